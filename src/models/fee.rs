//! Modelo de Fee
//!
//! Cargo monetario asociado a un booking. Como máximo un fee de tipo
//! Deposit por booking (índice único parcial en el schema).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "fee_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Deposit,
    RentalCharge,
    Surcharge,
    Damage,
    Other,
}

/// Fee principal - mapea exactamente a la tabla fees
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fee {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub fee_type: FeeType,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
