//! Modelos de Inspection y Report
//!
//! Inspección técnica del vehículo (pre/post rental) con lectura de
//! batería; los reports hijos capturan notas de daños.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inspection_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InspectionType {
    PreRental,
    PostRental,
}

/// Inspection principal - mapea exactamente a la tabla inspections
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Inspection {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub inspection_type: InspectionType,
    pub battery_capacity: Decimal,
    pub inspector_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Report hijo de una inspección (notas de daños)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InspectionReport {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub note: String,
    pub created_at: DateTime<Utc>,
}
