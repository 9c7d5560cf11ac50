//! Modelo de Payment
//!
//! Pago 1:1 con un fee. El par (status = Paid, provider_reference no vacía)
//! es el marcador de idempotencia frente a notificaciones duplicadas del
//! gateway.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
    Failed,
}

/// Método de pago interno, mapeado desde el bank code del gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Gateway,
    AtmCard,
    CreditCard,
    QrCode,
    Cash,
    Unknown,
}

impl PaymentMethod {
    /// Tabla finita bank code → método interno. Cualquier código no mapeado
    /// devuelve Unknown, nunca un match parcial.
    pub fn from_bank_code(bank_code: &str) -> Self {
        match bank_code {
            "VNPAYQR" => PaymentMethod::QrCode,
            "VNBANK" => PaymentMethod::AtmCard,
            "INTCARD" => PaymentMethod::CreditCard,
            "NCB" | "VIETCOMBANK" | "VIETINBANK" | "BIDV" | "AGRIBANK" | "SACOMBANK"
            | "TECHCOMBANK" | "MBBANK" | "ACB" | "TPBANK" => PaymentMethod::AtmCard,
            "VISA" | "MASTERCARD" | "JCB" => PaymentMethod::CreditCard,
            _ => PaymentMethod::Unknown,
        }
    }
}

/// Payment principal - mapea exactamente a la tabla payments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub fee_id: Uuid,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub amount_paid: Decimal,
    pub paid_at: Option<DateTime<Utc>>,
    pub provider_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Marcador de idempotencia: un payment está liquidado solo cuando
    /// está Paid y tiene referencia del proveedor no vacía.
    pub fn is_settled(&self) -> bool {
        self.status == PaymentStatus::Paid
            && self
                .provider_reference
                .as_deref()
                .map(|r| !r.is_empty())
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: PaymentStatus, provider_reference: Option<&str>) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            fee_id: Uuid::new_v4(),
            method: PaymentMethod::Gateway,
            status,
            amount_paid: Decimal::from(500_000),
            paid_at: None,
            provider_reference: provider_reference.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn settled_requires_paid_and_provider_reference() {
        assert!(payment(PaymentStatus::Paid, Some("14226112")).is_settled());
        assert!(!payment(PaymentStatus::Paid, None).is_settled());
        assert!(!payment(PaymentStatus::Paid, Some("")).is_settled());
        assert!(!payment(PaymentStatus::Unpaid, Some("14226112")).is_settled());
        assert!(!payment(PaymentStatus::Refunded, Some("14226112")).is_settled());
    }

    #[test]
    fn bank_code_mapping_is_total() {
        assert_eq!(PaymentMethod::from_bank_code("VNPAYQR"), PaymentMethod::QrCode);
        assert_eq!(PaymentMethod::from_bank_code("NCB"), PaymentMethod::AtmCard);
        assert_eq!(PaymentMethod::from_bank_code("VISA"), PaymentMethod::CreditCard);
        assert_eq!(PaymentMethod::from_bank_code("INTCARD"), PaymentMethod::CreditCard);
        // Un código desconocido nunca produce un match parcial
        assert_eq!(PaymentMethod::from_bank_code("NCBX"), PaymentMethod::Unknown);
        assert_eq!(PaymentMethod::from_bank_code(""), PaymentMethod::Unknown);
    }
}
