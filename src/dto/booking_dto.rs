use crate::models::booking::{Booking, BookingStatus, VerificationStatus};
use crate::models::payment::PaymentMethod;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request para crear un booking con su fee de depósito y payment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub renter_id: Uuid,
    pub vehicle_at_station_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub deposit_amount: Decimal,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    #[validate(length(max = 500))]
    pub deposit_description: Option<String>,
    pub amount_paid: Decimal,
    /// Método cuando el depósito se captura en la creación; None deja el
    /// payment en Unpaid a la espera del gateway.
    pub captured_method: Option<PaymentMethod>,
}

/// Decisión de verificación de identidad en el pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationDecision {
    Approved,
    RejectedMismatch,
    RejectedOther,
}

impl VerificationDecision {
    pub fn as_verification_status(&self) -> VerificationStatus {
        match self {
            VerificationDecision::Approved => VerificationStatus::Approved,
            VerificationDecision::RejectedMismatch => VerificationStatus::RejectedMismatch,
            VerificationDecision::RejectedOther => VerificationStatus::RejectedOther,
        }
    }

    pub fn is_rejection(&self) -> bool {
        !matches!(self, VerificationDecision::Approved)
    }
}

/// Request de verificación o rechazo de un booking
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyBookingRequest {
    pub staff_id: Uuid,
    pub decision: VerificationDecision,
    #[validate(length(min = 3, max = 500))]
    pub cancel_reason: Option<String>,
}

/// Request de inicio de auto-cancelación
#[derive(Debug, Deserialize)]
pub struct RequestCancellationRequest {
    pub renter_id: Uuid,
}

/// Response de inicio de auto-cancelación: el código viaja out-of-band,
/// nunca en esta respuesta.
#[derive(Debug, Serialize)]
pub struct RequestCancellationResponse {
    pub booking_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Request de confirmación de auto-cancelación
#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmCancellationRequest {
    pub renter_id: Uuid,
    #[validate(length(equal = 6))]
    pub code: String,
    #[validate(length(min = 3, max = 500))]
    pub reason: String,
    pub bank_account: Option<String>,
}

/// Response de confirmación de auto-cancelación
#[derive(Debug, Serialize)]
pub struct ConfirmCancellationResponse {
    pub booking_id: Uuid,
    pub refund_amount: Decimal,
    pub transaction_fee: Decimal,
    pub currency: String,
}

/// Response de booking para la API
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub vehicle_at_station_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub verification_status: VerificationStatus,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            renter_id: booking.renter_id,
            vehicle_at_station_id: booking.vehicle_at_station_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: booking.status,
            verification_status: booking.verification_status,
            verified_by: booking.verified_by,
            verified_at: booking.verified_at,
            cancel_reason: booking.cancel_reason,
            created_at: booking.created_at,
        }
    }
}
