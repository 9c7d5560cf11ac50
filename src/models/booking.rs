//! Modelo de Booking
//!
//! Una reserva de un vehículo en estación para una ventana de tiempo,
//! previa a la entrega física. Mapea exactamente a la tabla bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado principal del booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingVerification,
    Verified,
    Cancelled,
    RentalCreated,
}

/// Resultado de la verificación de identidad en el pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    RejectedMismatch,
    RejectedOther,
}

impl VerificationStatus {
    /// Las variantes de rechazo requieren un cancel_reason obligatorio.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            VerificationStatus::RejectedMismatch | VerificationStatus::RejectedOther
        )
    }
}

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
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

impl Booking {
    /// La salida de PendingVerification es una transición one-shot:
    /// verificar o cancelar un booking ya resuelto debe fallar.
    pub fn is_pending_verification(&self) -> bool {
        self.status == BookingStatus::PendingVerification
    }

    /// Solo un booking verificado puede abrir un rental.
    pub fn can_open_rental(&self) -> bool {
        self.status == BookingStatus::Verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking_with_status(status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            renter_id: Uuid::new_v4(),
            vehicle_at_station_id: Uuid::new_v4(),
            start_time: now,
            end_time: now + chrono::Duration::hours(4),
            status,
            verification_status: VerificationStatus::Pending,
            verified_by: None,
            verified_at: None,
            cancel_reason: None,
            created_at: now,
        }
    }

    #[test]
    fn only_pending_bookings_can_be_checked_in() {
        assert!(booking_with_status(BookingStatus::PendingVerification).is_pending_verification());
        assert!(!booking_with_status(BookingStatus::Verified).is_pending_verification());
        assert!(!booking_with_status(BookingStatus::Cancelled).is_pending_verification());
        assert!(!booking_with_status(BookingStatus::RentalCreated).is_pending_verification());
    }

    #[test]
    fn only_verified_bookings_can_open_rental() {
        assert!(booking_with_status(BookingStatus::Verified).can_open_rental());
        assert!(!booking_with_status(BookingStatus::PendingVerification).can_open_rental());
        assert!(!booking_with_status(BookingStatus::RentalCreated).can_open_rental());
    }

    #[test]
    fn rejection_variants_require_reason() {
        assert!(VerificationStatus::RejectedMismatch.is_rejection());
        assert!(VerificationStatus::RejectedOther.is_rejection());
        assert!(!VerificationStatus::Approved.is_rejection());
        assert!(!VerificationStatus::Pending.is_rejection());
    }
}
