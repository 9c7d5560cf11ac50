//! Modelo de Rental
//!
//! Periodo de posesión física del vehículo, abierto 1:1 desde un booking
//! verificado. La transición Reserved → InProgress es explícita (start),
//! nunca implícita en el receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rental_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    Reserved,
    InProgress,
    Completed,
    Late,
    Cancelled,
}

/// Rental principal - mapea exactamente a la tabla rentals
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub vehicle_at_station_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: RentalStatus,
    pub score: Option<i16>,
    pub comment: Option<String>,
    pub rated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Rental {
    pub fn can_start(&self) -> bool {
        self.status == RentalStatus::Reserved
    }

    /// El receipt solo procede con el rental en curso; los demás gates
    /// (contratos firmados, inspección) se verifican por separado.
    pub fn can_complete(&self) -> bool {
        self.status == RentalStatus::InProgress
    }

    pub fn can_rate(&self) -> bool {
        matches!(self.status, RentalStatus::Completed | RentalStatus::Late)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rental(status: RentalStatus) -> Rental {
        let now = Utc::now();
        Rental {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            vehicle_at_station_id: Uuid::new_v4(),
            start_time: now,
            end_time: now + chrono::Duration::hours(6),
            status,
            score: None,
            comment: None,
            rated_at: None,
            created_at: now,
        }
    }

    #[test]
    fn start_only_from_reserved() {
        assert!(rental(RentalStatus::Reserved).can_start());
        assert!(!rental(RentalStatus::InProgress).can_start());
        assert!(!rental(RentalStatus::Completed).can_start());
    }

    #[test]
    fn receipt_requires_in_progress() {
        assert!(rental(RentalStatus::InProgress).can_complete());
        assert!(!rental(RentalStatus::Reserved).can_complete());
        assert!(!rental(RentalStatus::Completed).can_complete());
        assert!(!rental(RentalStatus::Cancelled).can_complete());
    }

    #[test]
    fn rating_only_after_the_rental_ends() {
        assert!(rental(RentalStatus::Completed).can_rate());
        assert!(rental(RentalStatus::Late).can_rate());
        assert!(!rental(RentalStatus::InProgress).can_rate());
    }
}
