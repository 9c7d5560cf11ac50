use crate::models::inspection::InspectionType;
use crate::models::rental::{Rental, RentalStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request para abrir un rental desde un booking verificado
#[derive(Debug, Deserialize)]
pub struct OpenRentalRequest {
    pub booking_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Request para emitir un contrato sobre un rental
#[derive(Debug, Deserialize, Validate)]
pub struct IssueContractRequest {
    #[validate(length(min = 2, max = 100))]
    pub provider: String,
}

/// Request para registrar una inspección técnica
#[derive(Debug, Deserialize)]
pub struct RecordInspectionRequest {
    pub inspector_id: Uuid,
    pub inspection_type: InspectionType,
    pub battery_capacity: Decimal,
    /// Notas de daños; cada una crea un report hijo
    #[serde(default)]
    pub report_notes: Vec<String>,
}

/// Request de calificación post-rental
#[derive(Debug, Deserialize, Validate)]
pub struct RateRentalRequest {
    #[validate(range(min = 1, max = 5))]
    pub score: i16,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

/// Response de rental para la API
#[derive(Debug, Serialize)]
pub struct RentalResponse {
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

impl From<Rental> for RentalResponse {
    fn from(rental: Rental) -> Self {
        Self {
            id: rental.id,
            booking_id: rental.booking_id,
            vehicle_at_station_id: rental.vehicle_at_station_id,
            start_time: rental.start_time,
            end_time: rental.end_time,
            status: rental.status,
            score: rental.score,
            comment: rental.comment,
            rated_at: rental.rated_at,
            created_at: rental.created_at,
        }
    }
}
