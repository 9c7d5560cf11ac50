//! Controller del ciclo de vida de Rental
//!
//! Apertura desde un booking verificado, inicio explícito, emisión de
//! contratos, registro de inspecciones y el checklist multi-gate del
//! receipt de entrega.

use crate::dto::common::ApiResponse;
use crate::dto::contract_dto::ContractResponse;
use crate::dto::rental_dto::{
    IssueContractRequest, OpenRentalRequest, RateRentalRequest, RecordInspectionRequest,
    RentalResponse,
};
use crate::models::contract::{Contract, ContractStatus};
use crate::models::inspection::{Inspection, InspectionReport};
use crate::models::rental::{Rental, RentalStatus};
use crate::models::booking::BookingStatus;
use crate::models::vehicle_at_station::VehicleAtStationStatus;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::contract_repository::ContractRepository;
use crate::repositories::inspection_repository::InspectionRepository;
use crate::repositories::rental_repository::RentalRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{not_found_error, precondition_error, AppError};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Primer gate violado del receipt, si lo hay. Cada gate reporta por
/// separado para que el operador sepa exactamente qué falta.
pub fn receipt_gate_violation(
    contracts: &[Contract],
    inspection_count: i64,
    rental: &Rental,
) -> Option<&'static str> {
    if contracts.is_empty() {
        return Some("no contract has been created for this rental");
    }
    if contracts.iter().any(|c| c.status != ContractStatus::Signed) {
        return Some("all contracts must be signed before the receipt can be completed");
    }
    if inspection_count == 0 {
        return Some("no inspection has been recorded for this rental");
    }
    if !rental.can_complete() {
        return Some("rental is not in progress");
    }
    None
}

pub struct RentalController {
    pool: PgPool,
    repository: RentalRepository,
}

impl RentalController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RentalRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<RentalResponse, AppError> {
        let rental = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Rental", &id.to_string()))?;

        Ok(rental.into())
    }

    /// Abre un rental (Reserved) desde un booking verificado cuyo vehículo
    /// sigue en estado Booked, y marca el booking como RentalCreated.
    pub async fn open(
        &self,
        request: OpenRentalRequest,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        if request.end_time <= request.start_time {
            return Err(AppError::BadRequest(
                "end time must be after start time".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let booking = BookingRepository::find_by_id_for_update(&mut tx, request.booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &request.booking_id.to_string()))?;

        if !booking.can_open_rental() {
            return Err(precondition_error("only verified bookings can open a rental"));
        }

        let vehicle =
            VehicleRepository::find_by_id_for_update(&mut tx, booking.vehicle_at_station_id)
                .await?
                .ok_or_else(|| {
                    not_found_error(
                        "VehicleAtStation",
                        &booking.vehicle_at_station_id.to_string(),
                    )
                })?;
        if !vehicle.is_booked() {
            return Err(precondition_error("vehicle is not available for rental"));
        }

        let rental = Rental {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            vehicle_at_station_id: vehicle.id,
            start_time: request.start_time,
            end_time: request.end_time,
            status: RentalStatus::Reserved,
            score: None,
            comment: None,
            rated_at: None,
            created_at: now,
        };

        RentalRepository::insert(&mut tx, &rental).await?;
        BookingRepository::set_status(&mut tx, booking.id, BookingStatus::RentalCreated).await?;

        tx.commit().await?;

        tracing::info!(rental_id = %rental.id, booking_id = %booking.id, "rental opened");

        Ok(ApiResponse::success_with_message(
            rental.into(),
            "Rental opened from booking".to_string(),
        ))
    }

    /// Transición explícita Reserved → InProgress al entregar el vehículo.
    pub async fn start(&self, rental_id: Uuid) -> Result<ApiResponse<RentalResponse>, AppError> {
        let mut tx = self.pool.begin().await?;

        let rental = RentalRepository::find_by_id_for_update(&mut tx, rental_id)
            .await?
            .ok_or_else(|| not_found_error("Rental", &rental_id.to_string()))?;

        if !rental.can_start() {
            return Err(precondition_error("rental can only be started from reserved"));
        }

        RentalRepository::set_status(&mut tx, rental.id, RentalStatus::InProgress).await?;
        tx.commit().await?;

        tracing::info!(rental_id = %rental.id, "rental started");

        let updated = self.get_by_id(rental_id).await?;
        Ok(ApiResponse::success_with_message(
            updated,
            "Rental started".to_string(),
        ))
    }

    /// Emite un contrato (Issued) con campos de documento pendientes del
    /// workflow de firma.
    pub async fn issue_contract(
        &self,
        rental_id: Uuid,
        request: IssueContractRequest,
    ) -> Result<ApiResponse<ContractResponse>, AppError> {
        request.validate()?;

        let rental = self
            .repository
            .find_by_id(rental_id)
            .await?
            .ok_or_else(|| not_found_error("Rental", &rental_id.to_string()))?;

        let contract = Contract {
            id: Uuid::new_v4(),
            rental_id: rental.id,
            status: ContractStatus::Issued,
            provider: request.provider,
            document_url: None,
            document_hash: None,
            audit_trail_url: None,
            completed_at: None,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;
        ContractRepository::insert(&mut tx, &contract).await?;
        tx.commit().await?;

        tracing::info!(contract_id = %contract.id, rental_id = %rental.id, "contract issued");

        Ok(ApiResponse::success_with_message(
            contract.into(),
            "Contract issued".to_string(),
        ))
    }

    /// Registra una inspección. Las inspecciones no pueden preceder al
    /// acuerdo contractual.
    pub async fn record_inspection(
        &self,
        rental_id: Uuid,
        request: RecordInspectionRequest,
    ) -> Result<ApiResponse<serde_json::Value>, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let rental = RentalRepository::find_by_id_for_update(&mut tx, rental_id)
            .await?
            .ok_or_else(|| not_found_error("Rental", &rental_id.to_string()))?;

        let contract_count = ContractRepository::count_by_rental_tx(&mut tx, rental.id).await?;
        if contract_count == 0 {
            return Err(precondition_error(
                "contract must be created before inspection can be received",
            ));
        }

        let inspection = Inspection {
            id: Uuid::new_v4(),
            rental_id: rental.id,
            inspection_type: request.inspection_type,
            battery_capacity: request.battery_capacity,
            inspector_id: request.inspector_id,
            created_at: now,
        };

        InspectionRepository::insert(&mut tx, &inspection).await?;

        for note in &request.report_notes {
            let report = InspectionReport {
                id: Uuid::new_v4(),
                inspection_id: inspection.id,
                note: note.clone(),
                created_at: now,
            };
            InspectionRepository::insert_report(&mut tx, &report).await?;
        }

        tx.commit().await?;

        tracing::info!(
            inspection_id = %inspection.id,
            rental_id = %rental.id,
            reports = request.report_notes.len(),
            "inspection recorded"
        );

        Ok(ApiResponse::success_with_message(
            serde_json::json!({ "inspection_id": inspection.id }),
            "Inspection recorded".to_string(),
        ))
    }

    /// Receipt de entrega: checklist multi-gate. Requiere al menos un
    /// contrato, todos firmados, al menos una inspección y el rental en
    /// curso; cada gate incumplido falla con su propio mensaje.
    pub async fn complete_receipt(
        &self,
        rental_id: Uuid,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        let mut tx = self.pool.begin().await?;

        let rental = RentalRepository::find_by_id_for_update(&mut tx, rental_id)
            .await?
            .ok_or_else(|| not_found_error("Rental", &rental_id.to_string()))?;

        let contracts = ContractRepository::list_by_rental_tx(&mut tx, rental.id).await?;
        let inspection_count = InspectionRepository::count_by_rental_tx(&mut tx, rental.id).await?;

        if let Some(violation) = receipt_gate_violation(&contracts, inspection_count, &rental) {
            return Err(precondition_error(violation));
        }

        RentalRepository::set_status(&mut tx, rental.id, RentalStatus::Completed).await?;
        // La devolución del vehículo lo deja disponible de nuevo
        VehicleRepository::set_status(
            &mut tx,
            rental.vehicle_at_station_id,
            VehicleAtStationStatus::Available,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(rental_id = %rental.id, "rental receipt completed");

        let updated = self.get_by_id(rental_id).await?;
        Ok(ApiResponse::success_with_message(
            updated,
            "Rental completed".to_string(),
        ))
    }

    /// Calificación post-rental.
    pub async fn rate(
        &self,
        rental_id: Uuid,
        request: RateRentalRequest,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let rental = RentalRepository::find_by_id_for_update(&mut tx, rental_id)
            .await?
            .ok_or_else(|| not_found_error("Rental", &rental_id.to_string()))?;

        if !rental.can_rate() {
            return Err(precondition_error("only finished rentals can be rated"));
        }

        RentalRepository::set_rating(
            &mut tx,
            rental.id,
            request.score,
            request.comment.as_deref(),
            Utc::now(),
        )
        .await?;

        tx.commit().await?;

        let updated = self.get_by_id(rental_id).await?;
        Ok(ApiResponse::success_with_message(
            updated,
            "Rental rated".to_string(),
        ))
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
            end_time: now + chrono::Duration::hours(4),
            status,
            score: None,
            comment: None,
            rated_at: None,
            created_at: now,
        }
    }

    fn contract(status: ContractStatus) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            rental_id: Uuid::new_v4(),
            status,
            provider: "signwell".to_string(),
            document_url: None,
            document_hash: None,
            audit_trail_url: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn receipt_fails_without_contracts() {
        let violation =
            receipt_gate_violation(&[], 1, &rental(RentalStatus::InProgress));
        assert_eq!(violation, Some("no contract has been created for this rental"));
    }

    #[test]
    fn receipt_fails_with_unsigned_contracts() {
        for status in [ContractStatus::Issued, ContractStatus::PartiallySigned] {
            let contracts = vec![contract(ContractStatus::Signed), contract(status)];
            let violation =
                receipt_gate_violation(&contracts, 1, &rental(RentalStatus::InProgress));
            assert_eq!(
                violation,
                Some("all contracts must be signed before the receipt can be completed")
            );
        }
    }

    #[test]
    fn receipt_fails_without_inspections() {
        let contracts = vec![contract(ContractStatus::Signed)];
        let violation =
            receipt_gate_violation(&contracts, 0, &rental(RentalStatus::InProgress));
        assert_eq!(
            violation,
            Some("no inspection has been recorded for this rental")
        );
    }

    #[test]
    fn receipt_fails_when_rental_is_not_in_progress() {
        let contracts = vec![contract(ContractStatus::Signed)];
        let violation = receipt_gate_violation(&contracts, 1, &rental(RentalStatus::Reserved));
        assert_eq!(violation, Some("rental is not in progress"));
    }

    #[test]
    fn receipt_passes_when_every_gate_is_met() {
        let contracts = vec![contract(ContractStatus::Signed), contract(ContractStatus::Signed)];
        let violation =
            receipt_gate_violation(&contracts, 2, &rental(RentalStatus::InProgress));
        assert_eq!(violation, None);
    }
}
