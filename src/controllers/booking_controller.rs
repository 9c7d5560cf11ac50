//! Controller del ciclo de vida de Booking
//!
//! Creación del trío booking + fee de depósito + payment, verificación
//! one-shot en el pickup y el flujo de auto-cancelación con código
//! one-time acotado en el tiempo.

use crate::dto::booking_dto::{
    BookingResponse, ConfirmCancellationRequest, ConfirmCancellationResponse,
    CreateBookingRequest, RequestCancellationRequest, RequestCancellationResponse,
    VerifyBookingRequest,
};
use crate::dto::common::ApiResponse;
use crate::models::booking::{Booking, BookingStatus, VerificationStatus};
use crate::models::cancellation_code::CancellationCode;
use crate::models::fee::{Fee, FeeType};
use crate::models::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::models::vehicle_at_station::VehicleAtStationStatus;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::cancellation_code_repository::CancellationCodeRepository;
use crate::repositories::payment_repository::PaymentRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::notification_service::NotificationService;
use crate::utils::errors::{not_found_error, precondition_error, AppError};
use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Porcentaje retenido como fee de transacción al auto-cancelar.
/// Constante de política, no un input configurable.
const CANCELLATION_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Vigencia absoluta del código one-time de cancelación, en minutos.
const CANCELLATION_CODE_TTL_MINUTES: i64 = 15;

/// Calcula (fee de transacción, monto a devolver) para una
/// auto-cancelación. El caller solo ve el resultado, no la tarifa.
pub fn compute_refund(amount_paid: Decimal) -> (Decimal, Decimal) {
    let transaction_fee = amount_paid * CANCELLATION_FEE_RATE;
    (transaction_fee, amount_paid - transaction_fee)
}

/// Genera un código numérico de 6 dígitos, con ceros a la izquierda.
fn generate_cancellation_code() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", value)
}

pub struct BookingController {
    pool: PgPool,
    repository: BookingRepository,
}

impl BookingController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BookingRepository::new(pool.clone()),
            pool,
        }
    }

    /// Crea el trío Booking + Fee de depósito + Payment en un solo commit.
    /// Un fallo a mitad de camino no deja ningún registro parcial.
    pub async fn create(
        &self,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        request.validate()?;

        if request.end_time <= request.start_time {
            return Err(AppError::BadRequest(
                "end time must be after start time".to_string(),
            ));
        }
        if request.deposit_amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "deposit amount must be positive".to_string(),
            ));
        }
        if request.captured_method.is_some() && request.amount_paid != request.deposit_amount {
            return Err(AppError::BadRequest(
                "amount paid must equal the deposit amount when captured up front".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let vehicle =
            VehicleRepository::find_by_id_for_update(&mut tx, request.vehicle_at_station_id)
                .await?
                .ok_or_else(|| {
                    not_found_error(
                        "VehicleAtStation",
                        &request.vehicle_at_station_id.to_string(),
                    )
                })?;
        if !vehicle.is_available() {
            return Err(precondition_error("vehicle is not available for booking"));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            renter_id: request.renter_id,
            vehicle_at_station_id: request.vehicle_at_station_id,
            start_time: request.start_time,
            end_time: request.end_time,
            status: BookingStatus::PendingVerification,
            verification_status: VerificationStatus::Pending,
            verified_by: None,
            verified_at: None,
            cancel_reason: None,
            created_at: now,
        };

        let fee = Fee {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            fee_type: FeeType::Deposit,
            amount: request.deposit_amount,
            currency: request.currency.clone(),
            description: request.deposit_description.clone(),
            created_at: now,
        };

        let payment = match request.captured_method {
            Some(method) => Payment {
                id: Uuid::new_v4(),
                fee_id: fee.id,
                method,
                status: PaymentStatus::Paid,
                amount_paid: request.amount_paid,
                paid_at: Some(now),
                provider_reference: None,
                created_at: now,
            },
            None => Payment {
                id: Uuid::new_v4(),
                fee_id: fee.id,
                method: PaymentMethod::Gateway,
                status: PaymentStatus::Unpaid,
                amount_paid: request.amount_paid,
                paid_at: None,
                provider_reference: None,
                created_at: now,
            },
        };

        BookingRepository::insert(&mut tx, &booking).await?;
        PaymentRepository::insert_fee(&mut tx, &fee).await?;
        PaymentRepository::insert_payment(&mut tx, &payment).await?;
        VehicleRepository::set_status(&mut tx, vehicle.id, VehicleAtStationStatus::Booked).await?;

        tx.commit().await?;

        tracing::info!(booking_id = %booking.id, renter_id = %booking.renter_id, "booking created");

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Booking created with deposit fee and payment".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<BookingResponse, AppError> {
        let booking = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &id.to_string()))?;

        Ok(booking.into())
    }

    /// Verifica o rechaza un booking en el pickup. Transición one-shot:
    /// un booking ya verificado o cancelado no puede re-verificarse.
    pub async fn verify_or_reject(
        &self,
        booking_id: Uuid,
        request: VerifyBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        request.validate()?;

        let decision = request.decision;
        if decision.is_rejection() && request.cancel_reason.is_none() {
            return Err(AppError::BadRequest(
                "cancel reason is required when rejecting a booking".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let booking = BookingRepository::find_by_id_for_update(&mut tx, booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;

        if !booking.is_pending_verification() {
            return Err(precondition_error("only pending bookings can be checked in"));
        }

        let verification_status = decision.as_verification_status();
        let (status, cancel_reason) = if decision.is_rejection() {
            (BookingStatus::Cancelled, request.cancel_reason.as_deref())
        } else {
            (BookingStatus::Verified, None)
        };

        BookingRepository::record_verification(
            &mut tx,
            booking.id,
            status,
            verification_status,
            request.staff_id,
            now,
            cancel_reason,
        )
        .await?;

        // Un rechazo libera el vehículo reservado
        if decision.is_rejection() {
            VehicleRepository::set_status(
                &mut tx,
                booking.vehicle_at_station_id,
                VehicleAtStationStatus::Available,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            staff_id = %request.staff_id,
            ?verification_status,
            "booking verification recorded"
        );

        let updated = self.get_by_id(booking_id).await?;
        Ok(ApiResponse::success_with_message(
            updated,
            "Booking verification recorded".to_string(),
        ))
    }

    /// Genera el código one-time de auto-cancelación. Exactamente un
    /// código pendiente por renter: el anterior se sobrescribe.
    pub async fn request_self_cancellation(
        &self,
        booking_id: Uuid,
        request: RequestCancellationRequest,
        notifications: &NotificationService,
    ) -> Result<ApiResponse<RequestCancellationResponse>, AppError> {
        let booking = self
            .repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;

        if booking.renter_id != request.renter_id {
            return Err(precondition_error("booking does not belong to this renter"));
        }
        if !booking.is_pending_verification() {
            return Err(precondition_error(
                "only pending bookings can be self-cancelled",
            ));
        }

        let now = Utc::now();
        let code = CancellationCode {
            id: Uuid::new_v4(),
            renter_id: request.renter_id,
            booking_id,
            code: generate_cancellation_code(),
            expires_at: now + Duration::minutes(CANCELLATION_CODE_TTL_MINUTES),
            consumed: false,
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;
        CancellationCodeRepository::upsert(&mut tx, &code).await?;
        tx.commit().await?;

        // Entrega out-of-band tras el commit; best effort
        notifications
            .send_cancellation_code(request.renter_id, booking_id, &code.code, code.expires_at)
            .await;

        tracing::info!(booking_id = %booking_id, renter_id = %request.renter_id, "cancellation code issued");

        Ok(ApiResponse::success_with_message(
            RequestCancellationResponse {
                booking_id,
                expires_at: code.expires_at,
            },
            "Cancellation code sent".to_string(),
        ))
    }

    /// Confirma la auto-cancelación canjeando el código. Devuelve el 95%
    /// del monto pagado; el booking queda Cancelled y el payment Refunded
    /// en el mismo commit que consume el código.
    pub async fn confirm_self_cancellation(
        &self,
        booking_id: Uuid,
        request: ConfirmCancellationRequest,
    ) -> Result<ApiResponse<ConfirmCancellationResponse>, AppError> {
        request.validate()?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let booking = BookingRepository::find_by_id_for_update(&mut tx, booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;

        if booking.renter_id != request.renter_id {
            return Err(precondition_error("booking does not belong to this renter"));
        }
        if !booking.is_pending_verification() {
            return Err(precondition_error(
                "only pending bookings can be self-cancelled",
            ));
        }

        let Some(code) =
            CancellationCodeRepository::find_by_renter_for_update(&mut tx, request.renter_id)
                .await?
        else {
            return Err(precondition_error("no cancellation code on record"));
        };

        if code.is_expired(now) {
            // El código expirado se purga aunque la operación falle
            CancellationCodeRepository::delete_by_renter(&mut tx, request.renter_id).await?;
            tx.commit().await?;
            return Err(precondition_error("cancellation code has expired"));
        }
        if !code.issued_for(booking_id) {
            return Err(precondition_error(
                "cancellation code was issued for a different booking",
            ));
        }
        if !code.matches(&request.code, now) {
            return Err(precondition_error("cancellation code does not match"));
        }

        let fee = PaymentRepository::find_deposit_fee_by_booking_tx(&mut tx, booking_id)
            .await?
            .ok_or_else(|| not_found_error("Deposit fee for booking", &booking_id.to_string()))?;
        let payment = PaymentRepository::find_payment_by_fee_for_update(&mut tx, fee.id)
            .await?
            .ok_or_else(|| not_found_error("Payment for fee", &fee.id.to_string()))?;

        let (transaction_fee, refund) = compute_refund(payment.amount_paid);
        let reason = format!(
            "{} (refund: {} {})",
            request.reason, refund, fee.currency
        );

        BookingRepository::set_cancelled(&mut tx, booking_id, &reason).await?;
        PaymentRepository::mark_refunded(&mut tx, payment.id).await?;
        CancellationCodeRepository::delete_by_renter(&mut tx, request.renter_id).await?;
        VehicleRepository::set_status(
            &mut tx,
            booking.vehicle_at_station_id,
            VehicleAtStationStatus::Available,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking_id,
            renter_id = %request.renter_id,
            %refund,
            "booking self-cancelled with refund"
        );

        Ok(ApiResponse::success_with_message(
            ConfirmCancellationResponse {
                booking_id,
                refund_amount: refund,
                transaction_fee,
                currency: fee.currency,
            },
            "Booking cancelled and deposit refunded".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_keeps_five_percent_transaction_fee() {
        let (fee, refund) = compute_refund(Decimal::from(500_000));
        assert_eq!(fee, Decimal::from(25_000));
        assert_eq!(refund, Decimal::from(475_000));
    }

    #[test]
    fn refund_of_zero_is_zero() {
        let (fee, refund) = compute_refund(Decimal::ZERO);
        assert_eq!(fee, Decimal::ZERO);
        assert_eq!(refund, Decimal::ZERO);
    }

    #[test]
    fn fee_plus_refund_equals_amount_paid() {
        let amount = Decimal::from(123_456);
        let (fee, refund) = compute_refund(amount);
        assert_eq!(fee + refund, amount);
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_cancellation_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
