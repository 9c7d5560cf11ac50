use crate::models::booking::{Booking, BookingStatus, VerificationStatus};
use crate::utils::errors::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn find_by_renter(&self, renter_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE renter_id = $1 ORDER BY created_at DESC",
        )
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Lookup con lock de fila, para guards de transición dentro de la
    /// transacción del controller.
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError> {
        let booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(booking)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        booking: &Booking,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO bookings
                (id, renter_id, vehicle_at_station_id, start_time, end_time,
                 status, verification_status, verified_by, verified_at, cancel_reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(booking.id)
        .bind(booking.renter_id)
        .bind(booking.vehicle_at_station_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.status)
        .bind(booking.verification_status)
        .bind(booking.verified_by)
        .bind(booking.verified_at)
        .bind(booking.cancel_reason.as_deref())
        .bind(booking.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn record_verification(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: BookingStatus,
        verification_status: VerificationStatus,
        verified_by: Uuid,
        verified_at: DateTime<Utc>,
        cancel_reason: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, verification_status = $3, verified_by = $4,
                verified_at = $5, cancel_reason = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(verification_status)
        .bind(verified_by)
        .bind(verified_at)
        .bind(cancel_reason)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn set_cancelled(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        cancel_reason: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET status = $2, cancel_reason = $3 WHERE id = $1")
            .bind(id)
            .bind(BookingStatus::Cancelled)
            .bind(cancel_reason)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
