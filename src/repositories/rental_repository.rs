use crate::models::rental::{Rental, RentalStatus};
use crate::utils::errors::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct RentalRepository {
    pool: PgPool,
}

impl RentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Rental>, AppError> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    pub async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Rental>, AppError> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Rental>, AppError> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(rental)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        rental: &Rental,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO rentals
                (id, booking_id, vehicle_at_station_id, start_time, end_time,
                 status, score, comment, rated_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(rental.id)
        .bind(rental.booking_id)
        .bind(rental.vehicle_at_station_id)
        .bind(rental.start_time)
        .bind(rental.end_time)
        .bind(rental.status)
        .bind(rental.score)
        .bind(rental.comment.as_deref())
        .bind(rental.rated_at)
        .bind(rental.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: RentalStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE rentals SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn set_rating(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        score: i16,
        comment: Option<&str>,
        rated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE rentals SET score = $2, comment = $3, rated_at = $4 WHERE id = $1")
            .bind(id)
            .bind(score)
            .bind(comment)
            .bind(rated_at)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
