use crate::models::cancellation_code::CancellationCode;
use crate::utils::errors::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Repositorio de códigos one-shot de auto-cancelación.
///
/// Exactamente un código pendiente por renter: el upsert sobrescribe el par
/// código/expiración anterior en lugar de acumular.
pub struct CancellationCodeRepository {
    pool: PgPool,
}

impl CancellationCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(
        tx: &mut Transaction<'_, Postgres>,
        code: &CancellationCode,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO cancellation_codes
                (id, renter_id, booking_id, code, expires_at, consumed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (renter_id) DO UPDATE
            SET id = EXCLUDED.id,
                booking_id = EXCLUDED.booking_id,
                code = EXCLUDED.code,
                expires_at = EXCLUDED.expires_at,
                consumed = EXCLUDED.consumed,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(code.id)
        .bind(code.renter_id)
        .bind(code.booking_id)
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(code.consumed)
        .bind(code.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn find_by_renter(
        &self,
        renter_id: Uuid,
    ) -> Result<Option<CancellationCode>, AppError> {
        let code = sqlx::query_as::<_, CancellationCode>(
            "SELECT * FROM cancellation_codes WHERE renter_id = $1",
        )
        .bind(renter_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    /// Lookup con lock de fila dentro de la transacción de confirmación,
    /// para que dos confirmaciones concurrentes no consuman el mismo código.
    pub async fn find_by_renter_for_update(
        tx: &mut Transaction<'_, Postgres>,
        renter_id: Uuid,
    ) -> Result<Option<CancellationCode>, AppError> {
        let code = sqlx::query_as::<_, CancellationCode>(
            "SELECT * FROM cancellation_codes WHERE renter_id = $1 FOR UPDATE",
        )
        .bind(renter_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(code)
    }

    /// Invalida el código one-shot retirándolo del registro.
    pub async fn delete_by_renter(
        tx: &mut Transaction<'_, Postgres>,
        renter_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cancellation_codes WHERE renter_id = $1")
            .bind(renter_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
