use crate::models::fee::{Fee, FeeType};
use crate::models::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::utils::errors::AppError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Repositorio de fees y sus payments 1:1
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_deposit_fee_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<Fee>, AppError> {
        let fee = sqlx::query_as::<_, Fee>(
            "SELECT * FROM fees WHERE booking_id = $1 AND fee_type = $2",
        )
        .bind(booking_id)
        .bind(FeeType::Deposit)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fee)
    }

    pub async fn find_payment_by_fee(&self, fee_id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE fee_id = $1")
            .bind(fee_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Variante transaccional del lookup de fee de depósito; la
    /// reconciliación la necesita dentro de su propia transacción.
    pub async fn find_deposit_fee_by_booking_tx(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
    ) -> Result<Option<Fee>, AppError> {
        let fee = sqlx::query_as::<_, Fee>(
            "SELECT * FROM fees WHERE booking_id = $1 AND fee_type = $2",
        )
        .bind(booking_id)
        .bind(FeeType::Deposit)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(fee)
    }

    /// Lock de fila sobre el payment: el check de idempotencia y la
    /// mutación final deben verse dentro de la misma transacción.
    pub async fn find_payment_by_fee_for_update(
        tx: &mut Transaction<'_, Postgres>,
        fee_id: Uuid,
    ) -> Result<Option<Payment>, AppError> {
        let payment =
            sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE fee_id = $1 FOR UPDATE")
                .bind(fee_id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(payment)
    }

    pub async fn insert_fee(tx: &mut Transaction<'_, Postgres>, fee: &Fee) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO fees (id, booking_id, fee_type, amount, currency, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(fee.id)
        .bind(fee.booking_id)
        .bind(fee.fee_type)
        .bind(fee.amount)
        .bind(&fee.currency)
        .bind(fee.description.as_deref())
        .bind(fee.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn insert_payment(
        tx: &mut Transaction<'_, Postgres>,
        payment: &Payment,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO payments
                (id, fee_id, method, status, amount_paid, paid_at, provider_reference, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(payment.id)
        .bind(payment.fee_id)
        .bind(payment.method)
        .bind(payment.status)
        .bind(payment.amount_paid)
        .bind(payment.paid_at)
        .bind(payment.provider_reference.as_deref())
        .bind(payment.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn mark_paid(
        tx: &mut Transaction<'_, Postgres>,
        payment_id: Uuid,
        amount_paid: Decimal,
        method: PaymentMethod,
        provider_reference: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, amount_paid = $3, method = $4, provider_reference = $5, paid_at = $6
            WHERE id = $1
            "#,
        )
        .bind(payment_id)
        .bind(PaymentStatus::Paid)
        .bind(amount_paid)
        .bind(method)
        .bind(provider_reference)
        .bind(paid_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn mark_failed(
        tx: &mut Transaction<'_, Postgres>,
        payment_id: Uuid,
        failure_reference: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE payments SET status = $2, provider_reference = $3 WHERE id = $1",
        )
        .bind(payment_id)
        .bind(PaymentStatus::Failed)
        .bind(failure_reference)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Una vez Refunded el payment no vuelve a cambiar de estado.
    pub async fn mark_refunded(
        tx: &mut Transaction<'_, Postgres>,
        payment_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE payments SET status = $2 WHERE id = $1")
            .bind(payment_id)
            .bind(PaymentStatus::Refunded)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
