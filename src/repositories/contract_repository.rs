use crate::models::contract::{Contract, ContractStatus, Signature};
use crate::utils::errors::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Repositorio de contratos y sus firmas
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Contract>, AppError> {
        let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contract)
    }

    pub async fn list_by_rental(&self, rental_id: Uuid) -> Result<Vec<Contract>, AppError> {
        let contracts = sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts WHERE rental_id = $1 ORDER BY created_at",
        )
        .bind(rental_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contracts)
    }

    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Contract>, AppError> {
        let contract =
            sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(contract)
    }

    /// Gate de inspección: cuenta contratos dentro de la transacción.
    pub async fn count_by_rental_tx(
        tx: &mut Transaction<'_, Postgres>,
        rental_id: Uuid,
    ) -> Result<i64, AppError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contracts WHERE rental_id = $1")
                .bind(rental_id)
                .fetch_one(&mut **tx)
                .await?;

        Ok(count.0)
    }

    pub async fn list_by_rental_tx(
        tx: &mut Transaction<'_, Postgres>,
        rental_id: Uuid,
    ) -> Result<Vec<Contract>, AppError> {
        let contracts = sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts WHERE rental_id = $1 ORDER BY created_at",
        )
        .bind(rental_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(contracts)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        contract: &Contract,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO contracts
                (id, rental_id, status, provider, document_url, document_hash,
                 audit_trail_url, completed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(contract.id)
        .bind(contract.rental_id)
        .bind(contract.status)
        .bind(&contract.provider)
        .bind(contract.document_url.as_deref())
        .bind(contract.document_hash.as_deref())
        .bind(contract.audit_trail_url.as_deref())
        .bind(contract.completed_at)
        .bind(contract.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn advance_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: ContractStatus,
        completed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE contracts SET status = $2, completed_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(completed_at)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn insert_signature(
        tx: &mut Transaction<'_, Postgres>,
        signature: &Signature,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO signatures
                (id, contract_id, role, event, signature_type, signed_at,
                 signer_ip, user_agent, provider_signature_id,
                 cert_subject, cert_issuer, cert_serial, cert_fingerprint,
                 content_hash, evidence_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(signature.id)
        .bind(signature.contract_id)
        .bind(signature.role)
        .bind(signature.event)
        .bind(signature.signature_type)
        .bind(signature.signed_at)
        .bind(signature.signer_ip.as_deref())
        .bind(signature.user_agent.as_deref())
        .bind(signature.provider_signature_id.as_deref())
        .bind(signature.cert_subject.as_deref())
        .bind(signature.cert_issuer.as_deref())
        .bind(signature.cert_serial.as_deref())
        .bind(signature.cert_fingerprint.as_deref())
        .bind(signature.content_hash.as_deref())
        .bind(signature.evidence_url.as_deref())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
