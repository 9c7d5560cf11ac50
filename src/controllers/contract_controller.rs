//! Controller del workflow de firma de contratos
//!
//! Avance estrictamente monotónico Issued → PartiallySigned → Signed.
//! La firma está cross-gated con las inspecciones: no se firma sin una
//! inspección registrada sobre el rental del contrato.

use crate::dto::common::ApiResponse;
use crate::dto::contract_dto::{ContractResponse, SignContractRequest};
use crate::models::contract::Signature;
use crate::repositories::contract_repository::ContractRepository;
use crate::repositories::inspection_repository::InspectionRepository;
use crate::utils::errors::{not_found_error, precondition_error, AppError};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ContractController {
    pool: PgPool,
    repository: ContractRepository,
}

impl ContractController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ContractRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ContractResponse, AppError> {
        let contract = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Contract", &id.to_string()))?;

        Ok(contract.into())
    }

    /// Registra una firma y avanza el contrato un paso. Cada llamada
    /// agrega exactamente un registro Signature.
    pub async fn sign(
        &self,
        contract_id: Uuid,
        request: SignContractRequest,
    ) -> Result<ApiResponse<ContractResponse>, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let contract = ContractRepository::find_by_id_for_update(&mut tx, contract_id)
            .await?
            .ok_or_else(|| not_found_error("Contract", &contract_id.to_string()))?;

        let inspection_count =
            InspectionRepository::count_by_rental_tx(&mut tx, contract.rental_id).await?;
        if inspection_count == 0 {
            return Err(precondition_error(
                "inspection must be recorded before the contract can be signed",
            ));
        }

        let Some(next_status) = contract.status.next_on_sign() else {
            return Err(precondition_error("contract is already signed"));
        };

        let evidence = request.evidence;
        let signature = Signature {
            id: Uuid::new_v4(),
            contract_id: contract.id,
            role: request.role,
            event: request.event,
            signature_type: request.signature_type,
            signed_at: now,
            signer_ip: evidence.as_ref().and_then(|e| e.signer_ip.clone()),
            user_agent: evidence.as_ref().and_then(|e| e.user_agent.clone()),
            provider_signature_id: evidence
                .as_ref()
                .and_then(|e| e.provider_signature_id.clone()),
            cert_subject: evidence.as_ref().and_then(|e| e.cert_subject.clone()),
            cert_issuer: evidence.as_ref().and_then(|e| e.cert_issuer.clone()),
            cert_serial: evidence.as_ref().and_then(|e| e.cert_serial.clone()),
            cert_fingerprint: evidence.as_ref().and_then(|e| e.cert_fingerprint.clone()),
            content_hash: evidence.as_ref().and_then(|e| e.content_hash.clone()),
            evidence_url: evidence.as_ref().and_then(|e| e.evidence_url.clone()),
        };

        ContractRepository::advance_status(&mut tx, contract.id, next_status, now).await?;
        ContractRepository::insert_signature(&mut tx, &signature).await?;

        tx.commit().await?;

        tracing::info!(
            contract_id = %contract.id,
            ?next_status,
            role = ?signature.role,
            event = ?signature.event,
            "contract signature recorded"
        );

        let updated = self.get_by_id(contract_id).await?;
        Ok(ApiResponse::success_with_message(
            updated,
            "Signature recorded".to_string(),
        ))
    }
}
