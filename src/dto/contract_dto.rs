use crate::models::contract::{
    Contract, ContractStatus, SignatureEvent, SignatureRole, SignatureType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Evidencia de firma electrónica suministrada por el proveedor
#[derive(Debug, Clone, Deserialize)]
pub struct ESignatureEvidence {
    pub signer_ip: Option<String>,
    pub user_agent: Option<String>,
    pub provider_signature_id: Option<String>,
    pub cert_subject: Option<String>,
    pub cert_issuer: Option<String>,
    pub cert_serial: Option<String>,
    pub cert_fingerprint: Option<String>,
    pub content_hash: Option<String>,
    pub evidence_url: Option<String>,
}

/// Request de firma de contrato. La corrección de qué parte firma contra
/// role/event es obligación del caller; aquí solo se registra.
#[derive(Debug, Deserialize)]
pub struct SignContractRequest {
    pub role: SignatureRole,
    pub event: SignatureEvent,
    pub signature_type: SignatureType,
    pub evidence: Option<ESignatureEvidence>,
}

/// Response de contrato para la API
#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub status: ContractStatus,
    pub provider: String,
    pub document_url: Option<String>,
    pub document_hash: Option<String>,
    pub audit_trail_url: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        Self {
            id: contract.id,
            rental_id: contract.rental_id,
            status: contract.status,
            provider: contract.provider,
            document_url: contract.document_url,
            document_hash: contract.document_hash,
            audit_trail_url: contract.audit_trail_url,
            completed_at: contract.completed_at,
            created_at: contract.created_at,
        }
    }
}
