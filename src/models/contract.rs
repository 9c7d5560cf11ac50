//! Modelos de Contract y Signature
//!
//! El contrato avanza de forma estrictamente monotónica
//! Issued → PartiallySigned → Signed; no hay transiciones hacia atrás.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Issued,
    PartiallySigned,
    Signed,
    Voided,
    Expired,
}

impl ContractStatus {
    /// Siguiente estado al recibir una firma, o None si el contrato no
    /// admite más firmas.
    pub fn next_on_sign(&self) -> Option<ContractStatus> {
        match self {
            ContractStatus::Issued => Some(ContractStatus::PartiallySigned),
            ContractStatus::PartiallySigned => Some(ContractStatus::Signed),
            ContractStatus::Signed | ContractStatus::Voided | ContractStatus::Expired => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "signature_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SignatureRole {
    Renter,
    Staff,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "signature_event", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SignatureEvent {
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "signature_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SignatureType {
    Drawn,
    Typed,
    DigitalCert,
    OnPaper,
}

/// Contract principal - mapea exactamente a la tabla contracts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contract {
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

/// Signature - mapea exactamente a la tabla signatures
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Signature {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub role: SignatureRole,
    pub event: SignatureEvent,
    pub signature_type: SignatureType,
    pub signed_at: DateTime<Utc>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_is_strictly_monotonic() {
        assert_eq!(
            ContractStatus::Issued.next_on_sign(),
            Some(ContractStatus::PartiallySigned)
        );
        assert_eq!(
            ContractStatus::PartiallySigned.next_on_sign(),
            Some(ContractStatus::Signed)
        );
    }

    #[test]
    fn signed_contract_rejects_further_signatures() {
        assert_eq!(ContractStatus::Signed.next_on_sign(), None);
        assert_eq!(ContractStatus::Voided.next_on_sign(), None);
        assert_eq!(ContractStatus::Expired.next_on_sign(), None);
    }

    #[test]
    fn signed_is_only_reachable_through_partially_signed() {
        // Issued nunca salta directo a Signed
        let mut status = ContractStatus::Issued;
        let mut steps = Vec::new();
        while let Some(next) = status.next_on_sign() {
            steps.push(next);
            status = next;
        }
        assert_eq!(
            steps,
            vec![ContractStatus::PartiallySigned, ContractStatus::Signed]
        );
    }
}
