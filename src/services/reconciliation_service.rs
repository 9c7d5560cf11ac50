//! Motor de reconciliación de pagos
//!
//! Convierte una notificación IPN del gateway en una actualización
//! definitiva del payment interno y devuelve siempre un acknowledgement
//! bien formado: el gateway es un caller desatendido que reintenta
//! indefinidamente si no recibe respuesta dentro de su timeout. Ningún
//! camino de este módulo propaga errores hacia afuera.
//!
//! El pipeline corta en el primer fallo y cada salida es visible a nivel
//! de tipos; el check de idempotencia y la mutación final ocurren dentro
//! de la misma transacción para cerrar la ventana check-then-act entre
//! dos notificaciones concurrentes del mismo pedido.

use crate::models::fee::Fee;
use crate::models::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::payment_repository::PaymentRepository;
use crate::utils::errors::AppError;
use crate::utils::signature::{verify_signature, SECURE_HASH_FIELD};
use crate::services::vnpay_service::{amount_to_minor_units, parse_gateway_time};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Códigos de acknowledgement hacia el gateway
pub mod ipn_codes {
    pub const SUCCESS: &str = "00";
    pub const ORDER_NOT_FOUND: &str = "01";
    pub const ALREADY_CONFIRMED: &str = "02";
    pub const FEE_NOT_FOUND: &str = "03";
    pub const INVALID_AMOUNT: &str = "04";
    pub const PAYMENT_NOT_FOUND: &str = "05";
    pub const INVALID_SIGNATURE: &str = "97";
    pub const UNKNOWN_ERROR: &str = "99";
}

/// Acknowledgement hacia el gateway; siempre bien formado
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpnResponse {
    #[serde(rename = "RspCode")]
    pub rsp_code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl IpnResponse {
    pub fn new(rsp_code: &str, message: &str) -> Self {
        Self {
            rsp_code: rsp_code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn confirm_success() -> Self {
        Self::new(ipn_codes::SUCCESS, "Confirm Success")
    }

    pub fn order_not_found() -> Self {
        Self::new(ipn_codes::ORDER_NOT_FOUND, "Order not found")
    }

    /// Duplicado: no es un error, es un no-op con forma de éxito.
    pub fn already_confirmed() -> Self {
        Self::new(ipn_codes::ALREADY_CONFIRMED, "Order already confirmed")
    }

    pub fn fee_not_found() -> Self {
        Self::new(ipn_codes::FEE_NOT_FOUND, "Fee not found")
    }

    pub fn invalid_amount() -> Self {
        Self::new(ipn_codes::INVALID_AMOUNT, "Invalid amount")
    }

    pub fn payment_not_found() -> Self {
        Self::new(ipn_codes::PAYMENT_NOT_FOUND, "Payment not found")
    }

    pub fn invalid_signature() -> Self {
        Self::new(ipn_codes::INVALID_SIGNATURE, "Invalid signature")
    }

    pub fn unknown_error() -> Self {
        Self::new(ipn_codes::UNKNOWN_ERROR, "Unknown error")
    }
}

/// Resultado del gateway: solo la combinación 00/00 confirma el pago.
pub fn gateway_reports_success(response_code: &str, transaction_status: &str) -> bool {
    response_code == "00" && transaction_status == "00"
}

/// Solo los campos con prefijo vnp_ participan en la firma.
pub fn signed_fields(params: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    params
        .iter()
        .filter(|(key, _)| key.starts_with("vnp_"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Gate de firma sobre la notificación completa: el hash debe estar
/// presente y cubrir todos los campos vnp_ restantes.
pub fn notification_signature_valid(params: &BTreeMap<String, String>, secret: &str) -> bool {
    params
        .get(SECURE_HASH_FIELD)
        .map(|hash| verify_signature(hash, secret, &signed_fields(params)))
        .unwrap_or(false)
}

/// Resultado de evaluar una notificación contra el fee y el payment ya
/// cargados. Solo las variantes Record* mutan estado; un Reject devuelve
/// su acknowledgement tal cual y la transacción se descarta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationDecision {
    Reject(IpnResponse),
    RecordPaid {
        payment_id: Uuid,
        method: PaymentMethod,
        provider_reference: String,
        paid_at: DateTime<Utc>,
    },
    RecordFailure {
        payment_id: Uuid,
        failure_reference: String,
    },
}

/// Tramo de decisión del pipeline, libre de repositorios: monto en
/// unidades menores, existencia del payment, idempotencia y resultado
/// reportado por el gateway.
pub fn decide_notification(
    params: &BTreeMap<String, String>,
    fee: &Fee,
    payment: Option<&Payment>,
    now: DateTime<Utc>,
) -> NotificationDecision {
    let notified_amount = params
        .get("vnp_Amount")
        .and_then(|raw| raw.parse::<i64>().ok());
    let expected_amount = amount_to_minor_units(fee.amount);
    if notified_amount.is_none() || notified_amount != expected_amount {
        return NotificationDecision::Reject(IpnResponse::invalid_amount());
    }

    let Some(payment) = payment else {
        return NotificationDecision::Reject(IpnResponse::payment_not_found());
    };

    // Idempotencia: un duplicado es un no-op, no un error, y no debe
    // contabilizar fondos dos veces. Un payment ya devuelto tampoco se
    // revierte por una notificación tardía.
    if payment.is_settled() || payment.status == PaymentStatus::Refunded {
        return NotificationDecision::Reject(IpnResponse::already_confirmed());
    }

    let response_code = params.get("vnp_ResponseCode").map(String::as_str).unwrap_or("");
    let transaction_status = params
        .get("vnp_TransactionStatus")
        .map(String::as_str)
        .unwrap_or("");

    if gateway_reports_success(response_code, transaction_status) {
        NotificationDecision::RecordPaid {
            payment_id: payment.id,
            method: params
                .get("vnp_BankCode")
                .map(|code| PaymentMethod::from_bank_code(code))
                .unwrap_or(PaymentMethod::Unknown),
            provider_reference: params
                .get("vnp_TransactionNo")
                .cloned()
                .unwrap_or_default(),
            paid_at: params
                .get("vnp_PayDate")
                .and_then(|raw| parse_gateway_time(raw))
                .unwrap_or(now),
        }
    } else {
        NotificationDecision::RecordFailure {
            payment_id: payment.id,
            failure_reference: format!("ERR:{}/{}", response_code, transaction_status),
        }
    }
}

pub struct ReconciliationService {
    pool: PgPool,
    hash_secret: String,
}

impl ReconciliationService {
    pub fn new(pool: PgPool, hash_secret: String) -> Self {
        Self { pool, hash_secret }
    }

    /// Procesa una notificación IPN. Nunca propaga errores: los fallos
    /// internos inesperados se mapean al código genérico "99".
    pub async fn process_ipn(&self, params: &BTreeMap<String, String>) -> IpnResponse {
        match self.try_process(params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("IPN processing failed internally: {}", e);
                IpnResponse::unknown_error()
            }
        }
    }

    async fn try_process(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<IpnResponse, AppError> {
        // 1. Firma
        if !notification_signature_valid(params, &self.hash_secret) {
            return Ok(IpnResponse::invalid_signature());
        }

        // 2. Referencia de pedido
        let Some(booking_id) = params
            .get("vnp_TxnRef")
            .and_then(|raw| Uuid::parse_str(raw).ok())
        else {
            return Ok(IpnResponse::order_not_found());
        };

        let mut tx = self.pool.begin().await?;

        // 3. Booking
        let Some(booking) = BookingRepository::find_by_id_for_update(&mut tx, booking_id).await?
        else {
            return Ok(IpnResponse::order_not_found());
        };

        // 4. Fee de depósito
        let Some(fee) =
            PaymentRepository::find_deposit_fee_by_booking_tx(&mut tx, booking.id).await?
        else {
            return Ok(IpnResponse::fee_not_found());
        };

        // 5-8. Monto, payment, idempotencia y resultado del gateway:
        //      decisión pura sobre lo ya cargado bajo lock.
        let payment = PaymentRepository::find_payment_by_fee_for_update(&mut tx, fee.id).await?;

        match decide_notification(params, &fee, payment.as_ref(), Utc::now()) {
            NotificationDecision::Reject(response) => return Ok(response),

            NotificationDecision::RecordPaid {
                payment_id,
                method,
                provider_reference,
                paid_at,
            } => {
                PaymentRepository::mark_paid(
                    &mut tx,
                    payment_id,
                    fee.amount,
                    method,
                    &provider_reference,
                    paid_at,
                )
                .await?;

                tracing::info!(
                    booking_id = %booking.id,
                    payment_id = %payment_id,
                    provider_reference,
                    "deposit payment confirmed by gateway"
                );
            }

            NotificationDecision::RecordFailure {
                payment_id,
                failure_reference,
            } => {
                PaymentRepository::mark_failed(&mut tx, payment_id, &failure_reference).await?;

                tracing::warn!(
                    booking_id = %booking.id,
                    payment_id = %payment_id,
                    failure_reference,
                    "gateway reported a failed deposit payment"
                );
            }
        }

        tx.commit().await?;

        // El acknowledgement confirma la recepción, no el resultado del
        // pago: también un pago fallido registrado responde "00".
        Ok(IpnResponse::confirm_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fee::FeeType;
    use crate::utils::signature::sign_params;
    use rust_decimal::Decimal;

    fn deposit_fee(amount: i64) -> Fee {
        Fee {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            fee_type: FeeType::Deposit,
            amount: Decimal::from(amount),
            currency: "VND".to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn payment_for(fee: &Fee, status: PaymentStatus, provider_reference: Option<&str>) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            fee_id: fee.id,
            method: PaymentMethod::Gateway,
            status,
            amount_paid: fee.amount,
            paid_at: None,
            provider_reference: provider_reference.map(String::from),
            created_at: Utc::now(),
        }
    }

    fn notification(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn successful_notification() -> BTreeMap<String, String> {
        notification(&[
            ("vnp_Amount", "50000000"),
            ("vnp_ResponseCode", "00"),
            ("vnp_TransactionStatus", "00"),
            ("vnp_TransactionNo", "14226112"),
            ("vnp_BankCode", "NCB"),
            ("vnp_PayDate", "20250823173000"),
        ])
    }

    #[test]
    fn amount_mismatch_is_rejected_without_mutation() {
        let fee = deposit_fee(500_000);
        let payment = payment_for(&fee, PaymentStatus::Unpaid, None);

        let mut params = successful_notification();
        params.insert("vnp_Amount".to_string(), "49000000".to_string());

        let decision = decide_notification(&params, &fee, Some(&payment), Utc::now());
        assert_eq!(
            decision,
            NotificationDecision::Reject(IpnResponse::invalid_amount())
        );
    }

    #[test]
    fn missing_or_garbled_amount_is_invalid() {
        let fee = deposit_fee(500_000);
        let payment = payment_for(&fee, PaymentStatus::Unpaid, None);

        let mut params = successful_notification();
        params.remove("vnp_Amount");
        assert_eq!(
            decide_notification(&params, &fee, Some(&payment), Utc::now()),
            NotificationDecision::Reject(IpnResponse::invalid_amount())
        );

        params.insert("vnp_Amount".to_string(), "not-a-number".to_string());
        assert_eq!(
            decide_notification(&params, &fee, Some(&payment), Utc::now()),
            NotificationDecision::Reject(IpnResponse::invalid_amount())
        );
    }

    #[test]
    fn duplicate_notification_is_acknowledged_without_double_counting() {
        let fee = deposit_fee(500_000);
        let settled = payment_for(&fee, PaymentStatus::Paid, Some("14226112"));

        // Monto y códigos correctos: sin el corte de idempotencia esto
        // volvería a contabilizar el depósito.
        let decision = decide_notification(&successful_notification(), &fee, Some(&settled), Utc::now());
        assert_eq!(
            decision,
            NotificationDecision::Reject(IpnResponse::already_confirmed())
        );
    }

    #[test]
    fn late_notification_never_reverses_a_refund() {
        let fee = deposit_fee(500_000);
        let refunded = payment_for(&fee, PaymentStatus::Refunded, None);

        let decision = decide_notification(&successful_notification(), &fee, Some(&refunded), Utc::now());
        assert_eq!(
            decision,
            NotificationDecision::Reject(IpnResponse::already_confirmed())
        );
    }

    #[test]
    fn missing_payment_row_is_reported_not_confirmed() {
        let fee = deposit_fee(500_000);
        let decision = decide_notification(&successful_notification(), &fee, None, Utc::now());
        assert_eq!(
            decision,
            NotificationDecision::Reject(IpnResponse::payment_not_found())
        );
    }

    #[test]
    fn successful_notification_settles_the_payment() {
        let fee = deposit_fee(500_000);
        let payment = payment_for(&fee, PaymentStatus::Unpaid, None);

        let decision = decide_notification(&successful_notification(), &fee, Some(&payment), Utc::now());
        match decision {
            NotificationDecision::RecordPaid {
                payment_id,
                method,
                provider_reference,
                paid_at,
            } => {
                assert_eq!(payment_id, payment.id);
                assert_eq!(method, PaymentMethod::AtmCard);
                assert_eq!(provider_reference, "14226112");
                assert_eq!(paid_at, parse_gateway_time("20250823173000").unwrap());
            }
            other => panic!("expected RecordPaid, got {:?}", other),
        }
    }

    #[test]
    fn failed_gateway_result_is_recorded_not_confirmed() {
        let fee = deposit_fee(500_000);
        let payment = payment_for(&fee, PaymentStatus::Unpaid, None);

        let mut params = successful_notification();
        params.insert("vnp_ResponseCode".to_string(), "24".to_string());
        params.insert("vnp_TransactionStatus".to_string(), "02".to_string());

        let decision = decide_notification(&params, &fee, Some(&payment), Utc::now());
        assert_eq!(
            decision,
            NotificationDecision::RecordFailure {
                payment_id: payment.id,
                failure_reference: "ERR:24/02".to_string(),
            }
        );
    }

    #[test]
    fn tampered_notification_fails_the_signature_gate() {
        let secret = "RAOEXHYVSDDIIENYWSLDIIZTANXUXZFJ";
        let mut params = successful_notification();

        // Sin hash no hay firma válida
        assert!(!notification_signature_valid(&params, secret));

        let signature = sign_params(&signed_fields(&params), secret);
        params.insert(SECURE_HASH_FIELD.to_string(), signature);
        assert!(notification_signature_valid(&params, secret));

        params.insert("vnp_Amount".to_string(), "99000000".to_string());
        assert!(!notification_signature_valid(&params, secret));
    }

    #[test]
    fn only_double_zero_confirms_payment() {
        assert!(gateway_reports_success("00", "00"));
        assert!(!gateway_reports_success("00", "02"));
        assert!(!gateway_reports_success("24", "00"));
        assert!(!gateway_reports_success("", ""));
    }

    #[test]
    fn only_prefixed_fields_participate_in_signing() {
        let mut params = BTreeMap::new();
        params.insert("vnp_Amount".to_string(), "50000000".to_string());
        params.insert("vnp_TxnRef".to_string(), "abc".to_string());
        params.insert("extraneous".to_string(), "1".to_string());
        params.insert("another_field".to_string(), "x".to_string());

        let signed = signed_fields(&params);
        assert_eq!(signed.len(), 2);
        assert!(signed.contains_key("vnp_Amount"));
        assert!(signed.contains_key("vnp_TxnRef"));
    }

    #[test]
    fn acknowledgement_codes_match_the_gateway_vocabulary() {
        assert_eq!(IpnResponse::confirm_success().rsp_code, "00");
        assert_eq!(IpnResponse::order_not_found().rsp_code, "01");
        assert_eq!(IpnResponse::already_confirmed().rsp_code, "02");
        assert_eq!(IpnResponse::invalid_amount().rsp_code, "04");
        assert_eq!(IpnResponse::invalid_signature().rsp_code, "97");
        assert_eq!(IpnResponse::unknown_error().rsp_code, "99");
    }
}
