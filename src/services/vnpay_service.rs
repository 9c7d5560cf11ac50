//! Cliente del gateway de pagos VNPay
//!
//! Construcción de la URL de pago firmada, conversión de montos a unidades
//! menores (×100), formato de timestamps del gateway, y los comandos
//! querydr/refund contra la API. La creación de la URL es pura respecto al
//! almacenamiento; solo query/refund tocan la red.

use crate::config::environment::GatewayConfig;
use crate::utils::errors::AppError;
use crate::utils::signature::{
    canonical_query, sign_command_fields, sign_params, SECURE_HASH_FIELD,
};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Versión del protocolo del gateway
pub const VNP_VERSION: &str = "2.1.0";
/// Formato de timestamps del gateway
pub const GATEWAY_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// El gateway opera en hora de Vietnam (GMT+7)
fn gateway_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).expect("GMT+7 is a valid offset")
}

/// Convierte un monto decimal al entero en unidades menores (×100) que el
/// gateway espera. Asume moneda equivalente a cero decimales (VND); si se
/// introduce otra moneda el factor debe volverse currency-aware.
pub fn amount_to_minor_units(amount: Decimal) -> Option<i64> {
    let scaled = amount.checked_mul(Decimal::from(100))?;
    if scaled.fract() != Decimal::ZERO {
        return None;
    }
    scaled.to_i64()
}

/// Formatea un instante en el formato yyyyMMddHHmmss del gateway.
pub fn format_gateway_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&gateway_offset())
        .format(GATEWAY_TIME_FORMAT)
        .to_string()
}

/// Parsea el timestamp yyyyMMddHHmmss del gateway a UTC.
pub fn parse_gateway_time(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, GATEWAY_TIME_FORMAT).ok()?;
    gateway_offset()
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Request de creación de URL de pago
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentUrlRequest {
    pub order_ref: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub bank_code: Option<String>,
    pub locale: Option<String>,
    pub client_ip: String,
}

/// Response de creación de URL de pago
#[derive(Debug, Clone, Serialize)]
pub struct PaymentUrlResponse {
    pub payment_url: String,
    pub amount: Decimal,
    pub created_at: String,
}

/// Response de un comando querydr/refund del gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCommandResponse {
    #[serde(rename = "vnp_ResponseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "vnp_Message")]
    pub message: Option<String>,
    #[serde(rename = "vnp_TransactionNo")]
    pub transaction_no: Option<String>,
    #[serde(rename = "vnp_TransactionStatus")]
    pub transaction_status: Option<String>,
    #[serde(rename = "vnp_Amount")]
    pub amount: Option<String>,
    #[serde(rename = "vnp_TxnRef")]
    pub txn_ref: Option<String>,
}

pub struct VnpayService {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

impl VnpayService {
    pub fn new(config: GatewayConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Arma los parámetros vnp_*, los firma y devuelve la URL de
    /// redirección compuesta más el eco de monto/timestamp.
    pub fn build_payment_url(
        &self,
        request: &CreatePaymentUrlRequest,
        now: DateTime<Utc>,
    ) -> Result<PaymentUrlResponse, AppError> {
        let minor_units = amount_to_minor_units(request.amount).ok_or_else(|| {
            AppError::BadRequest(format!("amount '{}' cannot be scaled for the gateway", request.amount))
        })?;

        if minor_units <= 0 {
            return Err(AppError::BadRequest("amount must be positive".to_string()));
        }

        let create_date = format_gateway_time(now);

        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("vnp_Version".to_string(), VNP_VERSION.to_string());
        params.insert("vnp_Command".to_string(), "pay".to_string());
        params.insert("vnp_TmnCode".to_string(), self.config.tmn_code.clone());
        params.insert("vnp_Amount".to_string(), minor_units.to_string());
        params.insert("vnp_CurrCode".to_string(), "VND".to_string());
        params.insert("vnp_TxnRef".to_string(), request.order_ref.to_string());
        params.insert("vnp_OrderInfo".to_string(), request.description.clone());
        params.insert("vnp_OrderType".to_string(), "other".to_string());
        params.insert(
            "vnp_Locale".to_string(),
            request.locale.clone().unwrap_or_else(|| "vn".to_string()),
        );
        params.insert("vnp_ReturnUrl".to_string(), self.config.return_url.clone());
        params.insert("vnp_IpAddr".to_string(), request.client_ip.clone());
        params.insert("vnp_CreateDate".to_string(), create_date.clone());
        if let Some(bank_code) = &request.bank_code {
            if !bank_code.is_empty() {
                params.insert("vnp_BankCode".to_string(), bank_code.clone());
            }
        }

        let secure_hash = sign_params(&params, &self.config.hash_secret);
        let query = canonical_query(&params);

        let payment_url = format!(
            "{}?{}&{}={}",
            self.config.pay_url, query, SECURE_HASH_FIELD, secure_hash
        );

        Ok(PaymentUrlResponse {
            payment_url,
            amount: request.amount,
            created_at: create_date,
        })
    }

    /// Comando querydr: consulta sincrónica del estado de una transacción.
    /// La firma usa el input pipe-delimited, no el query canónico.
    pub async fn query_transaction(
        &self,
        order_ref: Uuid,
        transaction_date: &str,
        client_ip: &str,
    ) -> Result<GatewayCommandResponse, AppError> {
        let request_id = Uuid::new_v4().to_string();
        let create_date = format_gateway_time(Utc::now());
        let txn_ref = order_ref.to_string();
        let order_info = format!("Query transaction {}", txn_ref);

        let secure_hash = sign_command_fields(
            &[
                &request_id,
                VNP_VERSION,
                "querydr",
                &self.config.tmn_code,
                &txn_ref,
                transaction_date,
                &create_date,
                client_ip,
                &order_info,
            ],
            &self.config.hash_secret,
        );

        let body = serde_json::json!({
            "vnp_RequestId": request_id,
            "vnp_Version": VNP_VERSION,
            "vnp_Command": "querydr",
            "vnp_TmnCode": self.config.tmn_code,
            "vnp_TxnRef": txn_ref,
            "vnp_OrderInfo": order_info,
            "vnp_TransactionDate": transaction_date,
            "vnp_CreateDate": create_date,
            "vnp_IpAddr": client_ip,
            "vnp_SecureHash": secure_hash,
        });

        self.post_command(&body).await
    }

    /// Comando refund: solicitud sincrónica de devolución. Sin retry
    /// automático; la política de reintento pertenece al caller.
    #[allow(clippy::too_many_arguments)]
    pub async fn refund_transaction(
        &self,
        order_ref: Uuid,
        amount: Decimal,
        transaction_no: &str,
        transaction_date: &str,
        created_by: &str,
        client_ip: &str,
    ) -> Result<GatewayCommandResponse, AppError> {
        let minor_units = amount_to_minor_units(amount).ok_or_else(|| {
            AppError::BadRequest(format!("amount '{}' cannot be scaled for the gateway", amount))
        })?;

        let request_id = Uuid::new_v4().to_string();
        let create_date = format_gateway_time(Utc::now());
        let txn_ref = order_ref.to_string();
        let amount_str = minor_units.to_string();
        let order_info = format!("Refund transaction {}", txn_ref);
        // 02: devolución total
        let transaction_type = "02";

        let secure_hash = sign_command_fields(
            &[
                &request_id,
                VNP_VERSION,
                "refund",
                &self.config.tmn_code,
                transaction_type,
                &txn_ref,
                &amount_str,
                transaction_no,
                transaction_date,
                created_by,
                &create_date,
                client_ip,
                &order_info,
            ],
            &self.config.hash_secret,
        );

        let body = serde_json::json!({
            "vnp_RequestId": request_id,
            "vnp_Version": VNP_VERSION,
            "vnp_Command": "refund",
            "vnp_TmnCode": self.config.tmn_code,
            "vnp_TransactionType": transaction_type,
            "vnp_TxnRef": txn_ref,
            "vnp_Amount": amount_str,
            "vnp_TransactionNo": transaction_no,
            "vnp_TransactionDate": transaction_date,
            "vnp_CreateBy": created_by,
            "vnp_CreateDate": create_date,
            "vnp_IpAddr": client_ip,
            "vnp_OrderInfo": order_info,
            "vnp_SecureHash": secure_hash,
        });

        self.post_command(&body).await
    }

    async fn post_command(
        &self,
        body: &serde_json::Value,
    ) -> Result<GatewayCommandResponse, AppError> {
        let response = self
            .http_client
            .post(&self.config.api_url)
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalGateway(format!("gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalGateway(format!(
                "gateway returned status {}",
                response.status()
            )));
        }

        response
            .json::<GatewayCommandResponse>()
            .await
            .map_err(|e| AppError::ExternalGateway(format!("unparseable gateway response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_scales_by_one_hundred() {
        assert_eq!(amount_to_minor_units(Decimal::from(500_000)), Some(50_000_000));
        assert_eq!(amount_to_minor_units(Decimal::ZERO), Some(0));
    }

    #[test]
    fn fractional_minor_units_are_rejected() {
        // 0.005 × 100 = 0.5: no representable como entero en unidades menores
        let amount = Decimal::new(5, 3);
        assert_eq!(amount_to_minor_units(amount), None);
    }

    #[test]
    fn gateway_time_round_trips() {
        let at = Utc.with_ymd_and_hms(2025, 8, 23, 10, 30, 0).unwrap();
        let formatted = format_gateway_time(at);
        // GMT+7: 10:30 UTC son 17:30 en hora del gateway
        assert_eq!(formatted, "20250823173000");
        assert_eq!(parse_gateway_time(&formatted), Some(at));
    }

    #[test]
    fn malformed_gateway_time_is_rejected() {
        assert_eq!(parse_gateway_time("not-a-date"), None);
        assert_eq!(parse_gateway_time("2025-08-23 10:30:00"), None);
        assert_eq!(parse_gateway_time(""), None);
    }

    fn service() -> VnpayService {
        VnpayService::new(
            GatewayConfig {
                tmn_code: "EVRENT01".to_string(),
                hash_secret: "RAOEXHYVSDDIIENYWSLDIIZTANXUXZFJ".to_string(),
                pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
                api_url: "https://sandbox.vnpayment.vn/merchant_webapi/api/transaction".to_string(),
                return_url: "https://rental.example.com/payment/return".to_string(),
                request_timeout_secs: 10,
            },
            reqwest::Client::new(),
        )
    }

    #[test]
    fn payment_url_is_signed_and_echoes_amount() {
        let svc = service();
        let now = Utc.with_ymd_and_hms(2025, 8, 23, 3, 0, 0).unwrap();
        let request = CreatePaymentUrlRequest {
            order_ref: Uuid::new_v4(),
            amount: Decimal::from(500_000),
            description: "Thanh toan dat coc".to_string(),
            bank_code: None,
            locale: None,
            client_ip: "203.0.113.9".to_string(),
        };

        let response = svc.build_payment_url(&request, now).unwrap();
        assert!(response.payment_url.starts_with("https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?"));
        assert!(response.payment_url.contains("vnp_Amount=50000000"));
        assert!(response.payment_url.contains("vnp_SecureHash="));
        assert_eq!(response.amount, Decimal::from(500_000));
        assert_eq!(response.created_at, "20250823100000");
    }

    #[test]
    fn payment_url_rejects_non_positive_amount() {
        let svc = service();
        let request = CreatePaymentUrlRequest {
            order_ref: Uuid::new_v4(),
            amount: Decimal::ZERO,
            description: "test".to_string(),
            bank_code: None,
            locale: None,
            client_ip: "203.0.113.9".to_string(),
        };
        assert!(svc.build_payment_url(&request, Utc::now()).is_err());
    }

    #[test]
    fn empty_bank_code_is_omitted_from_the_url() {
        let svc = service();
        let request = CreatePaymentUrlRequest {
            order_ref: Uuid::new_v4(),
            amount: Decimal::from(100_000),
            description: "test".to_string(),
            bank_code: Some(String::new()),
            locale: None,
            client_ip: "203.0.113.9".to_string(),
        };
        let response = svc.build_payment_url(&request, Utc::now()).unwrap();
        assert!(!response.payment_url.contains("vnp_BankCode"));
    }
}
