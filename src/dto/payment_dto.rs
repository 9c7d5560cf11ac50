use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Request de consulta de transacción contra la API del gateway
#[derive(Debug, Deserialize)]
pub struct QueryTransactionRequest {
    pub order_ref: Uuid,
    /// Timestamp original de la transacción, formato yyyyMMddHHmmss
    pub transaction_date: String,
    pub client_ip: String,
}

/// Request de devolución contra la API del gateway
#[derive(Debug, Deserialize)]
pub struct RefundTransactionRequest {
    pub order_ref: Uuid,
    pub amount: Decimal,
    pub transaction_no: String,
    pub transaction_date: String,
    pub created_by: String,
    pub client_ip: String,
}
