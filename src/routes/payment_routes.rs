use crate::dto::common::ApiResponse;
use crate::dto::payment_dto::{QueryTransactionRequest, RefundTransactionRequest};
use crate::repositories::payment_repository::PaymentRepository;
use crate::services::reconciliation_service::{notification_signature_valid, IpnResponse};
use crate::services::vnpay_service::{CreatePaymentUrlRequest, GatewayCommandResponse, PaymentUrlResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/url", post(create_payment_url))
        .route("/ipn", get(handle_ipn))
        .route("/return", get(handle_return))
        .route("/query", post(query_transaction))
        .route("/refund", post(refund_transaction))
}

async fn create_payment_url(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentUrlRequest>,
) -> Result<Json<ApiResponse<PaymentUrlResponse>>, AppError> {
    let service = state.vnpay_service();
    let response = service.build_payment_url(&request, Utc::now())?;
    Ok(Json(ApiResponse::success(response)))
}

/// IPN server-to-server: la fuente autoritativa del estado del pago.
/// Siempre responde 200 con un acknowledgement bien formado; el gateway
/// reintenta indefinidamente ante cualquier otra cosa.
async fn handle_ipn(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Json<IpnResponse> {
    let service = state.reconciliation_service();
    Json(service.process_ipn(&params).await)
}

/// Redirect de retorno del usuario: verificación advisory, nunca muta el
/// payment. El IPN es quien confirma.
async fn handle_return(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let valid_signature = notification_signature_valid(&params, &state.config.gateway.hash_secret);

    let booking_id = params
        .get("vnp_TxnRef")
        .and_then(|raw| Uuid::parse_str(raw).ok());

    let payment_status = match booking_id {
        Some(id) if valid_signature => {
            let payments = PaymentRepository::new(state.pool.clone());
            match payments.find_deposit_fee_by_booking(id).await? {
                Some(fee) => payments
                    .find_payment_by_fee(fee.id)
                    .await?
                    .map(|p| p.status),
                None => None,
            }
        }
        _ => None,
    };

    Ok(Json(serde_json::json!({
        "valid_signature": valid_signature,
        "booking_id": booking_id,
        "response_code": params.get("vnp_ResponseCode"),
        "payment_status": payment_status,
    })))
}

async fn query_transaction(
    State(state): State<AppState>,
    Json(request): Json<QueryTransactionRequest>,
) -> Result<Json<ApiResponse<GatewayCommandResponse>>, AppError> {
    let service = state.vnpay_service();
    let response = service
        .query_transaction(request.order_ref, &request.transaction_date, &request.client_ip)
        .await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn refund_transaction(
    State(state): State<AppState>,
    Json(request): Json<RefundTransactionRequest>,
) -> Result<Json<ApiResponse<GatewayCommandResponse>>, AppError> {
    let service = state.vnpay_service();
    let response = service
        .refund_transaction(
            request.order_ref,
            request.amount,
            &request.transaction_no,
            &request.transaction_date,
            &request.created_by,
            &request.client_ip,
        )
        .await?;
    Ok(Json(ApiResponse::success(response)))
}
