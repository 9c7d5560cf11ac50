use crate::controllers::rental_controller::RentalController;
use crate::dto::common::ApiResponse;
use crate::dto::contract_dto::ContractResponse;
use crate::dto::rental_dto::{
    IssueContractRequest, OpenRentalRequest, RateRentalRequest, RecordInspectionRequest,
    RentalResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

pub fn create_rental_router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_rental))
        .route("/:id", get(get_rental))
        .route("/:id/start", post(start_rental))
        .route("/:id/contract", post(issue_contract))
        .route("/:id/inspection", post(record_inspection))
        .route("/:id/receipt", post(complete_receipt))
        .route("/:id/rating", post(rate_rental))
}

async fn open_rental(
    State(state): State<AppState>,
    Json(request): Json<OpenRentalRequest>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.open(request).await?;
    Ok(Json(response))
}

async fn get_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RentalResponse>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn start_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.start(id).await?;
    Ok(Json(response))
}

async fn issue_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<IssueContractRequest>,
) -> Result<Json<ApiResponse<ContractResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.issue_contract(id, request).await?;
    Ok(Json(response))
}

async fn record_inspection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordInspectionRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.record_inspection(id, request).await?;
    Ok(Json(response))
}

async fn complete_receipt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.complete_receipt(id).await?;
    Ok(Json(response))
}

async fn rate_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RateRentalRequest>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(state.pool.clone());
    let response = controller.rate(id, request).await?;
    Ok(Json(response))
}
