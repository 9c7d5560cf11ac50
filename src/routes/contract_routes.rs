use crate::controllers::contract_controller::ContractController;
use crate::dto::common::ApiResponse;
use crate::dto::contract_dto::{ContractResponse, SignContractRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

pub fn create_contract_router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_contract))
        .route("/:id/signature", post(sign_contract))
}

async fn get_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractResponse>, AppError> {
    let controller = ContractController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn sign_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SignContractRequest>,
) -> Result<Json<ApiResponse<ContractResponse>>, AppError> {
    let controller = ContractController::new(state.pool.clone());
    let response = controller.sign(id, request).await?;
    Ok(Json(response))
}
