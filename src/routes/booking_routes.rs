use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingResponse, ConfirmCancellationRequest, ConfirmCancellationResponse,
    CreateBookingRequest, RequestCancellationRequest, RequestCancellationResponse,
    VerifyBookingRequest,
};
use crate::dto::common::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/:id", get(get_booking))
        .route("/:id/verification", post(verify_booking))
        .route("/:id/cancellation/request", post(request_cancellation))
        .route("/:id/cancellation/confirm", post(confirm_cancellation))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn verify_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VerifyBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.verify_or_reject(id, request).await?;
    Ok(Json(response))
}

async fn request_cancellation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RequestCancellationRequest>,
) -> Result<Json<ApiResponse<RequestCancellationResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let notifications = state.notification_service();
    let response = controller
        .request_self_cancellation(id, request, &notifications)
        .await?;
    Ok(Json(response))
}

async fn confirm_cancellation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmCancellationRequest>,
) -> Result<Json<ApiResponse<ConfirmCancellationResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.confirm_self_cancellation(id, request).await?;
    Ok(Json(response))
}
