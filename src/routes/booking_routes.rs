use axum::{
    extract::{Path, Query, State},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingResponse, ConflictQuery, CreateBookingRequest, ToggleResponse, UpdateBookingRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::{admin_only_middleware, auth_middleware, AuthenticatedUser};
use crate::repositories::booking_repository::BookingFlag;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/vehicle/:vehicle_id", get(list_by_vehicle))
        .route("/by-name/:name", get(list_by_customer_name))
        .layer(from_fn(admin_only_middleware));

    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/check-conflict", get(check_conflict))
        .route("/code/:code", get(get_by_code))
        .route("/:id", get(get_booking))
        .route("/:id", put(update_booking))
        .route("/:id", delete(delete_booking))
        .route("/:id/pickup", patch(toggle_pickup))
        .route("/:id/returned", patch(toggle_returned))
        .route("/:id/payment", patch(toggle_payment))
        .merge(admin_routes)
        .layer(from_fn_with_state(state, auth_middleware))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.create(&auth, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Reserva creada exitosamente".to_string(),
    )))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.list(&auth).await?;
    Ok(Json(response))
}

async fn list_by_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.list_by_vehicle(vehicle_id).await?;
    Ok(Json(response))
}

async fn list_by_customer_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.list_by_customer_name(&name).await?;
    Ok(Json(response))
}

async fn check_conflict(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<ConflictQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let has_conflict = controller.check_conflict(&auth, query).await?;
    Ok(Json(serde_json::json!({ "has_conflict": has_conflict })))
}

async fn get_by_code(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(code): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.get_by_code(&auth, &code).await?;
    Ok(Json(response))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.get_by_id(&auth, id).await?;
    Ok(Json(response))
}

async fn update_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.update(&auth, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Reserva actualizada exitosamente".to_string(),
    )))
}

async fn delete_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    controller.delete(&auth, id).await?;
    Ok(Json(ApiResponse::message_only(
        "Reserva eliminada exitosamente".to_string(),
    )))
}

async fn toggle_pickup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller.toggle_flag(&auth, id, BookingFlag::Pickup).await?;
    Ok(Json(response))
}

async fn toggle_returned(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller
        .toggle_flag(&auth, id, BookingFlag::Returned)
        .await?;
    Ok(Json(response))
}

async fn toggle_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone());
    let response = controller
        .toggle_flag(&auth, id, BookingFlag::Payment)
        .await?;
    Ok(Json(response))
}
