use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::cart_controller::CartController;
use crate::dto::cart_dto::{
    AddItemRequest, CartResponse, DetailedCartResponse, SubmitCartRequest, SubmitCartResponse,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_cart_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_cart))
        .route("/active", get(get_active_cart))
        .route("/:id", get(get_cart))
        .route("/:id/detailed", get(get_detailed_cart))
        .route("/:id/items", post(add_item))
        .route("/:id/items", delete(clear_cart))
        .route("/:id/items/:item_id", delete(remove_item))
        .route("/:id/submit", post(submit_cart))
        .route("/:id/complete", post(complete_cart))
        .route("/:id/cancel", post(cancel_cart))
        .layer(from_fn_with_state(state, auth_middleware))
}

async fn create_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<CartResponse>>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.create(auth.user_id).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Carrito creado exitosamente".to_string(),
    )))
}

async fn get_active_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<CartResponse>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.get_active(auth.user_id).await?;
    Ok(Json(response))
}

async fn get_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<CartResponse>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.get(&auth, id).await?;
    Ok(Json(response))
}

async fn get_detailed_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailedCartResponse>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.detailed(&auth, id).await?;
    Ok(Json(response))
}

async fn add_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<ApiResponse<CartResponse>>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.add_item(&auth, id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Línea añadida al carrito".to_string(),
    )))
}

async fn remove_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<CartResponse>>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.remove_item(&auth, id, item_id).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Línea eliminada del carrito".to_string(),
    )))
}

async fn clear_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartResponse>>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.clear(&auth, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Carrito vaciado".to_string(),
    )))
}

async fn submit_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitCartRequest>,
) -> Result<Json<ApiResponse<SubmitCartResponse>>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.submit(&auth, id, request).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn complete_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartResponse>>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.complete(&auth, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Carrito completado".to_string(),
    )))
}

async fn cancel_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartResponse>>, AppError> {
    let controller = CartController::new(state.pool.clone());
    let response = controller.cancel(&auth, id).await?;
    Ok(Json(ApiResponse::success_with_message(
        response,
        "Carrito cancelado".to_string(),
    )))
}
