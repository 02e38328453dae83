//! Backend de alquiler de vehículos
//!
//! API REST sobre Axum y PostgreSQL: catálogo de vehículos, carrito de
//! alquiler con conversión atómica a reservas, y códigos de reserva de
//! 8 dígitos generados por vía aleatoria o determinista.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use middleware::cors::cors_layer;
use state::AppState;

/// Construye el router completo de la aplicación
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", routes::auth_routes::create_auth_router(state.clone()))
        .nest("/api/users", routes::user_routes::create_user_router(state.clone()))
        .nest(
            "/api/vehicles",
            routes::vehicle_routes::create_vehicle_router(state.clone()),
        )
        .nest("/api/cart", routes::cart_routes::create_cart_router(state.clone()))
        .nest(
            "/api/bookings",
            routes::booking_routes::create_booking_router(state.clone()),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check del servicio
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "service": "vehicle-rental",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
