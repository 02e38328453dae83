//! DTOs del carrito

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::VehicleResponse;
use crate::models::booking::DriverLicenseData;
use crate::models::cart::{Cart, CartItem};

/// Request para añadir una línea al carrito activo
#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub vehicle_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub price: Decimal,
    pub accessories: Option<Vec<String>>,
}

/// Response de una línea del carrito
#[derive(Debug, Clone, Serialize)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub price: Decimal,
    pub accessories: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            cart_id: item.cart_id,
            vehicle_id: item.vehicle_id,
            start_date: item.start_date,
            end_date: item.end_date,
            price: item.price,
            accessories: item.accessories,
            created_at: item.created_at,
        }
    }
}

/// Response del carrito con sus líneas
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub final_price: Decimal,
    pub items: Vec<CartItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartResponse {
    pub fn from_parts(cart: Cart, items: Vec<CartItem>) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id,
            status: cart.status,
            final_price: cart.final_price,
            items: items.into_iter().map(CartItemResponse::from).collect(),
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

/// Línea del carrito con los detalles del vehículo incluidos
#[derive(Debug, Serialize)]
pub struct DetailedCartItemResponse {
    #[serde(flatten)]
    pub item: CartItemResponse,
    pub vehicle: Option<VehicleResponse>,
}

/// Response detallada del carrito
#[derive(Debug, Serialize)]
pub struct DetailedCartResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub final_price: Decimal,
    pub items: Vec<DetailedCartItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos extra para la conversión carrito → reservas
#[derive(Debug, Default, Deserialize)]
pub struct SubmitCartRequest {
    pub dl_type: Option<String>,
    pub dl_expiration: Option<NaiveDate>,
    pub dl_number: Option<String>,
    pub helmet_size: Option<String>,
    pub gloves_size: Option<String>,
}

impl From<SubmitCartRequest> for DriverLicenseData {
    fn from(request: SubmitCartRequest) -> Self {
        Self {
            dl_type: request.dl_type,
            dl_expiration: request.dl_expiration,
            dl_number: request.dl_number,
            helmet_size: request.helmet_size,
            gloves_size: request.gloves_size,
        }
    }
}

/// Par {reserva, código} devuelto por la conversión
#[derive(Debug, Serialize)]
pub struct BookingCodePair {
    pub booking_id: Uuid,
    pub generated_code: String,
}

/// Response de la conversión del carrito
#[derive(Debug, Serialize)]
pub struct SubmitCartResponse {
    pub message: String,
    pub cart_id: Uuid,
    pub bookings: Vec<BookingCodePair>,
}
