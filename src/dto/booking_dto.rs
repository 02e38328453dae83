//! DTOs de reservas

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::Booking;

/// Request para crear una reserva directa
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub accessories: Option<Vec<String>>,

    #[validate(length(min = 1, max = 10))]
    pub dl_type: String,

    pub dl_expiration: NaiveDate,

    #[validate(length(min = 1, max = 50))]
    pub dl_number: String,

    pub helmet_size: Option<String>,
    pub gloves_size: Option<String>,
    pub pickup: Option<bool>,
    pub returned: Option<bool>,
}

/// Request para actualizar una reserva: lista explícita de campos
/// permitidos, nunca escritura genérica de atributos
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub total_price: Option<Decimal>,
    pub accessories: Option<Vec<String>>,

    #[validate(length(min = 1, max = 10))]
    pub dl_type: Option<String>,

    pub dl_expiration: Option<NaiveDate>,

    #[validate(length(min = 1, max = 50))]
    pub dl_number: Option<String>,

    pub helmet_size: Option<String>,
    pub gloves_size: Option<String>,
}

/// Response de reserva
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub is_active: bool,
    pub payment_status: bool,
    pub pickup: bool,
    pub returned: bool,
    pub accessories: serde_json::Value,
    pub dl_type: Option<String>,
    pub dl_expiration: Option<NaiveDate>,
    pub dl_number: Option<String>,
    pub helmet_size: Option<String>,
    pub gloves_size: Option<String>,
    pub booking_code: String,
    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            vehicle_id: booking.vehicle_id,
            customer_id: booking.customer_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_price: booking.total_price,
            is_active: booking.is_active,
            payment_status: booking.payment_status,
            pickup: booking.pickup,
            returned: booking.returned,
            accessories: booking.accessories,
            dl_type: booking.dl_type,
            dl_expiration: booking.dl_expiration,
            dl_number: booking.dl_number,
            helmet_size: booking.helmet_size,
            gloves_size: booking.gloves_size,
            booking_code: booking.booking_code,
            created_at: booking.created_at,
            last_update: booking.last_update,
        }
    }
}

/// Query para comprobar conflictos del propio usuario
#[derive(Debug, Deserialize)]
pub struct ConflictQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Response de un toggle de flag booleano
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub message: String,
    pub new_value: bool,
}
