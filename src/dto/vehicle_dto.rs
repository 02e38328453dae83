//! DTOs de vehículos

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::Vehicle;

/// Request para crear un vehículo (solo admin)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 50))]
    pub vehicle_type: String,

    #[validate(length(min = 1, max = 100))]
    pub brand: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1900, max = 2030))]
    pub year: i32,

    pub price_per_hour: Decimal,

    pub deposit: Decimal,

    #[validate(length(min = 5, max = 20))]
    pub license_plate: String,

    #[validate(length(min = 1, max = 10))]
    pub driving_license: String,

    pub power: Option<String>,
    pub engine_size: Option<Decimal>,
    pub fuel_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Request para actualizar un vehículo: lista explícita de campos
/// permitidos, nunca escritura genérica de atributos
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 2, max = 50))]
    pub vehicle_type: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2030))]
    pub year: Option<i32>,

    pub price_per_hour: Option<Decimal>,

    pub deposit: Option<Decimal>,

    #[validate(length(min = 1, max = 10))]
    pub driving_license: Option<String>,

    pub power: Option<String>,
    pub engine_size: Option<Decimal>,
    pub fuel_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Response de vehículo
#[derive(Debug, Clone, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub vehicle_type: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price_per_hour: Decimal,
    pub deposit: Decimal,
    pub license_plate: String,
    pub driving_license: String,
    pub power: Option<String>,
    pub engine_size: Option<Decimal>,
    pub fuel_type: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            vehicle_type: vehicle.vehicle_type,
            brand: vehicle.brand,
            model: vehicle.model,
            year: vehicle.year,
            price_per_hour: vehicle.price_per_hour,
            deposit: vehicle.deposit,
            license_plate: vehicle.license_plate,
            driving_license: vehicle.driving_license,
            power: vehicle.power,
            engine_size: vehicle.engine_size,
            fuel_type: vehicle.fuel_type,
            description: vehicle.description,
            image_url: vehicle.image_url,
            is_active: vehicle.is_active,
            created_at: vehicle.created_at,
        }
    }
}

/// Filtros de búsqueda del catálogo
#[derive(Debug, Deserialize)]
pub struct VehicleFilters {
    pub vehicle_type: Option<String>,
    pub driving_license: Option<String>,
    pub keyword: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// Query de disponibilidad para un rango de fechas
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Request para comprobar disponibilidad de un vehículo concreto
#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityRequest {
    pub vehicle_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Response de disponibilidad
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub vehicle_id: Uuid,
    pub is_booked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
