//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle del catálogo de alquiler.
//! Mapea exactamente a la tabla vehicles con primary key 'id'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
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

impl Vehicle {
    /// Costo total del alquiler: horas * precio por hora + depósito
    pub fn rental_cost(&self, hours: i64) -> Decimal {
        self.price_per_hour * Decimal::from(hours) + self.deposit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vehicle() -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            vehicle_type: "moto".to_string(),
            brand: "Ducati".to_string(),
            model: "Monster".to_string(),
            year: 2022,
            price_per_hour: Decimal::new(1550, 2),
            deposit: Decimal::new(20000, 2),
            license_plate: "AB123CD".to_string(),
            driving_license: "A".to_string(),
            power: None,
            engine_size: None,
            fuel_type: Some("gasolina".to_string()),
            description: None,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rental_cost_includes_deposit() {
        let vehicle = sample_vehicle();
        assert_eq!(vehicle.rental_cost(4), Decimal::new(26200, 2));
    }

    #[test]
    fn test_rental_cost_zero_hours_is_deposit() {
        let vehicle = sample_vehicle();
        assert_eq!(vehicle.rental_cost(0), Decimal::new(20000, 2));
    }
}
