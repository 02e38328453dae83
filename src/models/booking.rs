//! Modelos de Booking y BookingCode
//!
//! Una reserva nace de una petición directa o de la conversión de un
//! carrito. El código de reserva de 8 dígitos se guarda dos veces: en la
//! columna desnormalizada 'booking_code' y en la tabla booking_codes,
//! ambas escritas en la misma transacción.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Decimal,
    /// true = activa, false = cancelada
    pub is_active: bool,
    /// true = pagada, false = pendiente
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

/// Fila de la tabla booking_codes (uno a uno con bookings)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingCode {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub generated_code: String,
}

/// Datos de licencia de conducir aplicados al convertir un carrito.
/// Los valores ausentes toman los defaults documentados.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverLicenseData {
    pub dl_type: Option<String>,
    pub dl_expiration: Option<NaiveDate>,
    pub dl_number: Option<String>,
    pub helmet_size: Option<String>,
    pub gloves_size: Option<String>,
}

impl DriverLicenseData {
    pub fn dl_type_or_default(&self) -> String {
        self.dl_type.clone().unwrap_or_else(|| "A".to_string())
    }

    pub fn dl_expiration_or_default(&self) -> NaiveDate {
        self.dl_expiration.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn dl_number_or_default(&self) -> String {
        self.dl_number.clone().unwrap_or_else(|| "DL000000".to_string())
    }

    pub fn helmet_size_or_default(&self) -> String {
        self.helmet_size.clone().unwrap_or_else(|| "M".to_string())
    }

    pub fn gloves_size_or_default(&self) -> String {
        self.gloves_size.clone().unwrap_or_else(|| "M".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_license_defaults() {
        let data = DriverLicenseData {
            dl_type: None,
            dl_expiration: None,
            dl_number: None,
            helmet_size: None,
            gloves_size: None,
        };

        assert_eq!(data.dl_type_or_default(), "A");
        assert_eq!(data.dl_number_or_default(), "DL000000");
        assert_eq!(data.helmet_size_or_default(), "M");
        assert_eq!(data.gloves_size_or_default(), "M");
        assert_eq!(data.dl_expiration_or_default(), Utc::now().date_naive());
    }

    #[test]
    fn test_driver_license_explicit_values_win() {
        let data = DriverLicenseData {
            dl_type: Some("B".to_string()),
            dl_expiration: None,
            dl_number: Some("X99".to_string()),
            helmet_size: Some("L".to_string()),
            gloves_size: None,
        };

        assert_eq!(data.dl_type_or_default(), "B");
        assert_eq!(data.dl_number_or_default(), "X99");
        assert_eq!(data.helmet_size_or_default(), "L");
        assert_eq!(data.gloves_size_or_default(), "M");
    }
}
