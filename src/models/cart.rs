//! Modelos de Cart y CartItem
//!
//! Este módulo contiene el carrito de alquiler y sus líneas.
//! Un carrito pertenece a un usuario y sólo puede modificarse
//! mientras su estado sea 'active'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado del carrito - almacenado como TEXT en la tabla
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    Active,
    Completed,
    Cancelled,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "active",
            CartStatus::Completed => "completed",
            CartStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "completed" => CartStatus::Completed,
            "cancelled" => CartStatus::Cancelled,
            _ => CartStatus::Active,
        }
    }

    /// Los estados terminales son absorbentes
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CartStatus::Active)
    }
}

/// Cart principal - mapea exactamente a la tabla carts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub final_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn status(&self) -> CartStatus {
        CartStatus::from_db(&self.status)
    }

    pub fn is_active(&self) -> bool {
        self.status() == CartStatus::Active
    }
}

/// Línea del carrito - mapea exactamente a la tabla cart_items
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub price: Decimal,
    pub accessories: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!CartStatus::Active.is_terminal());
        assert!(CartStatus::Completed.is_terminal());
        assert!(CartStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_from_db() {
        assert_eq!(CartStatus::from_db("active"), CartStatus::Active);
        assert_eq!(CartStatus::from_db("completed"), CartStatus::Completed);
        assert_eq!(CartStatus::from_db("cancelled"), CartStatus::Cancelled);
    }
}
