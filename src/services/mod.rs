//! Services module
//!
//! Este módulo contiene la lógica de negocio central de la aplicación:
//! la regla de solapamiento de fechas y la generación de códigos de reserva.

pub mod availability;
pub mod booking_code;

pub use availability::*;
