//! Controllers del sistema
//!
//! Cada controller encapsula la lógica de negocio de una entidad y
//! orquesta los repositorios; los handlers HTTP viven en routes/.

pub mod auth_controller;
pub mod booking_controller;
pub mod cart_controller;
pub mod user_controller;
pub mod vehicle_controller;
