//! Utilidades del sistema
//!
//! Este módulo contiene utilidades compartidas: manejo de errores,
//! JWT y helpers de validación.

pub mod errors;
pub mod jwt;
pub mod validation;
