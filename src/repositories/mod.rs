//! Repositorios de acceso a datos
//!
//! Cada repositorio encapsula el SQL de una entidad. Las operaciones que
//! participan en transacciones del llamador se exponen como funciones
//! asociadas sobre &mut PgConnection.

pub mod booking_repository;
pub mod cart_repository;
pub mod token_repository;
pub mod user_repository;
pub mod vehicle_repository;
