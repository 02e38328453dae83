//! Generación de códigos de reserva
//!
//! Produce códigos numéricos de 8 dígitos únicos entre los ya almacenados.
//! Conviven dos estrategias:
//! - aleatoria: reintento acotado (1000 intentos) contra la tabla de códigos;
//! - determinista: SHA-256 de {user_id, vehicle_id, booking_id, inicio, fin}
//!   reducido módulo 10^8. La ruta determinista no reintenta: los mismos
//!   parámetros reproducen siempre el mismo código, así que ante una colisión
//!   el llamador debe variar un parámetro (normalmente el booking_id).

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

/// Longitud del código público de reserva
pub const CODE_LENGTH: usize = 8;

/// Tope de reintentos de la ruta aleatoria
pub const MAX_RANDOM_ATTEMPTS: u32 = 1000;

const CODE_SPACE: u128 = 100_000_000;

/// Genera un candidato aleatorio de 8 dígitos (sin chequeo de unicidad)
pub fn random_candidate() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Deriva el código determinista a partir de los parámetros de la reserva.
/// El digest SHA-256 se interpreta como entero big-endian (primeros 16
/// bytes) y se reduce módulo 10^8.
pub fn derive_code(
    user_id: Uuid,
    vehicle_id: Uuid,
    booking_id: Uuid,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> String {
    let unique_string = format!(
        "{}{}{}{}{}",
        user_id,
        vehicle_id,
        booking_id,
        start_date.to_rfc3339(),
        end_date.to_rfc3339()
    );

    let digest = Sha256::digest(unique_string.as_bytes());
    let mut leading = [0u8; 16];
    leading.copy_from_slice(&digest[..16]);
    let numeric_part = u128::from_be_bytes(leading) % CODE_SPACE;

    format!("{:08}", numeric_part)
}

/// ¿Existe ya el código entre los almacenados?
pub async fn code_exists(conn: &mut PgConnection, code: &str) -> AppResult<bool> {
    let exists: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM booking_codes WHERE generated_code = $1 \
         UNION ALL SELECT 1 FROM bookings WHERE booking_code = $1 LIMIT 1)",
    )
    .bind(code)
    .fetch_one(conn)
    .await?;

    Ok(exists.0)
}

/// Ruta aleatoria: reintenta hasta encontrar un código libre o agotar el tope
pub async fn generate_unique_random_code(conn: &mut PgConnection) -> AppResult<String> {
    for _ in 0..MAX_RANDOM_ATTEMPTS {
        let candidate = random_candidate();
        if !code_exists(conn, &candidate).await? {
            return Ok(candidate);
        }
    }

    Err(AppError::GenerationExhausted(format!(
        "No se pudo generar un código de reserva único tras {} intentos",
        MAX_RANDOM_ATTEMPTS
    )))
}

/// Ruta determinista: deriva el código y falla con Conflict si ya existe
pub async fn deterministic_code_checked(
    conn: &mut PgConnection,
    user_id: Uuid,
    vehicle_id: Uuid,
    booking_id: Uuid,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> AppResult<String> {
    let code = derive_code(user_id, vehicle_id, booking_id, start_date, end_date);

    if code_exists(conn, &code).await? {
        return Err(AppError::Conflict(format!(
            "El código derivado '{}' ya está asociado a otra reserva",
            code
        )));
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_inputs() -> (Uuid, Uuid, Uuid, DateTime<Utc>, DateTime<Utc>) {
        (
            Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
            Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap(),
            Uuid::parse_str("33333333-3333-3333-3333-333333333333").unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_random_candidate_shape() {
        for _ in 0..100 {
            let code = random_candidate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_derive_code_is_deterministic() {
        let (user, vehicle, booking, start, end) = fixed_inputs();
        let a = derive_code(user, vehicle, booking, start, end);
        let b = derive_code(user, vehicle, booking, start, end);
        assert_eq!(a, b);
        assert_eq!(a.len(), CODE_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_derive_code_changes_with_booking_id() {
        let (user, vehicle, booking, start, end) = fixed_inputs();
        let other_booking = Uuid::parse_str("44444444-4444-4444-4444-444444444444").unwrap();

        let a = derive_code(user, vehicle, booking, start, end);
        let b = derive_code(user, vehicle, other_booking, start, end);
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_code_changes_with_dates() {
        let (user, vehicle, booking, start, end) = fixed_inputs();
        let later = Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap();

        let a = derive_code(user, vehicle, booking, start, end);
        let b = derive_code(user, vehicle, booking, start, later);
        assert_ne!(a, b);
    }

    #[test]
    fn test_random_candidates_rarely_collide() {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            seen.insert(random_candidate());
        }
        // 10^8 de espacio: alguna colisión puntual es tolerable, una tasa
        // alta delataría un generador roto
        assert!(seen.len() > 9_900);
    }
}
