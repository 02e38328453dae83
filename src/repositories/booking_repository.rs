use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::booking_dto::UpdateBookingRequest;
use crate::models::booking::{Booking, BookingCode};
use crate::utils::errors::{AppError, AppResult};

/// Flags booleanos de una reserva que se pueden invertir
#[derive(Debug, Clone, Copy)]
pub enum BookingFlag {
    Pickup,
    Returned,
    Payment,
}

impl BookingFlag {
    fn column(&self) -> &'static str {
        match self {
            BookingFlag::Pickup => "pickup",
            BookingFlag::Returned => "returned",
            BookingFlag::Payment => "payment_status",
        }
    }
}

/// Campos necesarios para insertar una reserva. El id lo aporta el
/// llamador: el código determinista se deriva de él antes del INSERT.
pub struct NewBooking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub customer_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub accessories: serde_json::Value,
    pub dl_type: String,
    pub dl_expiration: NaiveDate,
    pub dl_number: String,
    pub helmet_size: String,
    pub gloves_size: String,
    pub pickup: bool,
    pub returned: bool,
    pub booking_code: String,
}

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserta la reserva dentro de la transacción del llamador
    pub async fn insert(conn: &mut PgConnection, new_booking: NewBooking) -> AppResult<Booking> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, vehicle_id, customer_id, start_date, end_date, total_price,
                is_active, payment_status, pickup, returned, accessories,
                dl_type, dl_expiration, dl_number, helmet_size, gloves_size,
                booking_code, created_at, last_update
            )
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, FALSE, $7, $8, $9,
                    $10, $11, $12, $13, $14, $15, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(new_booking.id)
        .bind(new_booking.vehicle_id)
        .bind(new_booking.customer_id)
        .bind(new_booking.start_date)
        .bind(new_booking.end_date)
        .bind(new_booking.total_price)
        .bind(new_booking.pickup)
        .bind(new_booking.returned)
        .bind(new_booking.accessories)
        .bind(new_booking.dl_type)
        .bind(new_booking.dl_expiration)
        .bind(new_booking.dl_number)
        .bind(new_booking.helmet_size)
        .bind(new_booking.gloves_size)
        .bind(new_booking.booking_code)
        .fetch_one(conn)
        .await?;

        Ok(booking)
    }

    /// Fila en booking_codes, uno a uno con la reserva. Se escribe en la
    /// misma transacción que la columna desnormalizada bookings.booking_code.
    pub async fn insert_code(
        conn: &mut PgConnection,
        booking_id: Uuid,
        generated_code: &str,
    ) -> AppResult<BookingCode> {
        let code = sqlx::query_as::<_, BookingCode>(
            r#"
            INSERT INTO booking_codes (id, booking_id, generated_code)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(generated_code)
        .fetch_one(conn)
        .await?;

        Ok(code)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    /// Lee la reserva bloqueando su fila dentro de la transacción del llamador
    pub async fn find_by_id_tx(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Booking>> {
        let booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(booking)
    }

    /// Lee la reserva acotada a su propietario, bloqueando la fila. Un id
    /// ajeno devuelve None, indistinguible de una reserva inexistente.
    pub async fn find_by_id_and_customer_tx(
        conn: &mut PgConnection,
        id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE id = $1 AND customer_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(customer_id)
        .fetch_optional(conn)
        .await?;

        Ok(booking)
    }

    /// Resuelve una reserva desde su código público en booking_codes
    pub async fn find_by_code(&self, generated_code: &str) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.* FROM bookings b
            JOIN booking_codes c ON c.booking_id = b.id
            WHERE c.generated_code = $1
            "#,
        )
        .bind(generated_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn list_all(&self) -> AppResult<Vec<Booking>> {
        let bookings =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(bookings)
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Búsqueda administrativa de reservas por nombre o apellido del
    /// cliente, sin distinguir mayúsculas
    pub async fn list_by_customer_name(&self, name: &str) -> AppResult<Vec<Booking>> {
        let pattern = format!("%{}%", name);

        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.* FROM bookings b
            JOIN users u ON u.id = b.customer_id
            WHERE u.name ILIKE $1 OR u.surname ILIKE $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn list_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE vehicle_id = $1 ORDER BY created_at DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// ¿Alguna reserva activa del vehículo solapa el rango? Límites
    /// inclusivos. Las filas candidatas quedan bloqueadas dentro de la
    /// transacción para que el insert posterior no corra contra otro
    /// request concurrente.
    pub async fn vehicle_has_conflict(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<bool> {
        let conflicting: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM bookings
            WHERE vehicle_id = $1
            AND is_active = TRUE
            AND start_date <= $3
            AND end_date >= $2
            FOR UPDATE
            "#,
        )
        .bind(vehicle_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(conn)
        .await?;

        Ok(!conflicting.is_empty())
    }

    /// Variante para actualizaciones: ignora la propia reserva al
    /// comprobar solapamientos del vehículo
    pub async fn vehicle_has_conflict_excluding(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        exclude_booking: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<bool> {
        let conflicting: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM bookings
            WHERE vehicle_id = $1
            AND id <> $2
            AND is_active = TRUE
            AND start_date <= $4
            AND end_date >= $3
            FOR UPDATE
            "#,
        )
        .bind(vehicle_id)
        .bind(exclude_booking)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(conn)
        .await?;

        Ok(!conflicting.is_empty())
    }

    /// ¿El usuario ya tiene una reserva activa que solape el rango?
    /// Evita que un mismo usuario se duplique entre vehículos distintos.
    pub async fn user_has_conflict(
        conn: &mut PgConnection,
        customer_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<bool> {
        let conflicting: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM bookings
            WHERE customer_id = $1
            AND is_active = TRUE
            AND start_date <= $3
            AND end_date >= $2
            FOR UPDATE
            "#,
        )
        .bind(customer_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(conn)
        .await?;

        Ok(!conflicting.is_empty())
    }

    /// Aplica sólo los campos presentes del patch y actualiza last_update.
    /// Corre en la transacción del llamador, con la fila ya bloqueada.
    pub async fn update(
        conn: &mut PgConnection,
        current: &Booking,
        patch: UpdateBookingRequest,
    ) -> AppResult<Booking> {
        let accessories = match patch.accessories {
            Some(list) => serde_json::json!(list),
            None => current.accessories.clone(),
        };

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET start_date = $2, end_date = $3, total_price = $4, accessories = $5,
                dl_type = $6, dl_expiration = $7, dl_number = $8,
                helmet_size = $9, gloves_size = $10, last_update = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(patch.start_date.unwrap_or(current.start_date))
        .bind(patch.end_date.unwrap_or(current.end_date))
        .bind(patch.total_price.unwrap_or(current.total_price))
        .bind(accessories)
        .bind(patch.dl_type.or_else(|| current.dl_type.clone()))
        .bind(patch.dl_expiration.or(current.dl_expiration))
        .bind(patch.dl_number.or_else(|| current.dl_number.clone()))
        .bind(patch.helmet_size.or_else(|| current.helmet_size.clone()))
        .bind(patch.gloves_size.or_else(|| current.gloves_size.clone()))
        .fetch_one(conn)
        .await?;

        Ok(booking)
    }

    /// Borrado físico: la cancelación no deja fila
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM booking_codes WHERE booking_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reserva no encontrada".to_string()));
        }

        tx.commit().await?;

        Ok(())
    }

    pub async fn toggle_flag(&self, id: Uuid, flag: BookingFlag) -> AppResult<Booking> {
        let column = flag.column();
        let sql = format!(
            "UPDATE bookings SET {column} = NOT {column}, last_update = NOW() WHERE id = $1 RETURNING *",
        );

        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        Ok(booking)
    }
}
