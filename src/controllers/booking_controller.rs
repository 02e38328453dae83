//! Controller de reservas
//!
//! Creación directa de reservas con código aleatorio, consultas con
//! reglas de propiedad (un admin ve todo, un usuario sólo lo suyo),
//! actualización parcial y toggles de recogida/devolución/pago.
//! El chequeo de disponibilidad y el INSERT comparten transacción.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{
    BookingResponse, ConflictQuery, CreateBookingRequest, ToggleResponse, UpdateBookingRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::Booking;
use crate::repositories::booking_repository::{BookingFlag, BookingRepository, NewBooking};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::booking_code;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_date_range;

pub struct BookingController {
    repository: BookingRepository,
    vehicles: VehicleRepository,
}

impl BookingController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BookingRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    fn check_owner(auth: &AuthenticatedUser, booking: &Booking) -> AppResult<()> {
        if !auth.is_admin() && auth.user_id != booking.customer_id {
            return Err(AppError::Forbidden(
                "No tienes permiso sobre esta reserva".to_string(),
            ));
        }
        Ok(())
    }

    /// Crea una reserva directa. El vehículo y el propio usuario se
    /// comprueban contra solapamientos dentro de la transacción que
    /// también hace el INSERT; el código se genera por la ruta aleatoria.
    pub async fn create(
        &self,
        auth: &AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> AppResult<BookingResponse> {
        request.validate()?;
        validate_date_range(request.start_date, request.end_date)
            .map_err(|_| AppError::BadRequest("Rango de fechas inválido".to_string()))?;

        let vehicle = self
            .vehicles
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if !vehicle.is_active {
            return Err(AppError::NotActive(
                "El vehículo no está disponible para alquiler".to_string(),
            ));
        }

        let mut tx = self.repository.pool().begin().await?;

        if BookingRepository::vehicle_has_conflict(
            &mut tx,
            request.vehicle_id,
            request.start_date,
            request.end_date,
        )
        .await?
        {
            return Err(AppError::Conflict(
                "El vehículo ya está reservado en ese rango de fechas".to_string(),
            ));
        }

        if BookingRepository::user_has_conflict(
            &mut tx,
            auth.user_id,
            request.start_date,
            request.end_date,
        )
        .await?
        {
            return Err(AppError::Conflict(
                "Ya tienes una reserva activa que solapa ese rango".to_string(),
            ));
        }

        let code = booking_code::generate_unique_random_code(&mut tx).await?;

        let booking = BookingRepository::insert(
            &mut tx,
            NewBooking {
                id: Uuid::new_v4(),
                vehicle_id: request.vehicle_id,
                customer_id: auth.user_id,
                start_date: request.start_date,
                end_date: request.end_date,
                total_price: request.total_price,
                accessories: serde_json::json!(request.accessories.unwrap_or_default()),
                dl_type: request.dl_type,
                dl_expiration: request.dl_expiration,
                dl_number: request.dl_number,
                helmet_size: request.helmet_size.unwrap_or_else(|| "M".to_string()),
                gloves_size: request.gloves_size.unwrap_or_else(|| "M".to_string()),
                pickup: request.pickup.unwrap_or(false),
                returned: request.returned.unwrap_or(false),
                booking_code: code.clone(),
            },
        )
        .await?;

        BookingRepository::insert_code(&mut tx, booking.id, &code).await?;

        tx.commit().await?;

        tracing::info!("📅 Reserva {} creada con código {}", booking.id, code);

        Ok(BookingResponse::from(booking))
    }

    pub async fn get_by_id(
        &self,
        auth: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<BookingResponse> {
        let booking = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        Self::check_owner(auth, &booking)?;

        Ok(BookingResponse::from(booking))
    }

    pub async fn get_by_code(
        &self,
        auth: &AuthenticatedUser,
        code: &str,
    ) -> AppResult<BookingResponse> {
        let booking = self
            .repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        Self::check_owner(auth, &booking)?;

        Ok(BookingResponse::from(booking))
    }

    /// Un admin lista todas las reservas; un usuario sólo las propias
    pub async fn list(&self, auth: &AuthenticatedUser) -> AppResult<Vec<BookingResponse>> {
        let bookings = if auth.is_admin() {
            self.repository.list_all().await?
        } else {
            self.repository.list_by_customer(auth.user_id).await?
        };

        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }

    pub async fn list_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<BookingResponse>> {
        let bookings = self.repository.list_by_vehicle(vehicle_id).await?;

        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }

    /// Búsqueda administrativa por nombre o apellido del cliente
    pub async fn list_by_customer_name(&self, name: &str) -> AppResult<Vec<BookingResponse>> {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "El nombre de búsqueda no puede estar vacío".to_string(),
            ));
        }

        let bookings = self.repository.list_by_customer_name(name).await?;

        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }

    /// Actualización parcial. Si el patch mueve las fechas, el nuevo
    /// rango se revalida contra las demás reservas del vehículo dentro
    /// de la misma transacción que aplica el cambio.
    pub async fn update(
        &self,
        auth: &AuthenticatedUser,
        id: Uuid,
        patch: UpdateBookingRequest,
    ) -> AppResult<BookingResponse> {
        patch.validate()?;

        let mut tx = self.repository.pool().begin().await?;

        // La búsqueda va acotada a id + propietario: a un no-propietario
        // la reserva le resulta inexistente, sin filtrar que exista
        let current = BookingRepository::find_by_id_and_customer_tx(&mut tx, id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        if !current.is_active {
            return Err(AppError::Immutable(
                "Una reserva cancelada no admite cambios".to_string(),
            ));
        }

        let new_start = patch.start_date.unwrap_or(current.start_date);
        let new_end = patch.end_date.unwrap_or(current.end_date);

        if patch.start_date.is_some() || patch.end_date.is_some() {
            validate_date_range(new_start, new_end)
                .map_err(|_| AppError::BadRequest("Rango de fechas inválido".to_string()))?;

            if BookingRepository::vehicle_has_conflict_excluding(
                &mut tx,
                current.vehicle_id,
                current.id,
                new_start,
                new_end,
            )
            .await?
            {
                return Err(AppError::Conflict(
                    "El vehículo ya está reservado en el nuevo rango".to_string(),
                ));
            }
        }

        let booking = BookingRepository::update(&mut tx, &current, patch).await?;

        tx.commit().await?;

        Ok(BookingResponse::from(booking))
    }

    pub async fn delete(&self, auth: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        let booking = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        Self::check_owner(auth, &booking)?;

        self.repository.delete(id).await?;

        tracing::info!("🗑️ Reserva {} eliminada", id);

        Ok(())
    }

    pub async fn toggle_flag(
        &self,
        auth: &AuthenticatedUser,
        id: Uuid,
        flag: BookingFlag,
    ) -> AppResult<ToggleResponse> {
        let booking = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        Self::check_owner(auth, &booking)?;

        let updated = self.repository.toggle_flag(id, flag).await?;

        let (label, new_value) = match flag {
            BookingFlag::Pickup => ("recogida", updated.pickup),
            BookingFlag::Returned => ("devolución", updated.returned),
            BookingFlag::Payment => ("pago", updated.payment_status),
        };

        Ok(ToggleResponse {
            message: format!("Estado de {} actualizado", label),
            new_value,
        })
    }

    /// ¿El usuario autenticado tiene ya una reserva activa que solape
    /// el rango consultado?
    pub async fn check_conflict(
        &self,
        auth: &AuthenticatedUser,
        query: ConflictQuery,
    ) -> AppResult<bool> {
        validate_date_range(query.start_date, query.end_date)
            .map_err(|_| AppError::BadRequest("Rango de fechas inválido".to_string()))?;

        let mut conn = self.repository.pool().acquire().await?;

        BookingRepository::user_has_conflict(
            &mut conn,
            auth.user_id,
            query.start_date,
            query.end_date,
        )
        .await
    }
}
