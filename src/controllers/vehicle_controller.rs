//! Controller de vehículos
//!
//! Catálogo público de vehículos y operaciones de administración.
//! La comprobación de disponibilidad aplica una antelación mínima de
//! 12 horas antes de consultar solapamientos.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{
    AvailabilityResponse, CheckAvailabilityRequest, CreateVehicleRequest, UpdateVehicleRequest,
    VehicleFilters, VehicleResponse,
};
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_date_range;

/// Antelación mínima entre el momento de la consulta y el inicio del alquiler
const MIN_LEAD_HOURS: i64 = 12;

pub struct VehicleController {
    repository: VehicleRepository,
    pool: PgPool,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<VehicleResponse> {
        request.validate()?;

        if self
            .repository
            .license_plate_exists(&request.license_plate)
            .await?
        {
            return Err(AppError::Conflict(
                "La matrícula ya está registrada".to_string(),
            ));
        }

        let vehicle = self.repository.create(request).await?;

        tracing::info!("🚗 Vehículo creado: {} {}", vehicle.brand, vehicle.model);

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn search(&self, filters: VehicleFilters) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.repository.search(&filters).await?;

        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    /// Vehículos activos sin reserva solapada con el rango pedido
    pub async fn available_in_range(
        &self,
        start_date: chrono::DateTime<Utc>,
        end_date: chrono::DateTime<Utc>,
    ) -> AppResult<Vec<VehicleResponse>> {
        validate_date_range(start_date, end_date)
            .map_err(|_| AppError::BadRequest("Rango de fechas inválido".to_string()))?;

        let vehicles = self
            .repository
            .available_in_range(start_date, end_date)
            .await?;

        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    /// Disponibilidad de un vehículo concreto. Un inicio a menos de 12
    /// horas vista se reporta como no disponible sin consultar reservas.
    pub async fn check_availability(
        &self,
        request: CheckAvailabilityRequest,
    ) -> AppResult<AvailabilityResponse> {
        validate_date_range(request.start_date, request.end_date)
            .map_err(|_| AppError::BadRequest("Rango de fechas inválido".to_string()))?;

        let vehicle = self
            .repository
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if !vehicle.is_active {
            return Err(AppError::NotActive(
                "El vehículo no está disponible para alquiler".to_string(),
            ));
        }

        if request.start_date < Utc::now() + Duration::hours(MIN_LEAD_HOURS) {
            return Ok(AvailabilityResponse {
                vehicle_id: vehicle.id,
                is_booked: true,
                message: Some(format!(
                    "El alquiler debe comenzar con al menos {} horas de antelación",
                    MIN_LEAD_HOURS
                )),
            });
        }

        let mut conn = self.pool.acquire().await?;
        let is_booked = BookingRepository::vehicle_has_conflict(
            &mut *conn,
            vehicle.id,
            request.start_date,
            request.end_date,
        )
        .await?;

        Ok(AvailabilityResponse {
            vehicle_id: vehicle.id,
            is_booked,
            message: None,
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> AppResult<VehicleResponse> {
        request.validate()?;

        let vehicle = self.repository.update(id, request).await?;

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn toggle_active(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self.repository.toggle_active(id).await?;

        tracing::info!(
            "🔁 Vehículo {} ahora {}",
            vehicle.id,
            if vehicle.is_active { "activo" } else { "inactivo" }
        );

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.delete(id).await
    }

    pub async fn rental_cost(&self, id: Uuid, hours: i64) -> AppResult<Decimal> {
        if hours <= 0 {
            return Err(AppError::BadRequest(
                "Las horas de alquiler deben ser positivas".to_string(),
            ));
        }

        self.repository.rental_cost(id, hours).await
    }
}
