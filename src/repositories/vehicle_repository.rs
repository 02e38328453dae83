use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters};
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, vehicle_type, brand, model, year, price_per_hour, deposit,
                license_plate, driving_license, power, engine_size, fuel_type,
                description, image_url, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, TRUE, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.vehicle_type)
        .bind(request.brand)
        .bind(request.model)
        .bind(request.year)
        .bind(request.price_per_hour)
        .bind(request.deposit)
        .bind(request.license_plate)
        .bind(request.driving_license)
        .bind(request.power)
        .bind(request.engine_size)
        .bind(request.fuel_type)
        .bind(request.description)
        .bind(request.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn license_plate_exists(&self, license_plate: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1)")
                .bind(license_plate)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    /// Búsqueda filtrada del catálogo activo. Los filtros ausentes no
    /// restringen; el keyword busca en marca, modelo, tipo y combustible.
    pub async fn search(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        let keyword = filters.keyword.as_ref().map(|k| format!("%{}%", k));

        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE is_active = TRUE
            AND ($1::text IS NULL OR vehicle_type = $1)
            AND ($2::text IS NULL OR driving_license = $2)
            AND ($3::numeric IS NULL OR price_per_hour >= $3)
            AND ($4::numeric IS NULL OR price_per_hour <= $4)
            AND ($5::text IS NULL OR brand ILIKE $5 OR model ILIKE $5
                 OR vehicle_type ILIKE $5 OR fuel_type ILIKE $5)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&filters.vehicle_type)
        .bind(&filters.driving_license)
        .bind(filters.min_price)
        .bind(filters.max_price)
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    /// Vehículos activos SIN reserva activa que solape el rango pedido
    /// (límites inclusivos)
    pub async fn available_in_range(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT v.* FROM vehicles v
            WHERE v.is_active = TRUE
            AND NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.vehicle_id = v.id
                AND b.is_active = TRUE
                AND b.start_date <= $2
                AND b.end_date >= $1
            )
            ORDER BY v.created_at DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> AppResult<Vehicle> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET vehicle_type = $2, brand = $3, model = $4, year = $5,
                price_per_hour = $6, deposit = $7, driving_license = $8,
                power = $9, engine_size = $10, fuel_type = $11,
                description = $12, image_url = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.vehicle_type.unwrap_or(current.vehicle_type))
        .bind(request.brand.unwrap_or(current.brand))
        .bind(request.model.unwrap_or(current.model))
        .bind(request.year.unwrap_or(current.year))
        .bind(request.price_per_hour.unwrap_or(current.price_per_hour))
        .bind(request.deposit.unwrap_or(current.deposit))
        .bind(request.driving_license.unwrap_or(current.driving_license))
        .bind(request.power.or(current.power))
        .bind(request.engine_size.or(current.engine_size))
        .bind(request.fuel_type.or(current.fuel_type))
        .bind(request.description.or(current.description))
        .bind(request.image_url.or(current.image_url))
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Vehicle> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET is_active = NOT is_active WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehículo no encontrado".to_string()));
        }

        Ok(())
    }

    /// Costo total del alquiler para un número de horas
    pub async fn rental_cost(&self, id: Uuid, hours: i64) -> AppResult<Decimal> {
        let vehicle = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        Ok(vehicle.rental_cost(hours))
    }
}
