//! Controller del carrito
//!
//! Toda mutación del carrito ocurre dentro de una transacción que
//! bloquea primero la fila del carrito, verifica que siga activo y
//! recalcula el total desde las líneas restantes antes de confirmar.
//! La conversión a reservas es atómica: o todas las líneas se
//! convierten o ninguna.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::cart_dto::{
    AddItemRequest, BookingCodePair, CartItemResponse, CartResponse, DetailedCartItemResponse,
    DetailedCartResponse, SubmitCartRequest, SubmitCartResponse,
};
use crate::dto::vehicle_dto::VehicleResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::DriverLicenseData;
use crate::models::cart::{Cart, CartStatus};
use crate::repositories::booking_repository::{BookingRepository, NewBooking};
use crate::repositories::cart_repository::CartRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::availability::{conflicts_with_any, DateRange};
use crate::services::booking_code;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_date_range;

pub struct CartController {
    repository: CartRepository,
    vehicles: VehicleRepository,
}

impl CartController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CartRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    fn check_owner(auth: &AuthenticatedUser, cart: &Cart) -> AppResult<()> {
        if !auth.is_admin() && auth.user_id != cart.user_id {
            return Err(AppError::Forbidden(
                "No tienes permiso sobre este carrito".to_string(),
            ));
        }
        Ok(())
    }

    fn check_active(cart: &Cart) -> AppResult<()> {
        if !cart.is_active() {
            return Err(AppError::NotActive(format!(
                "El carrito está en estado '{}' y ya no admite cambios",
                cart.status
            )));
        }
        Ok(())
    }

    pub async fn create(&self, user_id: Uuid) -> AppResult<CartResponse> {
        let cart = self.repository.create_active_cart(user_id).await?;

        tracing::info!("🛒 Carrito creado para usuario {}", user_id);

        Ok(CartResponse::from_parts(cart, Vec::new()))
    }

    pub async fn get(&self, auth: &AuthenticatedUser, cart_id: Uuid) -> AppResult<CartResponse> {
        let cart = self
            .repository
            .find_by_id(cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Self::check_owner(auth, &cart)?;

        let items = self.repository.items(cart.id).await?;

        Ok(CartResponse::from_parts(cart, items))
    }

    pub async fn get_active(&self, user_id: Uuid) -> AppResult<CartResponse> {
        let cart = self
            .repository
            .find_active_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("El usuario no tiene carrito activo".to_string()))?;

        let items = self.repository.items(cart.id).await?;

        Ok(CartResponse::from_parts(cart, items))
    }

    /// Carrito con los detalles de cada vehículo incluidos en línea
    pub async fn detailed(
        &self,
        auth: &AuthenticatedUser,
        cart_id: Uuid,
    ) -> AppResult<DetailedCartResponse> {
        let cart = self
            .repository
            .find_by_id(cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Self::check_owner(auth, &cart)?;

        let items = self.repository.items(cart.id).await?;

        let mut detailed_items = Vec::with_capacity(items.len());
        for item in items {
            let vehicle = self.vehicles.find_by_id(item.vehicle_id).await?;
            detailed_items.push(DetailedCartItemResponse {
                item: CartItemResponse::from(item),
                vehicle: vehicle.map(VehicleResponse::from),
            });
        }

        Ok(DetailedCartResponse {
            id: cart.id,
            user_id: cart.user_id,
            status: cart.status,
            final_price: cart.final_price,
            items: detailed_items,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        })
    }

    /// Añade una línea. El chequeo de solapamiento (contra reservas del
    /// vehículo y contra las demás líneas del carrito) y el insert van
    /// en la misma transacción.
    pub async fn add_item(
        &self,
        auth: &AuthenticatedUser,
        cart_id: Uuid,
        request: AddItemRequest,
    ) -> AppResult<CartResponse> {
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

        let cart = CartRepository::find_by_id_tx(&mut tx, cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Self::check_owner(auth, &cart)?;
        Self::check_active(&cart)?;

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
            cart.user_id,
            request.start_date,
            request.end_date,
        )
        .await?
        {
            return Err(AppError::Conflict(
                "El usuario ya tiene una reserva activa que solapa ese rango".to_string(),
            ));
        }

        // items_tx bloquea las líneas existentes; el solapamiento se
        // evalúa con la misma regla inclusiva que usan los repositorios
        let requested = DateRange::new(request.start_date, request.end_date)
            .ok_or_else(|| AppError::BadRequest("Rango de fechas inválido".to_string()))?;
        let existing: Vec<DateRange> = CartRepository::items_tx(&mut tx, cart.id)
            .await?
            .iter()
            .filter_map(|item| DateRange::new(item.start_date, item.end_date))
            .collect();

        if conflicts_with_any(requested, &existing) {
            return Err(AppError::Conflict(
                "El carrito ya contiene una línea que solapa ese rango".to_string(),
            ));
        }

        let accessories = serde_json::json!(request.accessories.unwrap_or_default());

        CartRepository::insert_item(
            &mut tx,
            cart.id,
            request.vehicle_id,
            request.start_date,
            request.end_date,
            request.price,
            accessories,
        )
        .await?;

        CartRepository::recompute_total(&mut tx, cart.id).await?;

        tx.commit().await?;

        self.get(auth, cart_id).await
    }

    pub async fn remove_item(
        &self,
        auth: &AuthenticatedUser,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<CartResponse> {
        let mut tx = self.repository.pool().begin().await?;

        let cart = CartRepository::find_by_id_tx(&mut tx, cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Self::check_owner(auth, &cart)?;
        Self::check_active(&cart)?;

        let removed = CartRepository::delete_item(&mut tx, cart.id, item_id).await?;
        if !removed {
            return Err(AppError::NotFound(
                "La línea no existe en este carrito".to_string(),
            ));
        }

        CartRepository::recompute_total(&mut tx, cart.id).await?;

        tx.commit().await?;

        self.get(auth, cart_id).await
    }

    pub async fn clear(
        &self,
        auth: &AuthenticatedUser,
        cart_id: Uuid,
    ) -> AppResult<CartResponse> {
        let mut tx = self.repository.pool().begin().await?;

        let cart = CartRepository::find_by_id_tx(&mut tx, cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Self::check_owner(auth, &cart)?;
        Self::check_active(&cart)?;

        let removed = CartRepository::clear_items(&mut tx, cart.id).await?;
        if removed == 0 {
            return Err(AppError::BadRequest(
                "El carrito ya está vacío".to_string(),
            ));
        }

        CartRepository::recompute_total(&mut tx, cart.id).await?;

        tx.commit().await?;

        self.get(auth, cart_id).await
    }

    /// Marca el carrito como completado sin convertirlo; la conversión
    /// con reservas va por submit
    pub async fn complete(
        &self,
        auth: &AuthenticatedUser,
        cart_id: Uuid,
    ) -> AppResult<CartResponse> {
        let mut tx = self.repository.pool().begin().await?;

        let cart = CartRepository::find_by_id_tx(&mut tx, cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Self::check_owner(auth, &cart)?;
        Self::check_active(&cart)?;

        let cart = CartRepository::set_status(&mut tx, cart.id, CartStatus::Completed).await?;

        tx.commit().await?;

        Ok(CartResponse::from_parts(cart, Vec::new()))
    }

    pub async fn cancel(
        &self,
        auth: &AuthenticatedUser,
        cart_id: Uuid,
    ) -> AppResult<CartResponse> {
        let mut tx = self.repository.pool().begin().await?;

        let cart = CartRepository::find_by_id_tx(&mut tx, cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Self::check_owner(auth, &cart)?;
        Self::check_active(&cart)?;

        let cart = CartRepository::set_status(&mut tx, cart.id, CartStatus::Cancelled).await?;

        tx.commit().await?;

        tracing::info!("🛒 Carrito {} cancelado", cart.id);

        Ok(CartResponse::from_parts(cart, Vec::new()))
    }

    /// Convierte todas las líneas del carrito en reservas dentro de una
    /// única transacción. Cada línea se revalida contra las reservas ya
    /// existentes; un solo conflicto aborta la conversión completa. El
    /// código de cada reserva se deriva determinísticamente de sus
    /// parámetros y se escribe en bookings y booking_codes a la vez.
    pub async fn submit(
        &self,
        auth: &AuthenticatedUser,
        cart_id: Uuid,
        request: SubmitCartRequest,
    ) -> AppResult<SubmitCartResponse> {
        let license = DriverLicenseData::from(request);

        let mut tx = self.repository.pool().begin().await?;

        let cart = CartRepository::find_by_id_tx(&mut tx, cart_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Self::check_owner(auth, &cart)?;
        Self::check_active(&cart)?;

        let items = CartRepository::items_tx(&mut tx, cart.id).await?;
        if items.is_empty() {
            return Err(AppError::BadRequest(
                "El carrito no tiene líneas que convertir".to_string(),
            ));
        }

        let mut bookings = Vec::with_capacity(items.len());

        for item in &items {
            if BookingRepository::vehicle_has_conflict(
                &mut tx,
                item.vehicle_id,
                item.start_date,
                item.end_date,
            )
            .await?
            {
                return Err(AppError::Conflict(format!(
                    "El vehículo {} ya está reservado en el rango solicitado",
                    item.vehicle_id
                )));
            }

            let booking_id = Uuid::new_v4();
            let code = booking_code::deterministic_code_checked(
                &mut tx,
                cart.user_id,
                item.vehicle_id,
                booking_id,
                item.start_date,
                item.end_date,
            )
            .await?;

            let booking = BookingRepository::insert(
                &mut tx,
                NewBooking {
                    id: booking_id,
                    vehicle_id: item.vehicle_id,
                    customer_id: cart.user_id,
                    start_date: item.start_date,
                    end_date: item.end_date,
                    total_price: item.price,
                    accessories: item.accessories.clone(),
                    dl_type: license.dl_type_or_default(),
                    dl_expiration: license.dl_expiration_or_default(),
                    dl_number: license.dl_number_or_default(),
                    helmet_size: license.helmet_size_or_default(),
                    gloves_size: license.gloves_size_or_default(),
                    pickup: false,
                    returned: false,
                    booking_code: code.clone(),
                },
            )
            .await?;

            BookingRepository::insert_code(&mut tx, booking.id, &code).await?;

            bookings.push(BookingCodePair {
                booking_id: booking.id,
                generated_code: code,
            });
        }

        CartRepository::clear_items(&mut tx, cart.id).await?;
        CartRepository::set_status(&mut tx, cart.id, CartStatus::Completed).await?;

        tx.commit().await?;

        tracing::info!(
            "✅ Carrito {} convertido en {} reservas",
            cart.id,
            bookings.len()
        );

        Ok(SubmitCartResponse {
            message: format!("{} reservas creadas", bookings.len()),
            cart_id: cart.id,
            bookings,
        })
    }
}
