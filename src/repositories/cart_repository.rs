use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::cart::{Cart, CartItem, CartStatus};
use crate::utils::errors::{AppError, AppResult};

pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Crea un carrito activo. El chequeo "un solo carrito activo por
    /// usuario" y el insert van en la misma transacción, con la fila
    /// existente bloqueada, para cerrar la carrera check-then-create.
    pub async fn create_active_cart(&self, user_id: Uuid) -> AppResult<Cart> {
        let mut tx = self.pool.begin().await?;

        let existing: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM carts WHERE user_id = $1 AND status = 'active' FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if !existing.is_empty() {
            return Err(AppError::Conflict(
                "El usuario ya tiene un carrito activo".to_string(),
            ));
        }

        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (id, user_id, status, final_price, created_at, updated_at)
            VALUES ($1, $2, 'active', 0, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(cart)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(cart)
    }

    /// Lee el carrito bloqueando su fila dentro de la transacción del
    /// llamador. Toda mutación del carrito pasa por aquí primero.
    pub async fn find_by_id_tx(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(cart)
    }

    pub async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT * FROM carts WHERE user_id = $1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    pub async fn items(&self, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY created_at",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn items_tx(conn: &mut PgConnection, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY created_at FOR UPDATE",
        )
        .bind(cart_id)
        .fetch_all(conn)
        .await?;

        Ok(items)
    }

    pub async fn insert_item(
        conn: &mut PgConnection,
        cart_id: Uuid,
        vehicle_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        price: Decimal,
        accessories: serde_json::Value,
    ) -> AppResult<CartItem> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (id, cart_id, vehicle_id, start_date, end_date, price, accessories, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cart_id)
        .bind(vehicle_id)
        .bind(start_date)
        .bind(end_date)
        .bind(price)
        .bind(accessories)
        .fetch_one(conn)
        .await?;

        Ok(item)
    }

    pub async fn delete_item(
        conn: &mut PgConnection,
        cart_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
            .bind(item_id)
            .bind(cart_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_items(conn: &mut PgConnection, cart_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Recalcula el total desde las líneas restantes. Nunca se acumula
    /// incrementalmente: así el total no puede divergir de los items.
    pub async fn recompute_total(conn: &mut PgConnection, cart_id: Uuid) -> AppResult<Decimal> {
        let (total,): (Decimal,) = sqlx::query_as(
            r#"
            UPDATE carts
            SET final_price = COALESCE(
                    (SELECT SUM(price) FROM cart_items WHERE cart_id = $1), 0),
                updated_at = NOW()
            WHERE id = $1
            RETURNING final_price
            "#,
        )
        .bind(cart_id)
        .fetch_one(conn)
        .await?;

        Ok(total)
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        cart_id: Uuid,
        status: CartStatus,
    ) -> AppResult<Cart> {
        let cart = sqlx::query_as::<_, Cart>(
            "UPDATE carts SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(cart_id)
        .bind(status.as_str())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Carrito no encontrado".to_string()))?;

        Ok(cart)
    }
}
