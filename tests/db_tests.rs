//! Tests de integración contra PostgreSQL
//!
//! Cada test corre en una base de datos propia con las migraciones
//! aplicadas. Cubren las propiedades que requieren estado persistente:
//! atomicidad de la conversión del carrito, la constraint de exclusión
//! de solapamientos y la matriz de permisos sobre reservas.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use vehicle_rental::config::environment::EnvironmentConfig;
use vehicle_rental::controllers::auth_controller::AuthController;
use vehicle_rental::controllers::booking_controller::BookingController;
use vehicle_rental::controllers::cart_controller::CartController;
use vehicle_rental::dto::auth_dto::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use vehicle_rental::dto::booking_dto::{CreateBookingRequest, UpdateBookingRequest};
use vehicle_rental::dto::cart_dto::{AddItemRequest, SubmitCartRequest};
use vehicle_rental::dto::vehicle_dto::CreateVehicleRequest;
use vehicle_rental::middleware::auth::AuthenticatedUser;
use vehicle_rental::models::user::User;
use vehicle_rental::models::vehicle::Vehicle;
use vehicle_rental::repositories::booking_repository::{BookingRepository, NewBooking};
use vehicle_rental::repositories::token_repository::TokenRepository;
use vehicle_rental::repositories::user_repository::UserRepository;
use vehicle_rental::repositories::vehicle_repository::VehicleRepository;
use vehicle_rental::utils::errors::AppError;

fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: "test_secret".to_string(),
        jwt_expiration: 3600,
        cors_origins: vec![],
    }
}

fn auth_for(user: &User) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: user.id,
        role: user.role(),
        jti: format!("jti-{}", user.id),
    }
}

async fn seed_user(pool: &PgPool, email: &str, role: &str) -> User {
    seed_named_user(pool, "Ana", "García", email, role).await
}

async fn seed_named_user(
    pool: &PgPool,
    name: &str,
    surname: &str,
    email: &str,
    role: &str,
) -> User {
    UserRepository::new(pool.clone())
        .create(
            name.to_string(),
            surname.to_string(),
            email.to_string(),
            bcrypt::hash("secreto1", 4).unwrap(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            "Madrid".to_string(),
            role,
        )
        .await
        .unwrap()
}

async fn seed_vehicle(pool: &PgPool, license_plate: &str) -> Vehicle {
    VehicleRepository::new(pool.clone())
        .create(CreateVehicleRequest {
            vehicle_type: "moto".to_string(),
            brand: "Ducati".to_string(),
            model: "Monster".to_string(),
            year: 2022,
            price_per_hour: Decimal::new(1500, 2),
            deposit: Decimal::new(10000, 2),
            license_plate: license_plate.to_string(),
            driving_license: "A".to_string(),
            power: None,
            engine_size: None,
            fuel_type: None,
            description: None,
            image_url: None,
        })
        .await
        .unwrap()
}

/// Rango futuro de dos días que empieza a 'days_from_now' días vista
fn rental_range(days_from_now: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc::now() + Duration::days(days_from_now);
    (start, start + Duration::days(2))
}

fn item_request(
    vehicle_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    price: Decimal,
) -> AddItemRequest {
    AddItemRequest {
        vehicle_id,
        start_date: start,
        end_date: end,
        price,
        accessories: None,
    }
}

fn booking_request(
    vehicle_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CreateBookingRequest {
    CreateBookingRequest {
        vehicle_id,
        start_date: start,
        end_date: end,
        total_price: Decimal::new(9000, 2),
        accessories: None,
        dl_type: "A".to_string(),
        dl_expiration: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        dl_number: "DL123456".to_string(),
        helmet_size: None,
        gloves_size: None,
        pickup: None,
        returned: None,
    }
}

fn new_booking(
    vehicle_id: Uuid,
    customer_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    code: &str,
) -> NewBooking {
    NewBooking {
        id: Uuid::new_v4(),
        vehicle_id,
        customer_id,
        start_date: start,
        end_date: end,
        total_price: Decimal::new(9000, 2),
        accessories: serde_json::json!([]),
        dl_type: "A".to_string(),
        dl_expiration: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        dl_number: "DL123456".to_string(),
        helmet_size: "M".to_string(),
        gloves_size: "M".to_string(),
        pickup: false,
        returned: false,
        booking_code: code.to_string(),
    }
}

#[sqlx::test]
async fn test_conflicting_cart_item_leaves_total_unchanged(pool: PgPool) {
    let user = seed_user(&pool, "carrito@test.com", "user").await;
    let auth = auth_for(&user);
    let v1 = seed_vehicle(&pool, "AAA-1111").await;
    let v2 = seed_vehicle(&pool, "BBB-2222").await;
    let carts = CartController::new(pool.clone());

    let cart = carts.create(user.id).await.unwrap();
    let (s1, e1) = rental_range(30);
    let (s2, e2) = rental_range(40);

    carts
        .add_item(&auth, cart.id, item_request(v1.id, s1, e1, Decimal::new(5000, 2)))
        .await
        .unwrap();
    carts
        .add_item(&auth, cart.id, item_request(v2.id, s2, e2, Decimal::new(7000, 2)))
        .await
        .unwrap();

    // La tercera línea solapa la primera: debe rechazarse sin tocar nada
    let err = carts
        .add_item(
            &auth,
            cart.id,
            item_request(v1.id, s1 + Duration::hours(6), e1, Decimal::new(9900, 2)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let current = carts.get(&auth, cart.id).await.unwrap();
    assert_eq!(current.items.len(), 2);
    assert_eq!(current.final_price, Decimal::new(12000, 2));
}

#[sqlx::test]
async fn test_submit_rolls_back_completely_on_conflict(pool: PgPool) {
    let owner = seed_user(&pool, "dueno@test.com", "user").await;
    let rival = seed_user(&pool, "rival@test.com", "user").await;
    let auth = auth_for(&owner);
    let v1 = seed_vehicle(&pool, "CCC-3333").await;
    let v2 = seed_vehicle(&pool, "DDD-4444").await;
    let carts = CartController::new(pool.clone());
    let bookings = BookingRepository::new(pool.clone());

    let cart = carts.create(owner.id).await.unwrap();
    let (s1, e1) = rental_range(30);
    let (s2, e2) = rental_range(40);

    carts
        .add_item(&auth, cart.id, item_request(v1.id, s1, e1, Decimal::new(5000, 2)))
        .await
        .unwrap();
    carts
        .add_item(&auth, cart.id, item_request(v2.id, s2, e2, Decimal::new(7000, 2)))
        .await
        .unwrap();

    // Otro usuario reserva el segundo vehículo en ese rango: la segunda
    // línea del carrito chocará durante la conversión
    let mut conn = pool.acquire().await.unwrap();
    BookingRepository::insert(&mut conn, new_booking(v2.id, rival.id, s2, e2, "90000001"))
        .await
        .unwrap();
    drop(conn);

    let err = carts
        .submit(&auth, cart.id, SubmitCartRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Todo o nada: tampoco sobrevive la reserva de la primera línea
    assert!(bookings.list_by_vehicle(v1.id).await.unwrap().is_empty());
    assert_eq!(bookings.list_by_vehicle(v2.id).await.unwrap().len(), 1);

    let current = carts.get(&auth, cart.id).await.unwrap();
    assert_eq!(current.status, "active");
    assert_eq!(current.items.len(), 2);
}

#[sqlx::test]
async fn test_submit_converts_every_item(pool: PgPool) {
    let owner = seed_user(&pool, "convertir@test.com", "user").await;
    let auth = auth_for(&owner);
    let v1 = seed_vehicle(&pool, "EEE-5555").await;
    let v2 = seed_vehicle(&pool, "FFF-6666").await;
    let v3 = seed_vehicle(&pool, "GGG-7777").await;
    let carts = CartController::new(pool.clone());

    let cart = carts.create(owner.id).await.unwrap();
    for (idx, vehicle) in [&v1, &v2, &v3].into_iter().enumerate() {
        let (start, end) = rental_range(30 + 10 * idx as i64);
        carts
            .add_item(&auth, cart.id, item_request(vehicle.id, start, end, Decimal::new(5000, 2)))
            .await
            .unwrap();
    }

    let response = carts
        .submit(&auth, cart.id, SubmitCartRequest::default())
        .await
        .unwrap();

    assert_eq!(response.bookings.len(), 3);
    let codes: std::collections::HashSet<_> = response
        .bookings
        .iter()
        .map(|pair| pair.generated_code.clone())
        .collect();
    assert_eq!(codes.len(), 3);

    let current = carts.get(&auth, cart.id).await.unwrap();
    assert_eq!(current.status, "completed");
    assert!(current.items.is_empty());
}

#[sqlx::test]
async fn test_delete_permission_matrix(pool: PgPool) {
    let owner = seed_user(&pool, "propietario@test.com", "user").await;
    let stranger = seed_user(&pool, "ajeno@test.com", "user").await;
    let admin = seed_user(&pool, "admin@test.com", "admin").await;
    let vehicle = seed_vehicle(&pool, "HHH-8888").await;
    let bookings = BookingController::new(pool.clone());

    let (start, end) = rental_range(30);
    let booking = bookings
        .create(&auth_for(&owner), booking_request(vehicle.id, start, end))
        .await
        .unwrap();

    // Un no-propietario sin rol admin no puede borrar
    let err = bookings
        .delete(&auth_for(&stranger), booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // El propietario sí, y la reserva deja de existir
    bookings.delete(&auth_for(&owner), booking.id).await.unwrap();
    let err = bookings
        .get_by_id(&auth_for(&owner), booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Un admin puede borrar reservas ajenas
    let second = bookings
        .create(&auth_for(&owner), booking_request(vehicle.id, start, end))
        .await
        .unwrap();
    bookings.delete(&auth_for(&admin), second.id).await.unwrap();
}

#[sqlx::test]
async fn test_update_scoped_to_owner_reports_not_found(pool: PgPool) {
    let owner = seed_user(&pool, "titular@test.com", "user").await;
    let stranger = seed_user(&pool, "intruso@test.com", "user").await;
    let vehicle = seed_vehicle(&pool, "JJJ-9999").await;
    let bookings = BookingController::new(pool.clone());

    let (start, end) = rental_range(30);
    let booking = bookings
        .create(&auth_for(&owner), booking_request(vehicle.id, start, end))
        .await
        .unwrap();

    let patch = UpdateBookingRequest {
        start_date: None,
        end_date: None,
        total_price: Some(Decimal::new(12345, 2)),
        accessories: None,
        dl_type: None,
        dl_expiration: None,
        dl_number: None,
        helmet_size: None,
        gloves_size: None,
    };

    // Para un id ajeno la respuesta es NotFound, no Forbidden: la
    // existencia de la reserva no se filtra
    let err = bookings
        .update(&auth_for(&stranger), booking.id, patch)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let owner_patch = UpdateBookingRequest {
        start_date: None,
        end_date: None,
        total_price: Some(Decimal::new(12345, 2)),
        accessories: None,
        dl_type: None,
        dl_expiration: None,
        dl_number: None,
        helmet_size: None,
        gloves_size: None,
    };
    let updated = bookings
        .update(&auth_for(&owner), booking.id, owner_patch)
        .await
        .unwrap();
    assert_eq!(updated.total_price, Decimal::new(12345, 2));
}

#[sqlx::test]
async fn test_overlap_constraint_rejects_concurrent_style_insert(pool: PgPool) {
    let user = seed_user(&pool, "solapa@test.com", "user").await;
    let other = seed_user(&pool, "solapa2@test.com", "user").await;
    let vehicle = seed_vehicle(&pool, "KKK-0000").await;

    let (start, end) = rental_range(30);
    let mut conn = pool.acquire().await.unwrap();

    BookingRepository::insert(&mut conn, new_booking(vehicle.id, user.id, start, end, "80000001"))
        .await
        .unwrap();

    // Segundo INSERT sin pasar por el chequeo de la aplicación, tocando
    // el rango sólo en el extremo: la constraint de exclusión lo veta
    let err = BookingRepository::insert(
        &mut conn,
        new_booking(vehicle.id, other.id, end, end + Duration::days(1), "80000002"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
}

#[sqlx::test]
async fn test_change_password_requires_current_password(pool: PgPool) {
    let config = test_config();
    let auth = AuthController::new(pool.clone(), &config);

    let registered = auth
        .register(RegisterRequest {
            name: "Leo".to_string(),
            surname: "Blanco".to_string(),
            email: "claves@test.com".to_string(),
            password: "original1".to_string(),
            bday: NaiveDate::from_ymd_opt(1991, 5, 5).unwrap(),
            place: "Sevilla".to_string(),
        })
        .await
        .unwrap();

    let err = auth
        .change_password(
            registered.user.id,
            ChangePasswordRequest {
                old_password: "equivocada".to_string(),
                new_password: "renovada1".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    auth.change_password(
        registered.user.id,
        ChangePasswordRequest {
            old_password: "original1".to_string(),
            new_password: "renovada1".to_string(),
        },
    )
    .await
    .unwrap();

    // El password nuevo funciona y el anterior deja de hacerlo
    auth.login(LoginRequest {
        email: "claves@test.com".to_string(),
        password: "renovada1".to_string(),
    })
    .await
    .unwrap();

    let err = auth
        .login(LoginRequest {
            email: "claves@test.com".to_string(),
            password: "original1".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[sqlx::test]
async fn test_refresh_revokes_previous_jti(pool: PgPool) {
    let config = test_config();
    let auth = AuthController::new(pool.clone(), &config);
    let tokens = TokenRepository::new(pool.clone());
    let user = seed_user(&pool, "refresco@test.com", "user").await;

    let refreshed = auth.refresh(user.id, "jti-origen").await.unwrap();

    assert!(!refreshed.access_token.is_empty());
    assert!(tokens.is_revoked("jti-origen").await.unwrap());
}

#[sqlx::test]
async fn test_bookings_by_customer_name(pool: PgPool) {
    let leonor = seed_named_user(&pool, "Leonor", "Quirós", "leonor@test.com", "user").await;
    let vehicle = seed_vehicle(&pool, "LLL-1212").await;
    let bookings = BookingController::new(pool.clone());

    let (start, end) = rental_range(30);
    bookings
        .create(&auth_for(&leonor), booking_request(vehicle.id, start, end))
        .await
        .unwrap();

    let found = bookings.list_by_customer_name("leo").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].customer_id, leonor.id);

    assert!(bookings.list_by_customer_name("zzz").await.unwrap().is_empty());

    let err = bookings.list_by_customer_name("   ").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}
