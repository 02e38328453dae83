use std::net::SocketAddr;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use vehicle_rental::config::environment::EnvironmentConfig;
use vehicle_rental::create_app;
use vehicle_rental::database::DatabaseConnection;
use vehicle_rental::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🏍️ Vehicle Rental - API de alquiler de vehículos");
    info!("================================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();
    let config = EnvironmentConfig::default();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let app = create_app(AppState::new(pool, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔐 Endpoints - Auth:");
    info!("   POST /api/auth/register - Registrar usuario");
    info!("   POST /api/auth/login - Login");
    info!("   POST /api/auth/logout - Logout (revoca el token)");
    info!("   POST /api/auth/refresh - Token nuevo (revoca el anterior)");
    info!("   POST /api/auth/change-password - Cambiar password");
    info!("   GET  /api/auth/me - Usuario actual");
    info!("👥 Endpoints - Users:");
    info!("   GET  /api/users - Listar usuarios (admin)");
    info!("   GET  /api/users/:id - Obtener usuario");
    info!("   PUT  /api/users/:id - Actualizar perfil");
    info!("   PUT  /api/users/:id/role - Cambiar rol (admin)");
    info!("   DELETE /api/users/:id - Eliminar usuario");
    info!("🚗 Endpoints - Vehicles:");
    info!("   GET  /api/vehicles - Buscar en el catálogo");
    info!("   GET  /api/vehicles/available - Disponibles en un rango");
    info!("   POST /api/vehicles/check-availability - Disponibilidad de un vehículo");
    info!("   GET  /api/vehicles/:id - Obtener vehículo");
    info!("   GET  /api/vehicles/:id/cost/:hours - Costo del alquiler");
    info!("   POST /api/vehicles - Crear vehículo (admin)");
    info!("   PUT  /api/vehicles/:id - Actualizar vehículo (admin)");
    info!("   PATCH /api/vehicles/:id/toggle - Activar/desactivar (admin)");
    info!("   DELETE /api/vehicles/:id - Eliminar vehículo (admin)");
    info!("🛒 Endpoints - Cart:");
    info!("   POST /api/cart - Crear carrito activo");
    info!("   GET  /api/cart/active - Carrito activo del usuario");
    info!("   GET  /api/cart/:id - Obtener carrito");
    info!("   GET  /api/cart/:id/detailed - Carrito con vehículos");
    info!("   POST /api/cart/:id/items - Añadir línea");
    info!("   DELETE /api/cart/:id/items/:item_id - Quitar línea");
    info!("   DELETE /api/cart/:id/items - Vaciar carrito");
    info!("   POST /api/cart/:id/submit - Convertir en reservas");
    info!("   POST /api/cart/:id/complete - Completar carrito");
    info!("   POST /api/cart/:id/cancel - Cancelar carrito");
    info!("📅 Endpoints - Bookings:");
    info!("   POST /api/bookings - Crear reserva");
    info!("   GET  /api/bookings - Listar reservas");
    info!("   GET  /api/bookings/check-conflict - Conflictos del usuario");
    info!("   GET  /api/bookings/code/:code - Reserva por código");
    info!("   GET  /api/bookings/vehicle/:vehicle_id - Por vehículo (admin)");
    info!("   GET  /api/bookings/by-name/:name - Por nombre de cliente (admin)");
    info!("   GET  /api/bookings/:id - Obtener reserva");
    info!("   PUT  /api/bookings/:id - Actualizar reserva");
    info!("   DELETE /api/bookings/:id - Eliminar reserva");
    info!("   PATCH /api/bookings/:id/pickup - Toggle recogida");
    info!("   PATCH /api/bookings/:id/returned - Toggle devolución");
    info!("   PATCH /api/bookings/:id/payment - Toggle pago");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
