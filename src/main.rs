mod config;
mod state;
mod database;
mod services;
mod utils;
mod models;
mod middleware;
mod controllers;
mod repositories;
mod routes;
mod dto;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
use middleware::cors::cors_middleware;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::default();

    // Configurar logging: DEBUG en desarrollo, INFO en el resto
    tracing_subscriber::fmt()
        .with_max_level(if config.is_development() {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    info!("🔋 EV Rental Booking - Backend de reservas y depósitos");
    info!("======================================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();

    // Crear router de la API
    let app_state = AppState::new(pool, config);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/booking", routes::booking_routes::create_booking_router())
        .nest("/api/rental", routes::rental_routes::create_rental_router())
        .nest("/api/contract", routes::contract_routes::create_contract_router())
        .nest("/api/payment", routes::payment_routes::create_payment_router())
        .layer(cors_middleware())
        .with_state(app_state.clone());

    let addr: SocketAddr = app_state.config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("📋 Endpoints - Booking:");
    info!("   POST /api/booking - Crear booking con depósito");
    info!("   GET  /api/booking/:id - Obtener booking");
    info!("   POST /api/booking/:id/verification - Verificar/rechazar en pickup");
    info!("   POST /api/booking/:id/cancellation/request - Solicitar código de cancelación");
    info!("   POST /api/booking/:id/cancellation/confirm - Confirmar auto-cancelación");
    info!("🚗 Endpoints - Rental:");
    info!("   POST /api/rental - Abrir rental desde booking verificado");
    info!("   GET  /api/rental/:id - Obtener rental");
    info!("   POST /api/rental/:id/start - Iniciar rental");
    info!("   POST /api/rental/:id/contract - Emitir contrato");
    info!("   POST /api/rental/:id/inspection - Registrar inspección");
    info!("   POST /api/rental/:id/receipt - Completar receipt de entrega");
    info!("   POST /api/rental/:id/rating - Calificar rental");
    info!("📝 Endpoints - Contract:");
    info!("   GET  /api/contract/:id - Obtener contrato");
    info!("   POST /api/contract/:id/signature - Registrar firma");
    info!("💳 Endpoints - Payment (gateway):");
    info!("   POST /api/payment/url - Crear URL de pago firmada");
    info!("   GET  /api/payment/ipn - Notificación IPN del gateway");
    info!("   GET  /api/payment/return - Retorno del usuario (advisory)");
    info!("   POST /api/payment/query - Consultar transacción");
    info!("   POST /api/payment/refund - Solicitar devolución");

    // Iniciar servidor
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

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "ev-rental-booking",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
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
