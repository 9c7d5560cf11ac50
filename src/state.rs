//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use crate::config::environment::EnvironmentConfig;
use crate::services::notification_service::NotificationService;
use crate::services::reconciliation_service::ReconciliationService;
use crate::services::vnpay_service::VnpayService;
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub http_client: Client,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            pool,
            config,
            http_client: Client::new(),
        }
    }

    pub fn vnpay_service(&self) -> VnpayService {
        VnpayService::new(self.config.gateway.clone(), self.http_client.clone())
    }

    pub fn reconciliation_service(&self) -> ReconciliationService {
        ReconciliationService::new(self.pool.clone(), self.config.gateway.hash_secret.clone())
    }

    pub fn notification_service(&self) -> NotificationService {
        NotificationService::new(
            self.http_client.clone(),
            self.config.notify_webhook_url.clone(),
        )
    }
}
