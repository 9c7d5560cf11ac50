//! Entrega out-of-band de códigos de cancelación
//!
//! La entrega real (email/SMS) es un colaborador externo; aquí se postea a
//! un webhook configurable con timeout acotado. La entrega es best-effort:
//! un fallo se registra pero no invalida el código ya emitido.

use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

pub struct NotificationService {
    http_client: reqwest::Client,
    webhook_url: Option<String>,
}

impl NotificationService {
    pub fn new(http_client: reqwest::Client, webhook_url: Option<String>) -> Self {
        Self {
            http_client,
            webhook_url,
        }
    }

    pub async fn send_cancellation_code(
        &self,
        renter_id: Uuid,
        booking_id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) {
        let Some(url) = &self.webhook_url else {
            tracing::info!(
                %renter_id,
                %booking_id,
                "no notification webhook configured, cancellation code not delivered"
            );
            return;
        };

        let body = serde_json::json!({
            "type": "booking_cancellation_code",
            "renter_id": renter_id,
            "booking_id": booking_id,
            "code": code,
            "expires_at": expires_at.to_rfc3339(),
        });

        let result = self
            .http_client
            .post(url)
            .timeout(Duration::from_secs(5))
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(%renter_id, %booking_id, "cancellation code delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    %renter_id,
                    %booking_id,
                    status = %response.status(),
                    "cancellation code delivery rejected"
                );
            }
            Err(e) => {
                tracing::warn!(%renter_id, %booking_id, "cancellation code delivery failed: {}", e);
            }
        }
    }
}
