//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y las credenciales del
//! gateway de pagos.

use std::env;

/// Configuración del gateway de pagos
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Código de terminal asignado por el gateway
    pub tmn_code: String,
    /// Secreto compartido para HMAC-SHA512
    pub hash_secret: String,
    /// URL de redirección de pago
    pub pay_url: String,
    /// URL de la API de comandos (querydr / refund)
    pub api_url: String,
    /// URL de retorno del usuario tras el pago
    pub return_url: String,
    /// Timeout acotado para llamadas de red al gateway, en segundos
    pub request_timeout_secs: u64,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub gateway: GatewayConfig,
    /// Webhook opcional para entrega out-of-band de códigos (email/SMS)
    pub notify_webhook_url: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            gateway: GatewayConfig {
                tmn_code: env::var("VNP_TMN_CODE").expect("VNP_TMN_CODE must be set"),
                hash_secret: env::var("VNP_HASH_SECRET").expect("VNP_HASH_SECRET must be set"),
                pay_url: env::var("VNP_PAY_URL").expect("VNP_PAY_URL must be set"),
                api_url: env::var("VNP_API_URL").expect("VNP_API_URL must be set"),
                return_url: env::var("VNP_RETURN_URL").expect("VNP_RETURN_URL must be set"),
                request_timeout_secs: env::var("VNP_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("VNP_REQUEST_TIMEOUT_SECS must be a valid number"),
            },
            notify_webhook_url: env::var("NOTIFY_WEBHOOK_URL").ok(),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
