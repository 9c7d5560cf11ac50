//! Services module
//!
//! Este módulo contiene la lógica de integración externa: el cliente del
//! gateway de pagos (firma de URL, query, refund), el motor de
//! reconciliación de notificaciones IPN y la entrega out-of-band de
//! códigos de cancelación.

pub mod vnpay_service;
pub mod reconciliation_service;
pub mod notification_service;
