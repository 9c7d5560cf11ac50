//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores y el protocolo
//! de firmas del gateway de pagos.

pub mod errors;
pub mod signature;
