//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL, más los guards de transición del ciclo de vida
//! booking → rental.

pub mod booking;
pub mod fee;
pub mod payment;
pub mod rental;
pub mod contract;
pub mod inspection;
pub mod cancellation_code;
pub mod vehicle_at_station;
