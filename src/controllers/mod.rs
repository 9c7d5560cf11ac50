//! Controllers del ciclo de vida booking → rental
//!
//! Cada operación de transición envuelve su secuencia read-check-write
//! completa en una sola transacción sqlx.

pub mod booking_controller;
pub mod rental_controller;
pub mod contract_controller;
