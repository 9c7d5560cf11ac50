//! Repositorios de acceso a datos
//!
//! Un repositorio por agregado. Las lecturas simples van contra el pool;
//! todo camino read-check-write recibe la transacción abierta por el
//! controller para que la secuencia completa sea un solo commit atómico.

pub mod booking_repository;
pub mod payment_repository;
pub mod rental_repository;
pub mod contract_repository;
pub mod inspection_repository;
pub mod cancellation_code_repository;
pub mod vehicle_repository;
