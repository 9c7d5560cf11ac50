//! DTOs de la API
//!
//! Requests y responses serializables, separados de los modelos de
//! persistencia.

pub mod common;
pub mod booking_dto;
pub mod rental_dto;
pub mod contract_dto;
pub mod payment_dto;
