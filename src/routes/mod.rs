pub mod booking_routes;
pub mod rental_routes;
pub mod contract_routes;
pub mod payment_routes;
