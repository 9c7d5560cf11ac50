//! Modelo de VehicleAtStation
//!
//! Propiedad del subsistema de estaciones; aquí solo se consume y muta su
//! status como efecto colateral del ciclo booking → rental. Las columnas de
//! catálogo quedan fuera de este core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vehicle_at_station_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleAtStationStatus {
    Available,
    Booked,
    Maintenance,
}

/// VehicleAtStation - mapea a la tabla vehicles_at_station
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleAtStation {
    pub id: Uuid,
    pub station_id: Uuid,
    pub vehicle_id: Uuid,
    pub status: VehicleAtStationStatus,
    pub updated_at: DateTime<Utc>,
}

impl VehicleAtStation {
    pub fn is_available(&self) -> bool {
        self.status == VehicleAtStationStatus::Available
    }

    /// Un rental solo puede abrirse sobre un vehículo en estado Booked.
    pub fn is_booked(&self) -> bool {
        self.status == VehicleAtStationStatus::Booked
    }
}
