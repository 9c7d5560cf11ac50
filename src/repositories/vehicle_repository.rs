use crate::models::vehicle_at_station::{VehicleAtStation, VehicleAtStationStatus};
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Acceso al status de vehicles_at_station. El catálogo de estaciones es
/// de otro subsistema; este core solo lee y muta el status como efecto
/// del ciclo booking → rental.
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VehicleAtStation>, AppError> {
        let vehicle =
            sqlx::query_as::<_, VehicleAtStation>("SELECT * FROM vehicles_at_station WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<VehicleAtStation>, AppError> {
        let vehicle = sqlx::query_as::<_, VehicleAtStation>(
            "SELECT * FROM vehicles_at_station WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(vehicle)
    }

    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: VehicleAtStationStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE vehicles_at_station SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
