use crate::models::inspection::{Inspection, InspectionReport};
use crate::utils::errors::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct InspectionRepository {
    pool: PgPool,
}

impl InspectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_rental(&self, rental_id: Uuid) -> Result<Vec<Inspection>, AppError> {
        let inspections = sqlx::query_as::<_, Inspection>(
            "SELECT * FROM inspections WHERE rental_id = $1 ORDER BY created_at",
        )
        .bind(rental_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(inspections)
    }

    /// Gate de firma y de receipt: cuenta inspecciones dentro de la
    /// transacción.
    pub async fn count_by_rental_tx(
        tx: &mut Transaction<'_, Postgres>,
        rental_id: Uuid,
    ) -> Result<i64, AppError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM inspections WHERE rental_id = $1")
                .bind(rental_id)
                .fetch_one(&mut **tx)
                .await?;

        Ok(count.0)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        inspection: &Inspection,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO inspections
                (id, rental_id, inspection_type, battery_capacity, inspector_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(inspection.id)
        .bind(inspection.rental_id)
        .bind(inspection.inspection_type)
        .bind(inspection.battery_capacity)
        .bind(inspection.inspector_id)
        .bind(inspection.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn insert_report(
        tx: &mut Transaction<'_, Postgres>,
        report: &InspectionReport,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO inspection_reports (id, inspection_id, note, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(report.id)
        .bind(report.inspection_id)
        .bind(&report.note)
        .bind(report.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
