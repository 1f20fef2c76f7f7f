// src/db/vehicles_repo.rs

use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::vehicles::Vehicle};

#[derive(FromRow)]
struct VehicleUpsertRow {
    #[sqlx(flatten)]
    vehicle: Vehicle,
    inserted: bool,
}

#[derive(Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles ORDER BY plate ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    /// UPSERT atômico pela placa (o chamador já normalizou para maiúsculas).
    /// No DO UPDATE, campo ausente no arquivo preserva o valor do banco.
    pub async fn upsert_by_plate<'e, E>(
        &self,
        executor: E,
        plate: &str,
        model: Option<&str>,
        brand: Option<&str>,
        year: Option<i32>,
        vin: Option<&str>,
        client_id: Option<Uuid>,
    ) -> Result<(Vehicle, bool), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, VehicleUpsertRow>(
            r#"
            INSERT INTO vehicles (plate, model, brand, year, vin, client_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (plate)
            DO UPDATE SET
                model      = COALESCE(EXCLUDED.model, vehicles.model),
                brand      = COALESCE(EXCLUDED.brand, vehicles.brand),
                year       = COALESCE(EXCLUDED.year, vehicles.year),
                vin        = COALESCE(EXCLUDED.vin, vehicles.vin),
                client_id  = COALESCE(EXCLUDED.client_id, vehicles.client_id),
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(plate)
        .bind(model)
        .bind(brand)
        .bind(year)
        .bind(vin)
        .bind(client_id)
        .fetch_one(executor)
        .await?;

        Ok((row.vehicle, row.inserted))
    }
}
