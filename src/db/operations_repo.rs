// src/db/operations_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::operations::{ServiceOrder, ServiceOrderStatus},
};

#[derive(FromRow)]
struct ServiceOrderUpsertRow {
    #[sqlx(flatten)]
    order: ServiceOrder,
    inserted: bool,
}

#[derive(Clone)]
pub struct OperationsRepository {
    pool: PgPool,
}

impl OperationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<ServiceOrder>, AppError> {
        let orders = sqlx::query_as::<_, ServiceOrder>(
            "SELECT * FROM service_orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// UPSERT atômico de ordem legada pela chave composta
    /// (legacy_number, origin = LEGACY).
    /// O status sempre vem preenchido do normalizador (há fallback), então é
    /// sobrescrito; os demais campos seguem a semântica de coalesce.
    pub async fn upsert_legacy_order<'e, E>(
        &self,
        executor: E,
        legacy_number: &str,
        status: ServiceOrderStatus,
        legacy_client_name: Option<&str>,
        legacy_vehicle_plate: Option<&str>,
        legacy_total_value: Option<Decimal>,
        legacy_paid_value: Option<Decimal>,
        observations: Option<&str>,
    ) -> Result<(ServiceOrder, bool), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ServiceOrderUpsertRow>(
            r#"
            INSERT INTO service_orders (
                origin, status, legacy_number, legacy_client_name,
                legacy_vehicle_plate, legacy_total_value, legacy_paid_value,
                observations
            )
            VALUES ('LEGACY', $1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (legacy_number, origin) WHERE legacy_number IS NOT NULL
            DO UPDATE SET
                status               = EXCLUDED.status,
                legacy_client_name   = COALESCE(EXCLUDED.legacy_client_name, service_orders.legacy_client_name),
                legacy_vehicle_plate = COALESCE(EXCLUDED.legacy_vehicle_plate, service_orders.legacy_vehicle_plate),
                legacy_total_value   = COALESCE(EXCLUDED.legacy_total_value, service_orders.legacy_total_value),
                legacy_paid_value    = COALESCE(EXCLUDED.legacy_paid_value, service_orders.legacy_paid_value),
                observations         = COALESCE(EXCLUDED.observations, service_orders.observations),
                updated_at           = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(status)
        .bind(legacy_number)
        .bind(legacy_client_name)
        .bind(legacy_vehicle_plate)
        .bind(legacy_total_value)
        .bind(legacy_paid_value)
        .bind(observations)
        .fetch_one(executor)
        .await?;

        Ok((row.order, row.inserted))
    }
}
