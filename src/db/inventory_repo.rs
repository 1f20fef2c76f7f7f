// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, PgPool, Postgres};

use crate::{common::error::AppError, models::inventory::InventoryItem};

#[derive(FromRow)]
struct ItemUpsertRow {
    #[sqlx(flatten)]
    item: InventoryItem,
    inserted: bool,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<InventoryItem>, AppError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Entrada de estoque por nota fiscal.
    /// Tenta INSERIR. Se o SKU já existir (ON CONFLICT), SOMA a quantidade
    /// recebida à existente em vez de substituí-la. Atômico: não há
    /// select prévio, então não sofre da corrida check-then-act.
    /// min_quantity só é definido na criação; depois fica como estava.
    pub async fn upsert_additive<'e, E>(
        &self,
        executor: E,
        sku: &str,
        name: &str,
        quantity: Decimal,
        unit_price: Decimal,
        ncm: Option<&str>,
        min_quantity: Decimal,
    ) -> Result<(InventoryItem, bool), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ItemUpsertRow>(
            r#"
            INSERT INTO inventory_items (sku, name, quantity, min_quantity, unit_price, ncm)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (sku)
            DO UPDATE SET
                name       = EXCLUDED.name,
                quantity   = inventory_items.quantity + EXCLUDED.quantity,
                unit_price = EXCLUDED.unit_price,
                ncm        = COALESCE(EXCLUDED.ncm, inventory_items.ncm),
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(sku)
        .bind(name)
        .bind(quantity)
        .bind(min_quantity)
        .bind(unit_price)
        .bind(ncm)
        .fetch_one(executor)
        .await?;

        Ok((row.item, row.inserted))
    }
}
