// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- ITEM DE ESTOQUE ---
// Chave de identidade: SKU (código do produto na nota fiscal).
// A quantidade é SOMADA na reimportação (semântica de "estoque recebido"),
// nunca substituída.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: Decimal,
    pub min_quantity: Decimal,
    pub unit_price: Decimal,
    pub ncm: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
