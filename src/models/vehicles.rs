// src/models/vehicles.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- VEÍCULO ---
// Chave de identidade: placa (sempre armazenada em maiúsculas).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub plate: String,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
