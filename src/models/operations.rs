// src/models/operations.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// --- Enums ---

// Mapeia o CREATE TYPE service_order_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceOrderStatus {
    Open,
    Quotation,
    Approved,
    InProgress,
    WaitingParts,
    Finished,
    Cancelled,
}

impl ServiceOrderStatus {
    /// Converte o nome exato do enum (já em maiúsculas) de volta para o tipo.
    pub fn from_name(value: &str) -> Option<Self> {
        match value {
            "OPEN" => Some(Self::Open),
            "QUOTATION" => Some(Self::Quotation),
            "APPROVED" => Some(Self::Approved),
            "IN_PROGRESS" => Some(Self::InProgress),
            "WAITING_PARTS" => Some(Self::WaitingParts),
            "FINISHED" => Some(Self::Finished),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

// Mapeia o CREATE TYPE service_order_origin do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_order_origin", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceOrderOrigin {
    System,
    Legacy,
}

// --- ORDEM DE SERVIÇO ---
// Ordens de origem LEGACY carregam os campos desnormalizados (nome do
// cliente, placa, valores) em vez de referências relacionais.
// Chave de identidade legada: (legacy_number, origin).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    pub id: Uuid,
    pub origin: ServiceOrderOrigin,
    pub status: ServiceOrderStatus,
    pub client_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub legacy_number: Option<String>,
    pub legacy_client_name: Option<String>,
    pub legacy_vehicle_plate: Option<String>,
    pub legacy_total_value: Option<Decimal>,
    pub legacy_paid_value: Option<Decimal>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
