// src/models/import.rs

use serde::Serialize;

// --- RELATÓRIO DE IMPORTAÇÃO ---
// Resumo devolvido ao chamador ao final do lote. Nunca é persistido.
// total = imported + updated; 'errors' só aparece no JSON quando alguma
// linha foi pulada.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: u32,
    pub updated: u32,
    pub skipped: u32,
    pub total: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
