// src/handlers/import.rs

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use crate::{common::error::AppError, config::AppState, models::import::ImportReport};

// Teto do XML de nota fiscal. Os arquivos tabulares não são limitados
// aqui (isso fica na borda de transporte).
const MAX_INVOICE_BYTES: usize = 5 * 1024 * 1024;

// ---
// Resposta de sucesso: os contadores do relatório achatados no corpo.
// "success: true" quer dizer que o LOTE rodou até o fim, mesmo que
// linhas individuais tenham sido puladas.
// ---
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: ImportReport,
    pub message: String,
}

impl ImportResponse {
    fn completed(report: ImportReport, message: &str) -> Self {
        Self {
            success: true,
            report,
            message: message.to_string(),
        }
    }
}

/// Extrai o campo `file` do multipart. Um upload por requisição.
async fn read_upload(mut multipart: Multipart) -> Result<(Option<String>, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await?;
            return Ok((file_name, data));
        }
    }
    Err(AppError::MissingFile)
}

fn decode_utf8(data: Bytes) -> Result<String, AppError> {
    String::from_utf8(data.to_vec()).map_err(|_| AppError::InvalidEncoding)
}

// ---
// Handler: importação de clientes (CSV)
// ---
pub async fn import_clients(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (_, data) = read_upload(multipart).await?;
    let content = decode_utf8(data)?;

    let report = app_state.import_service.import_clients(&content).await?;

    Ok((
        StatusCode::OK,
        Json(ImportResponse::completed(
            report,
            "Importação de clientes concluída",
        )),
    ))
}

// ---
// Handler: importação de veículos (CSV)
// ---
pub async fn import_vehicles(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (_, data) = read_upload(multipart).await?;
    let content = decode_utf8(data)?;

    let report = app_state.import_service.import_vehicles(&content).await?;

    Ok((
        StatusCode::OK,
        Json(ImportResponse::completed(
            report,
            "Importação de veículos concluída",
        )),
    ))
}

// ---
// Handler: importação de ordens de serviço legadas (CSV)
// ---
pub async fn import_service_orders(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (_, data) = read_upload(multipart).await?;
    let content = decode_utf8(data)?;

    let report = app_state
        .import_service
        .import_legacy_orders(&content)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ImportResponse::completed(
            report,
            "Importação de ordens legadas concluída",
        )),
    ))
}

// ---
// Handler: importação de peças por nota fiscal (XML)
// ---
pub async fn import_parts(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (file_name, data) = read_upload(multipart).await?;

    // Extensão errada é rejeitada antes de qualquer parse
    let is_xml = file_name
        .as_deref()
        .map(|name| name.to_lowercase().ends_with(".xml"))
        .unwrap_or(false);
    if !is_xml {
        return Err(AppError::UnsupportedFileType(".xml"));
    }
    if data.len() > MAX_INVOICE_BYTES {
        return Err(AppError::FileTooLarge(MAX_INVOICE_BYTES));
    }

    let xml = decode_utf8(data)?;
    let report = app_state.import_service.import_parts(&xml).await?;

    Ok((
        StatusCode::OK,
        Json(ImportResponse::completed(
            report,
            "Importação de peças concluída",
        )),
    ))
}
