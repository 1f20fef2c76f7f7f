// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
//
// A taxonomia da importação tem dois níveis:
//  - Erros de LINHA (RowValidation e falhas de banco restritas a uma linha):
//    são capturados dentro do loop do lote, viram um "skip" no relatório e
//    o lote continua.
//  - Erros de LOTE (arquivo vazio, XML inválido, perda de conexão...):
//    derrubam o lote inteiro com rollback e viram uma resposta de erro única.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Nível de linha ---
    #[error("{0}")]
    RowValidation(String),

    // --- Nível de lote (antes de abrir a transação) ---
    #[error("Nenhum arquivo foi enviado no campo 'file'")]
    MissingFile,

    #[error("Tipo de arquivo não suportado: esperado {0}")]
    UnsupportedFileType(&'static str),

    #[error("Arquivo excede o limite de {0} bytes")]
    FileTooLarge(usize),

    #[error("Arquivo não está em UTF-8 válido")]
    InvalidEncoding,

    #[error("Arquivo de importação vazio ou sem linhas de dados")]
    EmptyImportFile,

    #[error("XML inválido: {0}")]
    InvalidXml(String),

    #[error("Nenhum item válido encontrado na nota fiscal")]
    NoValidItems,

    #[error("Lote excede o limite de {0} linhas")]
    BatchTooLarge(usize),

    #[error("Erro ao ler o upload: {0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),

    #[error("Erro ao decodificar o arquivo: {0}")]
    CsvError(#[from] csv::Error),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Decide o destino do lote quando um erro acontece durante o
    /// processamento de uma linha: falhas de conexão derrubam a transação
    /// inteira; qualquer outra coisa é registrada como linha pulada.
    pub fn aborts_batch(&self) -> bool {
        match self {
            AppError::DatabaseError(err) => matches!(
                err,
                sqlx::Error::Io(_)
                    | sqlx::Error::Protocol(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MissingFile => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::UnsupportedFileType(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::FileTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            AppError::InvalidEncoding => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::EmptyImportFile => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::InvalidXml(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::NoValidItems => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::BatchTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            AppError::MultipartError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::CsvError(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::RowValidation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            err => {
                tracing::error!("Erro Interno do Servidor: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Formato de falha de lote: { "error": ..., "details"? }
        let body = match &self {
            AppError::InvalidXml(details) => Json(json!({
                "error": "XML inválido",
                "details": details,
            })),
            _ => Json(json!({ "error": error_message })),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_abort_the_batch() {
        let err = AppError::DatabaseError(sqlx::Error::PoolClosed);
        assert!(err.aborts_batch());

        let err = AppError::DatabaseError(sqlx::Error::PoolTimedOut);
        assert!(err.aborts_batch());
    }

    #[test]
    fn row_errors_do_not_abort_the_batch() {
        let err = AppError::RowValidation("nome é obrigatório".into());
        assert!(!err.aborts_batch());

        // Violação de constraint fica restrita à linha
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert!(!err.aborts_batch());
    }
}
