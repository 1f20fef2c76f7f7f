// src/services/import/mod.rs
//
// Motor de importação em massa: decodifica o arquivo enviado, normaliza
// cada registro, resolve identidade e aplica o merge — tudo dentro de UMA
// transação por invocação.
//
// Modelo de falha em dois níveis:
//  - erro de LINHA (validação ou persistência restrita à linha): vira um
//    "skip" no relatório e o loop segue para a próxima linha;
//  - erro de LOTE (arquivo inválido antes do loop, ou perda da conexão no
//    meio dele): rollback de tudo e uma única resposta de erro.
// "Sucesso" significa "o lote rodou até o fim", não "toda linha passou".
//
// Cada linha persiste dentro de um SAVEPOINT próprio (transação aninhada
// do sqlx). Sem isso, o primeiro statement com erro deixaria a transação
// do Postgres em estado abortado (25P02) e todas as linhas seguintes
// falhariam em cascata, com o COMMIT final virando ROLLBACK silencioso.

pub mod fields;
pub mod invoice;
pub mod report;
pub mod status;
pub mod tabular;

use sqlx::{Acquire, PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, InventoryRepository, OperationsRepository, VehicleRepository},
    models::import::ImportReport,
};
use fields::{ClientRecord, LegacyOrderRecord, VehicleRecord};
use report::ReportBuilder;

/// Teto de linhas por lote, para a transação não ficar aberta
/// indefinidamente com um arquivo desproporcional.
pub const MAX_BATCH_ROWS: usize = 10_000;

fn ensure_batch_size(rows: usize) -> Result<(), AppError> {
    if rows > MAX_BATCH_ROWS {
        return Err(AppError::BatchTooLarge(MAX_BATCH_ROWS));
    }
    Ok(())
}

/// Mensagem de erro de linha para o relatório. Texto cru do driver não
/// volta para o chamador da API: vai para o log, e o relatório recebe
/// uma frase curta.
fn row_error_detail(err: &AppError) -> String {
    match err {
        AppError::DatabaseError(db_err) => {
            tracing::warn!(error = %db_err, "Falha de banco restrita a uma linha");
            "falha ao gravar a linha".to_string()
        }
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub struct ImportService {
    pool: PgPool,
    clients: ClientRepository,
    vehicles: VehicleRepository,
    orders: OperationsRepository,
    inventory: InventoryRepository,
}

impl ImportService {
    pub fn new(
        pool: PgPool,
        clients: ClientRepository,
        vehicles: VehicleRepository,
        orders: OperationsRepository,
        inventory: InventoryRepository,
    ) -> Self {
        Self {
            pool,
            clients,
            vehicles,
            orders,
            inventory,
        }
    }

    // =========================================================================
    //  CAMINHO 1: CLIENTES (arquivo delimitado)
    // =========================================================================

    pub async fn import_clients(&self, content: &str) -> Result<ImportReport, AppError> {
        let rows = tabular::decode_delimited(content)?;
        ensure_batch_size(rows.len())?;
        tracing::info!(rows = rows.len(), "Iniciando importação de clientes");

        let mut tx = self.pool.begin().await?;
        let mut builder = ReportBuilder::new();

        for (index, row) in rows.iter().enumerate() {
            // +2: linhas são 1-based e a primeira é o cabeçalho
            let line = index + 2;

            // Campos obrigatórios ausentes nem chegam ao banco
            let record = match ClientRecord::from_row(row) {
                Ok(record) => record,
                Err(err) => {
                    builder.record_skipped(format!("Linha {}: {}", line, err));
                    continue;
                }
            };

            // SAVEPOINT por linha: erro de persistência fica contido aqui
            let mut sp = tx.begin().await?;
            match self.apply_client_record(&mut sp, &record).await {
                Ok(inserted) => {
                    sp.commit().await?;
                    if inserted {
                        builder.record_inserted();
                    } else {
                        builder.record_updated();
                    }
                }
                Err(err) if err.aborts_batch() => {
                    sp.rollback().await.ok();
                    tx.rollback().await.ok();
                    return Err(err);
                }
                Err(err) => {
                    sp.rollback().await.ok();
                    builder.record_skipped(format!(
                        "Linha {} ({}): {}",
                        line,
                        record.name,
                        row_error_detail(&err)
                    ));
                }
            }
        }

        tx.commit().await?;
        let report = builder.finish();
        tracing::info!(
            imported = report.imported,
            updated = report.updated,
            skipped = report.skipped,
            "Importação de clientes concluída"
        );
        Ok(report)
    }

    /// Resolução de identidade do cliente, em ordem de prioridade:
    /// 1. documento (UPSERT atômico apoiado na constraint);
    /// 2. telefone (select-then-update: o banco não garante unicidade aqui);
    /// 3. nada bateu → insere novo.
    /// Devolve true quando inseriu, false quando atualizou.
    async fn apply_client_record(
        &self,
        conn: &mut PgConnection,
        record: &ClientRecord,
    ) -> Result<bool, AppError> {
        if let Some(document) = record.document.as_deref() {
            let (_, inserted) = self
                .clients
                .upsert_by_document(
                    &mut *conn,
                    &record.name,
                    record.email.as_deref(),
                    Some(&record.phone),
                    document,
                    record.address.as_deref(),
                )
                .await?;
            return Ok(inserted);
        }

        if let Some(existing) = self.clients.find_by_phone(&mut *conn, &record.phone).await? {
            self.clients
                .update_coalesce(
                    &mut *conn,
                    existing.id,
                    Some(&record.name),
                    record.email.as_deref(),
                    None,
                    record.address.as_deref(),
                )
                .await?;
            return Ok(false);
        }

        self.clients
            .insert(
                &mut *conn,
                &record.name,
                record.email.as_deref(),
                Some(&record.phone),
                record.address.as_deref(),
            )
            .await?;
        Ok(true)
    }

    // =========================================================================
    //  CAMINHO 2: VEÍCULOS (arquivo delimitado)
    // =========================================================================

    pub async fn import_vehicles(&self, content: &str) -> Result<ImportReport, AppError> {
        let rows = tabular::decode_delimited(content)?;
        ensure_batch_size(rows.len())?;
        tracing::info!(rows = rows.len(), "Iniciando importação de veículos");

        let mut tx = self.pool.begin().await?;
        let mut builder = ReportBuilder::new();

        for (index, row) in rows.iter().enumerate() {
            let line = index + 2;

            let record = match VehicleRecord::from_row(row) {
                Ok(record) => record,
                Err(err) => {
                    builder.record_skipped(format!("Linha {}: {}", line, err));
                    continue;
                }
            };

            let mut sp = tx.begin().await?;
            match self.apply_vehicle_record(&mut sp, &record).await {
                Ok(inserted) => {
                    sp.commit().await?;
                    if inserted {
                        builder.record_inserted();
                    } else {
                        builder.record_updated();
                    }
                }
                Err(err) if err.aborts_batch() => {
                    sp.rollback().await.ok();
                    tx.rollback().await.ok();
                    return Err(err);
                }
                Err(err) => {
                    sp.rollback().await.ok();
                    builder.record_skipped(format!(
                        "Linha {} ({}): {}",
                        line,
                        record.plate,
                        row_error_detail(&err)
                    ));
                }
            }
        }

        tx.commit().await?;
        let report = builder.finish();
        tracing::info!(
            imported = report.imported,
            updated = report.updated,
            skipped = report.skipped,
            "Importação de veículos concluída"
        );
        Ok(report)
    }

    async fn apply_vehicle_record(
        &self,
        conn: &mut PgConnection,
        record: &VehicleRecord,
    ) -> Result<bool, AppError> {
        // Vincula o dono quando o arquivo trouxer documento ou telefone
        // de um cliente já cadastrado; caso contrário o veículo fica órfão.
        let owner_id = self.resolve_owner(&mut *conn, record).await?;

        let (_, inserted) = self
            .vehicles
            .upsert_by_plate(
                &mut *conn,
                &record.plate,
                record.model.as_deref(),
                record.brand.as_deref(),
                record.year,
                record.vin.as_deref(),
                owner_id,
            )
            .await?;
        Ok(inserted)
    }

    async fn resolve_owner(
        &self,
        conn: &mut PgConnection,
        record: &VehicleRecord,
    ) -> Result<Option<Uuid>, AppError> {
        if let Some(document) = record.owner_document.as_deref() {
            if let Some(client) = self.clients.find_by_document(&mut *conn, document).await? {
                return Ok(Some(client.id));
            }
        }
        if let Some(phone) = record.owner_phone.as_deref() {
            if let Some(client) = self.clients.find_by_phone(&mut *conn, phone).await? {
                return Ok(Some(client.id));
            }
        }
        Ok(None)
    }

    // =========================================================================
    //  CAMINHO 3: ORDENS DE SERVIÇO LEGADAS (arquivo delimitado)
    // =========================================================================

    pub async fn import_legacy_orders(&self, content: &str) -> Result<ImportReport, AppError> {
        let rows = tabular::decode_delimited(content)?;
        ensure_batch_size(rows.len())?;
        tracing::info!(rows = rows.len(), "Iniciando importação de ordens legadas");

        let mut tx = self.pool.begin().await?;
        let mut builder = ReportBuilder::new();

        for (index, row) in rows.iter().enumerate() {
            let line = index + 2;

            let record = match LegacyOrderRecord::from_row(row) {
                Ok(record) => record,
                Err(err) => {
                    builder.record_skipped(format!("Linha {}: {}", line, err));
                    continue;
                }
            };

            let mut sp = tx.begin().await?;
            let outcome = self
                .orders
                .upsert_legacy_order(
                    &mut *sp,
                    &record.number,
                    record.status,
                    record.client_name.as_deref(),
                    record.vehicle_plate.as_deref(),
                    record.total_value,
                    record.paid_value,
                    record.observations.as_deref(),
                )
                .await;

            match outcome {
                Ok((_, inserted)) => {
                    sp.commit().await?;
                    if inserted {
                        builder.record_inserted();
                    } else {
                        builder.record_updated();
                    }
                }
                Err(err) if err.aborts_batch() => {
                    sp.rollback().await.ok();
                    tx.rollback().await.ok();
                    return Err(err);
                }
                Err(err) => {
                    sp.rollback().await.ok();
                    builder.record_skipped(format!(
                        "Linha {} (OS {}): {}",
                        line,
                        record.number,
                        row_error_detail(&err)
                    ));
                }
            }
        }

        tx.commit().await?;
        let report = builder.finish();
        tracing::info!(
            imported = report.imported,
            updated = report.updated,
            skipped = report.skipped,
            "Importação de ordens legadas concluída"
        );
        Ok(report)
    }

    // =========================================================================
    //  CAMINHO 4: PEÇAS / ESTOQUE (XML de nota fiscal)
    // =========================================================================

    pub async fn import_parts(&self, xml: &str) -> Result<ImportReport, AppError> {
        let decoded = invoice::decode_invoice(xml)?;
        let (items, rejected) = invoice::validate_items(decoded);

        // Nenhum item sobreviveu à validação: aborta antes de persistir
        if items.is_empty() {
            return Err(AppError::NoValidItems);
        }
        ensure_batch_size(items.len())?;
        tracing::info!(
            items = items.len(),
            rejected = rejected.len(),
            "Iniciando importação de peças por nota fiscal"
        );

        let mut tx = self.pool.begin().await?;
        let mut builder = ReportBuilder::new();

        // Itens rejeitados na validação entram no relatório como pulados
        for message in rejected {
            builder.record_skipped(message);
        }

        for item in &items {
            let mut sp = tx.begin().await?;
            let outcome = self
                .inventory
                .upsert_additive(
                    &mut *sp,
                    &item.sku,
                    &item.name,
                    item.quantity,
                    item.unit_price,
                    item.ncm.as_deref(),
                    rust_decimal::Decimal::ZERO,
                )
                .await;

            match outcome {
                Ok((_, inserted)) => {
                    sp.commit().await?;
                    if inserted {
                        builder.record_inserted();
                    } else {
                        builder.record_updated();
                    }
                }
                Err(err) if err.aborts_batch() => {
                    sp.rollback().await.ok();
                    tx.rollback().await.ok();
                    return Err(err);
                }
                Err(err) => {
                    sp.rollback().await.ok();
                    builder.record_skipped(format!(
                        "SKU {}: {}",
                        item.sku,
                        row_error_detail(&err)
                    ));
                }
            }
        }

        tx.commit().await?;
        let report = builder.finish();
        tracing::info!(
            imported = report.imported,
            updated = report.updated,
            skipped = report.skipped,
            "Importação de peças concluída"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_ceiling_is_enforced() {
        assert!(ensure_batch_size(MAX_BATCH_ROWS).is_ok());
        let err = ensure_batch_size(MAX_BATCH_ROWS + 1).unwrap_err();
        assert!(matches!(err, AppError::BatchTooLarge(_)));
    }

    #[test]
    fn database_errors_are_not_echoed_to_the_caller() {
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(row_error_detail(&err), "falha ao gravar a linha");
    }

    #[test]
    fn validation_messages_pass_through_unchanged() {
        let err = AppError::RowValidation("placa é obrigatória".into());
        assert_eq!(row_error_detail(&err), "placa é obrigatória");
    }
}
