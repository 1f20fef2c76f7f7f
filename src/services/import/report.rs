// src/services/import/report.rs
//
// Acumulador do relatório de importação: três contadores e a lista
// ordenada de erros por linha. O total final é imported + updated.

use crate::models::import::ImportReport;

#[derive(Debug, Default)]
pub struct ReportBuilder {
    imported: u32,
    updated: u32,
    skipped: u32,
    errors: Vec<String>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_inserted(&mut self) {
        self.imported += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    /// Linha pulada sempre carrega uma mensagem com contexto
    /// (qual linha, qual valor identificador, o que falhou).
    pub fn record_skipped(&mut self, message: String) {
        self.skipped += 1;
        self.errors.push(message);
    }

    pub fn finish(self) -> ImportReport {
        ImportReport {
            imported: self.imported,
            updated: self.updated,
            skipped: self.skipped,
            total: self.imported + self.updated,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_imported_plus_updated() {
        let mut builder = ReportBuilder::new();
        builder.record_inserted();
        builder.record_inserted();
        builder.record_updated();
        builder.record_skipped("Linha 4: nome e telefone são obrigatórios".into());

        let report = builder.finish();
        assert_eq!(report.imported, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.total, 3);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn errors_are_omitted_from_json_when_empty() {
        let report = ReportBuilder::new().finish();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("errors").is_none());

        let mut builder = ReportBuilder::new();
        builder.record_skipped("Linha 2: placa é obrigatória".into());
        let json = serde_json::to_value(&builder.finish()).unwrap();
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
    }
}
