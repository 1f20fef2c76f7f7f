// src/services/import/tabular.rs
//
// Decodificador tabular: transforma texto delimitado cru em uma sequência
// ordenada de mapas chave→valor. Os cabeçalhos viram chaves minúsculas e
// sem espaços nas pontas, para o mapeamento por apelidos ser tolerante.

use std::collections::HashMap;

use crate::common::error::AppError;

/// Uma linha decodificada: cabeçalho normalizado → valor cru.
/// A chave só existe se o cabeçalho existia no arquivo.
pub type RawRow = HashMap<String, String>;

const CANDIDATE_DELIMITERS: [u8; 3] = [b';', b',', b'\t'];

/// Detecta o delimitador olhando só a linha de cabeçalho: vence o candidato
/// com mais ocorrências (empate resolve pela ordem `;` > `,` > tab).
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let mut best = CANDIDATE_DELIMITERS[0];
    let mut best_count = 0usize;
    for candidate in CANDIDATE_DELIMITERS {
        let count = header.matches(candidate as char).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Decodifica o arquivo inteiro. Linhas vazias são puladas.
/// Arquivo vazio ou só com cabeçalho é erro de LOTE (EmptyImportFile),
/// levantado antes de qualquer transação ser aberta.
pub fn decode_delimited(content: &str) -> Result<Vec<RawRow>, AppError> {
    let delimiter = sniff_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;

        // Linha totalmente vazia não conta como dado
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let mut row = RawRow::new();
        for (i, field) in record.iter().enumerate() {
            if let Some(header) = headers.get(i) {
                if !header.is_empty() {
                    row.insert(header.clone(), field.trim().to_string());
                }
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AppError::EmptyImportFile);
    }

    Ok(rows)
}
