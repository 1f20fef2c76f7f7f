// src/services/import/fields.rs
//
// Normalizador de campos: resolve apelidos de cabeçalho para o campo
// canônico de cada entidade e aplica as coerções (trim, e-mail minúsculo,
// telefone/documento só com dígitos). A checagem de campos obrigatórios
// acontece DEPOIS da normalização, ainda antes da resolução de identidade.

use rust_decimal::Decimal;

use super::{status::normalize_status, tabular::RawRow};
use crate::{common::error::AppError, models::operations::ServiceOrderStatus};

// --- Apelidos aceitos por campo canônico (ordem = prioridade) ---

const CLIENT_NAME: &[&str] = &["name", "nome", "cliente", "razao social", "razão social"];
const CLIENT_EMAIL: &[&str] = &["email", "e-mail"];
const CLIENT_PHONE: &[&str] = &["phone", "telefone", "celular", "fone"];
const CLIENT_DOCUMENT: &[&str] = &["document", "documento", "cpf", "cnpj", "cpf_cnpj", "cpf/cnpj"];
const CLIENT_ADDRESS: &[&str] = &["address", "endereco", "endereço"];

const VEHICLE_PLATE: &[&str] = &["plate", "placa"];
const VEHICLE_MODEL: &[&str] = &["model", "modelo"];
const VEHICLE_BRAND: &[&str] = &["brand", "marca", "fabricante"];
const VEHICLE_YEAR: &[&str] = &["year", "ano"];
const VEHICLE_VIN: &[&str] = &["vin", "chassi", "chassis"];

const ORDER_NUMBER: &[&str] = &["number", "numero", "número", "n_os", "os", "ordem"];
const ORDER_CLIENT_NAME: &[&str] = &["client", "cliente", "nome do cliente", "nome_cliente"];
const ORDER_PLATE: &[&str] = &["plate", "placa", "veiculo", "veículo"];
const ORDER_STATUS: &[&str] = &["status", "situacao", "situação"];
const ORDER_TOTAL: &[&str] = &["total", "valor", "valor total", "valor_total"];
const ORDER_PAID: &[&str] = &["paid", "pago", "valor pago", "valor_pago"];
const ORDER_OBSERVATIONS: &[&str] = &["observations", "observacoes", "observações", "obs"];

// ---
// Funções puras de extração
// ---

/// Primeiro apelido presente com valor não-vazio vence; o valor volta sem
/// espaços nas pontas. String vazia vira ausência, nunca "".
pub fn pick(row: &RawRow, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        if let Some(value) = row.get(*alias) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// E-mail sempre minúsculo.
pub fn pick_email(row: &RawRow, aliases: &[&str]) -> Option<String> {
    pick(row, aliases).map(|value| value.to_lowercase())
}

/// Telefone e documento ficam só com dígitos ("(11) 9.9999-0000" → "11999990000").
pub fn pick_digits(row: &RawRow, aliases: &[&str]) -> Option<String> {
    pick(row, aliases)
        .map(|value| value.chars().filter(char::is_ascii_digit).collect::<String>())
        .filter(|digits| !digits.is_empty())
}

/// Valores monetários de exportações legadas podem vir no formato
/// brasileiro ("1.234,56"). Não-numérico vira ausência, não zero.
pub fn parse_money(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace("R$", "");
    let cleaned = cleaned.trim();
    let normalized = if cleaned.contains(',') {
        // ponto é separador de milhar, vírgula é decimal
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    normalized.parse::<Decimal>().ok()
}

// ---
// Registros normalizados por entidade
// ---

/// Cliente normalizado. Obrigatórios: nome e telefone.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub document: Option<String>,
    pub address: Option<String>,
}

impl ClientRecord {
    pub fn from_row(row: &RawRow) -> Result<Self, AppError> {
        let name = pick(row, CLIENT_NAME);
        let phone = pick_digits(row, CLIENT_PHONE);

        let (name, phone) = match (name, phone) {
            (Some(name), Some(phone)) => (name, phone),
            _ => {
                return Err(AppError::RowValidation(
                    "nome e telefone são obrigatórios".into(),
                ));
            }
        };

        Ok(Self {
            name,
            email: pick_email(row, CLIENT_EMAIL),
            phone,
            document: pick_digits(row, CLIENT_DOCUMENT),
            address: pick(row, CLIENT_ADDRESS),
        })
    }
}

/// Veículo normalizado. Obrigatório: placa (guardada em maiúsculas).
/// Os campos de dono servem só para vincular o cliente existente.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub plate: String,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub owner_document: Option<String>,
    pub owner_phone: Option<String>,
}

impl VehicleRecord {
    pub fn from_row(row: &RawRow) -> Result<Self, AppError> {
        let plate = pick(row, VEHICLE_PLATE)
            .ok_or_else(|| AppError::RowValidation("placa é obrigatória".into()))?
            .to_uppercase();

        Ok(Self {
            plate,
            model: pick(row, VEHICLE_MODEL),
            brand: pick(row, VEHICLE_BRAND),
            year: pick(row, VEHICLE_YEAR).and_then(|y| y.parse::<i32>().ok()),
            vin: pick(row, VEHICLE_VIN).map(|v| v.to_uppercase()),
            owner_document: pick_digits(row, CLIENT_DOCUMENT),
            owner_phone: pick_digits(row, CLIENT_PHONE),
        })
    }
}

/// Ordem de serviço legada normalizada. Obrigatório: número da OS.
/// O status passa pelo normalizador de texto livre (com fallback).
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyOrderRecord {
    pub number: String,
    pub client_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub status: ServiceOrderStatus,
    pub total_value: Option<Decimal>,
    pub paid_value: Option<Decimal>,
    pub observations: Option<String>,
}

impl LegacyOrderRecord {
    pub fn from_row(row: &RawRow) -> Result<Self, AppError> {
        let number = pick(row, ORDER_NUMBER)
            .ok_or_else(|| AppError::RowValidation("número da OS é obrigatório".into()))?;

        let status = pick(row, ORDER_STATUS)
            .map(|raw| normalize_status(&raw))
            .unwrap_or(ServiceOrderStatus::Finished);

        Ok(Self {
            number,
            client_name: pick(row, ORDER_CLIENT_NAME),
            vehicle_plate: pick(row, ORDER_PLATE).map(|p| p.to_uppercase()),
            status,
            total_value: pick(row, ORDER_TOTAL).and_then(|v| parse_money(&v)),
            paid_value: pick(row, ORDER_PAID).and_then(|v| parse_money(&v)),
            observations: pick(row, ORDER_OBSERVATIONS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn pick_respects_alias_priority() {
        let r = row(&[("nome", "Maria"), ("cliente", "Outro")]);
        assert_eq!(pick(&r, CLIENT_NAME), Some("Maria".to_string()));
    }

    #[test]
    fn pick_skips_empty_values() {
        let r = row(&[("name", "  "), ("nome", "Maria")]);
        assert_eq!(pick(&r, CLIENT_NAME), Some("Maria".to_string()));
    }

    #[test]
    fn email_is_lowercased() {
        let r = row(&[("email", " Maria@Example.COM ")]);
        assert_eq!(pick_email(&r, CLIENT_EMAIL), Some("maria@example.com".to_string()));
    }

    #[test]
    fn phone_keeps_only_digits() {
        let r = row(&[("telefone", "(11) 9.9999-0000")]);
        assert_eq!(pick_digits(&r, CLIENT_PHONE), Some("11999990000".to_string()));
    }

    #[test]
    fn digits_only_garbage_is_absent() {
        let r = row(&[("cpf", "n/a")]);
        assert_eq!(pick_digits(&r, CLIENT_DOCUMENT), None);
    }

    #[test]
    fn parse_money_accepts_brazilian_format() {
        assert_eq!(parse_money("1.234,56"), Decimal::from_str("1234.56").ok());
        assert_eq!(parse_money("R$ 150,00"), Decimal::from_str("150.00").ok());
        assert_eq!(parse_money("99.90"), Decimal::from_str("99.90").ok());
        assert_eq!(parse_money("abc"), None);
    }

    #[test]
    fn client_requires_name_and_phone() {
        let err = ClientRecord::from_row(&row(&[("nome", "Maria")])).unwrap_err();
        assert!(matches!(err, AppError::RowValidation(_)));

        let ok = ClientRecord::from_row(&row(&[("nome", "Maria"), ("fone", "1199")])).unwrap();
        assert_eq!(ok.name, "Maria");
        assert_eq!(ok.phone, "1199");
        assert_eq!(ok.document, None);
    }

    #[test]
    fn vehicle_plate_is_uppercased() {
        let r = row(&[("placa", "abc1d23"), ("modelo", "Gol")]);
        let record = VehicleRecord::from_row(&r).unwrap();
        assert_eq!(record.plate, "ABC1D23");
        assert_eq!(record.model, Some("Gol".to_string()));
    }

    #[test]
    fn legacy_order_requires_number() {
        let err = LegacyOrderRecord::from_row(&row(&[("cliente", "Maria")])).unwrap_err();
        assert!(matches!(err, AppError::RowValidation(_)));
    }

    #[test]
    fn legacy_order_status_defaults_to_finished_when_column_missing() {
        let record = LegacyOrderRecord::from_row(&row(&[("numero", "42")])).unwrap();
        assert_eq!(record.status, ServiceOrderStatus::Finished);
    }
}
