// src/services/import/invoice.rs
//
// Decodificador de nota fiscal (XML). Localiza os nós de produto (`det`)
// onde quer que estejam na árvore; ausente, um único ou uma lista viram
// sempre 0..N itens. Números são lidos de forma defensiva no decode
// (não-numérico vira 0); a validação de negócio roda logo em seguida e
// cada item rejeitado vira uma linha pulada no relatório.

use rust_decimal::Decimal;

use crate::common::error::AppError;

/// Um item de produto extraído da nota, ainda sem validação.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceItem {
    pub sku: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub ncm: Option<String>,
}

fn child_text(node: roxmltree::Node<'_, '_>, tag: &str) -> String {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

fn decimal_or_zero(raw: &str) -> Decimal {
    raw.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Decodifica a nota inteira. XML malformado é erro de LOTE (InvalidXml).
pub fn decode_invoice(xml: &str) -> Result<Vec<InvoiceItem>, AppError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|err| AppError::InvalidXml(err.to_string()))?;

    let mut items = Vec::new();
    for det in doc.descendants().filter(|node| node.has_tag_name("det")) {
        let Some(prod) = det.children().find(|child| child.has_tag_name("prod")) else {
            continue;
        };

        let ncm = child_text(prod, "NCM");
        items.push(InvoiceItem {
            sku: child_text(prod, "cProd"),
            name: child_text(prod, "xProd"),
            quantity: decimal_or_zero(&child_text(prod, "qCom")),
            unit_price: decimal_or_zero(&child_text(prod, "vUnCom")),
            ncm: (!ncm.is_empty()).then_some(ncm),
        });
    }

    Ok(items)
}

/// Validação tipada pós-decode: nome e SKU não-vazios, quantidade positiva,
/// preço não-negativo. Devolve os itens que sobreviveram e uma mensagem
/// por item rejeitado (para o relatório, em vez de descarte silencioso).
pub fn validate_items(items: Vec<InvoiceItem>) -> (Vec<InvoiceItem>, Vec<String>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        let position = index + 1;
        let label = if item.sku.is_empty() { "?" } else { &item.sku };

        if item.sku.is_empty() || item.name.is_empty() {
            rejected.push(format!(
                "Item {} ({}): código e descrição do produto são obrigatórios",
                position, label
            ));
        } else if item.quantity <= Decimal::ZERO {
            rejected.push(format!(
                "Item {} ({}): quantidade deve ser positiva",
                position, label
            ));
        } else if item.unit_price < Decimal::ZERO {
            rejected.push(format!(
                "Item {} ({}): preço unitário não pode ser negativo",
                position, label
            ));
        } else {
            valid.push(item);
        }
    }

    (valid, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfe(dets: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <nfeProc><NFe><infNFe>{}</infNFe></NFe></nfeProc>"#,
            dets
        )
    }

    fn det(sku: &str, name: &str, qty: &str, price: &str) -> String {
        format!(
            "<det><prod><cProd>{}</cProd><xProd>{}</xProd>\
             <NCM>40103900</NCM><qCom>{}</qCom><vUnCom>{}</vUnCom></prod></det>",
            sku, name, qty, price
        )
    }

    #[test]
    fn decodes_multiple_product_nodes() {
        let xml = nfe(&format!(
            "{}{}",
            det("X1", "Correia", "5.000", "39.90"),
            det("X2", "Filtro de óleo", "2.000", "18.50")
        ));
        let items = decode_invoice(&xml).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].sku, "X1");
        assert_eq!(items[0].quantity, "5.000".parse().unwrap());
        assert_eq!(items[1].ncm.as_deref(), Some("40103900"));
    }

    #[test]
    fn single_product_node_still_decodes() {
        let xml = nfe(&det("X1", "Correia", "1", "10"));
        assert_eq!(decode_invoice(&xml).unwrap().len(), 1);
    }

    #[test]
    fn absent_product_list_decodes_to_empty() {
        let xml = nfe("");
        assert_eq!(decode_invoice(&xml).unwrap().len(), 0);
    }

    #[test]
    fn non_numeric_fields_become_zero() {
        let xml = nfe(&det("X1", "Correia", "muitas", "caro"));
        let items = decode_invoice(&xml).unwrap();
        assert_eq!(items[0].quantity, Decimal::ZERO);
        assert_eq!(items[0].unit_price, Decimal::ZERO);
    }

    #[test]
    fn malformed_xml_is_a_batch_error() {
        let err = decode_invoice("<nfe><det>").unwrap_err();
        assert!(matches!(err, AppError::InvalidXml(_)));
    }

    #[test]
    fn validation_rejects_bad_items_with_messages() {
        let items = vec![
            InvoiceItem {
                sku: "X1".into(),
                name: "Correia".into(),
                quantity: Decimal::ONE,
                unit_price: Decimal::TEN,
                ncm: None,
            },
            // quantidade zerada (veio não-numérica do decode)
            InvoiceItem {
                sku: "X2".into(),
                name: "Filtro".into(),
                quantity: Decimal::ZERO,
                unit_price: Decimal::TEN,
                ncm: None,
            },
            // sem código
            InvoiceItem {
                sku: "".into(),
                name: "Vela".into(),
                quantity: Decimal::ONE,
                unit_price: Decimal::ONE,
                ncm: None,
            },
        ];

        let (valid, rejected) = validate_items(items);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].sku, "X1");
        assert_eq!(rejected.len(), 2);
        assert!(rejected[0].contains("X2"));
        assert!(rejected[1].contains("obrigatórios"));
    }
}
