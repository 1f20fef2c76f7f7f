// src/services/import/status.rs
//
// Normalizador de status: mapeia o texto livre dos sistemas legados para o
// enum fechado de status. A tabela de regras é ordenada e a PRIMEIRA regra
// que casar vence; depois disso nenhuma outra é testada. Mesma entrada,
// mesma saída, sempre.

use crate::models::operations::ServiceOrderStatus;

// Regras de substring, avaliadas de cima para baixo sobre o texto já em
// maiúsculas. A ordem é um artefato revisável: mudou a ordem, mudou o
// comportamento.
const STATUS_RULES: &[(&str, ServiceOrderStatus)] = &[
    ("ABERTA", ServiceOrderStatus::Open),
    ("ABERTO", ServiceOrderStatus::Open),
    ("PENDENTE", ServiceOrderStatus::Open),
    ("ORÇAMENTO", ServiceOrderStatus::Quotation),
    ("ORCAMENTO", ServiceOrderStatus::Quotation),
    ("APROV", ServiceOrderStatus::Approved),
    ("ANDAMENTO", ServiceOrderStatus::InProgress),
    ("EXECU", ServiceOrderStatus::InProgress),
    ("PEÇA", ServiceOrderStatus::WaitingParts),
    ("PECA", ServiceOrderStatus::WaitingParts),
    ("AGUARD", ServiceOrderStatus::WaitingParts),
    ("CANCEL", ServiceOrderStatus::Cancelled),
    ("FINALIZ", ServiceOrderStatus::Finished),
    ("CONCLU", ServiceOrderStatus::Finished),
    ("ENTREG", ServiceOrderStatus::Finished),
];

/// Mapeia texto livre para o enum fechado:
/// 1. maiúsculas + trim;
/// 2. se já for um nome do enum, volta como está;
/// 3. senão, primeira regra de substring que casar;
/// 4. senão, fallback FINISHED (ordens legadas quase sempre já encerraram).
pub fn normalize_status(raw: &str) -> ServiceOrderStatus {
    let value = raw.trim().to_uppercase();

    if let Some(exact) = ServiceOrderStatus::from_name(&value) {
        return exact;
    }

    for (pattern, status) in STATUS_RULES {
        if value.contains(pattern) {
            return *status;
        }
    }

    ServiceOrderStatus::Finished
}
