// tests/import_batches.rs
//
// Testes de lote contra um Postgres real (provisionado pelo #[sqlx::test],
// que aplica as migrações de ./migrations em um banco isolado por teste).

use rust_decimal::Decimal;
use sqlx::PgPool;

use oficina_backend::db::{
    ClientRepository, InventoryRepository, OperationsRepository, VehicleRepository,
};
use oficina_backend::services::ImportService;

fn service(pool: &PgPool) -> ImportService {
    ImportService::new(
        pool.clone(),
        ClientRepository::new(pool.clone()),
        VehicleRepository::new(pool.clone()),
        OperationsRepository::new(pool.clone()),
        InventoryRepository::new(pool.clone()),
    )
}

fn invoice_xml(dets: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <nfeProc><NFe><infNFe>{}</infNFe></NFe></nfeProc>"#,
        dets
    )
}

fn invoice_det(sku: &str, name: &str, qty: &str, price: &str) -> String {
    format!(
        "<det><prod><cProd>{}</cProd><xProd>{}</xProd>\
         <qCom>{}</qCom><vUnCom>{}</vUnCom></prod></det>",
        sku, name, qty, price
    )
}

// ---
// Tolerância a falha parcial: uma linha inválida não derruba as demais.
// ---
#[sqlx::test]
async fn invalid_row_is_skipped_and_the_rest_commits(pool: PgPool) {
    let svc = service(&pool);

    let mut csv = String::from("nome;telefone\n");
    for i in 1..=10 {
        if i == 4 {
            // sem telefone: falha o campo obrigatório
            csv.push_str("Cliente 4;\n");
        } else {
            csv.push_str(&format!("Cliente {};119900{:02}\n", i, i));
        }
    }

    let report = svc.import_clients(&csv).await.unwrap();
    assert_eq!(report.imported, 9);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Linha 5:"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 9);
}

// ---
// Erro de persistência no meio do lote: o savepoint da linha isola a
// falha e as outras linhas continuam valendo no commit final.
// ---
#[sqlx::test]
async fn store_level_row_failure_does_not_poison_the_batch(pool: PgPool) {
    let svc = service(&pool);

    // A OS 2 estoura o NUMERIC(12,2) da coluna de valor total: o erro só
    // aparece no INSERT, nunca na validação de campos.
    let csv = "numero;cliente;status;total\n\
               1;Maria;Aberta;100,00\n\
               2;João;Aberta;99999999999999,99\n\
               3;Ana;cancelada - cliente desistiu;50,00\n";

    let report = svc.import_legacy_orders(csv).await.unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Linha 3 (OS 2):"));
    // O texto cru do driver fica no log, não na resposta
    assert!(report.errors[0].contains("falha ao gravar a linha"));

    let numbers: Vec<String> =
        sqlx::query_scalar("SELECT legacy_number FROM service_orders ORDER BY legacy_number")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(numbers, vec!["1".to_string(), "3".to_string()]);
}

// ---
// Idempotência: reimportar o mesmo arquivo atualiza em vez de duplicar.
// ---
#[sqlx::test]
async fn reimport_updates_instead_of_duplicating(pool: PgPool) {
    let svc = service(&pool);

    let csv = "nome;telefone;cpf\n\
               Maria;11990001111;11122233344\n\
               João;11990002222;55566677788\n";

    let first = svc.import_clients(csv).await.unwrap();
    assert_eq!(first.imported, 2);
    assert_eq!(first.updated, 0);

    let second = svc.import_clients(csv).await.unwrap();
    assert_eq!(second.imported, 0);
    assert_eq!(second.updated, 2);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

// ---
// Precedência do documento: mesmo documento com telefone novo atualiza o
// registro existente (telefone sobrescrito), não cria outro cliente.
// ---
#[sqlx::test]
async fn document_match_wins_over_phone(pool: PgPool) {
    let svc = service(&pool);

    svc.import_clients("nome;telefone;cpf\nMaria;11111111111;11122233344\n")
        .await
        .unwrap();
    let report = svc
        .import_clients("nome;telefone;cpf\nMaria;22222222222;11122233344\n")
        .await
        .unwrap();
    assert_eq!(report.updated, 1);

    let (count, phone): (i64, String) = sqlx::query_as(
        "SELECT COUNT(*) OVER (), phone FROM clients WHERE document = '11122233344'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
    assert_eq!(phone, "22222222222");
}

// ---
// Coalesce na atualização: campo ausente no arquivo não apaga o que já
// estava gravado.
// ---
#[sqlx::test]
async fn absent_field_does_not_null_out_stored_value(pool: PgPool) {
    let svc = service(&pool);

    svc.import_clients(
        "nome;telefone;cpf;email\nMaria;11990001111;11122233344;maria@example.com\n",
    )
    .await
    .unwrap();

    // Segundo arquivo sem coluna de e-mail, mas com endereço novo
    svc.import_clients("nome;telefone;cpf;endereco\nMaria;11990001111;11122233344;Rua B, 20\n")
        .await
        .unwrap();

    let (email, address): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT email, address FROM clients WHERE document = '11122233344'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(email.as_deref(), Some("maria@example.com"));
    assert_eq!(address.as_deref(), Some("Rua B, 20"));
}

// ---
// Merge aditivo de estoque: reimportar o mesmo SKU soma a quantidade.
// ---
#[sqlx::test]
async fn inventory_quantities_are_added_not_replaced(pool: PgPool) {
    let svc = service(&pool);

    let first = invoice_xml(&invoice_det("X1", "Correia dentada", "10.000", "39.90"));
    let report = svc.import_parts(&first).await.unwrap();
    assert_eq!(report.imported, 1);

    let second = invoice_xml(&invoice_det("X1", "Correia dentada", "5.000", "42.00"));
    let report = svc.import_parts(&second).await.unwrap();
    assert_eq!(report.updated, 1);

    let quantity: Decimal =
        sqlx::query_scalar("SELECT quantity FROM inventory_items WHERE sku = 'X1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(quantity, "15.000".parse().unwrap());
}

// ---
// Abortos de lote: falha ao abrir a transação não persiste nada.
// ---
#[sqlx::test]
async fn closed_pool_aborts_before_any_write(pool: PgPool) {
    let svc = service(&pool);
    pool.close().await;

    let err = svc
        .import_clients("nome;telefone\nMaria;11990001111\n")
        .await
        .unwrap_err();
    assert!(err.aborts_batch());
}
