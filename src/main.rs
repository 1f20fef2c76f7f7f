//src/main.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;

use oficina_backend::config::AppState;
use oficina_backend::handlers;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de importação em massa (upload de um arquivo por requisição).
    // O limite de corpo fica acima do teto do XML (5 MiB) para sobrar
    // espaço para o envelope multipart.
    let import_routes = Router::new()
        .route("/clients", post(handlers::import::import_clients))
        .route("/vehicles", post(handlers::import::import_vehicles))
        .route("/service-orders", post(handlers::import::import_service_orders))
        .route("/parts", post(handlers::import::import_parts))
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/clients", get(handlers::browse::list_clients))
        .route("/api/vehicles", get(handlers::browse::list_vehicles))
        .route("/api/service-orders", get(handlers::browse::list_service_orders))
        .route("/api/inventory/items", get(handlers::browse::list_inventory_items))
        .nest("/api/import", import_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
