// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{ClientRepository, InventoryRepository, OperationsRepository, VehicleRepository},
    services::ImportService,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub clients: ClientRepository,
    pub vehicles: VehicleRepository,
    pub orders: OperationsRepository,
    pub inventory: InventoryRepository,
    pub import_service: ImportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let clients = ClientRepository::new(db_pool.clone());
        let vehicles = VehicleRepository::new(db_pool.clone());
        let orders = OperationsRepository::new(db_pool.clone());
        let inventory = InventoryRepository::new(db_pool.clone());
        let import_service = ImportService::new(
            db_pool.clone(),
            clients.clone(),
            vehicles.clone(),
            orders.clone(),
            inventory.clone(),
        );

        Ok(Self {
            db_pool,
            clients,
            vehicles,
            orders,
            inventory,
            import_service,
        })
    }
}
