// src/db/crm_repo.rs

use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::crm::Client};

// Linha auxiliar do UPSERT: além do cliente, o Postgres nos diz se a linha
// acabou de nascer (xmax = 0) ou se caiu no DO UPDATE.
#[derive(FromRow)]
struct ClientUpsertRow {
    #[sqlx(flatten)]
    client: Client,
    inserted: bool,
}

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list_all(&self) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    /// Resolução de identidade por documento (CPF/CNPJ), match exato.
    pub async fn find_by_document<'e, E>(
        &self,
        executor: E,
        document: &str,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE document = $1",
        )
        .bind(document)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    /// Fallback de identidade por telefone. O banco não garante unicidade
    /// de telefone, então escolhemos o registro mais antigo como canônico.
    pub async fn find_by_phone<'e, E>(
        &self,
        executor: E,
        phone: &str,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE phone = $1 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(phone)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    // ---
    // Escrita (transacional)
    // ---

    /// UPSERT atômico pela chave de documento.
    /// Tenta INSERIR; se o documento já existir (ON CONFLICT), ATUALIZA com
    /// semântica de coalesce: campo nulo no arquivo nunca apaga o que já
    /// estava no banco. Devolve também se a operação inseriu ou atualizou.
    pub async fn upsert_by_document<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        document: &str,
        address: Option<&str>,
    ) -> Result<(Client, bool), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ClientUpsertRow>(
            r#"
            INSERT INTO clients (name, email, phone, document, address)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (document) WHERE document IS NOT NULL
            DO UPDATE SET
                name       = EXCLUDED.name,
                email      = COALESCE(EXCLUDED.email, clients.email),
                phone      = COALESCE(EXCLUDED.phone, clients.phone),
                address    = COALESCE(EXCLUDED.address, clients.address),
                updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(document)
        .bind(address)
        .fetch_one(executor)
        .await?;

        Ok((row.client, row.inserted))
    }

    /// Atualização com coalesce de um cliente já resolvido (caminho do
    /// fallback por telefone, onde não há constraint para apoiar o UPSERT).
    pub async fn update_coalesce<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        document: Option<&str>,
        address: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                name       = COALESCE($2, name),
                email      = COALESCE($3, email),
                document   = COALESCE($4, document),
                address    = COALESCE($5, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(document)
        .bind(address)
        .fetch_one(executor)
        .await?;

        Ok(client)
    }

    /// Insere um cliente novo (nenhuma chave de identidade bateu).
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, email, phone, address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .fetch_one(executor)
        .await?;

        Ok(client)
    }
}
