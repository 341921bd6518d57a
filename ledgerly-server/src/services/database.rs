//! Database service for ledgerly-server.

use crate::models::{
    Category, CategoryPatch, Client, File, NewClient, NewFile, NewTransaction,
    TransactionWithNames, UpdateClient,
};
use crate::services::metrics::DB_QUERY_DURATION;
use ledgerly_core::error::{AppError, PatchFailure};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "ledgerly-server"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Persistence(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Persistence(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Client Operations
    // -------------------------------------------------------------------------

    /// Create a new client for an accountant.
    #[instrument(skip(self, input), fields(accountant_id = %input.accountant_id))]
    pub async fn create_client(&self, input: &NewClient) -> Result<Client, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, accountant_id, first_name, last_name, email, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, accountant_id, first_name, last_name, email, phone_number, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.accountant_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to create client: {}", e)))?;

        timer.observe_duration();

        info!(client_id = %client.id, "Client created");

        Ok(client)
    }

    /// List all clients belonging to an accountant, ordered by first name.
    #[instrument(skip(self), fields(accountant_id = %accountant_id))]
    pub async fn list_clients(&self, accountant_id: Uuid) -> Result<Vec<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_clients"])
            .start_timer();

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, accountant_id, first_name, last_name, email, phone_number, created_at
            FROM clients
            WHERE accountant_id = $1
            ORDER BY first_name ASC
            "#,
        )
        .bind(accountant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to list clients: {}", e)))?;

        timer.observe_duration();

        Ok(clients)
    }

    /// Get a single client by id, scoped to its accountant.
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn get_client(
        &self,
        accountant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, accountant_id, first_name, last_name, email, phone_number, created_at
            FROM clients
            WHERE accountant_id = $1 AND id = $2
            "#,
        )
        .bind(accountant_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to get client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    /// Partially update a client. `None` fields are left unchanged.
    #[instrument(skip(self, updates), fields(client_id = %client_id))]
    pub async fn update_client(
        &self,
        accountant_id: Uuid,
        client_id: Uuid,
        updates: &UpdateClient,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                phone_number = COALESCE($6, phone_number),
                updated_at = NOW()
            WHERE accountant_id = $1 AND id = $2
            RETURNING id, accountant_id, first_name, last_name, email, phone_number, created_at
            "#,
        )
        .bind(accountant_id)
        .bind(client_id)
        .bind(&updates.first_name)
        .bind(&updates.last_name)
        .bind(&updates.email)
        .bind(&updates.phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to update client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    // -------------------------------------------------------------------------
    // File Operations
    // -------------------------------------------------------------------------

    /// Record a finalized upload.
    #[instrument(skip(self, input), fields(client_id = %input.client_id))]
    pub async fn create_file(&self, input: &NewFile) -> Result<File, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_file"])
            .start_timer();

        let file = sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (id, client_id, accountant_id, name, storage_path, size)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, client_id, accountant_id, name, storage_path, size, uploaded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.client_id)
        .bind(input.accountant_id)
        .bind(&input.name)
        .bind(&input.storage_path)
        .bind(input.size)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to create file: {}", e)))?;

        timer.observe_duration();

        info!(file_id = %file.id, storage_path = %file.storage_path, "File recorded");

        Ok(file)
    }

    /// List files for a client, newest upload first.
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn list_files_by_client(&self, client_id: Uuid) -> Result<Vec<File>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_files_by_client"])
            .start_timer();

        let files = sqlx::query_as::<_, File>(
            r#"
            SELECT id, client_id, accountant_id, name, storage_path, size, uploaded_at
            FROM files
            WHERE client_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to list files: {}", e)))?;

        timer.observe_duration();

        Ok(files)
    }

    // -------------------------------------------------------------------------
    // Category Operations
    // -------------------------------------------------------------------------

    /// List all categories ordered by name.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_categories"])
            .start_timer();

        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to list categories: {}", e)))?;

        timer.observe_duration();

        Ok(categories)
    }

    /// Create a category. Duplicate names are permitted; the id is the only
    /// identity.
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_category"])
            .start_timer();

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(anyhow::anyhow!("Failed to create category: {}", e)))?;

        timer.observe_duration();

        info!(category_id = category.id, name = %category.name, "Category created");

        Ok(category)
    }

    // -------------------------------------------------------------------------
    // Transaction Operations
    // -------------------------------------------------------------------------

    /// Bulk insert verified webhook events as transactions in a single
    /// statement. Returns the number of rows inserted.
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn insert_transactions(&self, rows: &[NewTransaction]) -> Result<u64, AppError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_transactions"])
            .start_timer();

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO transactions \
             (id, client_id, file_id, accountant_id, tx_amount, tx_narration, tx_timestamp, \
              category_id_by_ai, reason, confidence) ",
        );

        builder.push_values(rows, |mut b, row| {
            b.push_bind(Uuid::new_v4())
                .push_bind(row.client_id)
                .push_bind(row.file_id)
                .push_bind(row.accountant_id)
                .push_bind(row.tx_amount)
                .push_bind(row.tx_narration.clone())
                .push_bind(row.tx_timestamp)
                .push_bind(row.category_id_by_ai)
                .push_bind(row.reason.clone())
                .push_bind(row.confidence.clone());
        });

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            AppError::Persistence(anyhow::anyhow!("Failed to insert transactions: {}", e))
        })?;

        timer.observe_duration();

        let inserted = result.rows_affected();
        info!(inserted = inserted, "Transactions inserted from webhook batch");

        Ok(inserted)
    }

    /// List all transactions for a file, joined with the AI-category and
    /// override-category names. Base order is creation time ascending with
    /// the id as a stable tiebreaker; callers re-sort for other modes.
    #[instrument(skip(self), fields(client_id = %client_id, file_id = %file_id))]
    pub async fn list_transactions_by_file(
        &self,
        client_id: Uuid,
        file_id: Uuid,
    ) -> Result<Vec<TransactionWithNames>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_transactions_by_file"])
            .start_timer();

        let rows = sqlx::query_as::<_, TransactionWithNames>(
            r#"
            SELECT t.id, t.client_id, t.file_id, t.accountant_id, t.tx_amount, t.tx_narration,
                   t.tx_timestamp, t.category_id_by_ai, t.updated_category_id, t.reason,
                   t.confidence, t.created_at, t.updated_at, t.updated_by,
                   ai.name AS ai_category_name, upd.name AS updated_category_name
            FROM transactions t
            LEFT JOIN categories ai ON ai.id = t.category_id_by_ai
            LEFT JOIN categories upd ON upd.id = t.updated_category_id
            WHERE t.client_id = $1 AND t.file_id = $2
            ORDER BY t.created_at ASC, t.id ASC
            "#,
        )
        .bind(client_id)
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::Persistence(anyhow::anyhow!("Failed to list transactions: {}", e))
        })?;

        timer.observe_duration();

        Ok(rows)
    }

    /// Apply accountant override patches to transactions within one
    /// client/file scope.
    ///
    /// Patches are applied independently. Rows outside the given scope or
    /// missing entirely are collected as failures; if any patch failed the
    /// whole call returns `PartialUpdate` enumerating every failing id, but
    /// patches that did apply are not rolled back.
    #[instrument(skip(self, patches), fields(client_id = %client_id, file_id = %file_id, count = patches.len()))]
    pub async fn apply_overrides(
        &self,
        client_id: Uuid,
        file_id: Uuid,
        accountant_id: Uuid,
        patches: &[CategoryPatch],
    ) -> Result<Vec<Uuid>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["apply_overrides"])
            .start_timer();

        let mut applied = Vec::new();
        let mut failures = Vec::new();

        for patch in patches {
            let result = sqlx::query(
                r#"
                UPDATE transactions
                SET updated_category_id = $1, updated_by = $2, updated_at = NOW()
                WHERE id = $3 AND client_id = $4 AND file_id = $5
                "#,
            )
            .bind(patch.updated_category_id)
            .bind(accountant_id)
            .bind(patch.id)
            .bind(client_id)
            .bind(file_id)
            .execute(&self.pool)
            .await;

            match result {
                Ok(r) if r.rows_affected() == 0 => {
                    failures.push(PatchFailure {
                        id: patch.id,
                        cause: "transaction not found in this client/file scope".to_string(),
                    });
                }
                Ok(_) => applied.push(patch.id),
                Err(e) => {
                    failures.push(PatchFailure {
                        id: patch.id,
                        cause: e.to_string(),
                    });
                }
            }
        }

        timer.observe_duration();

        if !failures.is_empty() {
            warn!(
                applied = applied.len(),
                failed = failures.len(),
                "Override batch partially applied"
            );
            return Err(AppError::PartialUpdate { failures });
        }

        info!(applied = applied.len(), "Override batch applied");

        Ok(applied)
    }
}
