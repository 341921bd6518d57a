use crate::config::LedgerlyConfig;
use crate::handlers;
use crate::services::{ClassifierClient, Database, StorageClient};
use axum::{
    routing::{get, post},
    Router,
};
use ledgerly_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: LedgerlyConfig,
    pub db: Database,
    pub storage: Arc<StorageClient>,
    pub classifier: Arc<ClassifierClient>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: LedgerlyConfig) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;
        db.run_migrations().await.map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;

        let storage = Arc::new(StorageClient::new(&config.storage));
        let classifier = Arc::new(ClassifierClient::new(&config.classifier));

        let state = AppState {
            config: config.clone(),
            db,
            storage,
            classifier,
        };

        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics_endpoint))
        .route(
            "/api/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/api/clients/:client_id",
            get(handlers::clients::get_client).put(handlers::clients::update_client),
        )
        .route(
            "/api/clients/:client_id/files",
            get(handlers::files::list_files).post(handlers::files::finalize_upload),
        )
        .route(
            "/api/clients/:client_id/files/:file_id/transactions",
            get(handlers::transactions::list_transactions)
                .patch(handlers::transactions::apply_overrides),
        )
        .route(
            "/api/clients/:client_id/files/:file_id/transactions/summary",
            get(handlers::transactions::transactions_summary),
        )
        .route(
            "/api/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/api/storage/signed-upload",
            post(handlers::storage::signed_upload),
        )
        .route(
            "/api/storage/sign-download",
            post(handlers::storage::sign_download),
        )
        .route(
            "/api/transactions/webhook",
            post(handlers::webhook::classification_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
