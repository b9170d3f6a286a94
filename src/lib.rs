pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{
    EnrollmentChange, EnrollmentError, EnrollmentPolicy, ValidationError,
    DEFAULT_MAX_STUDENTS_PER_COURSE,
};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use crate::config::{AppConfig, StorageBackend};
use std::sync::Arc;

/// Open the configured store and serve the API until the process is stopped.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let policy = config.enrollment_policy();
    log::info!(
        "Enrollment limit: {} students per course",
        policy.max_students_per_course()
    );

    match config.database.backend {
        StorageBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let postgres_store =
                PostgresStore::new(&database_url, config.max_connections(), policy).await?;

            log::info!("Running database migrations...");
            postgres_store.migrate().await?;

            serve_store(Arc::new(postgres_store), &config).await
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on shutdown");
            serve_store(Arc::new(MemoryStore::new(policy)), &config).await
        }
    }
}

async fn serve_store<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
    }

    let app = routes::create_router().with_state(store);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Courses API running on http://{}/api/v1/", bind_address);

    serve(listener, app).await?;

    Ok(())
}
