use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use training_portal::api::router;
use training_portal::config::AppConfig;
use training_portal::db;
use training_portal::external::{
    BlobStore, HttpBlobStore, HttpMailer, LocalBlobStore, LogMailer, Mailer,
};
use training_portal::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "training_portal=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;
    db::migrate(&pool).await?;

    let blobs: Arc<dyn BlobStore> = match config.blob.clone() {
        Some(blob) => Arc::new(HttpBlobStore::new(blob)?),
        None => {
            info!("no blob service configured, storing uploads in {}", config.local_blob_dir);
            Arc::new(LocalBlobStore::new(
                &config.local_blob_dir,
                config.public_base_url.clone(),
            ))
        }
    };
    let mailer: Arc<dyn Mailer> = match config.mail.clone() {
        Some(mail) => Arc::new(HttpMailer::new(mail)?),
        None => Arc::new(LogMailer),
    };

    let state = AppState {
        db: pool.clone(),
        blobs,
        mailer,
        uploads_dir: config.local_blob_dir.clone().into(),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
