use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::external::{BlobStore, Mailer};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub blobs: Arc<dyn BlobStore>,
    pub mailer: Arc<dyn Mailer>,
    /// Directory served under `/files` for locally stored uploads.
    pub uploads_dir: PathBuf,
}
