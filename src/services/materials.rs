use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::db::topics;
use crate::error::AppError;
use crate::external::BlobStore;
use crate::models::Topic;

const MAX_NOTES_BYTES: usize = 20 * 1024 * 1024;

/// Trainer notes: the file goes to blob storage, the topic keeps its URL.
pub struct MaterialsService {
    db: SqlitePool,
    blobs: Arc<dyn BlobStore>,
}

impl MaterialsService {
    pub fn new(db: SqlitePool, blobs: Arc<dyn BlobStore>) -> Self {
        Self { db, blobs }
    }

    pub async fn upload_trainer_notes(
        &self,
        topic_id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Topic, AppError> {
        if topics::find_topic(&self.db, topic_id).await?.is_none() {
            return Err(AppError::NotFound("topic"));
        }
        if bytes.is_empty() {
            return Err(AppError::BadRequest("notes file is empty".to_string()));
        }
        if bytes.len() > MAX_NOTES_BYTES {
            return Err(AppError::BadRequest(format!(
                "notes file exceeds {} bytes",
                MAX_NOTES_BYTES
            )));
        }

        let url = self.blobs.upload(file_name, content_type, bytes).await?;
        topics::set_trainer_notes(&self.db, topic_id, &url).await?;
        info!(topic_id, %url, "trainer notes attached");

        topics::find_topic(&self.db, topic_id)
            .await?
            .ok_or(AppError::NotFound("topic"))
    }
}
