use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub name: String,
    pub course_id: String,
    pub trainer_id: Option<String>,
    pub trainee_ids: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct BatchRow {
    pub id: String,
    pub name: String,
    pub course_id: String,
    pub trainer_id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: String,
    pub updated_at: String,
}

impl BatchRow {
    pub fn with_trainees(self, trainee_ids: Vec<String>) -> Batch {
        Batch {
            id: self.id,
            name: self.name,
            course_id: self.course_id,
            trainer_id: self.trainer_id,
            trainee_ids,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatchRequest {
    pub name: String,
    pub course_id: String,
    pub trainer_id: Option<String>,
    #[serde(default)]
    pub trainee_ids: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTraineesRequest {
    pub trainee_ids: Vec<String>,
}
