use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub topic_name: String,
    pub description: String,
    pub trainer_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTopicRequest {
    pub topic_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignment_problem_ids: Vec<String>,
    #[serde(default)]
    pub practice_problem_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicRequest {
    pub topic_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTopicProblemsRequest {
    pub assignment_problem_ids: Vec<String>,
    pub practice_problem_ids: Vec<String>,
}
