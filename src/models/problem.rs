use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub platform: String,
    pub difficulty: String,
    pub category: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProblemRow {
    pub id: String,
    pub title: String,
    pub link: String,
    pub platform: String,
    pub difficulty: String,
    pub category: String,
    pub tags: String,
}

impl TryFrom<ProblemRow> for Problem {
    type Error = serde_json::Error;

    fn try_from(row: ProblemRow) -> Result<Self, Self::Error> {
        Ok(Problem {
            tags: serde_json::from_str(&row.tags)?,
            id: row.id,
            title: row.title,
            link: row.link,
            platform: row.platform,
            difficulty: row.difficulty,
            category: row.category,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProblemRequest {
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProblemRequest {
    pub title: Option<String>,
    pub link: Option<String>,
    pub platform: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}
