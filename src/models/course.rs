use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Weekday indices skipped by default (0 = Sunday).
pub const DEFAULT_EXCLUDED_DAYS: [u8; 1] = [0];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub excluded_days: Vec<u8>,
    pub custom_holidays: Vec<DateTime<Utc>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Storage shape of a course; `excluded_days` is a JSON array and holidays
/// live in their own table.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub excluded_days: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CourseRow {
    pub fn into_course(
        self,
        custom_holidays: Vec<DateTime<Utc>>,
    ) -> Result<Course, serde_json::Error> {
        let excluded_days = serde_json::from_str(&self.excluded_days)?;
        Ok(Course {
            id: self.id,
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            excluded_days,
            custom_holidays,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// One `{topicId, date}` entry of a module's schedule. The same topic may
/// appear several times; each entry is a separate session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSchedule {
    pub topic_id: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSchedule {
    pub module_id: String,
    pub topic_schedules: Vec<TopicSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub excluded_days: Option<Vec<u8>>,
    #[serde(default)]
    pub custom_holidays: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub excluded_days: Option<Vec<u8>>,
    pub custom_holidays: Option<Vec<DateTime<Utc>>>,
}

/// Replaces the ordered module list of a course. `locked_module_ids` must be
/// a subset of `module_ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCourseModulesRequest {
    pub module_ids: Vec<String>,
    #[serde(default)]
    pub locked_module_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetModuleLockRequest {
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetModuleScheduleRequest {
    pub topic_schedules: Vec<TopicSchedule>,
}
