#![allow(dead_code)]

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use training_portal::db::{self, batches, courses, modules, problems, topics, users};
use training_portal::error::AppError;
use training_portal::external::{LocalBlobStore, MailMessage, Mailer};
use training_portal::models::*;
use training_portal::state::AppState;

/// A single-connection in-memory database so every query sees the same data.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Failed to parse database url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

/// A file-backed database with several connections, for tests that need
/// writes to interleave. The file lives in the temp directory.
pub async fn file_pool(max_connections: u32) -> SqlitePool {
    let path = std::env::temp_dir().join(format!("portal-test-{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());
    let pool = db::connect(&url, max_connections)
        .await
        .expect("Failed to open database file");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, d, 9, 0, 0).unwrap()
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: &MailMessage) -> Result<(), AppError> {
        Err(AppError::Upstream("relay down".to_string()))
    }
}

pub fn app_state(pool: SqlitePool, mailer: Arc<dyn Mailer>) -> AppState {
    let uploads_dir = std::env::temp_dir().join(format!("portal-test-{}", uuid::Uuid::new_v4()));
    AppState {
        db: pool,
        blobs: Arc::new(LocalBlobStore::new(&uploads_dir, "http://localhost/files")),
        mailer,
        uploads_dir,
    }
}

pub async fn seed_course(pool: &SqlitePool, title: &str) -> Course {
    courses::insert_course(
        pool,
        NewCourseRequest {
            title: title.to_string(),
            description: String::new(),
            start_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap(),
            excluded_days: None,
            custom_holidays: Vec::new(),
        },
    )
    .await
    .expect("Failed to insert course")
}

pub async fn seed_problem(pool: &SqlitePool, title: &str) -> Problem {
    problems::insert_problem(
        pool,
        NewProblemRequest {
            title: title.to_string(),
            link: format!("https://judge.example/{}", title),
            platform: "judge".to_string(),
            difficulty: "easy".to_string(),
            category: "basics".to_string(),
            tags: vec!["warmup".to_string()],
        },
    )
    .await
    .expect("Failed to insert problem")
}

pub async fn seed_topic(pool: &SqlitePool, name: &str, assignments: &[&Problem]) -> Topic {
    topics::insert_topic(
        pool,
        NewTopicRequest {
            topic_name: name.to_string(),
            description: String::new(),
            assignment_problem_ids: assignments.iter().map(|p| p.id.clone()).collect(),
            practice_problem_ids: Vec::new(),
        },
    )
    .await
    .expect("Failed to insert topic")
}

pub async fn seed_module(pool: &SqlitePool, title: &str, topics: &[&Topic]) -> Module {
    modules::insert_module(
        pool,
        NewModuleRequest {
            title: title.to_string(),
            description: String::new(),
            topic_ids: topics.iter().map(|t| t.id.clone()).collect(),
        },
    )
    .await
    .expect("Failed to insert module")
}

pub async fn seed_user(pool: &SqlitePool, name: &str, role: Role) -> User {
    users::insert_user(
        pool,
        NewUserRequest {
            name: name.to_string(),
            email: format!("{}@portal.test", name.to_lowercase()),
            role,
        },
    )
    .await
    .expect("Failed to insert user")
}

pub async fn seed_batch(
    pool: &SqlitePool,
    name: &str,
    course: &Course,
    trainees: &[&User],
) -> Batch {
    batches::insert_batch(
        pool,
        NewBatchRequest {
            name: name.to_string(),
            course_id: course.id.clone(),
            trainer_id: None,
            trainee_ids: trainees.iter().map(|u| u.id.clone()).collect(),
            start_date: course.start_date,
            end_date: course.end_date,
        },
    )
    .await
    .expect("Failed to insert batch")
}

/// A three-module curriculum:
/// M1 has topics A and B, scheduled as A (3rd), B (1st), A (5th).
/// M2 has topic C, scheduled on the 7th, and is locked in the course.
/// M3 has topic D, never scheduled.
pub struct Curriculum {
    pub course: Course,
    pub m1: Module,
    pub m2: Module,
    pub m3: Module,
    pub a: Topic,
    pub b: Topic,
    pub c: Topic,
    pub d: Topic,
    pub p1: Problem,
    pub p2: Problem,
    pub p3: Problem,
}

pub async fn seed_curriculum(pool: &SqlitePool) -> Curriculum {
    let course = seed_course(pool, "Backend Foundations").await;
    let p1 = seed_problem(pool, "two-sum").await;
    let p2 = seed_problem(pool, "valid-parentheses").await;
    let p3 = seed_problem(pool, "merge-intervals").await;

    let a = seed_topic(pool, "Arrays", &[&p1]).await;
    let b = seed_topic(pool, "Stacks", &[&p2]).await;
    let c = seed_topic(pool, "Sorting", &[&p3]).await;
    let d = seed_topic(pool, "Review", &[]).await;

    let m1 = seed_module(pool, "Data Structures", &[&a, &b]).await;
    let m2 = seed_module(pool, "Algorithms", &[&c]).await;
    let m3 = seed_module(pool, "Wrap-up", &[&d]).await;

    courses::set_course_modules(
        pool,
        &course.id,
        &SetCourseModulesRequest {
            module_ids: vec![m1.id.clone(), m2.id.clone(), m3.id.clone()],
            locked_module_ids: vec![m2.id.clone()],
        },
    )
    .await
    .expect("Failed to set course modules");

    courses::replace_module_schedule(
        pool,
        &course.id,
        &m1.id,
        &[
            TopicSchedule { topic_id: a.id.clone(), date: Some(day(3)) },
            TopicSchedule { topic_id: b.id.clone(), date: Some(day(1)) },
            TopicSchedule { topic_id: a.id.clone(), date: Some(day(5)) },
        ],
    )
    .await
    .expect("Failed to schedule M1");
    courses::replace_module_schedule(
        pool,
        &course.id,
        &m2.id,
        &[TopicSchedule { topic_id: c.id.clone(), date: Some(day(7)) }],
    )
    .await
    .expect("Failed to schedule M2");

    Curriculum { course, m1, m2, m3, a, b, c, d, p1, p2, p3 }
}
