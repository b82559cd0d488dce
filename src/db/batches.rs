use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::db::{courses, new_id, now, require_title, unique_violation, users};
use crate::error::AppError;
use crate::models::{Batch, BatchRow, Course, NewBatchRequest, Role};

const BATCH_COLUMNS: &str =
    "id, name, course_id, trainer_id, start_date, end_date, created_at, updated_at";

async fn fetch_trainee_ids(db: &SqlitePool, batch_id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT trainee_id FROM batch_trainees WHERE batch_id = ? ORDER BY trainee_id",
    )
    .bind(batch_id)
    .fetch_all(db)
    .await
}

async fn check_members(
    db: &SqlitePool,
    trainer_id: Option<&str>,
    trainee_ids: &[String],
) -> Result<(), AppError> {
    if let Some(trainer_id) = trainer_id {
        match users::find_user(db, trainer_id).await? {
            Some(user) if user.role == Role::Trainer => {}
            _ => {
                return Err(AppError::BadRequest(format!(
                    "{} is not a trainer",
                    trainer_id
                )));
            }
        }
    }
    let mut seen = HashSet::new();
    for trainee_id in trainee_ids {
        if !seen.insert(trainee_id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "trainee {} is listed twice",
                trainee_id
            )));
        }
        match users::find_user(db, trainee_id).await? {
            Some(user) if user.role == Role::Trainee => {}
            _ => {
                return Err(AppError::BadRequest(format!(
                    "{} is not a trainee",
                    trainee_id
                )));
            }
        }
    }
    Ok(())
}

pub async fn fetch_batches(db: &SqlitePool) -> Result<Vec<Batch>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BatchRow>(&format!(
        "SELECT {} FROM batches ORDER BY start_date, name",
        BATCH_COLUMNS
    ))
    .fetch_all(db)
    .await?;

    let mut batches = Vec::with_capacity(rows.len());
    for row in rows {
        let trainees = fetch_trainee_ids(db, &row.id).await?;
        batches.push(row.with_trainees(trainees));
    }
    Ok(batches)
}

pub async fn find_batch(db: &SqlitePool, id: &str) -> Result<Option<Batch>, sqlx::Error> {
    let row = sqlx::query_as::<_, BatchRow>(&format!(
        "SELECT {} FROM batches WHERE id = ?",
        BATCH_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    match row {
        Some(row) => {
            let trainees = fetch_trainee_ids(db, &row.id).await?;
            Ok(Some(row.with_trainees(trainees)))
        }
        None => Ok(None),
    }
}

pub async fn insert_batch(db: &SqlitePool, req: NewBatchRequest) -> Result<Batch, AppError> {
    require_title(&req.name, "batch name")?;
    if req.start_date > req.end_date {
        return Err(AppError::BadRequest(
            "batch start date must not be after its end date".to_string(),
        ));
    }
    if courses::find_course(db, &req.course_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "course {} does not exist",
            req.course_id
        )));
    }
    check_members(db, req.trainer_id.as_deref(), &req.trainee_ids).await?;

    let id = new_id();
    let now = now();
    let mut tx = db.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO batches
            (id, name, course_id, trainer_id, start_date, end_date, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(&id)
    .bind(req.name.trim())
    .bind(&req.course_id)
    .bind(&req.trainer_id)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(&now)
    .execute(&mut *tx)
    .await
    .map_err(|e| unique_violation(e, "a batch with this name already exists"))?;

    for trainee_id in &req.trainee_ids {
        sqlx::query("INSERT INTO batch_trainees (batch_id, trainee_id) VALUES (?, ?)")
            .bind(&id)
            .bind(trainee_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    find_batch(db, &id).await?.ok_or(AppError::NotFound("batch"))
}

pub async fn set_trainees(
    db: &SqlitePool,
    batch_id: &str,
    trainee_ids: &[String],
) -> Result<(), AppError> {
    check_members(db, None, trainee_ids).await?;

    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM batch_trainees WHERE batch_id = ?")
        .bind(batch_id)
        .execute(&mut *tx)
        .await?;
    for trainee_id in trainee_ids {
        sqlx::query("INSERT INTO batch_trainees (batch_id, trainee_id) VALUES (?, ?)")
            .bind(batch_id)
            .bind(trainee_id)
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("UPDATE batches SET updated_at = ? WHERE id = ?")
        .bind(now())
        .bind(batch_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn delete_batch(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM batches WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// The batch through which a trainee takes a course. When enrolled in more
/// than one, the earliest-starting batch wins.
pub async fn find_trainee_batch(
    db: &SqlitePool,
    course_id: &str,
    trainee_id: &str,
) -> Result<Option<BatchRow>, sqlx::Error> {
    sqlx::query_as::<_, BatchRow>(
        r#"
        SELECT b.id, b.name, b.course_id, b.trainer_id, b.start_date, b.end_date,
               b.created_at, b.updated_at
        FROM batches b
        JOIN batch_trainees bt ON bt.batch_id = b.id
        WHERE b.course_id = ? AND bt.trainee_id = ?
        ORDER BY b.start_date, b.name
        LIMIT 1
        "#,
    )
    .bind(course_id)
    .bind(trainee_id)
    .fetch_optional(db)
    .await
}

/// Courses a trainee is enrolled in through any batch.
pub async fn fetch_trainee_courses(
    db: &SqlitePool,
    trainee_id: &str,
) -> Result<Vec<Course>, AppError> {
    let course_ids: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT b.course_id
        FROM batches b
        JOIN batch_trainees bt ON bt.batch_id = b.id
        WHERE bt.trainee_id = ?
        "#,
    )
    .bind(trainee_id)
    .fetch_all(db)
    .await?;

    let mut courses = Vec::with_capacity(course_ids.len());
    for course_id in course_ids {
        if let Some(course) = courses::find_course(db, &course_id).await? {
            courses.push(course);
        }
    }
    courses.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.title.cmp(&b.title)));
    Ok(courses)
}
