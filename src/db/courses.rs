use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::curriculum::{CourseGraph, ModuleNode};
use crate::db::{modules, new_id, now, require_title, topics, unique_violation};
use crate::error::AppError;
use crate::models::{
    Course, CourseRow, Module, ModuleSchedule, NewCourseRequest, SetCourseModulesRequest,
    TopicSchedule, UpdateCourseRequest,
};
use crate::models::course::DEFAULT_EXCLUDED_DAYS;

const COURSE_COLUMNS: &str =
    "id, title, description, start_date, end_date, excluded_days, created_at, updated_at";

const DUPLICATE_TITLE: &str = "a course with this title already exists";

#[derive(Debug, FromRow)]
struct CourseModuleRow {
    #[sqlx(flatten)]
    module: Module,
    course_locked: bool,
}

#[derive(Debug, FromRow)]
struct ScheduleRow {
    module_id: String,
    topic_id: String,
    date: Option<DateTime<Utc>>,
}

fn check_course_fields(
    title: &str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    excluded_days: &[u8],
) -> Result<(), AppError> {
    require_title(title, "course title")?;
    if start_date > end_date {
        return Err(AppError::BadRequest(
            "course start date must not be after its end date".to_string(),
        ));
    }
    if let Some(day) = excluded_days.iter().find(|d| **d > 6) {
        return Err(AppError::BadRequest(format!(
            "excluded day {} is not a weekday index (0-6)",
            day
        )));
    }
    Ok(())
}

async fn fetch_holidays(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<DateTime<Utc>>, sqlx::Error> {
    sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT holiday FROM course_holidays WHERE course_id = ? ORDER BY holiday",
    )
    .bind(course_id)
    .fetch_all(db)
    .await
}

async fn hydrate(db: &SqlitePool, row: CourseRow) -> Result<Course, AppError> {
    let holidays = fetch_holidays(db, &row.id).await?;
    Ok(row.into_course(holidays)?)
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses ORDER BY start_date, title",
        COURSE_COLUMNS
    ))
    .fetch_all(db)
    .await?;

    let mut courses = Vec::with_capacity(rows.len());
    for row in rows {
        courses.push(hydrate(db, row).await?);
    }
    Ok(courses)
}

pub async fn find_course(db: &SqlitePool, id: &str) -> Result<Option<Course>, AppError> {
    let row = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses WHERE id = ?",
        COURSE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    match row {
        Some(row) => Ok(Some(hydrate(db, row).await?)),
        None => Ok(None),
    }
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, AppError> {
    let excluded_days = req
        .excluded_days
        .unwrap_or_else(|| DEFAULT_EXCLUDED_DAYS.to_vec());
    check_course_fields(&req.title, req.start_date, req.end_date, &excluded_days)?;

    let id = new_id();
    let now = now();
    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO courses
            (id, title, description, start_date, end_date, excluded_days, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(&id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(serde_json::to_string(&excluded_days)?)
    .bind(&now)
    .execute(&mut *tx)
    .await
    .map_err(|e| unique_violation(e, DUPLICATE_TITLE))?;

    for holiday in &req.custom_holidays {
        sqlx::query("INSERT OR IGNORE INTO course_holidays (course_id, holiday) VALUES (?, ?)")
            .bind(&id)
            .bind(holiday)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    find_course(db, &id).await?.ok_or(AppError::NotFound("course"))
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, AppError> {
    let mut current = match find_course(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(start_date) = req.start_date {
        current.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        current.end_date = end_date;
    }
    if let Some(excluded_days) = req.excluded_days {
        current.excluded_days = excluded_days;
    }
    check_course_fields(
        &current.title,
        current.start_date,
        current.end_date,
        &current.excluded_days,
    )?;

    let mut tx = db.begin().await?;
    sqlx::query(
        r#"
        UPDATE courses
        SET title = ?1,
            description = ?2,
            start_date = ?3,
            end_date = ?4,
            excluded_days = ?5,
            updated_at = ?6
        WHERE id = ?7
        "#,
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.start_date)
    .bind(current.end_date)
    .bind(serde_json::to_string(&current.excluded_days)?)
    .bind(now())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| unique_violation(e, DUPLICATE_TITLE))?;

    if let Some(holidays) = req.custom_holidays {
        sqlx::query("DELETE FROM course_holidays WHERE course_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for holiday in &holidays {
            sqlx::query("INSERT OR IGNORE INTO course_holidays (course_id, holiday) VALUES (?, ?)")
                .bind(id)
                .bind(holiday)
                .execute(&mut *tx)
                .await?;
        }
    }
    tx.commit().await?;

    find_course(db, id).await
}

pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Modules of a course in course order, each with its per-course lock flag.
pub async fn fetch_course_modules(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<(Module, bool)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CourseModuleRow>(
        r#"
        SELECT m.id, m.title, m.description, m.is_locked, m.created_at, m.updated_at,
               cm.locked AS course_locked
        FROM course_modules cm
        JOIN modules m ON m.id = cm.module_id
        WHERE cm.course_id = ?
        ORDER BY cm.position
        "#,
    )
    .bind(course_id)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(|r| (r.module, r.course_locked)).collect())
}

/// Replaces the ordered module list and the locked subset of a course.
/// Schedules of modules dropped from the course go with them.
pub async fn set_course_modules(
    db: &SqlitePool,
    course_id: &str,
    req: &SetCourseModulesRequest,
) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    if let Some(dup) = req.module_ids.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(AppError::BadRequest(format!("module {} is listed twice", dup)));
    }
    if let Some(stray) = req.locked_module_ids.iter().find(|id| !seen.contains(id.as_str())) {
        return Err(AppError::BadRequest(format!(
            "locked module {} is not part of the course",
            stray
        )));
    }
    for module_id in &req.module_ids {
        if modules::find_module(db, module_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("module {} does not exist", module_id)));
        }
    }
    let locked: HashSet<&str> = req.locked_module_ids.iter().map(String::as_str).collect();

    let mut tx = db.begin().await?;
    let existing: Vec<String> =
        sqlx::query_scalar("SELECT module_id FROM course_modules WHERE course_id = ?")
            .bind(course_id)
            .fetch_all(&mut *tx)
            .await?;
    for module_id in existing.iter().filter(|id| !seen.contains(id.as_str())) {
        sqlx::query("DELETE FROM course_modules WHERE course_id = ? AND module_id = ?")
            .bind(course_id)
            .bind(module_id)
            .execute(&mut *tx)
            .await?;
    }
    for (position, module_id) in req.module_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO course_modules (course_id, module_id, position, locked)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(course_id, module_id)
            DO UPDATE SET position = excluded.position, locked = excluded.locked
            "#,
        )
        .bind(course_id)
        .bind(module_id)
        .bind(position as i64)
        .bind(locked.contains(module_id.as_str()))
        .execute(&mut *tx)
        .await?;
    }
    sqlx::query("UPDATE courses SET updated_at = ? WHERE id = ?")
        .bind(now())
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Locks or unlocks one module of a course. Returns false when the module is
/// not part of the course.
pub async fn set_module_lock(
    db: &SqlitePool,
    course_id: &str,
    module_id: &str,
    locked: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE course_modules SET locked = ? WHERE course_id = ? AND module_id = ?",
    )
    .bind(locked)
    .bind(course_id)
    .bind(module_id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

/// The stored per-module schedule of a course, modules in course order and
/// entries in the order they were written.
pub async fn fetch_schedule(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Vec<ModuleSchedule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ScheduleRow>(
        r#"
        SELECT ts.module_id, ts.topic_id, ts.date
        FROM topic_schedules ts
        JOIN course_modules cm
          ON cm.course_id = ts.course_id AND cm.module_id = ts.module_id
        WHERE ts.course_id = ?
        ORDER BY cm.position, ts.position
        "#,
    )
    .bind(course_id)
    .fetch_all(db)
    .await?;

    let mut schedule: Vec<ModuleSchedule> = Vec::new();
    for row in rows {
        let entry = TopicSchedule {
            topic_id: row.topic_id,
            date: row.date,
        };
        match schedule.last_mut() {
            Some(current) if current.module_id == row.module_id => {
                current.topic_schedules.push(entry)
            }
            _ => schedule.push(ModuleSchedule {
                module_id: row.module_id,
                topic_schedules: vec![entry],
            }),
        }
    }
    Ok(schedule)
}

/// Replaces one module's schedule inside a course in a single transaction.
pub async fn replace_module_schedule(
    db: &SqlitePool,
    course_id: &str,
    module_id: &str,
    entries: &[TopicSchedule],
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM topic_schedules WHERE course_id = ? AND module_id = ?")
        .bind(course_id)
        .bind(module_id)
        .execute(&mut *tx)
        .await?;
    for (position, entry) in entries.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO topic_schedules (course_id, module_id, position, topic_id, date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(course_id)
        .bind(module_id)
        .bind(position as i64)
        .bind(&entry.topic_id)
        .bind(entry.date)
        .execute(&mut *tx)
        .await?;
    }
    sqlx::query("UPDATE courses SET updated_at = ? WHERE id = ?")
        .bind(now())
        .bind(course_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

/// Loads a course with its modules, topics, problems and schedule.
pub async fn load_course_graph(
    db: &SqlitePool,
    course_id: &str,
) -> Result<Option<CourseGraph>, AppError> {
    let Some(course) = find_course(db, course_id).await? else {
        return Ok(None);
    };

    let mut nodes = Vec::new();
    let mut locked_module_ids = HashSet::new();
    for (module, locked) in fetch_course_modules(db, course_id).await? {
        if locked {
            locked_module_ids.insert(module.id.clone());
        }
        let topics = topics::fetch_topic_nodes(db, &module.id).await?;
        nodes.push(ModuleNode { module, topics });
    }
    let schedule = fetch_schedule(db, course_id).await?;

    Ok(Some(CourseGraph {
        course,
        modules: nodes,
        schedule,
        locked_module_ids,
    }))
}
