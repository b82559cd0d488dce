use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::db::{new_id, now, require_title, topics};
use crate::error::AppError;
use crate::models::{Module, NewModuleRequest, UpdateModuleRequest};

const MODULE_COLUMNS: &str = "id, title, description, is_locked, created_at, updated_at";

pub async fn fetch_modules(db: &SqlitePool) -> Result<Vec<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        "SELECT {} FROM modules ORDER BY title",
        MODULE_COLUMNS
    ))
    .fetch_all(db)
    .await
}

pub async fn find_module(db: &SqlitePool, id: &str) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as::<_, Module>(&format!(
        "SELECT {} FROM modules WHERE id = ?",
        MODULE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_module(db: &SqlitePool, req: NewModuleRequest) -> Result<Module, AppError> {
    require_title(&req.title, "module title")?;
    let id = new_id();
    let now = now();

    sqlx::query(
        r#"
        INSERT INTO modules (id, title, description, is_locked, created_at, updated_at)
        VALUES (?1, ?2, ?3, 0, ?4, ?4)
        "#,
    )
    .bind(&id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(&now)
    .execute(db)
    .await?;

    if !req.topic_ids.is_empty() {
        set_module_topics(db, &id, &req.topic_ids).await?;
    }

    Ok(Module {
        id,
        title: req.title.trim().to_string(),
        description: req.description,
        is_locked: false,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_module(
    db: &SqlitePool,
    id: &str,
    req: UpdateModuleRequest,
) -> Result<Option<Module>, AppError> {
    let mut current = match find_module(db, id).await? {
        Some(m) => m,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        require_title(&title, "module title")?;
        current.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(is_locked) = req.is_locked {
        current.is_locked = is_locked;
    }
    current.updated_at = now();

    sqlx::query(
        r#"
        UPDATE modules
        SET title = ?1,
            description = ?2,
            is_locked = ?3,
            updated_at = ?4
        WHERE id = ?5
        "#,
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.is_locked)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

/// Deleting a module also removes it from every course's module list,
/// locked set and schedule.
pub async fn delete_module(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM modules WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Topic ids of a module in module order.
pub async fn fetch_module_topic_ids(
    db: &SqlitePool,
    module_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT topic_id FROM module_topics WHERE module_id = ? ORDER BY position",
    )
    .bind(module_id)
    .fetch_all(db)
    .await
}

/// Replaces the ordered topic list of a module. Schedule entries that point
/// at removed topics stay stored and are skipped when courses are resolved.
pub async fn set_module_topics(
    db: &SqlitePool,
    module_id: &str,
    topic_ids: &[String],
) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for topic_id in topic_ids {
        if !seen.insert(topic_id.as_str()) {
            return Err(AppError::BadRequest(format!("topic {} is listed twice", topic_id)));
        }
        if topics::find_topic(db, topic_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("topic {} does not exist", topic_id)));
        }
    }

    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM module_topics WHERE module_id = ?")
        .bind(module_id)
        .execute(&mut *tx)
        .await?;
    for (position, topic_id) in topic_ids.iter().enumerate() {
        sqlx::query("INSERT INTO module_topics (module_id, topic_id, position) VALUES (?, ?, ?)")
            .bind(module_id)
            .bind(topic_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("UPDATE modules SET updated_at = ? WHERE id = ?")
        .bind(now())
        .bind(module_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
