//! Completed-problem ledger. Every write is a single statement so concurrent
//! toggles of different problems by the same trainee cannot overwrite each
//! other.

use sqlx::SqlitePool;

use crate::db::now;

/// Creates the progress record for a trainee in a batch if it is missing.
pub async fn ensure_progress(
    db: &SqlitePool,
    batch_id: &str,
    trainee_id: &str,
) -> Result<(), sqlx::Error> {
    let now = now();
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO progress (batch_id, trainee_id, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?3)
        "#,
    )
    .bind(batch_id)
    .bind(trainee_id)
    .bind(&now)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn mark_solved(
    db: &SqlitePool,
    batch_id: &str,
    trainee_id: &str,
    problem_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO progress_completions (batch_id, trainee_id, problem_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(batch_id)
    .bind(trainee_id)
    .bind(problem_id)
    .execute(db)
    .await?;
    touch(db, batch_id, trainee_id).await
}

pub async fn mark_unsolved(
    db: &SqlitePool,
    batch_id: &str,
    trainee_id: &str,
    problem_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "DELETE FROM progress_completions WHERE batch_id = ? AND trainee_id = ? AND problem_id = ?",
    )
    .bind(batch_id)
    .bind(trainee_id)
    .bind(problem_id)
    .execute(db)
    .await?;
    touch(db, batch_id, trainee_id).await
}

async fn touch(db: &SqlitePool, batch_id: &str, trainee_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE progress SET updated_at = ? WHERE batch_id = ? AND trainee_id = ?")
        .bind(now())
        .bind(batch_id)
        .bind(trainee_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Completed problem ids, sorted. Empty when no progress record exists yet.
pub async fn fetch_completed(
    db: &SqlitePool,
    batch_id: &str,
    trainee_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT problem_id FROM progress_completions
        WHERE batch_id = ? AND trainee_id = ?
        ORDER BY problem_id
        "#,
    )
    .bind(batch_id)
    .bind(trainee_id)
    .fetch_all(db)
    .await
}
