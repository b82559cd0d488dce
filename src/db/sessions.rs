use sqlx::{FromRow, SqlitePool};

use crate::db::{new_id, now};
use crate::models::Role;

#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub user_id: String,
    pub role: Role,
}

/// Issues a new opaque token for a user.
pub async fn issue_token(db: &SqlitePool, user_id: &str) -> Result<String, sqlx::Error> {
    let token = format!("{}{}", new_id().replace('-', ""), new_id().replace('-', ""));
    sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(now())
        .execute(db)
        .await?;
    Ok(token)
}

pub async fn find_session(
    db: &SqlitePool,
    token: &str,
) -> Result<Option<SessionRecord>, sqlx::Error> {
    sqlx::query_as::<_, SessionRecord>(
        r#"
        SELECT u.id AS user_id, u.role
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await
}

pub async fn revoke_token(db: &SqlitePool, token: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
