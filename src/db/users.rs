use sqlx::SqlitePool;

use crate::db::{new_id, now, require_title, unique_violation};
use crate::error::AppError;
use crate::models::{NewUserRequest, Role, User};

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

pub async fn fetch_users(db: &SqlitePool, role: Option<Role>) -> Result<Vec<User>, sqlx::Error> {
    match role {
        Some(role) => {
            sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users WHERE role = ? ORDER BY name",
                USER_COLUMNS
            ))
            .bind(role)
            .fetch_all(db)
            .await
        }
        None => {
            sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY name", USER_COLUMNS))
                .fetch_all(db)
                .await
        }
    }
}

pub async fn find_user(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_user(db: &SqlitePool, req: NewUserRequest) -> Result<User, AppError> {
    require_title(&req.name, "user name")?;
    let email = req.email.trim().to_ascii_lowercase();
    if !email.contains('@') {
        return Err(AppError::BadRequest(format!("{} is not an email address", req.email)));
    }
    let user = User {
        id: new_id(),
        name: req.name.trim().to_string(),
        email,
        role: req.role,
        created_at: now(),
        updated_at: now(),
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, role, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(db)
    .await
    .map_err(|e| unique_violation(e, "a user with this email already exists"))?;

    Ok(user)
}

pub async fn delete_user(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
