use sqlx::SqlitePool;

use crate::db::{new_id, now, require_title};
use crate::error::AppError;
use crate::models::{NewProblemRequest, Problem, ProblemRow, UpdateProblemRequest};

const PROBLEM_COLUMNS: &str = "id, title, link, platform, difficulty, category, tags";

pub async fn fetch_problems(db: &SqlitePool) -> Result<Vec<Problem>, AppError> {
    let rows = sqlx::query_as::<_, ProblemRow>(&format!(
        "SELECT {} FROM problems ORDER BY title",
        PROBLEM_COLUMNS
    ))
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|row| Problem::try_from(row).map_err(AppError::from))
        .collect()
}

pub async fn find_problem(db: &SqlitePool, id: &str) -> Result<Option<Problem>, AppError> {
    let row = sqlx::query_as::<_, ProblemRow>(&format!(
        "SELECT {} FROM problems WHERE id = ?",
        PROBLEM_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(Problem::try_from).transpose()?)
}

pub async fn insert_problem(db: &SqlitePool, req: NewProblemRequest) -> Result<Problem, AppError> {
    require_title(&req.title, "problem title")?;
    let problem = Problem {
        id: new_id(),
        title: req.title.trim().to_string(),
        link: req.link,
        platform: req.platform,
        difficulty: req.difficulty,
        category: req.category,
        tags: req.tags,
    };
    let now = now();

    sqlx::query(
        r#"
        INSERT INTO problems
            (id, title, link, platform, difficulty, category, tags, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "#,
    )
    .bind(&problem.id)
    .bind(&problem.title)
    .bind(&problem.link)
    .bind(&problem.platform)
    .bind(&problem.difficulty)
    .bind(&problem.category)
    .bind(serde_json::to_string(&problem.tags)?)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(problem)
}

pub async fn update_problem(
    db: &SqlitePool,
    id: &str,
    req: UpdateProblemRequest,
) -> Result<Option<Problem>, AppError> {
    let mut current = match find_problem(db, id).await? {
        Some(p) => p,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        require_title(&title, "problem title")?;
        current.title = title.trim().to_string();
    }
    if let Some(link) = req.link {
        current.link = link;
    }
    if let Some(platform) = req.platform {
        current.platform = platform;
    }
    if let Some(difficulty) = req.difficulty {
        current.difficulty = difficulty;
    }
    if let Some(category) = req.category {
        current.category = category;
    }
    if let Some(tags) = req.tags {
        current.tags = tags;
    }

    sqlx::query(
        r#"
        UPDATE problems
        SET title = ?1,
            link = ?2,
            platform = ?3,
            difficulty = ?4,
            category = ?5,
            tags = ?6,
            updated_at = ?7
        WHERE id = ?8
        "#,
    )
    .bind(&current.title)
    .bind(&current.link)
    .bind(&current.platform)
    .bind(&current.difficulty)
    .bind(&current.category)
    .bind(serde_json::to_string(&current.tags)?)
    .bind(now())
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_problem(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM problems WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
