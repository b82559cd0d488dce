use std::collections::HashSet;

use sqlx::{FromRow, SqlitePool};

use crate::curriculum::TopicNode;
use crate::db::{new_id, now, problems, require_title};
use crate::error::AppError;
use crate::models::{NewTopicRequest, Problem, ProblemRow, Topic, UpdateTopicRequest};

const TOPIC_COLUMNS: &str = "id, topic_name, description, trainer_notes, created_at, updated_at";

const KIND_ASSIGNMENT: &str = "assignment";
const KIND_PRACTICE: &str = "practice";

#[derive(Debug, FromRow)]
struct TopicProblemRow {
    kind: String,
    #[sqlx(flatten)]
    problem: ProblemRow,
}

pub async fn fetch_topics(db: &SqlitePool) -> Result<Vec<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(&format!(
        "SELECT {} FROM topics ORDER BY topic_name",
        TOPIC_COLUMNS
    ))
    .fetch_all(db)
    .await
}

pub async fn find_topic(db: &SqlitePool, id: &str) -> Result<Option<Topic>, sqlx::Error> {
    sqlx::query_as::<_, Topic>(&format!(
        "SELECT {} FROM topics WHERE id = ?",
        TOPIC_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_topic(db: &SqlitePool, req: NewTopicRequest) -> Result<Topic, AppError> {
    require_title(&req.topic_name, "topic name")?;
    let id = new_id();
    let now = now();

    sqlx::query(
        r#"
        INSERT INTO topics (id, topic_name, description, trainer_notes, created_at, updated_at)
        VALUES (?1, ?2, ?3, NULL, ?4, ?4)
        "#,
    )
    .bind(&id)
    .bind(req.topic_name.trim())
    .bind(&req.description)
    .bind(&now)
    .execute(db)
    .await?;

    set_topic_problems(db, &id, &req.assignment_problem_ids, &req.practice_problem_ids).await?;

    Ok(Topic {
        id,
        topic_name: req.topic_name.trim().to_string(),
        description: req.description,
        trainer_notes: None,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_topic(
    db: &SqlitePool,
    id: &str,
    req: UpdateTopicRequest,
) -> Result<Option<Topic>, AppError> {
    let mut current = match find_topic(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(topic_name) = req.topic_name {
        require_title(&topic_name, "topic name")?;
        current.topic_name = topic_name.trim().to_string();
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    current.updated_at = now();

    sqlx::query(
        r#"
        UPDATE topics
        SET topic_name = ?1,
            description = ?2,
            updated_at = ?3
        WHERE id = ?4
        "#,
    )
    .bind(&current.topic_name)
    .bind(&current.description)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn set_trainer_notes(db: &SqlitePool, id: &str, url: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE topics SET trainer_notes = ?, updated_at = ? WHERE id = ?")
        .bind(url)
        .bind(now())
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Deleting a topic pulls it out of every module's topic list.
pub async fn delete_topic(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM topics WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn set_topic_problems(
    db: &SqlitePool,
    topic_id: &str,
    assignment_ids: &[String],
    practice_ids: &[String],
) -> Result<(), AppError> {
    for (kind, ids) in [(KIND_ASSIGNMENT, assignment_ids), (KIND_PRACTICE, practice_ids)] {
        let mut seen = HashSet::new();
        for problem_id in ids {
            if !seen.insert(problem_id.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "problem {} is listed twice as {}",
                    problem_id, kind
                )));
            }
            if problems::find_problem(db, problem_id).await?.is_none() {
                return Err(AppError::BadRequest(format!(
                    "problem {} does not exist",
                    problem_id
                )));
            }
        }
    }

    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM topic_problems WHERE topic_id = ?")
        .bind(topic_id)
        .execute(&mut *tx)
        .await?;
    for (kind, ids) in [(KIND_ASSIGNMENT, assignment_ids), (KIND_PRACTICE, practice_ids)] {
        for (position, problem_id) in ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO topic_problems (topic_id, problem_id, kind, position)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(topic_id)
            .bind(problem_id)
            .bind(kind)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }
    }
    tx.commit().await?;
    Ok(())
}

/// Assignment and practice problems of a topic, each in list order.
pub async fn fetch_topic_problems(
    db: &SqlitePool,
    topic_id: &str,
) -> Result<(Vec<Problem>, Vec<Problem>), AppError> {
    let rows = sqlx::query_as::<_, TopicProblemRow>(
        r#"
        SELECT tp.kind, p.id, p.title, p.link, p.platform, p.difficulty, p.category, p.tags
        FROM topic_problems tp
        JOIN problems p ON p.id = tp.problem_id
        WHERE tp.topic_id = ?
        ORDER BY tp.kind, tp.position
        "#,
    )
    .bind(topic_id)
    .fetch_all(db)
    .await?;

    let mut assignments = Vec::new();
    let mut practice = Vec::new();
    for row in rows {
        let problem = Problem::try_from(row.problem)?;
        if row.kind == KIND_ASSIGNMENT {
            assignments.push(problem);
        } else {
            practice.push(problem);
        }
    }
    Ok((assignments, practice))
}

/// Topics of a module, in module order, with their problems populated.
pub async fn fetch_topic_nodes(
    db: &SqlitePool,
    module_id: &str,
) -> Result<Vec<TopicNode>, AppError> {
    let topics = sqlx::query_as::<_, Topic>(
        r#"
        SELECT t.id, t.topic_name, t.description, t.trainer_notes, t.created_at, t.updated_at
        FROM module_topics mt
        JOIN topics t ON t.id = mt.topic_id
        WHERE mt.module_id = ?
        ORDER BY mt.position
        "#,
    )
    .bind(module_id)
    .fetch_all(db)
    .await?;

    let mut nodes = Vec::with_capacity(topics.len());
    for topic in topics {
        let (assignment_problems, practice_problems) = fetch_topic_problems(db, &topic.id).await?;
        nodes.push(TopicNode {
            topic,
            assignment_problems,
            practice_problems,
        });
    }
    Ok(nodes)
}
