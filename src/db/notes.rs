use sqlx::SqlitePool;

use crate::db::now;
use crate::models::TopicNote;

/// One note per user and topic; writing again replaces the text.
pub async fn upsert_note(
    db: &SqlitePool,
    user_id: &str,
    topic_id: &str,
    course_id: &str,
    note: &str,
) -> Result<TopicNote, sqlx::Error> {
    sqlx::query_as::<_, TopicNote>(
        r#"
        INSERT INTO topic_notes (user_id, topic_id, course_id, note, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(user_id, topic_id)
        DO UPDATE SET course_id = excluded.course_id,
                      note = excluded.note,
                      updated_at = excluded.updated_at
        RETURNING user_id, topic_id, course_id, note, updated_at
        "#,
    )
    .bind(user_id)
    .bind(topic_id)
    .bind(course_id)
    .bind(note)
    .bind(now())
    .fetch_one(db)
    .await
}

pub async fn find_note(
    db: &SqlitePool,
    user_id: &str,
    topic_id: &str,
) -> Result<Option<TopicNote>, sqlx::Error> {
    sqlx::query_as::<_, TopicNote>(
        r#"
        SELECT user_id, topic_id, course_id, note, updated_at
        FROM topic_notes
        WHERE user_id = ? AND topic_id = ?
        "#,
    )
    .bind(user_id)
    .bind(topic_id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_course_notes(
    db: &SqlitePool,
    user_id: &str,
    course_id: &str,
) -> Result<Vec<TopicNote>, sqlx::Error> {
    sqlx::query_as::<_, TopicNote>(
        r#"
        SELECT user_id, topic_id, course_id, note, updated_at
        FROM topic_notes
        WHERE user_id = ? AND course_id = ?
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(db)
    .await
}
