mod admin;
mod batches;
mod trainee;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::auth::Session;
use crate::db::sessions;
use crate::error::AppError;
use crate::state::AppState;

const UPLOAD_LIMIT_BYTES: usize = 20 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session", delete(logout))
        .route("/files/{name}", get(serve_file))
        .route("/courses", get(admin::list_courses).post(admin::create_course))
        .route(
            "/courses/{id}",
            get(admin::get_course)
                .patch(admin::update_course)
                .delete(admin::delete_course),
        )
        .route("/courses/{id}/modules", put(admin::set_course_modules))
        .route("/courses/{id}/modules/{module_id}/lock", put(admin::set_module_lock))
        .route(
            "/courses/{id}/modules/{module_id}/schedule",
            put(admin::set_module_schedule),
        )
        .route("/courses/{id}/schedule", get(admin::get_schedule))
        .route("/modules", get(admin::list_modules).post(admin::create_module))
        .route(
            "/modules/{id}",
            get(admin::get_module)
                .patch(admin::update_module)
                .delete(admin::delete_module),
        )
        .route("/modules/{id}/topics", put(admin::set_module_topics))
        .route("/topics", get(admin::list_topics).post(admin::create_topic))
        .route(
            "/topics/{id}",
            get(admin::get_topic)
                .patch(admin::update_topic)
                .delete(admin::delete_topic),
        )
        .route("/topics/{id}/problems", put(admin::set_topic_problems))
        .route(
            "/topics/{id}/trainer-notes",
            post(admin::upload_trainer_notes).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route("/problems", get(admin::list_problems).post(admin::create_problem))
        .route(
            "/problems/{id}",
            get(admin::get_problem)
                .patch(admin::update_problem)
                .delete(admin::delete_problem),
        )
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/credentials", post(admin::reissue_credentials))
        .route("/batches", get(batches::list_batches).post(batches::create_batch))
        .route(
            "/batches/{id}",
            get(batches::get_batch).delete(batches::delete_batch),
        )
        .route("/batches/{id}/trainees", put(batches::set_trainees))
        .route("/batches/{id}/days", get(batches::batch_days))
        .route("/batches/{id}/progress", get(batches::batch_report))
        .route("/me/courses", get(trainee::my_courses))
        .route("/me/courses/{id}", get(trainee::course_view))
        .route(
            "/me/courses/{id}/problems/{problem_id}",
            patch(trainee::set_problem_status),
        )
        .route("/me/notes", get(trainee::list_notes))
        .route(
            "/me/notes/{topic_id}",
            get(trainee::get_note).put(trainee::put_note),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn logout(State(state): State<AppState>, session: Session) -> Result<StatusCode, AppError> {
    sessions::revoke_token(&state.db, &session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Serves files written by the local blob store.
async fn serve_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if name.contains('/') || name.contains('\\') || name.starts_with('.') {
        return Err(AppError::NotFound("file"));
    }
    let bytes = tokio::fs::read(state.uploads_dir.join(&name))
        .await
        .map_err(|_| AppError::NotFound("file"))?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Bytes::from(bytes),
    ))
}
