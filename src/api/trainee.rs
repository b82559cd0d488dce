use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::curriculum::CourseView;
use crate::db::{batches, courses, notes, topics};
use crate::error::AppError;
use crate::models::{Course, Role, SetProblemStatusRequest, TopicNote, UpsertNoteRequest};
use crate::services::CurriculumService;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CompletedResponse {
    completed_problem_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NoteQueryParams {
    course_id: String,
}

pub(super) async fn my_courses(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Course>>, AppError> {
    session.require(&[Role::Trainee])?;
    let courses = batches::fetch_trainee_courses(&state.db, &session.user_id).await?;
    Ok(Json(courses))
}

pub(super) async fn course_view(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<CourseView>, AppError> {
    session.require(&[Role::Trainee])?;
    let service = CurriculumService::new(state.db.clone());
    let view = service.course_view(&session.user_id, &id).await?;
    Ok(Json(view))
}

pub(super) async fn set_problem_status(
    State(state): State<AppState>,
    session: Session,
    Path((id, problem_id)): Path<(String, String)>,
    Json(req): Json<SetProblemStatusRequest>,
) -> Result<Json<CompletedResponse>, AppError> {
    session.require(&[Role::Trainee])?;
    let service = CurriculumService::new(state.db.clone());
    let completed_problem_ids = service
        .set_problem_status(&session.user_id, &id, &problem_id, req.status)
        .await?;
    Ok(Json(CompletedResponse {
        completed_problem_ids,
    }))
}

pub(super) async fn list_notes(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NoteQueryParams>,
) -> Result<Json<Vec<TopicNote>>, AppError> {
    let notes = notes::fetch_course_notes(&state.db, &session.user_id, &params.course_id).await?;
    Ok(Json(notes))
}

pub(super) async fn get_note(
    State(state): State<AppState>,
    session: Session,
    Path(topic_id): Path<String>,
) -> Result<Json<TopicNote>, AppError> {
    let note = notes::find_note(&state.db, &session.user_id, &topic_id)
        .await?
        .ok_or(AppError::NotFound("note"))?;
    Ok(Json(note))
}

pub(super) async fn put_note(
    State(state): State<AppState>,
    session: Session,
    Path(topic_id): Path<String>,
    Json(req): Json<UpsertNoteRequest>,
) -> Result<Json<TopicNote>, AppError> {
    if topics::find_topic(&state.db, &topic_id).await?.is_none() {
        return Err(AppError::NotFound("topic"));
    }
    if courses::find_course(&state.db, &req.course_id).await?.is_none() {
        return Err(AppError::NotFound("course"));
    }
    let note = notes::upsert_note(
        &state.db,
        &session.user_id,
        &topic_id,
        &req.course_id,
        &req.note,
    )
    .await?;
    Ok(Json(note))
}
