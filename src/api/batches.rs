use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::auth::Session;
use crate::curriculum::BatchDay;
use crate::db::batches;
use crate::error::AppError;
use crate::models::{Batch, NewBatchRequest, Role, SetTraineesRequest};
use crate::services::{BatchReport, CurriculumService};
use crate::state::AppState;

pub(super) async fn list_batches(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Batch>>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let mut batches = batches::fetch_batches(&state.db).await?;
    if session.role == Role::Trainer {
        batches.retain(|b| b.trainer_id.as_deref() == Some(session.user_id.as_str()));
    }
    Ok(Json(batches))
}

pub(super) async fn create_batch(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<NewBatchRequest>,
) -> Result<Json<Batch>, AppError> {
    session.require_admin()?;
    let batch = batches::insert_batch(&state.db, req).await?;
    Ok(Json(batch))
}

pub(super) async fn get_batch(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Batch>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let batch = batches::find_batch(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound("batch"))?;
    Ok(Json(batch))
}

pub(super) async fn delete_batch(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    if batches::delete_batch(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("batch"))
    }
}

pub(super) async fn set_trainees(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<SetTraineesRequest>,
) -> Result<Json<Batch>, AppError> {
    session.require_admin()?;
    if batches::find_batch(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound("batch"));
    }
    batches::set_trainees(&state.db, &id, &req.trainee_ids).await?;
    let batch = batches::find_batch(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound("batch"))?;
    Ok(Json(batch))
}

pub(super) async fn batch_days(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Vec<BatchDay>>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let service = CurriculumService::new(state.db.clone());
    Ok(Json(service.batch_days(&id).await?))
}

pub(super) async fn batch_report(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<BatchReport>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let service = CurriculumService::new(state.db.clone());
    Ok(Json(service.batch_report(&id).await?))
}
