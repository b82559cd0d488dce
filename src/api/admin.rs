use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use serde::Deserialize;

use crate::auth::Session;
use crate::db::{courses, modules, problems, topics, users};
use crate::error::AppError;
use crate::models::*;
use crate::services::{AccountService, CreatedUser, CurriculumService, MaterialsService};
use crate::state::AppState;

#[derive(Deserialize)]
pub(super) struct UserQueryParams {
    role: Option<Role>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UploadParams {
    file_name: String,
}

fn no_content(found: bool, what: &'static str) -> Result<StatusCode, AppError> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(what))
    }
}

pub(super) async fn list_courses(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Course>>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let courses = courses::fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

pub(super) async fn create_course(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    session.require_admin()?;
    let course = courses::insert_course(&state.db, req).await?;
    Ok(Json(course))
}

pub(super) async fn get_course(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let course = courses::find_course(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound("course"))?;
    Ok(Json(course))
}

pub(super) async fn update_course(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    session.require_admin()?;
    let course = courses::update_course(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound("course"))?;
    Ok(Json(course))
}

pub(super) async fn delete_course(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    no_content(courses::delete_course(&state.db, &id).await?, "course")
}

pub(super) async fn set_course_modules(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<SetCourseModulesRequest>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    if courses::find_course(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound("course"));
    }
    courses::set_course_modules(&state.db, &id, &req).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn set_module_lock(
    State(state): State<AppState>,
    session: Session,
    Path((id, module_id)): Path<(String, String)>,
    Json(req): Json<SetModuleLockRequest>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    no_content(courses::set_module_lock(&state.db, &id, &module_id, req.locked).await?, "module")
}

pub(super) async fn set_module_schedule(
    State(state): State<AppState>,
    session: Session,
    Path((id, module_id)): Path<(String, String)>,
    Json(req): Json<SetModuleScheduleRequest>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    let service = CurriculumService::new(state.db.clone());
    service
        .schedule_module(&id, &module_id, &req.topic_schedules)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn get_schedule(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Vec<ModuleSchedule>>, AppError> {
    session.require_admin()?;
    if courses::find_course(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound("course"));
    }
    let schedule = courses::fetch_schedule(&state.db, &id).await?;
    Ok(Json(schedule))
}

pub(super) async fn list_modules(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Module>>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    Ok(Json(modules::fetch_modules(&state.db).await?))
}

pub(super) async fn create_module(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<NewModuleRequest>,
) -> Result<Json<Module>, AppError> {
    session.require_admin()?;
    Ok(Json(modules::insert_module(&state.db, req).await?))
}

pub(super) async fn get_module(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Module>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let module = modules::find_module(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound("module"))?;
    Ok(Json(module))
}

pub(super) async fn update_module(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<UpdateModuleRequest>,
) -> Result<Json<Module>, AppError> {
    session.require_admin()?;
    let module = modules::update_module(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound("module"))?;
    Ok(Json(module))
}

pub(super) async fn delete_module(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    no_content(modules::delete_module(&state.db, &id).await?, "module")
}

pub(super) async fn set_module_topics(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<SetModuleTopicsRequest>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    if modules::find_module(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound("module"));
    }
    modules::set_module_topics(&state.db, &id, &req.topic_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_topics(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Topic>>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    Ok(Json(topics::fetch_topics(&state.db).await?))
}

pub(super) async fn create_topic(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<NewTopicRequest>,
) -> Result<Json<Topic>, AppError> {
    session.require_admin()?;
    Ok(Json(topics::insert_topic(&state.db, req).await?))
}

pub(super) async fn get_topic(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Topic>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let topic = topics::find_topic(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound("topic"))?;
    Ok(Json(topic))
}

pub(super) async fn update_topic(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<UpdateTopicRequest>,
) -> Result<Json<Topic>, AppError> {
    session.require_admin()?;
    let topic = topics::update_topic(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound("topic"))?;
    Ok(Json(topic))
}

pub(super) async fn delete_topic(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    no_content(topics::delete_topic(&state.db, &id).await?, "topic")
}

pub(super) async fn set_topic_problems(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<SetTopicProblemsRequest>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    if topics::find_topic(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound("topic"));
    }
    topics::set_topic_problems(
        &state.db,
        &id,
        &req.assignment_problem_ids,
        &req.practice_problem_ids,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn upload_trainer_notes(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Topic>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let service = MaterialsService::new(state.db.clone(), state.blobs.clone());
    let topic = service
        .upload_trainer_notes(&id, &params.file_name, content_type, body.to_vec())
        .await?;
    Ok(Json(topic))
}

pub(super) async fn list_problems(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Problem>>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    Ok(Json(problems::fetch_problems(&state.db).await?))
}

pub(super) async fn create_problem(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<NewProblemRequest>,
) -> Result<Json<Problem>, AppError> {
    session.require_admin()?;
    Ok(Json(problems::insert_problem(&state.db, req).await?))
}

pub(super) async fn get_problem(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Problem>, AppError> {
    session.require(&[Role::Admin, Role::Trainer])?;
    let problem = problems::find_problem(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound("problem"))?;
    Ok(Json(problem))
}

pub(super) async fn update_problem(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<UpdateProblemRequest>,
) -> Result<Json<Problem>, AppError> {
    session.require_admin()?;
    let problem = problems::update_problem(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound("problem"))?;
    Ok(Json(problem))
}

pub(super) async fn delete_problem(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    no_content(problems::delete_problem(&state.db, &id).await?, "problem")
}

pub(super) async fn list_users(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<UserQueryParams>,
) -> Result<Json<Vec<User>>, AppError> {
    session.require_admin()?;
    Ok(Json(users::fetch_users(&state.db, params.role).await?))
}

pub(super) async fn create_user(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<NewUserRequest>,
) -> Result<Json<CreatedUser>, AppError> {
    session.require_admin()?;
    let service = AccountService::new(state.db.clone(), state.mailer.clone());
    Ok(Json(service.create_user(req).await?))
}

pub(super) async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    no_content(users::delete_user(&state.db, &id).await?, "user")
}

pub(super) async fn reissue_credentials(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    session.require_admin()?;
    let service = AccountService::new(state.db.clone(), state.mailer.clone());
    service.reissue_credentials(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
