use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::curriculum::validate::validate_module_schedule;
use crate::curriculum::{
    BatchDay, CompletionStats, CourseView, aggregate, resolve_course, teaching_days,
};
use crate::db::{batches, courses, modules, problems, progress, users};
use crate::error::AppError;
use crate::models::{ProblemStatus, TopicSchedule};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeProgress {
    pub trainee_id: String,
    pub name: String,
    pub completed_problem_ids: Vec<String>,
    pub stats: CompletionStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_id: String,
    pub course_id: String,
    pub trainees: Vec<TraineeProgress>,
}

/// Reads and writes that go through the schedule resolver.
pub struct CurriculumService {
    db: SqlitePool,
}

impl CurriculumService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Resolves a course for one trainee and overlays their progress. A
    /// trainee without a batch or progress record sees everything unsolved.
    pub async fn course_view(
        &self,
        trainee_id: &str,
        course_id: &str,
    ) -> Result<CourseView, AppError> {
        let graph = courses::load_course_graph(&self.db, course_id)
            .await?
            .ok_or(AppError::NotFound("course"))?;

        let completed: HashSet<String> =
            match batches::find_trainee_batch(&self.db, course_id, trainee_id).await? {
                Some(batch) => progress::fetch_completed(&self.db, &batch.id, trainee_id)
                    .await?
                    .into_iter()
                    .collect(),
                None => {
                    debug!(trainee_id, course_id, "trainee has no batch for course");
                    HashSet::new()
                }
            };

        let resolved = resolve_course(&graph);
        Ok(aggregate(graph.course, resolved, &completed))
    }

    /// Marks a problem solved or unsolved for the trainee's batch in this
    /// course and returns the completed set afterwards.
    pub async fn set_problem_status(
        &self,
        trainee_id: &str,
        course_id: &str,
        problem_id: &str,
        status: ProblemStatus,
    ) -> Result<Vec<String>, AppError> {
        if courses::find_course(&self.db, course_id).await?.is_none() {
            return Err(AppError::NotFound("course"));
        }
        let batch = batches::find_trainee_batch(&self.db, course_id, trainee_id)
            .await?
            .ok_or(AppError::NotFound("batch"))?;
        if problems::find_problem(&self.db, problem_id).await?.is_none() {
            return Err(AppError::NotFound("problem"));
        }

        progress::ensure_progress(&self.db, &batch.id, trainee_id).await?;
        match status {
            ProblemStatus::Solved => {
                progress::mark_solved(&self.db, &batch.id, trainee_id, problem_id).await?
            }
            ProblemStatus::Unsolved => {
                progress::mark_unsolved(&self.db, &batch.id, trainee_id, problem_id).await?
            }
        }
        debug!(trainee_id, problem_id, ?status, "problem status updated");

        Ok(progress::fetch_completed(&self.db, &batch.id, trainee_id).await?)
    }

    /// Validates and stores the schedule of one module within a course.
    pub async fn schedule_module(
        &self,
        course_id: &str,
        module_id: &str,
        entries: &[TopicSchedule],
    ) -> Result<(), AppError> {
        let course = courses::find_course(&self.db, course_id)
            .await?
            .ok_or(AppError::NotFound("course"))?;
        let in_course = courses::fetch_course_modules(&self.db, course_id)
            .await?
            .iter()
            .any(|(module, _)| module.id == module_id);
        if !in_course {
            return Err(AppError::NotFound("module"));
        }

        let topic_ids: HashSet<String> = modules::fetch_module_topic_ids(&self.db, module_id)
            .await?
            .into_iter()
            .collect();
        let taken: HashSet<NaiveDate> = courses::fetch_schedule(&self.db, course_id)
            .await?
            .iter()
            .filter(|s| s.module_id != module_id)
            .flat_map(|s| s.topic_schedules.iter())
            .filter_map(|entry| entry.date.map(|d| d.date_naive()))
            .collect();

        validate_module_schedule(&course, &topic_ids, &taken, entries)?;
        courses::replace_module_schedule(&self.db, course_id, module_id, entries).await?;
        info!(
            course_id,
            module_id,
            entries = entries.len(),
            "module schedule replaced"
        );
        Ok(())
    }

    /// Teaching days of a batch, skipping its course's excluded weekdays and
    /// holidays.
    pub async fn batch_days(&self, batch_id: &str) -> Result<Vec<BatchDay>, AppError> {
        let batch = batches::find_batch(&self.db, batch_id)
            .await?
            .ok_or(AppError::NotFound("batch"))?;
        let course = courses::find_course(&self.db, &batch.course_id)
            .await?
            .ok_or(AppError::NotFound("course"))?;

        let holidays: Vec<NaiveDate> = course
            .custom_holidays
            .iter()
            .map(|d| d.date_naive())
            .collect();
        Ok(teaching_days(
            batch.start_date.date_naive(),
            batch.end_date.date_naive(),
            &course.excluded_days,
            &holidays,
        ))
    }

    /// Completion counters of every trainee in a batch.
    pub async fn batch_report(&self, batch_id: &str) -> Result<BatchReport, AppError> {
        let batch = batches::find_batch(&self.db, batch_id)
            .await?
            .ok_or(AppError::NotFound("batch"))?;
        let graph = courses::load_course_graph(&self.db, &batch.course_id)
            .await?
            .ok_or(AppError::NotFound("course"))?;
        let resolved = resolve_course(&graph);

        let mut trainees = Vec::with_capacity(batch.trainee_ids.len());
        for trainee_id in &batch.trainee_ids {
            let Some(user) = users::find_user(&self.db, trainee_id).await? else {
                continue;
            };
            let completed_problem_ids =
                progress::fetch_completed(&self.db, &batch.id, trainee_id).await?;
            let completed: HashSet<String> = completed_problem_ids.iter().cloned().collect();
            let view = aggregate(graph.course.clone(), resolved.clone(), &completed);
            trainees.push(TraineeProgress {
                trainee_id: user.id,
                name: user.name,
                completed_problem_ids,
                stats: view.stats,
            });
        }

        Ok(BatchReport {
            batch_id: batch.id,
            course_id: batch.course_id,
            trainees,
        })
    }
}
