mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use common::*;
use training_portal::curriculum::ModuleView;
use training_portal::db::{courses, modules, notes, progress, topics};
use training_portal::error::AppError;
use training_portal::models::{ProblemStatus, Role, TopicSchedule};
use training_portal::services::CurriculumService;

#[tokio::test]
async fn course_view_orders_sessions_and_hides_locked_modules() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let trainee = seed_user(&pool, "Asha", Role::Trainee).await;
    seed_batch(&pool, "Spring", &cur.course, &[&trainee]).await;

    let service = CurriculumService::new(pool.clone());
    let view = service
        .course_view(&trainee.id, &cur.course.id)
        .await
        .expect("Failed to build course view");

    assert_eq!(view.modules.len(), 3);

    let names: Vec<(&str, u32)> = view.modules[0]
        .topics()
        .iter()
        .map(|s| (s.topic_name.as_str(), s.day_number))
        .collect();
    assert_eq!(
        names,
        vec![("Stacks", 1), ("Arrays: Part 1", 2), ("Arrays: Part 2", 3)]
    );

    match &view.modules[1] {
        ModuleView::Locked(stub) => assert_eq!(stub.id, cur.m2.id),
        other => panic!("expected a locked module, got {:?}", other),
    }

    let wrap_up = view.modules[2].topics();
    assert_eq!(wrap_up.len(), 1);
    assert_eq!(wrap_up[0].topic_id, cur.d.id);
    assert_eq!(wrap_up[0].date, None);
    assert_eq!(wrap_up[0].day_number, 4);

    assert_eq!(view.stats.total_lectures, 4);
    assert_eq!(view.stats.total_assignments, 3);
    assert_eq!(view.stats.completed_assignments, 0);
    // the review topic has no assignments
    assert_eq!(view.stats.completed_lectures, 1);
}

#[tokio::test]
async fn unlocking_a_module_shifts_later_day_numbers() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;

    courses::set_module_lock(&pool, &cur.course.id, &cur.m2.id, false)
        .await
        .expect("Failed to unlock module");

    let service = CurriculumService::new(pool.clone());
    let view = service
        .course_view("nobody", &cur.course.id)
        .await
        .expect("Failed to build course view");

    let algorithms = view.modules[1].topics();
    assert_eq!(algorithms.len(), 1);
    assert_eq!(algorithms[0].topic_id, cur.c.id);
    assert_eq!(algorithms[0].day_number, 4);
    assert_eq!(view.modules[2].topics()[0].day_number, 5);
}

#[tokio::test]
async fn solving_a_problem_completes_every_session_of_its_topic() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let trainee = seed_user(&pool, "Ben", Role::Trainee).await;
    seed_batch(&pool, "Spring", &cur.course, &[&trainee]).await;
    let service = CurriculumService::new(pool.clone());

    let completed = service
        .set_problem_status(&trainee.id, &cur.course.id, &cur.p1.id, ProblemStatus::Solved)
        .await
        .expect("Failed to mark solved");
    assert_eq!(completed, vec![cur.p1.id.clone()]);

    let view = service.course_view(&trainee.id, &cur.course.id).await.unwrap();
    let sessions = view.modules[0].topics();
    assert!(!sessions[0].is_completed);
    assert!(sessions[1].is_completed);
    assert!(sessions[2].is_completed);
    assert_eq!(sessions[1].assignment_problems[0].status, ProblemStatus::Solved);
    assert_eq!(view.stats.completed_assignments, 2);
    assert_eq!(view.stats.completed_lectures, 3);
}

#[tokio::test]
async fn toggling_status_is_idempotent() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let trainee = seed_user(&pool, "Chen", Role::Trainee).await;
    seed_batch(&pool, "Spring", &cur.course, &[&trainee]).await;
    let service = CurriculumService::new(pool.clone());

    for _ in 0..2 {
        service
            .set_problem_status(&trainee.id, &cur.course.id, &cur.p2.id, ProblemStatus::Solved)
            .await
            .unwrap();
    }
    let completed = service
        .set_problem_status(&trainee.id, &cur.course.id, &cur.p1.id, ProblemStatus::Solved)
        .await
        .unwrap();
    let mut expected = vec![cur.p1.id.clone(), cur.p2.id.clone()];
    expected.sort();
    assert_eq!(completed, expected);

    for _ in 0..2 {
        service
            .set_problem_status(&trainee.id, &cur.course.id, &cur.p2.id, ProblemStatus::Unsolved)
            .await
            .unwrap();
    }
    let completed = service
        .set_problem_status(&trainee.id, &cur.course.id, &cur.p3.id, ProblemStatus::Unsolved)
        .await
        .unwrap();
    assert_eq!(completed, vec![cur.p1.id.clone()]);
}

#[tokio::test]
async fn progress_record_is_created_on_first_toggle() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let trainee = seed_user(&pool, "Dana", Role::Trainee).await;
    seed_batch(&pool, "Spring", &cur.course, &[&trainee]).await;

    assert_eq!(progress_rows(&pool).await, 0);

    let service = CurriculumService::new(pool.clone());
    service.course_view(&trainee.id, &cur.course.id).await.unwrap();
    assert_eq!(progress_rows(&pool).await, 0);

    service
        .set_problem_status(&trainee.id, &cur.course.id, &cur.p3.id, ProblemStatus::Unsolved)
        .await
        .unwrap();
    assert_eq!(progress_rows(&pool).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_of_different_problems_are_all_kept() {
    let pool = file_pool(5).await;
    let cur = seed_curriculum(&pool).await;
    let trainee = seed_user(&pool, "Kiri", Role::Trainee).await;
    let batch = seed_batch(&pool, "Spring", &cur.course, &[&trainee]).await;

    let mut handles = Vec::new();
    for round in 0..5 {
        for problem_id in [&cur.p1.id, &cur.p2.id, &cur.p3.id] {
            let service = CurriculumService::new(pool.clone());
            let trainee_id = trainee.id.clone();
            let course_id = cur.course.id.clone();
            let problem_id = problem_id.clone();
            handles.push(tokio::spawn(async move {
                service
                    .set_problem_status(&trainee_id, &course_id, &problem_id, ProblemStatus::Solved)
                    .await
                    .map_err(|e| format!("round {}: {}", round, e))
            }));
        }
    }
    for handle in handles {
        handle.await.expect("toggle task panicked").expect("toggle failed");
    }

    let completed = progress::fetch_completed(&pool, &batch.id, &trainee.id)
        .await
        .unwrap();
    let mut expected = vec![cur.p1.id.clone(), cur.p2.id.clone(), cur.p3.id.clone()];
    expected.sort();
    assert_eq!(completed, expected);
    assert_eq!(progress_rows(&pool).await, 1);
}

async fn progress_rows(pool: &sqlx::SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM progress")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn trainee_without_batch_sees_everything_unsolved() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let outsider = seed_user(&pool, "Eve", Role::Trainee).await;
    let service = CurriculumService::new(pool.clone());

    let view = service.course_view(&outsider.id, &cur.course.id).await.unwrap();
    assert!(
        view.modules
            .iter()
            .flat_map(|m| m.topics())
            .flat_map(|s| s.assignment_problems.iter())
            .all(|p| p.status == ProblemStatus::Unsolved)
    );

    let err = service
        .set_problem_status(&outsider.id, &cur.course.id, &cur.p1.id, ProblemStatus::Solved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("batch")));
}

#[tokio::test]
async fn unknown_course_or_problem_is_not_found() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let trainee = seed_user(&pool, "Finn", Role::Trainee).await;
    seed_batch(&pool, "Spring", &cur.course, &[&trainee]).await;
    let service = CurriculumService::new(pool.clone());

    let err = service.course_view(&trainee.id, "missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("course")));

    let err = service
        .set_problem_status(&trainee.id, &cur.course.id, "missing", ProblemStatus::Solved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("problem")));
}

#[tokio::test]
async fn schedule_writes_are_validated() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let service = CurriculumService::new(pool.clone());

    // the 7th belongs to the algorithms module
    let err = service
        .schedule_module(
            &cur.course.id,
            &cur.m3.id,
            &[TopicSchedule { topic_id: cur.d.id.clone(), date: Some(day(7)) }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let out_of_range = Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap();
    let err = service
        .schedule_module(
            &cur.course.id,
            &cur.m3.id,
            &[TopicSchedule { topic_id: cur.d.id.clone(), date: Some(out_of_range) }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = service
        .schedule_module(
            &cur.course.id,
            &cur.m3.id,
            &[TopicSchedule { topic_id: cur.a.id.clone(), date: Some(day(10)) }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    service
        .schedule_module(
            &cur.course.id,
            &cur.m3.id,
            &[TopicSchedule { topic_id: cur.d.id.clone(), date: Some(day(10)) }],
        )
        .await
        .expect("Failed to store a valid schedule");

    let schedule = courses::fetch_schedule(&pool, &cur.course.id).await.unwrap();
    let wrap_up = schedule
        .iter()
        .find(|s| s.module_id == cur.m3.id)
        .expect("wrap-up schedule stored");
    assert_eq!(wrap_up.topic_schedules.len(), 1);
    assert_eq!(wrap_up.topic_schedules[0].date, Some(day(10)));
}

#[tokio::test]
async fn rescheduling_a_module_may_reuse_its_own_dates() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let service = CurriculumService::new(pool.clone());

    service
        .schedule_module(
            &cur.course.id,
            &cur.m1.id,
            &[
                TopicSchedule { topic_id: cur.b.id.clone(), date: Some(day(3)) },
                TopicSchedule { topic_id: cur.a.id.clone(), date: Some(day(1)) },
            ],
        )
        .await
        .expect("Failed to reschedule");

    let view = service.course_view("nobody", &cur.course.id).await.unwrap();
    let names: Vec<&str> = view.modules[0]
        .topics()
        .iter()
        .map(|s| s.topic_name.as_str())
        .collect();
    assert_eq!(names, vec!["Arrays", "Stacks"]);
}

#[tokio::test]
async fn deleting_a_topic_removes_it_from_modules() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;

    assert!(topics::delete_topic(&pool, &cur.b.id).await.unwrap());

    let ids = modules::fetch_module_topic_ids(&pool, &cur.m1.id).await.unwrap();
    assert_eq!(ids, vec![cur.a.id.clone()]);

    // the stale schedule entry for the deleted topic is ignored
    let service = CurriculumService::new(pool.clone());
    let view = service.course_view("nobody", &cur.course.id).await.unwrap();
    let names: Vec<&str> = view.modules[0]
        .topics()
        .iter()
        .map(|s| s.topic_name.as_str())
        .collect();
    assert_eq!(names, vec!["Arrays: Part 1", "Arrays: Part 2"]);
}

#[tokio::test]
async fn deleting_a_module_removes_it_from_courses_and_schedules() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;

    assert!(modules::delete_module(&pool, &cur.m1.id).await.unwrap());

    let remaining: Vec<String> = courses::fetch_course_modules(&pool, &cur.course.id)
        .await
        .unwrap()
        .into_iter()
        .map(|(m, _)| m.id)
        .collect();
    assert_eq!(remaining, vec![cur.m2.id.clone(), cur.m3.id.clone()]);

    let schedule = courses::fetch_schedule(&pool, &cur.course.id).await.unwrap();
    assert!(schedule.iter().all(|s| s.module_id != cur.m1.id));
}

#[tokio::test]
async fn batch_days_skip_sundays() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let batch = seed_batch(&pool, "Spring", &cur.course, &[]).await;
    let service = CurriculumService::new(pool.clone());

    let days = service.batch_days(&batch.id).await.unwrap();
    // March 2025 has five Sundays
    assert_eq!(days.len(), 26);
    assert_eq!(days[0].day_number, 1);
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
}

#[tokio::test]
async fn batch_report_lists_each_trainee() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let gita = seed_user(&pool, "Gita", Role::Trainee).await;
    let hugo = seed_user(&pool, "Hugo", Role::Trainee).await;
    let batch = seed_batch(&pool, "Spring", &cur.course, &[&gita, &hugo]).await;
    let service = CurriculumService::new(pool.clone());

    service
        .set_problem_status(&gita.id, &cur.course.id, &cur.p2.id, ProblemStatus::Solved)
        .await
        .unwrap();

    let report = service.batch_report(&batch.id).await.unwrap();
    assert_eq!(report.trainees.len(), 2);
    let gita_row = report.trainees.iter().find(|t| t.trainee_id == gita.id).unwrap();
    assert_eq!(gita_row.completed_problem_ids, vec![cur.p2.id.clone()]);
    assert_eq!(gita_row.stats.completed_assignments, 1);
    let hugo_row = report.trainees.iter().find(|t| t.trainee_id == hugo.id).unwrap();
    assert!(hugo_row.completed_problem_ids.is_empty());
}

#[tokio::test]
async fn notes_are_upserted_per_topic() {
    let pool = test_pool().await;
    let cur = seed_curriculum(&pool).await;
    let trainee = seed_user(&pool, "Ivan", Role::Trainee).await;

    notes::upsert_note(&pool, &trainee.id, &cur.a.id, &cur.course.id, "first")
        .await
        .unwrap();
    let note = notes::upsert_note(&pool, &trainee.id, &cur.a.id, &cur.course.id, "second")
        .await
        .unwrap();
    assert_eq!(note.note, "second");

    let all = notes::fetch_course_notes(&pool, &trainee.id, &cur.course.id)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].note, "second");
}
