use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::curriculum::{ModuleStub, ResolvedModule, ResolvedSession};
use crate::models::{Course, Problem, ProblemStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub completed_lectures: u32,
    pub total_lectures: u32,
    pub completed_assignments: u32,
    pub total_assignments: u32,
    pub completed_practice: u32,
    pub total_practice: u32,
}

impl CompletionStats {
    fn absorb(&mut self, other: &CompletionStats) {
        self.completed_lectures += other.completed_lectures;
        self.total_lectures += other.total_lectures;
        self.completed_assignments += other.completed_assignments;
        self.total_assignments += other.total_assignments;
        self.completed_practice += other.completed_practice;
        self.total_practice += other.total_practice;
    }

    fn record(&mut self, session: &SessionView) {
        self.total_lectures += 1;
        if session.is_completed {
            self.completed_lectures += 1;
        }
        self.total_assignments += session.assignment_problems.len() as u32;
        self.completed_assignments += solved_count(&session.assignment_problems);
        self.total_practice += session.practice_problems.len() as u32;
        self.completed_practice += solved_count(&session.practice_problems);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemView {
    #[serde(flatten)]
    pub problem: Problem,
    pub status: ProblemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub topic_id: String,
    pub topic_name: String,
    pub description: String,
    pub trainer_notes: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub day_number: u32,
    pub is_completed: bool,
    pub assignment_problems: Vec<ProblemView>,
    pub practice_problems: Vec<ProblemView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenModuleView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub topics: Vec<SessionView>,
    pub stats: CompletionStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleView {
    Locked(ModuleStub),
    Open(OpenModuleView),
}

impl ModuleView {
    pub fn topics(&self) -> &[SessionView] {
        match self {
            ModuleView::Locked(_) => &[],
            ModuleView::Open(open) => &open.topics,
        }
    }
}

// Both shapes carry `isLocked` and `topics` so clients can treat the module
// list uniformly.
impl Serialize for ModuleView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ModuleView::Locked(stub) => {
                let mut s = serializer.serialize_struct("ModuleView", 5)?;
                s.serialize_field("id", &stub.id)?;
                s.serialize_field("title", &stub.title)?;
                s.serialize_field("description", &stub.description)?;
                s.serialize_field("isLocked", &true)?;
                s.serialize_field("topics", &[] as &[SessionView])?;
                s.end()
            }
            ModuleView::Open(open) => {
                let mut s = serializer.serialize_struct("ModuleView", 6)?;
                s.serialize_field("id", &open.id)?;
                s.serialize_field("title", &open.title)?;
                s.serialize_field("description", &open.description)?;
                s.serialize_field("isLocked", &false)?;
                s.serialize_field("topics", &open.topics)?;
                s.serialize_field("stats", &open.stats)?;
                s.end()
            }
        }
    }
}

/// The trainee-facing course: course metadata, resolved modules with
/// completion state, and course-wide counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<ModuleView>,
    pub stats: CompletionStats,
}

/// Overlays a trainee's completed problems onto a resolved course.
///
/// Locked modules pass through as stubs and add nothing to the counters.
/// Repeated sessions of a topic are counted once per session.
pub fn aggregate(
    course: Course,
    resolved: Vec<ResolvedModule>,
    completed: &HashSet<String>,
) -> CourseView {
    let mut stats = CompletionStats::default();
    let modules = resolved
        .into_iter()
        .map(|module| match module {
            ResolvedModule::Locked(stub) => ModuleView::Locked(stub),
            ResolvedModule::Open(open) => {
                let mut module_stats = CompletionStats::default();
                let topics: Vec<SessionView> = open
                    .sessions
                    .into_iter()
                    .map(|session| session_view(session, completed))
                    .inspect(|view| module_stats.record(view))
                    .collect();
                stats.absorb(&module_stats);
                ModuleView::Open(OpenModuleView {
                    id: open.id,
                    title: open.title,
                    description: open.description,
                    topics,
                    stats: module_stats,
                })
            }
        })
        .collect();

    CourseView {
        course,
        modules,
        stats,
    }
}

fn session_view(session: ResolvedSession, completed: &HashSet<String>) -> SessionView {
    let assignment_problems = decorate(session.assignment_problems, completed);
    let practice_problems = decorate(session.practice_problems, completed);
    // a topic without assignments cannot hold anyone back
    let is_completed = assignment_problems
        .iter()
        .all(|p| p.status == ProblemStatus::Solved);

    SessionView {
        topic_id: session.topic_id,
        topic_name: session.topic_name,
        description: session.description,
        trainer_notes: session.trainer_notes,
        date: session.date,
        day_number: session.day_number,
        is_completed,
        assignment_problems,
        practice_problems,
    }
}

fn decorate(problems: Vec<Problem>, completed: &HashSet<String>) -> Vec<ProblemView> {
    problems
        .into_iter()
        .map(|problem| {
            let status = if completed.contains(&problem.id) {
                ProblemStatus::Solved
            } else {
                ProblemStatus::Unsolved
            };
            ProblemView { problem, status }
        })
        .collect()
}

fn solved_count(problems: &[ProblemView]) -> u32 {
    problems
        .iter()
        .filter(|p| p.status == ProblemStatus::Solved)
        .count() as u32
}
