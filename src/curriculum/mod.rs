//! Trainee-facing curriculum: schedule resolution, progress overlay, and the
//! write-time checks that keep stored schedules coherent.

pub mod calendar;
pub mod progress;
pub mod resolver;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashSet;

use crate::models::{Course, Module, ModuleSchedule, Problem, Topic};

pub use calendar::{BatchDay, teaching_days};
pub use progress::{
    CompletionStats, CourseView, ModuleView, OpenModuleView, ProblemView, SessionView, aggregate,
};
pub use resolver::{ModuleStub, OpenModule, ResolvedModule, ResolvedSession, resolve_course};

/// A topic together with its populated problem lists.
#[derive(Debug, Clone)]
pub struct TopicNode {
    pub topic: Topic,
    pub assignment_problems: Vec<Problem>,
    pub practice_problems: Vec<Problem>,
}

/// A module with its topics in the module's own order.
#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub module: Module,
    pub topics: Vec<TopicNode>,
}

/// Everything the resolver needs for one course, loaded in one pass.
#[derive(Debug, Clone)]
pub struct CourseGraph {
    pub course: Course,
    /// In `course.modules` order.
    pub modules: Vec<ModuleNode>,
    pub schedule: Vec<ModuleSchedule>,
    pub locked_module_ids: HashSet<String>,
}
