use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::curriculum::{CourseGraph, ModuleNode, TopicNode};
use crate::models::{ModuleSchedule, Problem};

/// Placeholder for a module that is locked in this course. It stays visible
/// in module lists but carries no sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStub {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenModule {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sessions: Vec<ResolvedSession>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedModule {
    Locked(ModuleStub),
    Open(OpenModule),
}

/// One occurrence of a topic in the curriculum. Built from the stored topic,
/// never written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSession {
    pub topic_id: String,
    pub topic_name: String,
    pub description: String,
    pub trainer_notes: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub day_number: u32,
    pub assignment_problems: Vec<Problem>,
    pub practice_problems: Vec<Problem>,
}

impl ResolvedModule {
    pub fn id(&self) -> &str {
        match self {
            ResolvedModule::Locked(stub) => &stub.id,
            ResolvedModule::Open(open) => &open.id,
        }
    }

    pub fn sessions(&self) -> &[ResolvedSession] {
        match self {
            ResolvedModule::Locked(_) => &[],
            ResolvedModule::Open(open) => &open.sessions,
        }
    }
}

/// Produces the ordered, day-numbered curriculum for a course.
///
/// Locked modules become stubs. Every other module lists its dated sessions
/// in date order followed by its unscheduled topics, and day numbers run from
/// 1 across the whole course without gaps.
pub fn resolve_course(graph: &CourseGraph) -> Vec<ResolvedModule> {
    let schedules: HashMap<&str, &ModuleSchedule> = graph
        .schedule
        .iter()
        .map(|entry| (entry.module_id.as_str(), entry))
        .collect();

    let mut next_day = 1;
    let mut resolved = Vec::with_capacity(graph.modules.len());
    for node in &graph.modules {
        if graph.locked_module_ids.contains(&node.module.id) {
            resolved.push(ResolvedModule::Locked(ModuleStub {
                id: node.module.id.clone(),
                title: node.module.title.clone(),
                description: node.module.description.clone(),
            }));
            continue;
        }

        let schedule = schedules.get(node.module.id.as_str()).copied();
        let (open, following_day) = resolve_module(node, schedule, next_day);
        next_day = following_day;
        resolved.push(ResolvedModule::Open(open));
    }
    resolved
}

/// Resolves one module starting at `first_day`; returns the module and the
/// day number the next module starts at.
fn resolve_module(
    node: &ModuleNode,
    schedule: Option<&ModuleSchedule>,
    first_day: u32,
) -> (OpenModule, u32) {
    let topics: HashMap<&str, &TopicNode> = node
        .topics
        .iter()
        .map(|t| (t.topic.id.as_str(), t))
        .collect();

    // Entries without a date or pointing at a topic that left the module are
    // dropped here and never count as sessions.
    let dated: Vec<(&TopicNode, DateTime<Utc>)> = schedule
        .map(|s| s.topic_schedules.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| {
            let topic = topics.get(entry.topic_id.as_str())?;
            Some((*topic, entry.date?))
        })
        .collect();

    let mut session_counts: HashMap<&str, u32> = HashMap::new();
    for (topic, _) in &dated {
        *session_counts.entry(topic.topic.id.as_str()).or_default() += 1;
    }

    let mut parts_seen: HashMap<&str, u32> = HashMap::new();
    let mut scheduled: Vec<(DateTime<Utc>, String, &TopicNode)> = dated
        .iter()
        .map(|(topic, date)| {
            let id = topic.topic.id.as_str();
            let name = if session_counts[id] > 1 {
                let part = parts_seen.entry(id).or_default();
                *part += 1;
                format!("{}: Part {}", topic.topic.topic_name, part)
            } else {
                topic.topic.topic_name.clone()
            };
            (*date, name, *topic)
        })
        .collect();
    // stable: equal dates keep entry order
    scheduled.sort_by_key(|(date, _, _)| *date);

    let scheduled_ids: HashSet<&str> = session_counts.keys().copied().collect();
    let unscheduled = node
        .topics
        .iter()
        .filter(|t| !scheduled_ids.contains(t.topic.id.as_str()))
        .map(|t| (None, t.topic.topic_name.clone(), t));

    let sessions: Vec<ResolvedSession> = scheduled
        .into_iter()
        .map(|(date, name, topic)| (Some(date), name, topic))
        .chain(unscheduled)
        .zip(first_day..)
        .map(|((date, topic_name, topic), day_number)| ResolvedSession {
            topic_id: topic.topic.id.clone(),
            topic_name,
            description: topic.topic.description.clone(),
            trainer_notes: topic.topic.trainer_notes.clone(),
            date,
            day_number,
            assignment_problems: topic.assignment_problems.clone(),
            practice_problems: topic.practice_problems.clone(),
        })
        .collect();

    let next_day = first_day + sessions.len() as u32;
    let open = OpenModule {
        id: node.module.id.clone(),
        title: node.module.title.clone(),
        description: node.module.description.clone(),
        sessions,
    };
    (open, next_day)
}
