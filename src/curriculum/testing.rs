use chrono::{TimeZone, Utc};

use crate::curriculum::{ModuleNode, TopicNode};
use crate::models::{Course, Module, Problem, Topic};

pub fn course(id: &str) -> Course {
    Course {
        id: id.to_string(),
        title: format!("Course {}", id),
        description: String::new(),
        start_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap(),
        excluded_days: vec![0],
        custom_holidays: Vec::new(),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

pub fn problem(id: &str) -> Problem {
    Problem {
        id: id.to_string(),
        title: format!("Problem {}", id),
        link: format!("https://judge.example/{}", id),
        platform: "judge".to_string(),
        difficulty: "easy".to_string(),
        category: "arrays".to_string(),
        tags: Vec::new(),
    }
}

pub fn topic(id: &str, name: &str, assignments: Vec<Problem>) -> TopicNode {
    topic_with_practice(id, name, assignments, Vec::new())
}

pub fn topic_with_practice(
    id: &str,
    name: &str,
    assignments: Vec<Problem>,
    practice: Vec<Problem>,
) -> TopicNode {
    TopicNode {
        topic: Topic {
            id: id.to_string(),
            topic_name: name.to_string(),
            description: String::new(),
            trainer_notes: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        },
        assignment_problems: assignments,
        practice_problems: practice,
    }
}

pub fn module(id: &str, topics: Vec<TopicNode>) -> ModuleNode {
    ModuleNode {
        module: Module {
            id: id.to_string(),
            title: format!("Module {}", id),
            description: String::new(),
            is_locked: false,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        },
        topics,
    }
}
