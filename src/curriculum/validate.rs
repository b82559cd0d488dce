use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Course, TopicSchedule};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("topic {topic_id} is not part of this module")]
    UnknownTopic { topic_id: String },

    #[error("date {date} for topic {topic_id} is outside the course ({start} to {end})")]
    OutOfRange {
        topic_id: String,
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("date {date} is already taken by another topic")]
    DateCollision { date: NaiveDate },
}

/// Checks a module's proposed schedule before it is stored.
///
/// `taken_dates` are the calendar days already claimed by the course's other
/// modules. Undated entries are accepted as unscheduled.
pub fn validate_module_schedule(
    course: &Course,
    module_topic_ids: &HashSet<String>,
    taken_dates: &HashSet<NaiveDate>,
    entries: &[TopicSchedule],
) -> Result<(), ScheduleError> {
    let start = course.start_date.date_naive();
    let end = course.end_date.date_naive();
    let mut claimed: HashSet<NaiveDate> = HashSet::new();

    for entry in entries {
        if !module_topic_ids.contains(&entry.topic_id) {
            return Err(ScheduleError::UnknownTopic {
                topic_id: entry.topic_id.clone(),
            });
        }
        let Some(date) = entry.date.map(|d| d.date_naive()) else {
            continue;
        };
        if date < start || date > end {
            return Err(ScheduleError::OutOfRange {
                topic_id: entry.topic_id.clone(),
                date,
                start,
                end,
            });
        }
        if taken_dates.contains(&date) || !claimed.insert(date) {
            return Err(ScheduleError::DateCollision { date });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::curriculum::testing::course;

    fn entry(topic_id: &str, day: Option<u32>) -> TopicSchedule {
        TopicSchedule {
            topic_id: topic_id.to_string(),
            date: day.map(|d| Utc.with_ymd_and_hms(2025, 3, d, 10, 0, 0).unwrap()),
        }
    }

    fn members(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_repeats_on_distinct_days_and_undated_entries() {
        let entries = vec![entry("a", Some(2)), entry("a", Some(9)), entry("b", None)];
        let members = members(&["a", "b"]);
        let result = validate_module_schedule(&course("c"), &members, &HashSet::new(), &entries);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn rejects_dates_outside_course() {
        let mut c = course("c");
        c.end_date = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let err =
            validate_module_schedule(&c, &members(&["a"]), &HashSet::new(), &[entry("a", Some(11))])
                .unwrap_err();
        assert!(matches!(err, ScheduleError::OutOfRange { .. }));
    }

    #[test]
    fn end_date_itself_is_inside_course() {
        let mut c = course("c");
        c.end_date = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        assert!(
            validate_module_schedule(&c, &members(&["a"]), &HashSet::new(), &[entry("a", Some(10))])
                .is_ok()
        );
    }

    #[test]
    fn rejects_two_topics_on_one_day() {
        let err = validate_module_schedule(
            &course("c"),
            &members(&["a", "b"]),
            &HashSet::new(),
            &[entry("a", Some(4)), entry("b", Some(4))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ScheduleError::DateCollision {
                date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
            }
        );
    }

    #[test]
    fn rejects_day_taken_by_other_module() {
        let taken: HashSet<NaiveDate> = [NaiveDate::from_ymd_opt(2025, 3, 6).unwrap()].into();
        let err =
            validate_module_schedule(&course("c"), &members(&["a"]), &taken, &[entry("a", Some(6))])
                .unwrap_err();
        assert!(matches!(err, ScheduleError::DateCollision { .. }));
    }

    #[test]
    fn rejects_topic_outside_module() {
        let err = validate_module_schedule(
            &course("c"),
            &members(&["a"]),
            &HashSet::new(),
            &[entry("z", Some(3))],
        )
        .unwrap_err();
        assert_eq!(err, ScheduleError::UnknownTopic { topic_id: "z".into() });
    }
}
