use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// A teaching day of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDay {
    pub day_number: u32,
    pub date: NaiveDate,
}

/// Lists the teaching days between `start` and `end` (inclusive), skipping
/// excluded weekdays (0 = Sunday) and holidays.
pub fn teaching_days(
    start: NaiveDate,
    end: NaiveDate,
    excluded_days: &[u8],
    holidays: &[NaiveDate],
) -> Vec<BatchDay> {
    let excluded: HashSet<u32> = excluded_days.iter().map(|d| u32::from(*d)).collect();
    let holidays: HashSet<NaiveDate> = holidays.iter().copied().collect();

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| !excluded.contains(&date.weekday().num_days_from_sunday()))
        .filter(|date| !holidays.contains(date))
        .zip(1..)
        .map(|(date, day_number)| BatchDay { day_number, date })
        .collect()
}
