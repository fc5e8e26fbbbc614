use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};

use crate::models::{ExerciseEntry, MealEntry, WeightEntry};

/// Everything logged on one local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub meals: Vec<MealEntry>,
    pub exercises: Vec<ExerciseEntry>,
    /// Latest weigh-in of the day, if any.
    pub weight: Option<WeightEntry>,
}

impl DayBucket {
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            meals: Vec::new(),
            exercises: Vec::new(),
            weight: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty() && self.exercises.is_empty() && self.weight.is_none()
    }
}

/// Group entries into one bucket per day of `[start, end]`, inclusive.
///
/// Entries are assigned by the calendar date of their timestamp and keep
/// their input order within a day. Entries outside the window are dropped.
/// When a day has several weigh-ins the one with the latest timestamp wins.
#[must_use]
pub fn bucket_by_day(
    meals: &[MealEntry],
    exercises: &[ExerciseEntry],
    weights: &[WeightEntry],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DayBucket> {
    let mut days: BTreeMap<NaiveDate, DayBucket> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| (d, DayBucket::empty(d)))
        .collect();

    for meal in meals {
        if let Some(bucket) = days.get_mut(&meal.timestamp.date()) {
            bucket.meals.push(meal.clone());
        }
    }
    for exercise in exercises {
        if let Some(bucket) = days.get_mut(&exercise.timestamp.date()) {
            bucket.exercises.push(exercise.clone());
        }
    }
    for weight in weights {
        if let Some(bucket) = days.get_mut(&weight.timestamp.date()) {
            let newer = bucket
                .weight
                .as_ref()
                .is_none_or(|current| weight.timestamp >= current.timestamp);
            if newer {
                bucket.weight = Some(weight.clone());
            }
        }
    }

    days.into_values().collect()
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    if !(1..=12).contains(&month) {
        bail!("Invalid month {month}. Must be between 1 and 12");
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month {year}-{month:02}"))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .with_context(|| format!("Invalid month {year}-{month:02}"))?;
    Ok((start, end))
}

/// Parse a `YYYY-MM` month label.
pub fn parse_month(label: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", label.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{label}'. Use YYYY-MM"))?;
    Ok((date.year(), date.month()))
}
