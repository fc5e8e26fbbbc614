use anyhow::{Result, bail};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::buckets::{DayBucket, bucket_by_day, month_bounds};
use crate::daily::summarize_day;
use crate::energy::compute_exercise_calories;
use crate::models::{
    DailySummary, ExerciseEntry, MealEntry, MonthlySummary, NewExerciseEntry, NewMealEntry,
    NewWeightEntry, Profile, WeightEntry, validate_exercise, validate_meal, validate_profile,
    validate_weight,
};
use crate::monthly::{first_and_last_weight, summarize_month};

/// Shortest id prefix accepted by [`LogBook::remove`].
pub const MIN_ID_PREFIX: usize = 4;

/// One user's profile and logs. Entry lists are kept in timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogBook {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub meals: Vec<MealEntry>,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default)]
    pub weights: Vec<WeightEntry>,
}

/// An entry taken out of the book by [`LogBook::remove`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemovedEntry {
    Meal(MealEntry),
    Exercise(ExerciseEntry),
    Weight(WeightEntry),
}

impl RemovedEntry {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Meal(_) => "meal",
            Self::Exercise(_) => "exercise",
            Self::Weight(_) => "weight",
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Meal(m) => &m.id,
            Self::Exercise(e) => &e.id,
            Self::Weight(w) => &w.id,
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn insert_sorted<T>(list: &mut Vec<T>, item: T, at: impl Fn(&T) -> NaiveDateTime) {
    let ts = at(&item);
    let pos = list.partition_point(|e| at(e) <= ts);
    list.insert(pos, item);
}

impl LogBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_profile(&mut self, profile: Profile) -> Result<()> {
        validate_profile(&profile)?;
        self.profile = profile;
        Ok(())
    }

    pub fn add_meal(&mut self, meal: NewMealEntry) -> Result<MealEntry> {
        validate_meal(&meal)?;
        let entry = MealEntry {
            id: new_id(),
            name: meal.name.trim().to_string(),
            calories: meal.calories,
            protein_g: meal.protein_g,
            carbs_g: meal.carbs_g,
            fat_g: meal.fat_g,
            timestamp: meal.timestamp,
        };
        debug!(id = %entry.id, name = %entry.name, calories = entry.calories, "Logged meal");
        insert_sorted(&mut self.meals, entry.clone(), |m| m.timestamp);
        Ok(entry)
    }

    /// Log an exercise. Without an explicit calorie figure the burn is
    /// derived from the MET table and the body weight known at that time;
    /// with no known weight it is 0.
    pub fn add_exercise(&mut self, exercise: NewExerciseEntry) -> Result<ExerciseEntry> {
        validate_exercise(&exercise)?;
        let calories_burnt = match exercise.calories_burnt {
            Some(calories) => calories,
            None => {
                let weight = self.weight_at(exercise.timestamp).unwrap_or(0.0);
                compute_exercise_calories(
                    weight,
                    exercise.duration_min,
                    exercise.intensity,
                    exercise.exercise_type,
                )
            }
        };
        let entry = ExerciseEntry {
            id: new_id(),
            name: exercise.name.trim().to_string(),
            calories_burnt,
            duration_min: exercise.duration_min,
            intensity: exercise.intensity,
            exercise_type: exercise.exercise_type,
            timestamp: exercise.timestamp,
        };
        debug!(
            id = %entry.id,
            name = %entry.name,
            calories_burnt,
            derived = exercise.calories_burnt.is_none(),
            "Logged exercise"
        );
        insert_sorted(&mut self.exercises, entry.clone(), |e| e.timestamp);
        Ok(entry)
    }

    /// Log a weigh-in. The profile's current weight follows the newest entry.
    pub fn add_weight(&mut self, weight: NewWeightEntry) -> Result<WeightEntry> {
        validate_weight(&weight)?;
        let entry = WeightEntry {
            id: new_id(),
            weight_kg: weight.weight_kg,
            timestamp: weight.timestamp,
        };
        debug!(id = %entry.id, weight_kg = entry.weight_kg, "Logged weight");
        insert_sorted(&mut self.weights, entry.clone(), |w| w.timestamp);
        self.sync_profile_weight();
        Ok(entry)
    }

    /// Remove the entry whose id equals `id` or uniquely starts with it.
    pub fn remove(&mut self, id: &str) -> Result<RemovedEntry> {
        let id = id.trim();
        if id.len() < MIN_ID_PREFIX {
            bail!("Entry id must be at least {MIN_ID_PREFIX} characters");
        }

        let hit = |entry_id: &str| entry_id == id || entry_id.starts_with(id);
        let meal_hits: Vec<usize> = positions(&self.meals, |m| hit(&m.id));
        let exercise_hits: Vec<usize> = positions(&self.exercises, |e| hit(&e.id));
        let weight_hits: Vec<usize> = positions(&self.weights, |w| hit(&w.id));

        let total = meal_hits.len() + exercise_hits.len() + weight_hits.len();
        if total == 0 {
            bail!("No entry with id '{id}'");
        }
        if total > 1 {
            bail!("Id '{id}' matches {total} entries, use a longer prefix");
        }

        let removed = if let Some(&i) = meal_hits.first() {
            RemovedEntry::Meal(self.meals.remove(i))
        } else if let Some(&i) = exercise_hits.first() {
            RemovedEntry::Exercise(self.exercises.remove(i))
        } else {
            let i = weight_hits[0];
            let entry = self.weights.remove(i);
            self.sync_profile_weight();
            RemovedEntry::Weight(entry)
        };
        debug!(kind = removed.kind(), id = removed.id(), "Removed entry");
        Ok(removed)
    }

    /// Body weight known at `at`: the latest weigh-in on or before it, else
    /// the profile weight.
    #[must_use]
    pub fn weight_at(&self, at: NaiveDateTime) -> Option<f64> {
        self.weights
            .iter()
            .filter(|w| w.timestamp <= at)
            .max_by_key(|w| w.timestamp)
            .map(|w| w.weight_kg)
            .or(self.profile.weight_kg)
    }

    #[must_use]
    pub fn latest_weight(&self) -> Option<&WeightEntry> {
        self.weights.iter().max_by_key(|w| w.timestamp)
    }

    /// Most recent weigh-ins first.
    #[must_use]
    pub fn weight_history(&self, limit: usize) -> Vec<&WeightEntry> {
        let mut history: Vec<&WeightEntry> = self.weights.iter().collect();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history.truncate(limit);
        history
    }

    #[must_use]
    pub fn buckets(&self, start: NaiveDate, end: NaiveDate) -> Vec<DayBucket> {
        bucket_by_day(&self.meals, &self.exercises, &self.weights, start, end)
    }

    #[must_use]
    pub fn daily_summary(&self, date: NaiveDate, today: NaiveDate) -> DailySummary {
        let bucket = self
            .buckets(date, date)
            .pop()
            .unwrap_or_else(|| DayBucket::empty(date));
        summarize_day(
            date,
            &bucket.meals,
            &bucket.exercises,
            bucket.weight.as_ref(),
            Some(&self.profile),
            today,
        )
    }

    /// Daily summaries for the `days` days ending on `end`, oldest first.
    #[must_use]
    pub fn history(&self, end: NaiveDate, days: u32, today: NaiveDate) -> Vec<DailySummary> {
        if days == 0 {
            return Vec::new();
        }
        let Some(start) = end.checked_sub_days(Days::new(u64::from(days - 1))) else {
            return Vec::new();
        };
        self.buckets(start, end)
            .iter()
            .map(|b| {
                summarize_day(
                    b.date,
                    &b.meals,
                    &b.exercises,
                    b.weight.as_ref(),
                    Some(&self.profile),
                    today,
                )
            })
            .collect()
    }

    /// Summary of a calendar month. For the month containing `today` the
    /// window stops at `today`; a month entirely in the future has no days.
    pub fn monthly_summary(&self, year: i32, month: u32, today: NaiveDate) -> Result<MonthlySummary> {
        let (start, month_end) = month_bounds(year, month)?;
        let end = month_end.min(today);
        let buckets = self.buckets(start, end);
        let (first, last) = first_and_last_weight(
            self.weights
                .iter()
                .filter(|w| (start..=end).contains(&w.timestamp.date())),
        );
        debug!(%start, %end, days = buckets.len(), "Summarizing month");
        Ok(summarize_month(&buckets, Some(&self.profile), first, last))
    }

    fn sync_profile_weight(&mut self) {
        if let Some(latest) = self.latest_weight() {
            self.profile.weight_kg = Some(latest.weight_kg);
        }
    }
}

fn positions<T>(list: &[T], pred: impl Fn(&T) -> bool) -> Vec<usize> {
    list.iter()
        .enumerate()
        .filter(|(_, item)| pred(item))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, ExerciseType, Gender, Intensity};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn meal(name: &str, calories: f64, ts: NaiveDateTime) -> NewMealEntry {
        NewMealEntry {
            name: name.to_string(),
            calories,
            protein_g: None,
            carbs_g: None,
            fat_g: None,
            timestamp: ts,
        }
    }

    fn run(minutes: f64, ts: NaiveDateTime, calories: Option<f64>) -> NewExerciseEntry {
        NewExerciseEntry {
            name: "Run".to_string(),
            duration_min: minutes,
            intensity: Intensity::Moderate,
            exercise_type: ExerciseType::Running,
            calories_burnt: calories,
            timestamp: ts,
        }
    }

    fn weigh(kg: f64, ts: NaiveDateTime) -> NewWeightEntry {
        NewWeightEntry {
            weight_kg: kg,
            timestamp: ts,
        }
    }

    fn complete_profile() -> Profile {
        Profile {
            height_cm: Some(175.0),
            age_years: Some(30),
            gender: Some(Gender::Male),
            activity_level: Some(ActivityLevel::Sedentary),
            ..Profile::default()
        }
    }

    #[test]
    fn test_add_meal_assigns_id_and_keeps_order() {
        let mut book = LogBook::new();
        let late = book.add_meal(meal("Dinner", 700.0, at(2, 19))).unwrap();
        let early = book.add_meal(meal(" Lunch ", 500.0, at(2, 12))).unwrap();
        assert!(!late.id.is_empty());
        assert_ne!(late.id, early.id);
        assert_eq!(early.name, "Lunch");
        let names: Vec<&str> = book.meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Lunch", "Dinner"]);
    }

    #[test]
    fn test_invalid_entries_rejected() {
        let mut book = LogBook::new();
        assert!(book.add_meal(meal("", 100.0, at(1, 8))).is_err());
        assert!(book.add_meal(meal("Toast", -5.0, at(1, 8))).is_err());
        assert!(book.add_exercise(run(0.0, at(1, 8), None)).is_err());
        assert!(book.add_weight(weigh(0.0, at(1, 8))).is_err());
        assert!(book.meals.is_empty() && book.exercises.is_empty() && book.weights.is_empty());
    }

    #[test]
    fn test_exercise_calories_derived_from_weight_at_time() {
        let mut book = LogBook::new();
        book.add_weight(weigh(70.0, at(1, 7))).unwrap();
        book.add_weight(weigh(90.0, at(3, 7))).unwrap();

        // 5.0 MET * 70 kg * 0.5 h
        let derived = book.add_exercise(run(30.0, at(2, 18), None)).unwrap();
        assert!((derived.calories_burnt - 175.0).abs() < f64::EPSILON);

        let explicit = book.add_exercise(run(30.0, at(2, 19), Some(321.0))).unwrap();
        assert!((explicit.calories_burnt - 321.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exercise_falls_back_to_profile_weight() {
        let mut book = LogBook::new();
        book.set_profile(Profile {
            weight_kg: Some(80.0),
            ..Profile::default()
        })
        .unwrap();
        let entry = book.add_exercise(run(60.0, at(1, 9), None)).unwrap();
        assert!((entry.calories_burnt - 400.0).abs() < f64::EPSILON);

        let mut empty = LogBook::new();
        let entry = empty.add_exercise(run(60.0, at(1, 9), None)).unwrap();
        assert!(entry.calories_burnt.abs() < f64::EPSILON);
    }

    #[test]
    fn test_profile_weight_follows_latest_weigh_in() {
        let mut book = LogBook::new();
        book.add_weight(weigh(72.0, at(5, 7))).unwrap();
        book.add_weight(weigh(74.0, at(1, 7))).unwrap();
        assert_eq!(book.profile.weight_kg, Some(72.0));

        let latest_id = book.latest_weight().unwrap().id.clone();
        book.remove(&latest_id).unwrap();
        assert_eq!(book.profile.weight_kg, Some(74.0));
    }

    #[test]
    fn test_remove_by_prefix() {
        let mut book = LogBook::new();
        let entry = book.add_meal(meal("Toast", 200.0, at(1, 8))).unwrap();
        let removed = book.remove(&entry.id[..8]).unwrap();
        assert_eq!(removed.kind(), "meal");
        assert_eq!(removed.id(), entry.id);
        assert!(book.meals.is_empty());
    }

    #[test]
    fn test_remove_errors() {
        let mut book = LogBook::new();
        book.meals.push(MealEntry {
            id: "abcd-1".to_string(),
            name: "A".to_string(),
            calories: 1.0,
            protein_g: None,
            carbs_g: None,
            fat_g: None,
            timestamp: at(1, 8),
        });
        book.weights.push(WeightEntry {
            id: "abcd-2".to_string(),
            weight_kg: 70.0,
            timestamp: at(1, 8),
        });
        assert!(book.remove("abc").unwrap_err().to_string().contains("at least"));
        assert!(book.remove("zzzz").unwrap_err().to_string().contains("No entry"));
        assert!(book.remove("abcd").unwrap_err().to_string().contains("matches 2"));
        assert_eq!(book.remove("abcd-2").unwrap().kind(), "weight");
    }

    #[test]
    fn test_set_profile_validates() {
        let mut book = LogBook::new();
        let bad = Profile {
            height_cm: Some(-1.0),
            ..Profile::default()
        };
        assert!(book.set_profile(bad).is_err());
        assert_eq!(book.profile, Profile::default());
    }

    #[test]
    fn test_daily_summary_uses_that_days_weight() {
        let mut book = LogBook::new();
        book.set_profile(complete_profile()).unwrap();
        book.add_weight(weigh(70.0, at(15, 7))).unwrap();
        book.add_meal(meal("Plate", 1800.0, at(15, 12))).unwrap();
        book.add_exercise(run(30.0, at(15, 18), None)).unwrap();

        let summary = book.daily_summary(date(15), date(15));
        assert_eq!(summary.total_calories_consumed, 1800);
        assert_eq!(summary.total_calories_burnt, 175);
        assert_eq!(summary.bmr, 1649);
        assert_eq!(summary.tdee, 1979);

        // no weigh-in that day: energy fields stay 0
        let other = book.daily_summary(date(16), date(16));
        assert_eq!(other.bmr, 0);
        assert!(other.goal.is_none());
    }

    #[test]
    fn test_history_window() {
        let mut book = LogBook::new();
        book.add_meal(meal("Oats", 300.0, at(10, 8))).unwrap();
        let history = book.history(date(10), 3, date(10));
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].date, date(8));
        assert_eq!(history[2].total_calories_consumed, 300);
        assert!(book.history(date(10), 0, date(10)).is_empty());
    }

    #[test]
    fn test_monthly_summary_stops_at_today() {
        let mut book = LogBook::new();
        book.add_meal(meal("Oats", 1000.0, at(1, 8))).unwrap();
        book.add_meal(meal("Oats", 2000.0, at(10, 8))).unwrap();

        let partial = book.monthly_summary(2024, 6, date(10)).unwrap();
        assert_eq!(partial.day_count, 10);
        assert_eq!(partial.avg_calories_consumed, 300);
        assert_eq!(partial.days_tracked, 2);

        let full = book.monthly_summary(2024, 6, date(30)).unwrap();
        assert_eq!(full.day_count, 30);
        assert_eq!(full.avg_calories_consumed, 100);

        let future = book.monthly_summary(2024, 7, date(30)).unwrap();
        assert_eq!(future.day_count, 0);
        assert!(book.monthly_summary(2024, 13, date(30)).is_err());
    }

    #[test]
    fn test_monthly_weight_change_uses_every_weigh_in() {
        let mut book = LogBook::new();
        book.add_weight(weigh(80.0, at(1, 7))).unwrap();
        book.add_weight(weigh(81.0, at(1, 20))).unwrap();
        book.add_weight(weigh(79.0, at(30, 7))).unwrap();
        let july = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        book.add_weight(weigh(85.0, july.and_hms_opt(7, 0, 0).unwrap())).unwrap();

        let summary = book.monthly_summary(2024, 6, date(30)).unwrap();
        assert_eq!(summary.first_weight_kg, Some(80.0));
        assert_eq!(summary.last_weight_kg, Some(79.0));
        assert!((summary.weight_change_kg + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_history_newest_first() {
        let mut book = LogBook::new();
        book.add_weight(weigh(71.0, at(1, 7))).unwrap();
        book.add_weight(weigh(70.5, at(3, 7))).unwrap();
        book.add_weight(weigh(70.8, at(2, 7))).unwrap();
        let history: Vec<f64> = book.weight_history(2).iter().map(|w| w.weight_kg).collect();
        assert_eq!(history, vec![70.5, 70.8]);
    }

    #[test]
    fn test_serde_round_trip_keeps_entries() {
        let mut book = LogBook::new();
        book.set_profile(complete_profile()).unwrap();
        book.add_meal(meal("Toast", 200.0, at(1, 8))).unwrap();
        book.add_exercise(run(20.0, at(1, 9), Some(150.0))).unwrap();
        let json = serde_json::to_string(&book).unwrap();
        let back: LogBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);

        let empty: LogBook = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, LogBook::default());
    }
}
