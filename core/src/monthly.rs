//! Roll a run of day buckets into a monthly summary.
//!
//! Two sign conventions meet here. The daily summary reports
//! `calorie_target - net_calories`, while the theoretical monthly change is
//! driven by `avg_burnt - avg_consumed`: positive when more was burnt than
//! eaten. Both are reported values and are kept as they are.

use std::collections::HashMap;

use tracing::debug;

use crate::buckets::DayBucket;
use crate::daily::DayTotals;
use crate::energy::{compute_bmr, compute_tdee, estimate_weight_change_kg, round_to, whole};
use crate::models::{MonthlySummary, NameCount, Profile, WeightEntry};

/// How many names the frequency rankings keep.
pub const TOP_NAMES: usize = 3;

/// Agreement between an observed and a predicted weight change, 0-100.
///
/// A zero prediction always scores 100. Changes in opposite directions score
/// 0; otherwise the smaller magnitude is divided by the larger.
#[must_use]
pub fn accuracy_index(actual: f64, theoretical: f64) -> u8 {
    if theoretical == 0.0 {
        return 100;
    }
    let same_sign = (actual >= 0.0 && theoretical >= 0.0) || (actual <= 0.0 && theoretical <= 0.0);
    if !same_sign {
        return 0;
    }
    let (a, t) = (actual.abs(), theoretical.abs());
    let ratio = a.min(t) / a.max(t);
    #[allow(clippy::cast_sign_loss)]
    let score = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
    score
}

/// Count names in first-seen order and return the `limit` most frequent.
/// Ties keep first-seen order.
#[must_use]
pub fn most_common<'a, I>(names: I, limit: usize) -> Vec<NameCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<NameCount> = Vec::new();
    for name in names {
        if let Some(&i) = index.get(name) {
            counts[i].count += 1;
        } else {
            index.insert(name, counts.len());
            counts.push(NameCount {
                name: name.to_string(),
                count: 1,
            });
        }
    }
    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Chronologically earliest and latest of the given weigh-ins. Pass every
/// entry of the period, not the per-day buckets, which keep only the last
/// weigh-in of each day.
#[must_use]
pub fn first_and_last_weight<'a, I>(weights: I) -> (Option<&'a WeightEntry>, Option<&'a WeightEntry>)
where
    I: IntoIterator<Item = &'a WeightEntry>,
{
    let mut first: Option<&WeightEntry> = None;
    let mut last: Option<&WeightEntry> = None;
    for weight in weights {
        if first.is_none_or(|f| weight.timestamp < f.timestamp) {
            first = Some(weight);
        }
        if last.is_none_or(|l| weight.timestamp >= l.timestamp) {
            last = Some(weight);
        }
    }
    (first, last)
}

/// Aggregate the buckets of a period.
///
/// Averages divide by the number of buckets (at least 1), so days with no
/// entries pull the averages down. `first_weight`/`last_weight` are usually
/// the result of [`first_and_last_weight`].
#[must_use]
pub fn summarize_month(
    buckets: &[DayBucket],
    profile: Option<&Profile>,
    first_weight: Option<&WeightEntry>,
    last_weight: Option<&WeightEntry>,
) -> MonthlySummary {
    let day_count = buckets.len();
    #[allow(clippy::cast_precision_loss)]
    let divisor = day_count.max(1) as f64;

    let mut totals = DayTotals::default();
    for bucket in buckets {
        totals.add(&DayTotals::from_entries(&bucket.meals, &bucket.exercises));
    }

    let avg_consumed = totals.calories_consumed / divisor;
    let avg_burnt = totals.calories_burnt / divisor;

    let weight_change = match (first_weight, last_weight) {
        (Some(first), Some(last)) => last.weight_kg - first.weight_kg,
        _ => 0.0,
    };
    #[allow(clippy::cast_precision_loss)]
    let theoretical = estimate_weight_change_kg(avg_burnt - avg_consumed, day_count as f64);
    let accuracy = accuracy_index(weight_change, theoretical);

    let meal_names = buckets
        .iter()
        .flat_map(|b| b.meals.iter().map(|m| m.name.as_str()));
    let exercise_names = buckets
        .iter()
        .flat_map(|b| b.exercises.iter().map(|e| e.name.as_str()));

    let (bmr, tdee) = match (profile.and_then(Profile::body_metrics), last_weight) {
        (Some(metrics), Some(weight)) => {
            let bmr = compute_bmr(
                weight.weight_kg,
                metrics.height_cm,
                metrics.age_years,
                Some(metrics.gender),
            );
            (bmr, compute_tdee(bmr, Some(metrics.activity_level)))
        }
        _ => (0.0, 0.0),
    };

    debug!(
        day_count,
        weight_change, theoretical, accuracy, "Summarized period"
    );

    MonthlySummary {
        period_start: buckets.first().map(|b| b.date),
        period_end: buckets.last().map(|b| b.date),
        day_count,
        days_tracked: buckets.iter().filter(|b| !b.is_empty()).count(),
        avg_calories_consumed: whole(avg_consumed),
        avg_calories_burnt: whole(avg_burnt),
        avg_net_calories: whole(totals.net() / divisor),
        avg_protein_g: whole(totals.protein_g / divisor),
        avg_carbs_g: whole(totals.carbs_g / divisor),
        avg_fat_g: whole(totals.fat_g / divisor),
        avg_exercise_min: whole(totals.exercise_min / divisor),
        first_weight_kg: first_weight.map(|w| w.weight_kg),
        last_weight_kg: last_weight.map(|w| w.weight_kg),
        weight_change_kg: round_to(weight_change, 1),
        theoretical_weight_change_kg: round_to(theoretical, 2),
        accuracy_index: accuracy,
        most_common_meals: most_common(meal_names, TOP_NAMES),
        most_common_exercises: most_common(exercise_names, TOP_NAMES),
        bmr: whole(bmr),
        tdee: whole(tdee),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckets::bucket_by_day;
    use crate::models::{
        ActivityLevel, ExerciseEntry, ExerciseType, Gender, Intensity, MealEntry,
    };
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, 0, 0).unwrap()
    }

    fn meal(name: &str, calories: f64, d: u32) -> MealEntry {
        MealEntry {
            id: String::new(),
            name: name.to_string(),
            calories,
            protein_g: Some(10.0),
            carbs_g: Some(20.0),
            fat_g: Some(5.0),
            timestamp: ts(d, 12),
        }
    }

    fn exercise(name: &str, calories: f64, d: u32) -> ExerciseEntry {
        ExerciseEntry {
            id: String::new(),
            name: name.to_string(),
            calories_burnt: calories,
            duration_min: 40.0,
            intensity: Intensity::Moderate,
            exercise_type: ExerciseType::General,
            timestamp: ts(d, 18),
        }
    }

    fn weight(kg: f64, d: u32) -> WeightEntry {
        WeightEntry {
            id: String::new(),
            weight_kg: kg,
            timestamp: ts(d, 7),
        }
    }

    #[test]
    fn test_accuracy_index_examples() {
        assert_eq!(accuracy_index(2.0, 2.0), 100);
        assert_eq!(accuracy_index(-1.0, 2.0), 0);
        assert_eq!(accuracy_index(0.0, 0.0), 100);
        assert_eq!(accuracy_index(1.0, 2.0), 50);
        assert_eq!(accuracy_index(-3.0, -1.0), 33);
        assert_eq!(accuracy_index(5.0, 0.0), 100);
        // zero actual against a non-zero prediction shares the sign
        assert_eq!(accuracy_index(0.0, -1.5), 0);
    }

    #[test]
    fn test_most_common_ties_keep_first_seen_order() {
        let names = ["Eggs", "Toast", "Salad", "Toast", "Soup", "Eggs", "Rice"];
        let top = most_common(names, 3);
        let got: Vec<(&str, usize)> = top.iter().map(|n| (n.name.as_str(), n.count)).collect();
        assert_eq!(got, vec![("Eggs", 2), ("Toast", 2), ("Salad", 1)]);
    }

    #[test]
    fn test_most_common_fewer_than_limit() {
        let top = most_common(["Run"], 3);
        assert_eq!(top.len(), 1);
        assert!(most_common(std::iter::empty(), 3).is_empty());
    }

    #[test]
    fn test_averages_count_empty_days() {
        let meals = vec![meal("Oats", 2000.0, 1), meal("Oats", 1000.0, 2)];
        let exercises = vec![exercise("Run", 600.0, 1)];
        let buckets = bucket_by_day(&meals, &exercises, &[], date(1), date(4));
        let summary = summarize_month(&buckets, None, None, None);

        assert_eq!(summary.day_count, 4);
        assert_eq!(summary.days_tracked, 2);
        assert_eq!(summary.avg_calories_consumed, 750);
        assert_eq!(summary.avg_calories_burnt, 150);
        assert_eq!(summary.avg_net_calories, 600);
        assert_eq!(summary.avg_protein_g, 5);
        assert_eq!(summary.avg_carbs_g, 10);
        assert_eq!(summary.avg_fat_g, 3);
        assert_eq!(summary.avg_exercise_min, 10);
        assert_eq!(summary.period_start, Some(date(1)));
        assert_eq!(summary.period_end, Some(date(4)));
    }

    #[test]
    fn test_no_buckets() {
        let summary = summarize_month(&[], None, None, None);
        assert_eq!(summary.day_count, 0);
        assert_eq!(summary.avg_calories_consumed, 0);
        assert!(summary.theoretical_weight_change_kg.abs() < f64::EPSILON);
        assert_eq!(summary.accuracy_index, 100);
        assert!(summary.period_start.is_none());
    }

    #[test]
    fn test_theoretical_change_uses_burnt_minus_consumed() {
        // 10 days eating 2000 and burning 2770: +770/day * 10 / 7700 = +1.0
        let mut meals = Vec::new();
        let mut exercises = Vec::new();
        for d in 1..=10 {
            meals.push(meal("Plate", 2000.0, d));
            exercises.push(exercise("Bike", 2770.0, d));
        }
        let weights = vec![weight(80.0, 1), weight(79.0, 10)];
        let buckets = bucket_by_day(&meals, &exercises, &weights, date(1), date(10));
        let (first, last) = first_and_last_weight(&weights);
        let summary = summarize_month(&buckets, None, first, last);

        assert!((summary.theoretical_weight_change_kg - 1.0).abs() < 1e-9);
        assert!((summary.weight_change_kg + 1.0).abs() < 1e-9);
        // observed loss vs positive prediction: opposite signs
        assert_eq!(summary.accuracy_index, 0);
    }

    #[test]
    fn test_weight_change_and_accuracy() {
        let meals: Vec<MealEntry> = (1..=10).map(|d| meal("Plate", 1500.0, d)).collect();
        let exercises: Vec<ExerciseEntry> = (1..=10).map(|d| exercise("Walk", 1500.0, d)).collect();
        let weights = vec![weight(70.0, 3), weight(70.5, 1), weight(71.2, 9)];
        let buckets = bucket_by_day(&meals, &exercises, &weights, date(1), date(10));
        let (first, last) = first_and_last_weight(&weights);

        assert!((first.unwrap().weight_kg - 70.5).abs() < f64::EPSILON);
        assert!((last.unwrap().weight_kg - 71.2).abs() < f64::EPSILON);

        let summary = summarize_month(&buckets, None, first, last);
        assert!((summary.weight_change_kg - 0.7).abs() < 1e-9);
        assert!(summary.theoretical_weight_change_kg.abs() < f64::EPSILON);
        assert_eq!(summary.accuracy_index, 100);
    }

    #[test]
    fn test_missing_weights_give_zero_change() {
        let weights = [weight(70.0, 1)];
        let buckets = bucket_by_day(&[meal("Oats", 400.0, 1)], &[], &weights, date(1), date(3));
        let (first, _) = first_and_last_weight(&weights);
        let summary = summarize_month(&buckets, None, first, None);
        assert!(summary.weight_change_kg.abs() < f64::EPSILON);
        assert_eq!(summary.first_weight_kg, Some(70.0));
        assert!(summary.last_weight_kg.is_none());
    }

    #[test]
    fn test_rankings_across_days() {
        let meals = vec![
            meal("Oats", 300.0, 1),
            meal("Salad", 400.0, 1),
            meal("Oats", 300.0, 2),
            meal("Curry", 700.0, 2),
            meal("Salad", 400.0, 3),
            meal("Oats", 300.0, 3),
            meal("Pizza", 900.0, 3),
        ];
        let exercises = vec![exercise("Run", 300.0, 1), exercise("Swim", 300.0, 2)];
        let buckets = bucket_by_day(&meals, &exercises, &[], date(1), date(3));
        let summary = summarize_month(&buckets, None, None, None);

        let meal_names: Vec<&str> = summary
            .most_common_meals
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(meal_names, vec!["Oats", "Salad", "Curry"]);
        assert_eq!(summary.most_common_meals[0].count, 3);
        assert_eq!(summary.most_common_exercises.len(), 2);
        assert_eq!(summary.most_common_exercises[0].name, "Run");
    }

    #[test]
    fn test_profile_baseline_from_last_weight() {
        let profile = Profile {
            height_cm: Some(175.0),
            age_years: Some(30),
            gender: Some(Gender::Male),
            activity_level: Some(ActivityLevel::Sedentary),
            ..Profile::default()
        };
        let weights = [weight(72.0, 1), weight(70.0, 2)];
        let buckets = bucket_by_day(&[], &[], &weights, date(1), date(2));
        let (first, last) = first_and_last_weight(&weights);
        let summary = summarize_month(&buckets, Some(&profile), first, last);
        assert_eq!(summary.bmr, 1649);
        assert_eq!(summary.tdee, 1979);

        let without = summarize_month(&buckets, None, first, last);
        assert_eq!(without.bmr, 0);
        assert_eq!(without.tdee, 0);
    }
}
