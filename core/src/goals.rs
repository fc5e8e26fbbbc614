//! Calorie target resolution from BMI or from a dated weight goal.

use chrono::NaiveDate;
use serde::Serialize;

use crate::energy::KCAL_PER_KG;

/// Hard floor for targets derived from a dated weight goal.
pub const MIN_TARGET_CALORIES: f64 = 1200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    Gain,
    Maintain,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalRate {
    Slow,
    Moderate,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub direction: GoalDirection,
    pub rate: GoalRate,
}

/// `weight / (height in m)²`. Not guarded: a zero height gives infinity.
#[must_use]
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Maps a BMI onto a goal. NaN and infinite values land in the last branch.
#[must_use]
pub fn resolve_goal_from_bmi(bmi: f64) -> Goal {
    let (direction, rate) = if bmi < 18.5 {
        (GoalDirection::Gain, GoalRate::Moderate)
    } else if bmi < 25.0 {
        (GoalDirection::Maintain, GoalRate::Moderate)
    } else if bmi < 30.0 {
        (GoalDirection::Loss, GoalRate::Moderate)
    } else {
        (GoalDirection::Loss, GoalRate::Fast)
    };
    Goal { direction, rate }
}

/// Daily kcal adjustment applied on top of TDEE.
#[must_use]
pub fn calorie_adjustment(goal: Goal) -> f64 {
    let step = match goal.rate {
        GoalRate::Slow => 250.0,
        GoalRate::Moderate => 500.0,
        GoalRate::Fast => 750.0,
    };
    match goal.direction {
        GoalDirection::Loss => -step,
        GoalDirection::Maintain => 0.0,
        GoalDirection::Gain => step,
    }
}

#[must_use]
pub fn target_calories_from_bmi(weight_kg: f64, height_cm: f64, tdee: f64) -> f64 {
    let goal = resolve_goal_from_bmi(bmi(weight_kg, height_cm));
    (tdee + calorie_adjustment(goal)).round()
}

/// Whole calendar days from `today` until `target_date` (negative when past).
#[must_use]
pub fn days_until(target_date: NaiveDate, today: NaiveDate) -> i64 {
    (target_date - today).num_days()
}

/// Target that reaches `target_weight_kg` by `target_date`, floored at
/// [`MIN_TARGET_CALORIES`].
///
/// Without a usable goal (missing weight or date, or a date that is not
/// strictly after `today`) this falls back to the BMI heuristic called with a
/// height of 0. That yields an infinite BMI and therefore the loss/fast
/// adjustment; the fallback result is not floored.
#[must_use]
pub fn target_calories_from_weight_goal(
    current_weight_kg: f64,
    target_weight_kg: Option<f64>,
    target_date: Option<NaiveDate>,
    tdee: f64,
    today: NaiveDate,
) -> f64 {
    let (Some(target_weight), Some(target_date)) = (target_weight_kg, target_date) else {
        return target_calories_from_bmi(current_weight_kg, 0.0, tdee);
    };
    if target_date <= today {
        return target_calories_from_bmi(current_weight_kg, 0.0, tdee);
    }

    #[allow(clippy::cast_precision_loss)]
    let days = days_until(target_date, today) as f64;
    let required_daily_delta = (target_weight - current_weight_kg) * KCAL_PER_KG / days;
    (tdee + required_daily_delta).round().max(MIN_TARGET_CALORIES)
}
