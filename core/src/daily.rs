use chrono::NaiveDate;
use tracing::debug;

use crate::energy::{
    compute_bmr, compute_tdee, estimate_weight_change_kg, net_calories, round_to, whole,
};
use crate::goals::{days_until, target_calories_from_bmi, target_calories_from_weight_goal};
use crate::models::{DailySummary, ExerciseEntry, GoalProgress, MealEntry, Profile, WeightEntry};

/// Raw (unrounded) sums over a set of meals and exercises.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayTotals {
    pub calories_consumed: f64,
    pub calories_burnt: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub exercise_min: f64,
}

impl DayTotals {
    #[must_use]
    pub fn from_entries(meals: &[MealEntry], exercises: &[ExerciseEntry]) -> Self {
        let mut totals = Self::default();
        for meal in meals {
            totals.calories_consumed += meal.calories;
            totals.protein_g += meal.protein_g.unwrap_or(0.0);
            totals.carbs_g += meal.carbs_g.unwrap_or(0.0);
            totals.fat_g += meal.fat_g.unwrap_or(0.0);
        }
        for exercise in exercises {
            totals.calories_burnt += exercise.calories_burnt;
            totals.exercise_min += exercise.duration_min;
        }
        totals
    }

    pub fn add(&mut self, other: &Self) {
        self.calories_consumed += other.calories_consumed;
        self.calories_burnt += other.calories_burnt;
        self.protein_g += other.protein_g;
        self.carbs_g += other.carbs_g;
        self.fat_g += other.fat_g;
        self.exercise_min += other.exercise_min;
    }

    #[must_use]
    pub fn net(&self) -> f64 {
        net_calories(self.calories_consumed, self.calories_burnt)
    }
}

/// Energy figures that need a complete profile plus a weigh-in.
struct EnergyPlan {
    bmr: f64,
    tdee: f64,
    calorie_target: f64,
    goal: GoalProgress,
}

fn plan_energy(profile: &Profile, weight_kg: f64, today: NaiveDate) -> Option<EnergyPlan> {
    let metrics = profile.body_metrics()?;

    let bmr = compute_bmr(
        weight_kg,
        metrics.height_cm,
        metrics.age_years,
        Some(metrics.gender),
    );
    let tdee = compute_tdee(bmr, Some(metrics.activity_level));

    let calorie_target = if profile.target_weight_kg.is_some() && profile.target_date.is_some() {
        target_calories_from_weight_goal(
            weight_kg,
            profile.target_weight_kg,
            profile.target_date,
            tdee,
            today,
        )
    } else {
        target_calories_from_bmi(weight_kg, metrics.height_cm, tdee)
    };

    let days_until_target = profile
        .target_date
        .map(|target| days_until(target, today).max(0));

    Some(EnergyPlan {
        bmr,
        tdee,
        calorie_target,
        goal: GoalProgress {
            target_weight_kg: profile.target_weight_kg,
            current_weight_kg: weight_kg,
            target_date: profile.target_date,
            days_until_target,
        },
    })
}

/// Build the summary for one calendar day.
///
/// `today` drives the days-until-target countdown and the weight-goal
/// deadline check. With the same inputs the output is identical.
#[must_use]
pub fn summarize_day(
    date: NaiveDate,
    meals: &[MealEntry],
    exercises: &[ExerciseEntry],
    weight: Option<&WeightEntry>,
    profile: Option<&Profile>,
    today: NaiveDate,
) -> DailySummary {
    let totals = DayTotals::from_entries(meals, exercises);
    let net = totals.net();

    let plan = match (profile, weight) {
        (Some(profile), Some(weight)) => plan_energy(profile, weight.weight_kg, today),
        _ => None,
    };

    let (bmr, tdee, calorie_target, calorie_deficit, estimate, goal) = match plan {
        Some(plan) => {
            let deficit = plan.calorie_target - net;
            let estimate = round_to(estimate_weight_change_kg(deficit, 1.0), 3);
            (
                plan.bmr,
                plan.tdee,
                plan.calorie_target,
                deficit,
                estimate,
                Some(plan.goal),
            )
        }
        None => (0.0, 0.0, 0.0, 0.0, 0.0, None),
    };

    debug!(
        %date,
        meals = meals.len(),
        exercises = exercises.len(),
        has_plan = goal.is_some(),
        "Summarized day"
    );

    DailySummary {
        date,
        total_calories_consumed: whole(totals.calories_consumed),
        total_calories_burnt: whole(totals.calories_burnt),
        net_calories: whole(net),
        total_protein_g: whole(totals.protein_g),
        total_carbs_g: whole(totals.carbs_g),
        total_fat_g: whole(totals.fat_g),
        total_exercise_min: whole(totals.exercise_min),
        meal_count: meals.len(),
        exercise_count: exercises.len(),
        weight_kg: weight.map(|w| w.weight_kg),
        bmr: whole(bmr),
        tdee: whole(tdee),
        calorie_target: whole(calorie_target),
        calorie_deficit: whole(calorie_deficit),
        estimated_daily_weight_change_kg: estimate,
        goal,
    }
}
