//! Energy formulas: BMR, TDEE, MET-based exercise burn and weight projection.
//!
//! Every function here is total. Missing or degenerate inputs (zero, NaN,
//! infinity) produce 0 instead of an error so the summarizers can always
//! return a record.

use crate::models::{ActivityLevel, ExerciseType, Gender, Intensity};

/// Energy density of body fat (kcal per kg), used for gains and losses alike.
pub const KCAL_PER_KG: f64 = 7700.0;

fn usable(value: f64) -> bool {
    value.is_finite() && value != 0.0
}

/// Calculates Basal Metabolic Rate with the Mifflin-St Jeor equation.
///
/// ```text
/// BMR = 10 × weight + 6.25 × height − 5 × age + s
/// s = +5 for male, −161 otherwise
/// ```
///
/// Female, other and unknown genders all take the −161 branch.
#[must_use]
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: Option<Gender>) -> f64 {
    let Some(gender) = gender else {
        return 0.0;
    };
    if !usable(weight_kg) || !usable(height_cm) || age_years == 0 {
        return 0.0;
    }
    let offset = if gender == Gender::Male { 5.0 } else { -161.0 };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years) + offset
}

/// Total Daily Energy Expenditure: `round(bmr × activity multiplier)`.
#[must_use]
pub fn compute_tdee(bmr: f64, activity_level: Option<ActivityLevel>) -> f64 {
    match activity_level {
        Some(level) if usable(bmr) => (bmr * level.multiplier()).round(),
        _ => 0.0,
    }
}

/// MET value for an intensity/type pair.
///
/// Types without their own row (running, other) use the general row, and an
/// unknown intensity reads the moderate column.
#[must_use]
pub fn met_value(intensity: Intensity, exercise_type: ExerciseType) -> f64 {
    // (low, moderate, high)
    let row = match exercise_type {
        ExerciseType::Walking => (2.5, 3.5, 5.0),
        ExerciseType::Cycling => (4.0, 6.8, 10.0),
        ExerciseType::Swimming => (5.0, 7.0, 10.0),
        ExerciseType::Strength => (3.0, 5.0, 6.0),
        ExerciseType::General | ExerciseType::Running | ExerciseType::Other => (3.5, 5.0, 8.0),
    };
    match intensity {
        Intensity::Low => row.0,
        Intensity::Moderate | Intensity::Unknown => row.1,
        Intensity::High => row.2,
    }
}

/// Calories burnt by an exercise: `round(MET × weight × hours)`.
#[must_use]
pub fn compute_exercise_calories(
    weight_kg: f64,
    duration_min: f64,
    intensity: Intensity,
    exercise_type: ExerciseType,
) -> f64 {
    if !usable(weight_kg) || !usable(duration_min) {
        return 0.0;
    }
    (met_value(intensity, exercise_type) * weight_kg * (duration_min / 60.0)).round()
}

#[must_use]
pub fn net_calories(consumed: f64, burnt: f64) -> f64 {
    consumed - burnt
}

/// Projected body-weight change for a constant daily energy balance.
#[must_use]
pub fn estimate_weight_change_kg(net_calories_per_day: f64, days: f64) -> f64 {
    net_calories_per_day * days / KCAL_PER_KG
}

/// Rounds to `places` decimals, normalising `-0.0` to `0.0`.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Whole-number calories for summary output.
#[must_use]
pub fn whole(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}
