use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// --- Profile enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[serde(other)]
    Other,
}

impl Gender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl Gender {
    /// Case-insensitive parse. A blank value means no gender was given;
    /// anything unrecognised is `Other`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" => None,
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            _ => Some(Self::Other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
    #[serde(other)]
    Unknown,
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR. Unknown levels use the sedentary factor.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary | Self::Unknown => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very_active",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for ActivityLevel {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Self::Sedentary,
            "light" | "lightly_active" => Self::Light,
            "moderate" | "moderately_active" => Self::Moderate,
            "active" => Self::Active,
            "very_active" => Self::VeryActive,
            _ => Self::Unknown,
        }
    }
}

// --- Exercise enums ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    #[default]
    Moderate,
    High,
    #[serde(other)]
    Unknown,
}

impl Intensity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for Intensity {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "moderate" | "" => Self::Moderate,
            "high" => Self::High,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    #[default]
    General,
    Walking,
    Cycling,
    Swimming,
    Strength,
    Running,
    #[serde(other)]
    Other,
}

impl ExerciseType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
            Self::Swimming => "swimming",
            Self::Strength => "strength",
            Self::Running => "running",
            Self::Other => "other",
        }
    }
}

impl From<&str> for ExerciseType {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "general" | "" => Self::General,
            "walking" => Self::Walking,
            "cycling" => Self::Cycling,
            "swimming" => Self::Swimming,
            "strength" => Self::Strength,
            "running" => Self::Running,
            _ => Self::Other,
        }
    }
}

// --- Profile ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    /// Latest known body weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
}

/// The subset of a profile needed for BMR/TDEE.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub height_cm: f64,
    pub age_years: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl Profile {
    /// Returns the energy inputs only when height, age, gender and activity
    /// level are all present.
    #[must_use]
    pub fn body_metrics(&self) -> Option<BodyMetrics> {
        Some(BodyMetrics {
            height_cm: self.height_cm?,
            age_years: self.age_years?,
            gender: self.gender?,
            activity_level: self.activity_level?,
        })
    }
}

// --- Log entries ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub calories_burnt: f64,
    pub duration_min: f64,
    #[serde(default)]
    pub intensity: Intensity,
    #[serde(default)]
    pub exercise_type: ExerciseType,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    #[serde(default)]
    pub id: String,
    pub weight_kg: f64,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMealEntry {
    pub name: String,
    pub calories: f64,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub timestamp: NaiveDateTime,
}

/// Exercise as entered by the user. `calories_burnt` is derived from the
/// MET table when left empty.
#[derive(Debug, Clone)]
pub struct NewExerciseEntry {
    pub name: String,
    pub duration_min: f64,
    pub intensity: Intensity,
    pub exercise_type: ExerciseType,
    pub calories_burnt: Option<f64>,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewWeightEntry {
    pub weight_kg: f64,
    pub timestamp: NaiveDateTime,
}

// --- Derived summaries ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    pub current_weight_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_target: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calories_consumed: i64,
    pub total_calories_burnt: i64,
    pub net_calories: i64,
    pub total_protein_g: i64,
    pub total_carbs_g: i64,
    pub total_fat_g: i64,
    pub total_exercise_min: i64,
    pub meal_count: usize,
    pub exercise_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub bmr: i64,
    pub tdee: i64,
    pub calorie_target: i64,
    pub calorie_deficit: i64,
    pub estimated_daily_weight_change_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    pub day_count: usize,
    pub days_tracked: usize,
    pub avg_calories_consumed: i64,
    pub avg_calories_burnt: i64,
    pub avg_net_calories: i64,
    pub avg_protein_g: i64,
    pub avg_carbs_g: i64,
    pub avg_fat_g: i64,
    pub avg_exercise_min: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_weight_kg: Option<f64>,
    pub weight_change_kg: f64,
    pub theoretical_weight_change_kg: f64,
    pub accuracy_index: u8,
    pub most_common_meals: Vec<NameCount>,
    pub most_common_exercises: Vec<NameCount>,
    pub bmr: i64,
    pub tdee: i64,
}

// --- Validation ---

fn check_non_negative(field: &str, value: Option<f64>) -> Result<()> {
    if value.is_some_and(|v| !(v.is_finite() && v >= 0.0)) {
        bail!("{field} must be a non-negative number");
    }
    Ok(())
}

fn check_positive(field: &str, value: Option<f64>) -> Result<()> {
    if value.is_some_and(|v| !(v.is_finite() && v > 0.0)) {
        bail!("{field} must be greater than 0");
    }
    Ok(())
}

/// Validate a new meal: name must not be empty, calories and macros must not be negative.
pub fn validate_meal(meal: &NewMealEntry) -> Result<()> {
    if meal.name.trim().is_empty() {
        bail!("Meal name must not be empty");
    }
    check_non_negative("calories", Some(meal.calories))?;
    check_non_negative("protein_g", meal.protein_g)?;
    check_non_negative("carbs_g", meal.carbs_g)?;
    check_non_negative("fat_g", meal.fat_g)?;
    Ok(())
}

/// Validate a new exercise: name, positive duration, non-negative calories if given.
pub fn validate_exercise(exercise: &NewExerciseEntry) -> Result<()> {
    if exercise.name.trim().is_empty() {
        bail!("Exercise name must not be empty");
    }
    check_positive("duration_min", Some(exercise.duration_min))?;
    check_non_negative("calories_burnt", exercise.calories_burnt)?;
    Ok(())
}

pub fn validate_weight(entry: &NewWeightEntry) -> Result<()> {
    check_positive("weight_kg", Some(entry.weight_kg))
}

/// Validate profile numbers that are present. Missing fields are allowed.
pub fn validate_profile(profile: &Profile) -> Result<()> {
    check_positive("height_cm", profile.height_cm)?;
    check_positive("weight_kg", profile.weight_kg)?;
    check_positive("target_weight_kg", profile.target_weight_kg)?;
    if profile.age_years == Some(0) {
        bail!("age_years must be greater than 0");
    }
    Ok(())
}
