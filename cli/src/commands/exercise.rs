use anyhow::Result;

use kcal_core::models::{ExerciseType, Intensity, NewExerciseEntry};

use super::helpers::{parse_at, short_id};
use crate::store::Store;

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_exercise_add(
    store: &Store,
    name: &str,
    minutes: f64,
    intensity: &str,
    exercise_type: &str,
    calories: Option<f64>,
    at: Option<String>,
    json: bool,
) -> Result<()> {
    let intensity = Intensity::from(intensity);
    if intensity == Intensity::Unknown {
        eprintln!("Note: unknown intensity, using moderate MET values");
    }
    let exercise_type = ExerciseType::from(exercise_type);

    let mut book = store.load()?;
    let timestamp = parse_at(at)?;
    if calories.is_none() && book.weight_at(timestamp).is_none() {
        eprintln!("Note: no body weight on record, calories burnt set to 0. Use `kcal weight log` first.");
    }

    let entry = book.add_exercise(NewExerciseEntry {
        name: name.to_string(),
        duration_min: minutes,
        intensity,
        exercise_type,
        calories_burnt: calories,
        timestamp,
    })?;
    store.save(&book)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "[{}] Logged {} ({:.0} min, {} {}) burning {:.0} kcal at {}",
            short_id(&entry.id),
            entry.name,
            entry.duration_min,
            entry.intensity.as_str(),
            entry.exercise_type.as_str(),
            entry.calories_burnt,
            entry.timestamp.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
