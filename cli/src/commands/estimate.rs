use anyhow::{Context, Result, bail};

use kcal_core::energy::{compute_bmr, compute_exercise_calories, compute_tdee, met_value, whole};
use kcal_core::models::{ActivityLevel, ExerciseType, Gender, Intensity, Profile};

use crate::store::Store;

/// Body inputs for `kcal estimate bmr|tdee`. Missing values come from the
/// stored profile.
pub(crate) struct BodyArgs {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age_years: Option<u32>,
    pub gender: Option<String>,
}

#[derive(Debug)]
struct Body {
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    gender: Gender,
}

fn resolve_body(args: BodyArgs, profile: &Profile) -> Result<Body> {
    Ok(Body {
        weight_kg: args
            .weight_kg
            .or(profile.weight_kg)
            .context("Weight is required (--weight or `kcal weight log`)")?,
        height_cm: args
            .height_cm
            .or(profile.height_cm)
            .context("Height is required (--height or `kcal profile set --height`)")?,
        age_years: args
            .age_years
            .or(profile.age_years)
            .context("Age is required (--age or `kcal profile set --age`)")?,
        gender: args
            .gender
            .as_deref()
            .and_then(Gender::parse)
            .or(profile.gender)
            .context("Gender is required (--gender or `kcal profile set --gender`)")?,
    })
}

fn bmr_of(body: &Body) -> Result<f64> {
    let bmr = compute_bmr(body.weight_kg, body.height_cm, body.age_years, Some(body.gender));
    if bmr <= 0.0 {
        bail!("Weight, height and age must all be greater than 0");
    }
    Ok(bmr)
}

pub(crate) fn cmd_estimate_bmr(store: &Store, args: BodyArgs, json: bool) -> Result<()> {
    let book = store.load()?;
    let body = resolve_body(args, &book.profile)?;
    let bmr = bmr_of(&body)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "weight_kg": body.weight_kg,
                "height_cm": body.height_cm,
                "age_years": body.age_years,
                "gender": body.gender,
                "bmr": bmr,
            })
        );
    } else {
        println!("BMR: {} kcal/day", whole(bmr));
    }
    Ok(())
}

pub(crate) fn cmd_estimate_tdee(
    store: &Store,
    args: BodyArgs,
    activity: Option<String>,
    json: bool,
) -> Result<()> {
    let book = store.load()?;
    let body = resolve_body(args, &book.profile)?;
    let activity = activity
        .as_deref()
        .map(ActivityLevel::from)
        .or(book.profile.activity_level)
        .context("Activity level is required (--activity or `kcal profile set --activity`)")?;
    let bmr = bmr_of(&body)?;
    let tdee = compute_tdee(bmr, Some(activity));

    if json {
        println!(
            "{}",
            serde_json::json!({
                "bmr": bmr,
                "activity_level": activity,
                "multiplier": activity.multiplier(),
                "tdee": tdee,
            })
        );
    } else {
        println!(
            "BMR {} kcal x {} ({}) = TDEE {} kcal/day",
            whole(bmr),
            activity.multiplier(),
            activity.as_str(),
            whole(tdee)
        );
    }
    Ok(())
}

pub(crate) fn cmd_estimate_exercise(
    store: &Store,
    minutes: f64,
    intensity: &str,
    exercise_type: &str,
    weight_kg: Option<f64>,
    json: bool,
) -> Result<()> {
    if minutes <= 0.0 {
        bail!("Duration must be greater than 0");
    }
    let weight_kg = match weight_kg {
        Some(w) => w,
        None => store
            .load()?
            .profile
            .weight_kg
            .context("Weight is required (--weight or `kcal weight log`)")?,
    };
    let intensity = Intensity::from(intensity);
    let exercise_type = ExerciseType::from(exercise_type);
    let met = met_value(intensity, exercise_type);
    let calories = compute_exercise_calories(weight_kg, minutes, intensity, exercise_type);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "weight_kg": weight_kg,
                "duration_min": minutes,
                "intensity": intensity,
                "exercise_type": exercise_type,
                "met": met,
                "calories_burnt": calories,
            })
        );
    } else {
        println!(
            "{minutes:.0} min {} {} (MET {met}) at {weight_kg:.1} kg = {calories:.0} kcal",
            intensity.as_str(),
            exercise_type.as_str()
        );
    }
    Ok(())
}
