use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use kcal_core::energy::{compute_bmr, compute_tdee, round_to, whole};
use kcal_core::goals::{
    Goal, bmi, days_until, resolve_goal_from_bmi, target_calories_from_bmi,
    target_calories_from_weight_goal,
};
use kcal_core::models::{ActivityLevel, Gender, Profile};

use super::helpers::{parse_date, today};
use crate::store::Store;

/// Fields accepted by `kcal profile set`. `None` leaves a field unchanged.
pub(crate) struct ProfileUpdate {
    pub height_cm: Option<f64>,
    pub age_years: Option<u32>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
    pub target_weight_kg: Option<f64>,
    pub target_date: Option<String>,
    pub clear_goal: bool,
}

fn apply(mut profile: Profile, update: ProfileUpdate) -> Result<Profile> {
    if let Some(h) = update.height_cm {
        profile.height_cm = Some(h);
    }
    if let Some(a) = update.age_years {
        profile.age_years = Some(a);
    }
    if let Some(g) = update.gender {
        profile.gender = Gender::parse(&g);
    }
    if let Some(a) = update.activity_level {
        let level = ActivityLevel::from(a.as_str());
        if level == ActivityLevel::Unknown {
            eprintln!("Note: unknown activity level '{a}', TDEE will use the sedentary multiplier");
        }
        profile.activity_level = Some(level);
    }
    if update.clear_goal {
        profile.target_weight_kg = None;
        profile.target_date = None;
    }
    if let Some(w) = update.target_weight_kg {
        profile.target_weight_kg = Some(w);
    }
    if let Some(d) = update.target_date {
        profile.target_date = Some(parse_date(Some(d))?);
    }
    Ok(profile)
}

pub(crate) fn cmd_profile_set(store: &Store, update: ProfileUpdate, json: bool) -> Result<()> {
    let mut book = store.load()?;
    let profile = apply(book.profile.clone(), update)?;
    book.set_profile(profile)?;
    store.save(&book)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&book.profile)?);
    } else {
        println!("Profile updated.");
        print_profile(&profile_view(&book.profile, today()));
    }
    Ok(())
}

pub(crate) fn cmd_profile_show(store: &Store, json: bool) -> Result<()> {
    let book = store.load()?;
    let view = profile_view(&book.profile, today());

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_profile(&view);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ProfileView {
    #[serde(flatten)]
    profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bmi_goal: Option<Goal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bmr: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tdee: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calorie_target: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    days_until_target: Option<i64>,
}

fn profile_view(profile: &Profile, today: NaiveDate) -> ProfileView {
    let mut view = ProfileView {
        profile: profile.clone(),
        bmi: None,
        bmi_goal: None,
        bmr: None,
        tdee: None,
        calorie_target: None,
        days_until_target: profile.target_date.map(|d| days_until(d, today).max(0)),
    };

    if let (Some(w), Some(h)) = (profile.weight_kg, profile.height_cm) {
        let value = bmi(w, h);
        view.bmi = Some(round_to(value, 1));
        view.bmi_goal = Some(resolve_goal_from_bmi(value));
    }

    if let (Some(metrics), Some(w)) = (profile.body_metrics(), profile.weight_kg) {
        let bmr = compute_bmr(w, metrics.height_cm, metrics.age_years, Some(metrics.gender));
        let tdee = compute_tdee(bmr, Some(metrics.activity_level));
        let target = if profile.target_weight_kg.is_some() && profile.target_date.is_some() {
            target_calories_from_weight_goal(
                w,
                profile.target_weight_kg,
                profile.target_date,
                tdee,
                today,
            )
        } else {
            target_calories_from_bmi(w, metrics.height_cm, tdee)
        };
        view.bmr = Some(whole(bmr));
        view.tdee = Some(whole(tdee));
        view.calorie_target = Some(whole(target));
    }

    view
}

fn print_profile(view: &ProfileView) {
    let p = &view.profile;
    let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    println!("  Height:         {}", show(p.height_cm.map(|h| format!("{h:.0} cm"))));
    println!("  Weight:         {}", show(p.weight_kg.map(|w| format!("{w:.1} kg"))));
    println!("  Age:            {}", show(p.age_years.map(|a| a.to_string())));
    println!("  Gender:         {}", show(p.gender.map(|g| g.as_str().to_string())));
    println!(
        "  Activity:       {}",
        show(p.activity_level.map(|a| a.as_str().to_string()))
    );
    println!(
        "  Target weight:  {}",
        show(p.target_weight_kg.map(|w| format!("{w:.1} kg")))
    );
    println!(
        "  Target date:    {}",
        show(p.target_date.map(|d| {
            let days = view.days_until_target.unwrap_or(0);
            format!("{d} ({days} days left)")
        }))
    );
    if let (Some(bmi), Some(goal)) = (view.bmi, view.bmi_goal) {
        println!(
            "  BMI:            {bmi:.1} (suggests {:?}/{:?})",
            goal.direction, goal.rate
        );
    }
    match (view.bmr, view.tdee, view.calorie_target) {
        (Some(bmr), Some(tdee), Some(target)) => {
            println!("  BMR:            {bmr} kcal");
            println!("  TDEE:           {tdee} kcal");
            println!("  Daily target:   {target} kcal");
        }
        _ => eprintln!(
            "\nSet height, age, gender, activity level and log a weight to see BMR/TDEE."
        ),
    }
}
