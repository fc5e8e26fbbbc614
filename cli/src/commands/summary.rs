use anyhow::Result;
use chrono::Datelike;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use kcal_core::buckets::parse_month;
use kcal_core::insights::{InsightProvider, Insights, build_daily_report, build_monthly_report};
use kcal_core::models::{DailySummary, MonthlySummary, NameCount};

use super::helpers::{opt_num, parse_date, short_id, today, truncate};
use crate::store::Store;

pub(crate) async fn cmd_summary(
    store: &Store,
    date: Option<String>,
    provider: Option<&dyn InsightProvider>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let book = store.load()?;
    let summary = book.daily_summary(date, today());
    let report = build_daily_report(summary, provider).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = &report.summary;
    if summary.meal_count == 0 && summary.exercise_count == 0 && summary.weight_kg.is_none() {
        eprintln!("No entries for {date}");
        process::exit(2);
    }

    println!("=== {date} ===\n");

    let bucket = book.buckets(date, date).pop();
    if let Some(bucket) = &bucket {
        if !bucket.meals.is_empty() {
            println!("  MEALS");
            for m in &bucket.meals {
                println!(
                    "    [{}] {} {} - {:.0} kcal | P:{}g C:{}g F:{}g",
                    short_id(&m.id),
                    m.timestamp.format("%H:%M"),
                    m.name,
                    m.calories,
                    opt_num(m.protein_g),
                    opt_num(m.carbs_g),
                    opt_num(m.fat_g)
                );
            }
            println!();
        }
        if !bucket.exercises.is_empty() {
            println!("  EXERCISE");
            for e in &bucket.exercises {
                println!(
                    "    [{}] {} {} - {:.0} min {} {} - {:.0} kcal",
                    short_id(&e.id),
                    e.timestamp.format("%H:%M"),
                    e.name,
                    e.duration_min,
                    e.intensity.as_str(),
                    e.exercise_type.as_str(),
                    e.calories_burnt
                );
            }
            println!();
        }
    }

    print_daily_totals(summary);
    if let Some(insights) = &report.insights {
        print_insights(insights);
    }
    Ok(())
}

fn print_daily_totals(s: &DailySummary) {
    println!(
        "  CONSUMED: {} kcal | P:{}g C:{}g F:{}g ({} meals)",
        s.total_calories_consumed, s.total_protein_g, s.total_carbs_g, s.total_fat_g, s.meal_count
    );
    println!(
        "  BURNT:    {} kcal ({} min, {} exercises)",
        s.total_calories_burnt, s.total_exercise_min, s.exercise_count
    );
    println!("  NET:      {} kcal", s.net_calories);
    if let Some(w) = s.weight_kg {
        println!("  WEIGHT:   {w:.1} kg");
    }

    if s.tdee == 0 {
        eprintln!("\n  Complete your profile and log a weight for this day to see BMR/TDEE.");
        return;
    }
    println!("\n  BMR:      {} kcal", s.bmr);
    println!("  TDEE:     {} kcal", s.tdee);
    println!("  TARGET:   {} kcal", s.calorie_target);
    println!(
        "  DEFICIT:  {} kcal ({:.3} kg)",
        s.calorie_deficit, s.estimated_daily_weight_change_kg
    );
    if let Some(goal) = &s.goal {
        if let (Some(target), Some(date)) = (goal.target_weight_kg, goal.target_date) {
            let days = goal.days_until_target.unwrap_or(0);
            println!(
                "  GOAL:     {:.1} kg -> {target:.1} kg by {date} ({days} days)",
                goal.current_weight_kg
            );
        }
    }
}

pub(crate) async fn cmd_month(
    store: &Store,
    month: Option<String>,
    provider: Option<&dyn InsightProvider>,
    json: bool,
) -> Result<()> {
    let today = today();
    let (year, month) = match month {
        Some(label) => parse_month(&label)?,
        None => (today.year(), today.month()),
    };
    let book = store.load()?;
    let summary = book.monthly_summary(year, month, today)?;
    let report = build_monthly_report(summary, provider).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let s = &report.summary;
    if s.days_tracked == 0 {
        eprintln!("No entries for {year}-{month:02}");
        process::exit(2);
    }
    print_monthly(year, month, s);
    if let Some(insights) = &report.insights {
        print_insights(insights);
    }
    Ok(())
}

fn print_monthly(year: i32, month: u32, s: &MonthlySummary) {
    println!("=== {year}-{month:02} ===\n");
    println!("  Days tracked:   {} of {}", s.days_tracked, s.day_count);
    println!("\n  DAILY AVERAGES");
    println!("    Consumed:     {} kcal", s.avg_calories_consumed);
    println!("    Burnt:        {} kcal", s.avg_calories_burnt);
    println!("    Net:          {} kcal", s.avg_net_calories);
    println!(
        "    Macros:       P:{}g C:{}g F:{}g",
        s.avg_protein_g, s.avg_carbs_g, s.avg_fat_g
    );
    println!("    Exercise:     {} min", s.avg_exercise_min);

    println!("\n  WEIGHT");
    match (s.first_weight_kg, s.last_weight_kg) {
        (Some(first), Some(last)) => {
            println!("    {first:.1} kg -> {last:.1} kg ({:+.1} kg)", s.weight_change_kg);
        }
        _ => println!("    No weigh-ins this month"),
    }
    println!(
        "    Predicted:    {:+.2} kg (accuracy {}%)",
        s.theoretical_weight_change_kg, s.accuracy_index
    );
    if s.tdee > 0 {
        println!("    BMR / TDEE:   {} / {} kcal", s.bmr, s.tdee);
    }

    print_ranking("TOP MEALS", &s.most_common_meals);
    print_ranking("TOP EXERCISES", &s.most_common_exercises);
}

fn print_ranking(title: &str, names: &[NameCount]) {
    if names.is_empty() {
        return;
    }
    println!("\n  {title}");
    for (i, n) in names.iter().enumerate() {
        println!("    {}. {} ({}x)", i + 1, truncate(&n.name, 40), n.count);
    }
}

fn print_insights(insights: &Insights) {
    let sections = [
        ("INSIGHTS", &insights.insights),
        ("RECOMMENDATIONS", &insights.recommendations),
        ("TRENDS", &insights.trends),
        ("ACHIEVEMENTS", &insights.achievements),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("\n  {title}");
        for item in items {
            println!("    - {item}");
        }
    }
}

pub(crate) fn cmd_history(store: &Store, days: u32, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Consumed")]
        consumed: i64,
        #[tabled(rename = "Burnt")]
        burnt: i64,
        #[tabled(rename = "Net")]
        net: i64,
        #[tabled(rename = "Target")]
        target: String,
        #[tabled(rename = "Deficit")]
        deficit: String,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    let today = today();
    let book = store.load()?;
    let mut summaries = book.history(today, days, today);
    summaries.reverse();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries
        .iter()
        .all(|s| s.meal_count == 0 && s.exercise_count == 0 && s.weight_kg.is_none())
    {
        eprintln!("No entries in the last {days} days");
        process::exit(2);
    }

    let dash_if_zero = |v: i64, tdee: i64| {
        if tdee == 0 {
            "-".to_string()
        } else {
            v.to_string()
        }
    };
    let rows: Vec<HistoryRow> = summaries
        .iter()
        .map(|s| HistoryRow {
            date: s.date.format("%Y-%m-%d").to_string(),
            consumed: s.total_calories_consumed,
            burnt: s.total_calories_burnt,
            net: s.net_calories,
            target: dash_if_zero(s.calorie_target, s.tdee),
            deficit: dash_if_zero(s.calorie_deficit, s.tdee),
            weight: s
                .weight_kg
                .map_or_else(|| "-".to_string(), |w| format!("{w:.1}")),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
