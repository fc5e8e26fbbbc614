use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use kcal_core::models::NewWeightEntry;

use super::helpers::{LBS_PER_KG, parse_at, short_id, to_kg};
use crate::store::Store;

pub(crate) fn cmd_weight_log(
    store: &Store,
    value: f64,
    unit: &str,
    at: Option<String>,
    json: bool,
) -> Result<()> {
    let weight_kg = to_kg(value, unit)?;
    if !unit.eq_ignore_ascii_case("kg") {
        eprintln!("Converting {value:.1} lbs → {weight_kg:.2} kg");
    }

    let mut book = store.load()?;
    let entry = book.add_weight(NewWeightEntry {
        weight_kg,
        timestamp: parse_at(at)?,
    })?;
    store.save(&book)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "[{}] Logged {:.1} kg ({:.1} lbs) at {}",
            short_id(&entry.id),
            entry.weight_kg,
            entry.weight_kg * LBS_PER_KG,
            entry.timestamp.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub(crate) fn cmd_weight_history(store: &Store, limit: usize, json: bool) -> Result<()> {
    let book = store.load()?;
    let entries = book.weight_history(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No weight entries found. Use `kcal weight log` to record your weight.");
    } else {
        #[derive(Tabled)]
        struct WeightRow {
            #[tabled(rename = "ID")]
            id: String,
            #[tabled(rename = "Time")]
            time: String,
            #[tabled(rename = "Weight (kg)")]
            kg: String,
            #[tabled(rename = "Weight (lbs)")]
            lbs: String,
            #[tabled(rename = "Change")]
            change: String,
        }

        // entries are newest first; change is relative to the next older one
        let rows: Vec<WeightRow> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| WeightRow {
                id: short_id(&e.id),
                time: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                kg: format!("{:.1}", e.weight_kg),
                lbs: format!("{:.1}", e.weight_kg * LBS_PER_KG),
                change: entries
                    .get(i + 1)
                    .map(|older| format!("{:+.1}", e.weight_kg - older.weight_kg))
                    .unwrap_or_default(),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}
