use anyhow::Result;

use kcal_core::logbook::RemovedEntry;
use kcal_core::models::NewMealEntry;

use super::helpers::{opt_num, parse_at, short_id};
use crate::store::Store;

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_meal_add(
    store: &Store,
    name: &str,
    calories: f64,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    at: Option<String>,
    json: bool,
) -> Result<()> {
    let mut book = store.load()?;
    let entry = book.add_meal(NewMealEntry {
        name: name.to_string(),
        calories,
        protein_g: protein,
        carbs_g: carbs,
        fat_g: fat,
        timestamp: parse_at(at)?,
    })?;
    store.save(&book)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "[{}] Logged {} ({:.0} kcal | P:{}g C:{}g F:{}g) at {}",
            short_id(&entry.id),
            entry.name,
            entry.calories,
            opt_num(entry.protein_g),
            opt_num(entry.carbs_g),
            opt_num(entry.fat_g),
            entry.timestamp.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Delete a meal, exercise or weight entry by id or id prefix.
pub(crate) fn cmd_delete(store: &Store, id: &str, json: bool) -> Result<()> {
    let mut book = store.load()?;
    let removed = book.remove(id)?;
    store.save(&book)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": removed.id(), "kind": removed.kind() })
        );
    } else {
        let label = match &removed {
            RemovedEntry::Meal(m) => format!("{} ({:.0} kcal)", m.name, m.calories),
            RemovedEntry::Exercise(e) => format!("{} ({:.0} min)", e.name, e.duration_min),
            RemovedEntry::Weight(w) => format!("{:.1} kg", w.weight_kg),
        };
        println!(
            "Deleted {} entry [{}] {label}",
            removed.kind(),
            short_id(removed.id())
        );
    }

    Ok(())
}
