use std::path::Path;

use anyhow::{Context, Result};

use kcal_core::csv_import::{
    ImportSummary, import_exercises, import_meals, import_weights, parse_exercises_csv,
    parse_meals_csv, parse_weights_csv,
};

use super::helpers::json_error;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImportKind {
    Meals,
    Exercises,
    Weights,
}

impl ImportKind {
    fn label(self) -> &'static str {
        match self {
            Self::Meals => "meals",
            Self::Exercises => "exercises",
            Self::Weights => "weights",
        }
    }
}

pub(crate) fn cmd_import(
    store: &Store,
    kind: ImportKind,
    path: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mut book = store.load()?;
    let summary: ImportSummary = match kind {
        ImportKind::Meals => {
            let rows = parse_meals_csv(file)?;
            import_meals(&mut book, &rows, dry_run)?
        }
        ImportKind::Exercises => {
            let rows = parse_exercises_csv(file)?;
            import_exercises(&mut book, &rows, dry_run)?
        }
        ImportKind::Weights => {
            let rows = parse_weights_csv(file)?;
            import_weights(&mut book, &rows, dry_run)?
        }
    };

    if summary.rows_parsed == 0 {
        if json {
            println!("{}", json_error("No rows found in CSV file"));
        } else {
            eprintln!("No rows found in CSV file.");
        }
        return Ok(());
    }

    if !dry_run {
        store.save(&book)?;
    }

    let label = kind.label();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "kind": label,
                "dry_run": dry_run,
                "rows_parsed": summary.rows_parsed,
                "entries_logged": summary.entries_logged,
                "dates_spanned": summary.dates_spanned,
            })
        );
    } else if dry_run {
        println!("Dry run, no changes made.\n");
        println!("  Rows parsed:   {}", summary.rows_parsed);
        println!("  {label:<13}: {} to log", summary.rows_parsed);
        println!("  Dates spanned: {}", summary.dates_spanned);
    } else {
        println!("Import complete.\n");
        println!("  Rows parsed:   {}", summary.rows_parsed);
        println!("  {label:<13}: {} logged", summary.entries_logged);
        println!("  Dates spanned: {}", summary.dates_spanned);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_weights_writes_log() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("weights.csv");
        std::fs::write(&csv_path, "Timestamp,Weight (kg)\n2024-01-15 07:00,80.4\n").unwrap();
        let store = Store::open(&dir.path().join("log.json"));

        cmd_import(&store, ImportKind::Weights, &csv_path, true, true).unwrap();
        assert!(!store.path().exists());

        cmd_import(&store, ImportKind::Weights, &csv_path, false, true).unwrap();
        let book = store.load().unwrap();
        assert_eq!(book.weights.len(), 1);
        assert_eq!(book.profile.weight_kg, Some(80.4));
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("log.json"));
        let err = cmd_import(
            &store,
            ImportKind::Meals,
            &dir.path().join("nope.csv"),
            false,
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
