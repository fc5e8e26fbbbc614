use std::collections::BTreeSet;
use std::io::Read;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};

use crate::logbook::LogBook;
use crate::models::{
    ExerciseType, Intensity, NewExerciseEntry, NewMealEntry, NewWeightEntry, validate_exercise,
    validate_meal, validate_weight,
};

/// What an import would do / did. `entries_logged` stays 0 on a dry run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_parsed: usize,
    pub entries_logged: usize,
    pub dates_spanned: usize,
}

/// Parse a timestamp cell.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM[:SS]` and a bare
/// `YYYY-MM-DD`, which is read as midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    bail!("Cannot parse timestamp: '{value}'")
}

/// Header-driven reader shared by the three formats.
struct Table {
    headers: csv::StringRecord,
    records: Vec<(usize, csv::StringRecord)>,
}

impl Table {
    fn read<R: Read>(reader: R, required: &[&str]) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV headers")?.clone();
        for name in required {
            if !headers.iter().any(|h| h.eq_ignore_ascii_case(name)) {
                bail!("Missing required column: {name}");
            }
        }

        let mut records = Vec::new();
        for (line_num, result) in rdr.records().enumerate() {
            let record =
                result.with_context(|| format!("Failed to parse CSV row {}", line_num + 2))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            records.push((line_num + 2, record));
        }
        Ok(Self { headers, records })
    }

    fn col(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }
}

fn cell(record: &csv::StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

fn number(
    record: &csv::StringRecord,
    idx: Option<usize>,
    line: usize,
    name: &str,
) -> Result<Option<f64>> {
    let raw = cell(record, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .with_context(|| format!("Row {line}: invalid {name} '{raw}'"))
}

/// Parse a meal export.
///
/// Expected header: `Timestamp,Name,Calories,Protein (g),Carbs (g),Fat (g)`.
/// Macro columns are optional. Rows without a name or timestamp are skipped.
pub fn parse_meals_csv<R: Read>(reader: R) -> Result<Vec<NewMealEntry>> {
    let table = Table::read(reader, &["Timestamp", "Name", "Calories"])?;
    let idx_ts = table.col("Timestamp");
    let idx_name = table.col("Name");
    let idx_cal = table.col("Calories");
    let idx_protein = table.col("Protein (g)");
    let idx_carbs = table.col("Carbs (g)");
    let idx_fat = table.col("Fat (g)");

    let mut rows = Vec::new();
    for (line, record) in &table.records {
        let name = cell(record, idx_name);
        let ts = cell(record, idx_ts);
        if name.is_empty() || ts.is_empty() {
            continue;
        }
        let meal = NewMealEntry {
            name: name.to_string(),
            calories: number(record, idx_cal, *line, "calories")?.unwrap_or(0.0),
            protein_g: number(record, idx_protein, *line, "protein")?,
            carbs_g: number(record, idx_carbs, *line, "carbs")?,
            fat_g: number(record, idx_fat, *line, "fat")?,
            timestamp: parse_timestamp(ts).with_context(|| format!("Row {line}"))?,
        };
        validate_meal(&meal).with_context(|| format!("Row {line}"))?;
        rows.push(meal);
    }
    Ok(rows)
}

/// Parse an exercise export.
///
/// Expected header: `Timestamp,Name,Duration (min),Intensity,Type,Calories`.
/// Intensity and type default to moderate/general; a blank calorie cell is
/// left for the log book to derive.
pub fn parse_exercises_csv<R: Read>(reader: R) -> Result<Vec<NewExerciseEntry>> {
    let table = Table::read(reader, &["Timestamp", "Name", "Duration (min)"])?;
    let idx_ts = table.col("Timestamp");
    let idx_name = table.col("Name");
    let idx_duration = table.col("Duration (min)");
    let idx_intensity = table.col("Intensity");
    let idx_type = table.col("Type");
    let idx_cal = table.col("Calories");

    let mut rows = Vec::new();
    for (line, record) in &table.records {
        let name = cell(record, idx_name);
        let ts = cell(record, idx_ts);
        if name.is_empty() || ts.is_empty() {
            continue;
        }
        let intensity = match cell(record, idx_intensity) {
            "" => Intensity::default(),
            raw => Intensity::from(raw),
        };
        let exercise_type = match cell(record, idx_type) {
            "" => ExerciseType::default(),
            raw => ExerciseType::from(raw),
        };
        let exercise = NewExerciseEntry {
            name: name.to_string(),
            duration_min: number(record, idx_duration, *line, "duration")?.unwrap_or(0.0),
            intensity,
            exercise_type,
            calories_burnt: number(record, idx_cal, *line, "calories")?,
            timestamp: parse_timestamp(ts).with_context(|| format!("Row {line}"))?,
        };
        validate_exercise(&exercise).with_context(|| format!("Row {line}"))?;
        rows.push(exercise);
    }
    Ok(rows)
}

/// Parse a weight export with header `Timestamp,Weight (kg)`.
pub fn parse_weights_csv<R: Read>(reader: R) -> Result<Vec<NewWeightEntry>> {
    let table = Table::read(reader, &["Timestamp", "Weight (kg)"])?;
    let idx_ts = table.col("Timestamp");
    let idx_weight = table.col("Weight (kg)");

    let mut rows = Vec::new();
    for (line, record) in &table.records {
        let ts = cell(record, idx_ts);
        let Some(weight_kg) = number(record, idx_weight, *line, "weight")? else {
            continue;
        };
        if ts.is_empty() {
            continue;
        }
        let entry = NewWeightEntry {
            weight_kg,
            timestamp: parse_timestamp(ts).with_context(|| format!("Row {line}"))?,
        };
        validate_weight(&entry).with_context(|| format!("Row {line}"))?;
        rows.push(entry);
    }
    Ok(rows)
}

fn summarize<'a>(
    timestamps: impl Iterator<Item = &'a NaiveDateTime>,
    rows: usize,
    dry_run: bool,
) -> ImportSummary {
    let dates: BTreeSet<NaiveDate> = timestamps.map(NaiveDateTime::date).collect();
    ImportSummary {
        rows_parsed: rows,
        entries_logged: if dry_run { 0 } else { rows },
        dates_spanned: dates.len(),
    }
}

/// Log parsed meals into `book`. When `dry_run` is true nothing is written.
pub fn import_meals(
    book: &mut LogBook,
    rows: &[NewMealEntry],
    dry_run: bool,
) -> Result<ImportSummary> {
    if !dry_run {
        for row in rows {
            book.add_meal(row.clone())?;
        }
    }
    Ok(summarize(rows.iter().map(|r| &r.timestamp), rows.len(), dry_run))
}

pub fn import_exercises(
    book: &mut LogBook,
    rows: &[NewExerciseEntry],
    dry_run: bool,
) -> Result<ImportSummary> {
    if !dry_run {
        for row in rows {
            book.add_exercise(row.clone())?;
        }
    }
    Ok(summarize(rows.iter().map(|r| &r.timestamp), rows.len(), dry_run))
}

pub fn import_weights(
    book: &mut LogBook,
    rows: &[NewWeightEntry],
    dry_run: bool,
) -> Result<ImportSummary> {
    if !dry_run {
        for row in rows {
            book.add_weight(row.clone())?;
        }
    }
    Ok(summarize(rows.iter().map(|r| &r.timestamp), rows.len(), dry_run))
}
