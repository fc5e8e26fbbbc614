use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

use kcal_core::logbook::LogBook;

/// JSON file holding the whole log book.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the log book. A missing file is an empty book.
    pub fn load(&self) -> Result<LogBook> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No log file yet");
            return Ok(LogBook::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read log file: {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(LogBook::default());
        }
        let book: LogBook = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse log file: {}", self.path.display()))?;
        debug!(
            path = %self.path.display(),
            meals = book.meals.len(),
            exercises = book.exercises.len(),
            weights = book.weights.len(),
            "Loaded log file"
        );
        Ok(book)
    }

    /// Write the log book to a uniquely named temp file in the same
    /// directory, then rename it into place.
    pub fn save(&self, book: &LogBook) -> Result<()> {
        let dir = match self.path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        let json = serde_json::to_string_pretty(book).context("Failed to serialize log book")?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Saved log file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kcal_core::models::NewMealEntry;

    #[test]
    fn test_missing_file_is_empty_book() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("log.json"));
        assert_eq!(store.load().unwrap(), LogBook::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("nested").join("log.json"));

        let mut book = LogBook::new();
        book.add_meal(NewMealEntry {
            name: "Toast".to_string(),
            calories: 210.0,
            protein_g: Some(7.0),
            carbs_g: None,
            fat_g: None,
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        })
        .unwrap();
        store.save(&book).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), book);

        let leftovers: Vec<_> = std::fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("log.json")]);
    }

    #[test]
    fn test_concurrent_saves_leave_a_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");

        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut book = LogBook::new();
                    for n in 0..50 {
                        book.add_meal(NewMealEntry {
                            name: format!("Writer {i} meal {n}"),
                            calories: 100.0,
                            protein_g: None,
                            carbs_g: None,
                            fat_g: None,
                            timestamp: NaiveDate::from_ymd_opt(2024, 6, 1)
                                .unwrap()
                                .and_hms_opt(8, 0, 0)
                                .unwrap(),
                        })
                        .unwrap();
                    }
                    Store::open(&path).save(&book).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let book = Store::open(&path).load().unwrap();
        assert_eq!(book.meals.len(), 50);
        let writer = book.meals[0].name.split(" meal").next().unwrap().to_string();
        assert!(book.meals.iter().all(|m| m.name.starts_with(&writer)));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Store::open(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse log file"));
    }
}
