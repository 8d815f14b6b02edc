//! CSV persistence gateway
//!
//! The dataset is a flat CSV table with a fixed column order (the field
//! order of [`Record`]). Loading is deliberately forgiving: a missing or
//! unreadable file yields an empty dataset so a harvest can always start.
//! Saving is a full overwrite.

use crate::dataset::Dataset;
use crate::record::Record;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while saving the dataset
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads the dataset from a CSV file
///
/// Returns an empty dataset when the file does not exist. A file that fails
/// to parse is logged and also yields an empty dataset — the store never
/// raises on load. Rows are matched by header name, so files written with
/// an older column order still load.
pub fn load_dataset(path: &Path) -> Dataset {
    if !path.exists() {
        return Dataset::new();
    }

    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            tracing::warn!("Could not open existing dataset {}: {}", path.display(), e);
            return Dataset::new();
        }
    };

    let mut records = Vec::new();
    for row in reader.deserialize::<Record>() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping malformed row in {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!(
        "Loaded {} existing records from {}",
        records.len(),
        path.display()
    );
    Dataset::from_records(records)
}

/// Saves the dataset to a CSV file, replacing any previous contents
///
/// The parent directory is created if needed. Column order follows the
/// record's field order and is stable across runs.
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in dataset.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::info!(
        "Saved {} records to {}",
        dataset.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(url: &str, page: u32) -> Record {
        Record {
            book_url: Some(url.to_string()),
            title: Some("Title, with comma".to_string()),
            author: Some("Author".to_string()),
            author_url: None,
            avg_rating: Some("4.12".to_string()),
            ratings_count: Some("99".to_string()),
            cover_url: None,
            cover_id: None,
            page,
            scraped_at: "2024-01-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn test_load_missing_file_yields_empty_dataset() {
        let dir = tempdir().unwrap();
        let dataset = load_dataset(&dir.path().join("absent.csv"));
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_load_garbage_file_yields_empty_dataset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "not,a,matching\nheader,at,all\n").unwrap();

        let dataset = load_dataset(&path);
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");

        let dataset = Dataset::from_records(vec![
            record("https://example.com/b/1", 1),
            record("https://example.com/b/2", 2),
        ]);
        save_dataset(&dataset, &path).unwrap();

        let loaded = load_dataset(&path);
        assert_eq!(loaded.records(), dataset.records());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("data.csv");

        let dataset = Dataset::from_records(vec![record("https://example.com/b/1", 1)]);
        save_dataset(&dataset, &path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");

        let big = Dataset::from_records(vec![
            record("https://example.com/b/1", 1),
            record("https://example.com/b/2", 1),
        ]);
        save_dataset(&big, &path).unwrap();

        let small = Dataset::from_records(vec![record("https://example.com/b/3", 2)]);
        save_dataset(&small, &path).unwrap();

        let loaded = load_dataset(&path);
        assert_eq!(loaded.len(), 1);
    }
}
