//! Merge engine: idempotent combination of a new batch with the dataset
//!
//! Identity (the book URL) decides everything. A record whose identity is
//! already present is a no-op, except that a missing cover id may be filled
//! in by a later pass — the one write the engine permits after creation.

use crate::dataset::Dataset;
use crate::record::Record;
use std::collections::HashMap;

/// Counts reported by one merge, for operator summaries only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records whose identity was not present before
    pub added: usize,

    /// Existing records whose missing cover id was patched
    pub covers_updated: usize,

    /// Batch records dropped for lacking an identity
    pub dropped: usize,
}

impl MergeStats {
    /// Folds another merge's counts into this one
    pub fn accumulate(&mut self, other: MergeStats) {
        self.added += other.added;
        self.covers_updated += other.covers_updated;
        self.dropped += other.dropped;
    }
}

/// Merges a batch of freshly extracted records into the dataset
///
/// For each batch record:
/// - no identity → dropped (it cannot participate in deduplication)
/// - identity unseen → appended as new
/// - identity present and the existing record has no cover id while the new
///   one does → only the cover id is patched
/// - identity present otherwise → no-op; first-seen data is authoritative
///
/// Pure with respect to its inputs: no I/O, no clock, no hidden state.
pub fn merge(dataset: &mut Dataset, batch: Vec<Record>) -> MergeStats {
    let mut index: HashMap<String, usize> = dataset
        .records
        .iter()
        .enumerate()
        .filter_map(|(pos, record)| record.book_url.clone().map(|url| (url, pos)))
        .collect();

    let mut stats = MergeStats::default();

    for record in batch {
        let Some(url) = record.book_url.clone() else {
            tracing::debug!("Dropping record without book URL: {:?}", record.title);
            stats.dropped += 1;
            continue;
        };

        match index.get(&url) {
            Some(&pos) => {
                let existing = &mut dataset.records[pos];
                if existing.cover_id.is_none() && record.cover_id.is_some() {
                    existing.cover_id = record.cover_id;
                    stats.covers_updated += 1;
                }
            }
            None => {
                index.insert(url, dataset.records.len());
                dataset.records.push(record);
                stats.added += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, page: u32, cover_id: Option<&str>) -> Record {
        Record {
            book_url: Some(url.to_string()),
            title: Some("Title".to_string()),
            author: None,
            author_url: None,
            avg_rating: None,
            ratings_count: None,
            cover_url: None,
            cover_id: cover_id.map(str::to_string),
            page,
            scraped_at: "2024-01-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn test_merge_empty_batch_is_identity() {
        let mut dataset = Dataset::from_records(vec![record("https://x/a", 1, None)]);
        let before = dataset.records().to_vec();

        let stats = merge(&mut dataset, vec![]);

        assert_eq!(dataset.records(), before.as_slice());
        assert_eq!(stats, MergeStats::default());
    }

    #[test]
    fn test_merge_adds_unseen_records() {
        let mut dataset = Dataset::new();
        let stats = merge(
            &mut dataset,
            vec![record("https://x/a", 1, None), record("https://x/b", 1, None)],
        );

        assert_eq!(dataset.len(), 2);
        assert_eq!(stats.added, 2);
        assert_eq!(stats.covers_updated, 0);
    }

    #[test]
    fn test_merge_existing_record_wins() {
        let mut dataset = Dataset::from_records(vec![record("https://x/a", 3, None)]);

        let mut newer = record("https://x/a", 9, None);
        newer.title = Some("Different Title".to_string());
        let stats = merge(&mut dataset, vec![newer]);

        assert_eq!(stats.added, 0);
        assert_eq!(dataset.records()[0].page, 3);
        assert_eq!(dataset.records()[0].title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_merge_patches_missing_cover() {
        let mut dataset = Dataset::from_records(vec![record("https://x/a", 3, None)]);

        let stats = merge(
            &mut dataset,
            vec![
                record("https://x/a", 3, Some("cover_a.jpg")),
                record("https://x/b", 4, None),
            ],
        );

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].cover_id.as_deref(), Some("cover_a.jpg"));
        assert_eq!(stats.covers_updated, 1);
        assert_eq!(stats.added, 1);
    }

    #[test]
    fn test_merge_never_overwrites_existing_cover() {
        let mut dataset = Dataset::from_records(vec![record("https://x/a", 1, Some("kept.jpg"))]);

        merge(&mut dataset, vec![record("https://x/a", 1, Some("other.jpg"))]);
        merge(&mut dataset, vec![record("https://x/a", 1, None)]);

        assert_eq!(dataset.records()[0].cover_id.as_deref(), Some("kept.jpg"));
    }

    #[test]
    fn test_merge_drops_records_without_identity() {
        let mut dataset = Dataset::new();
        let mut anonymous = record("https://x/a", 1, None);
        anonymous.book_url = None;

        let stats = merge(&mut dataset, vec![anonymous]);

        assert!(dataset.is_empty());
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_merge_order_independent_for_disjoint_batches() {
        let batch_a = vec![record("https://x/a", 1, None), record("https://x/b", 1, None)];
        let batch_b = vec![record("https://x/c", 2, None), record("https://x/d", 2, None)];

        let mut forward = Dataset::new();
        merge(&mut forward, batch_a.clone());
        merge(&mut forward, batch_b.clone());

        let mut backward = Dataset::new();
        merge(&mut backward, batch_b);
        merge(&mut backward, batch_a);

        let urls = |d: &Dataset| {
            let mut v: Vec<_> = d
                .records()
                .iter()
                .filter_map(|r| r.book_url.clone())
                .collect();
            v.sort();
            v
        };
        assert_eq!(urls(&forward), urls(&backward));
    }

    #[test]
    fn test_merge_idempotent_on_repeat() {
        let batch = vec![record("https://x/a", 1, None), record("https://x/b", 1, None)];

        let mut dataset = Dataset::new();
        merge(&mut dataset, batch.clone());
        let stats = merge(&mut dataset, batch);

        assert_eq!(dataset.len(), 2);
        assert_eq!(stats.added, 0);
    }
}
