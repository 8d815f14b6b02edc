//! Record type for one harvested catalogue item
//!
//! Optional fields are `Option<String>` in memory and the `"N/A"` sentinel
//! on the wire, so CSV files written by earlier versions of the tool keep
//! loading unchanged.

use serde::{Deserialize, Serialize};

/// Placeholder written for a field that could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// One harvested book listing
///
/// `book_url` is the record's identity: it uniquely keys the record across
/// pages and runs and is never recomputed after extraction. `cover_id` is
/// the only field the merge engine may rewrite, and only from absent to
/// present. Field order here is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Canonical absolute URL of the book; dedup key
    #[serde(with = "na_string")]
    pub book_url: Option<String>,

    #[serde(with = "na_string")]
    pub title: Option<String>,

    #[serde(with = "na_string")]
    pub author: Option<String>,

    #[serde(with = "na_string")]
    pub author_url: Option<String>,

    /// Decimal-formatted average rating, e.g. "4.23"
    #[serde(with = "na_string")]
    pub avg_rating: Option<String>,

    /// Integer-formatted rating count with commas stripped
    #[serde(with = "na_string")]
    pub ratings_count: Option<String>,

    /// Source image URL of the cover
    #[serde(with = "na_string")]
    pub cover_url: Option<String>,

    /// Local cover filename once downloaded
    #[serde(with = "na_string")]
    pub cover_id: Option<String>,

    /// Listing page the record was first observed on (>= 1; 0 marks a row
    /// whose page column failed to parse on load)
    #[serde(with = "lenient_page")]
    pub page: u32,

    /// Local wall-clock timestamp at extraction time
    pub scraped_at: String,
}

impl Record {
    /// Formats the current local time the way `scraped_at` is stored
    pub fn observed_now() -> String {
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Serde codec mapping `Option<String>` to the `"N/A"` sentinel
///
/// An empty cell also decodes to `None`; old files use both forms.
mod na_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(v),
            None => serializer.serialize_str(super::NOT_AVAILABLE),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() || raw == super::NOT_AVAILABLE {
            Ok(None)
        } else {
            Ok(Some(raw))
        }
    }
}

/// Serde codec that never fails on a bad page cell
///
/// A row with a mangled page column still loads (as page 0); resume skips
/// such rows instead of refusing the whole file.
mod lenient_page {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.trim().parse().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(book_url: &str, page: u32) -> Record {
        Record {
            book_url: Some(book_url.to_string()),
            title: Some("A Title".to_string()),
            author: Some("An Author".to_string()),
            author_url: Some("https://www.goodreads.com/author/show/1".to_string()),
            avg_rating: Some("4.23".to_string()),
            ratings_count: Some("1234".to_string()),
            cover_url: Some("https://images.example.com/cover.jpg".to_string()),
            cover_id: None,
            page,
            scraped_at: "2024-01-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn test_none_serializes_to_sentinel() {
        let record = sample_record("https://www.goodreads.com/book/show/1", 1);

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&record).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        // cover_id is None and must land as the sentinel, not an empty cell
        assert!(out.contains("N/A"));
    }

    #[test]
    fn test_sentinel_and_empty_deserialize_to_none() {
        let data = "\
book_url,title,author,author_url,avg_rating,ratings_count,cover_url,cover_id,page,scraped_at
https://example.com/b/1,Title,N/A,,4.00,100,N/A,N/A,3,2024-01-01 12:00:00
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: Record = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(record.book_url.as_deref(), Some("https://example.com/b/1"));
        assert_eq!(record.author, None);
        assert_eq!(record.author_url, None);
        assert_eq!(record.cover_id, None);
        assert_eq!(record.page, 3);
    }

    #[test]
    fn test_unparsable_page_decodes_to_zero() {
        let data = "\
book_url,title,author,author_url,avg_rating,ratings_count,cover_url,cover_id,page,scraped_at
https://example.com/b/1,Title,N/A,N/A,N/A,N/A,N/A,N/A,not-a-number,2024-01-01 12:00:00
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: Record = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(record.page, 0);
    }

    #[test]
    fn test_roundtrip_preserves_fields() {
        let record = sample_record("https://www.goodreads.com/book/show/42", 7);

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&record).unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let loaded: Record = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(loaded, record);
    }
}
