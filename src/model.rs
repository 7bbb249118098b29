use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scraped document page, as stored in the flat records CSV.
///
/// `date` holds the high-confidence extraction (dateline or title);
/// `possible_date` the low-confidence full-body fallback. Both empty means
/// the page carried no date signal at all, which downstream consumers treat
/// as a data-quality marker rather than a fault.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Possible Date")]
    pub possible_date: Option<String>,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Book")]
    pub book: String,
    #[serde(rename = "Page")]
    pub page: String,
}

impl PageRecord {
    /// Best available date for this record: the confident field unless it is
    /// absent or the `Undated` sentinel, in which case the possible date
    /// stands in.
    pub fn resolved_date(&self) -> Option<&str> {
        match self.date.as_deref() {
            Some(date) if !date.is_empty() && date != "Undated" => Some(date),
            _ => self.possible_date.as_deref().filter(|date| !date.is_empty()),
        }
    }
}

/// Classification of one document title by the identify pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleClassification {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Matched By")]
    pub matched_by: Option<String>,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Download ledger for fetched e-books, persisted as JSON next to the data
/// directory so re-runs skip completed downloads and upstream content
/// changes stay detectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub books: BTreeMap<String, BookEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            schema_version: 1,
            books: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEntry {
    pub source_url: String,
    pub sha256: String,
    pub bytes: usize,
    pub downloaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub books_discovered: usize,
    pub downloaded: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    pub books_processed: usize,
    pub pages_scanned: usize,
    pub pages_skipped: usize,
    pub records_written: usize,
    pub dated: usize,
    pub possible_dated: usize,
    pub undated: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IdentifyReport {
    pub rows: usize,
    pub matched: usize,
    pub representatives: usize,
    pub memoranda: usize,
    pub unmatched: usize,
}
