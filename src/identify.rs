use crate::config::IdentifyConfig;
use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

pub const STATUS_INTERNAL: &str = "internal";
pub const STATUS_MEMORANDUM: &str = "memorandum";
pub const STATUS_REPRESENTATIVE: &str = "representative";
pub const STATUS_MENTION: &str = "mention";

pub const MATCHED_BY_COUNTRY: &str = "country";
pub const MATCHED_BY_DEMONYM: &str = "demonym";

/// Outcome of classifying one document title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub country: Option<String>,
    pub matched_by: Option<&'static str>,
    pub status: &'static str,
}

/// Matches document titles against the country and demonym reference lists
/// and decides whether a matched name is introduced as a state
/// representative.
pub struct TitleClassifier {
    countries: NameFinder,
    demonyms: NameFinder,
    memo_re: Regex,
}

impl TitleClassifier {
    pub fn from_reference_files(config: &IdentifyConfig, base_dir: &Path) -> Result<Self> {
        let countries_path = crate::config::resolve_path(base_dir, &config.countries_file);
        let demonyms_path = crate::config::resolve_path(base_dir, &config.demonyms_file);

        let countries = load_country_names(&countries_path, &config.country_column)?;
        let demonyms = load_demonyms(&demonyms_path)?;

        info!(
            countries = countries.len(),
            demonyms = demonyms.len(),
            "reference name lists loaded"
        );

        Self::new(&countries, &demonyms, &config.memo_marker)
    }

    pub fn new(countries: &[String], demonyms: &[String], memo_marker: &str) -> Result<Self> {
        let memo_re = Regex::new(&format!("(?i){}", regex::escape(memo_marker)))
            .context("failed to compile memo marker regex")?;

        Ok(Self {
            countries: NameFinder::new(countries)?,
            demonyms: NameFinder::new(demonyms)?,
            memo_re,
        })
    }

    /// Classify a title. No reference-name match means internal
    /// communication; a memorandum marker excludes the title outright; a
    /// matched name only counts as a participant when it is introduced by a
    /// representative phrase.
    pub fn classify(&self, title: &str) -> Classification {
        let (name, start, matched_by) = match self.countries.find(title) {
            Some((name, start)) => (name, start, MATCHED_BY_COUNTRY),
            None => match self.demonyms.find(title) {
                Some((name, start)) => (name, start, MATCHED_BY_DEMONYM),
                None => {
                    return Classification {
                        country: None,
                        matched_by: None,
                        status: STATUS_INTERNAL,
                    };
                }
            },
        };

        if self.memo_re.is_match(title) {
            return Classification {
                country: None,
                matched_by: Some(matched_by),
                status: STATUS_MEMORANDUM,
            };
        }

        let status = if is_representative(title, start) {
            STATUS_REPRESENTATIVE
        } else {
            STATUS_MENTION
        };

        Classification {
            country: Some(name),
            matched_by: Some(matched_by),
            status,
        }
    }
}

/// Case-insensitive leftmost search over a closed list of names.
struct NameFinder {
    re: Option<Regex>,
}

impl NameFinder {
    fn new(names: &[String]) -> Result<Self> {
        if names.is_empty() {
            return Ok(Self { re: None });
        }

        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
            .context("failed to compile name finder regex")?;
        Ok(Self { re: Some(re) })
    }

    fn find(&self, text: &str) -> Option<(String, usize)> {
        let found = self.re.as_ref()?.find(text)?;
        Some((found.as_str().to_string(), found.start()))
    }
}

/// A matched name speaks for a state when the words leading up to it
/// introduce a representative: either one of the republic phrases appears in
/// the five preceding words, or the name is directly preceded by "of"
/// ("the Minister of France").
fn is_representative(title: &str, match_start: usize) -> bool {
    let prefix = &title[..match_start];
    let words: Vec<String> = prefix
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect();

    let window_start = words.len().saturating_sub(5);
    let window = words[window_start..].join(" ");

    if window.contains("of the republic of")
        || window.contains("to republic of")
        || window.contains("of the federal republic of")
    {
        return true;
    }

    words.last().is_some_and(|word| word == "of")
}

/// Country names from one column of the reference CSV, deduplicated in file
/// order.
pub fn load_country_names(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open countries file {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers of {}", path.display()))?
        .clone();
    let Some(column_index) = headers.iter().position(|h| h == column) else {
        bail!("countries file {} has no column {column}", path.display());
    };

    let mut names = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("malformed row in {}", path.display()))?;
        let Some(name) = row.get(column_index) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || names.iter().any(|existing| existing == name) {
            continue;
        }
        names.push(name.to_string());
    }

    Ok(names)
}

#[derive(Debug, Deserialize)]
struct DemonymEntry {
    #[serde(default)]
    demonym: String,
}

/// Demonyms from the reference JSON array, blanks dropped, deduplicated in
/// file order.
pub fn load_demonyms(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read demonyms file {}", path.display()))?;
    let entries: Vec<DemonymEntry> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse demonyms file {}", path.display()))?;

    let mut demonyms = Vec::new();
    for entry in entries {
        let demonym = entry.demonym.trim();
        if demonym.is_empty() || demonyms.iter().any(|existing| existing == demonym) {
            continue;
        }
        demonyms.push(demonym.to_string());
    }

    Ok(demonyms)
}
