use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

/// Closed vocabulary of month surface forms. Abbreviations carry their dot so
/// that "Jan. 4" matches while the "jan" inside "janitor" does not; "may" has
/// no dotted form. Matching is case-insensitive and deliberately unanchored:
/// historical OCR runs words together ("May4, 1865") and a word boundary
/// would lose those dates.
const MONTHS: [(&str, u32); 23] = [
    ("january", 1),
    ("jan.", 1),
    ("february", 2),
    ("feb.", 2),
    ("march", 3),
    ("mar.", 3),
    ("april", 4),
    ("apr.", 4),
    ("may", 5),
    ("june", 6),
    ("jun.", 6),
    ("july", 7),
    ("jul.", 7),
    ("august", 8),
    ("aug.", 8),
    ("september", 9),
    ("sep.", 9),
    ("october", 10),
    ("oct.", 10),
    ("november", 11),
    ("nov.", 11),
    ("december", 12),
    ("dec.", 12),
];

/// Result of scanning a free-text string for a publication date.
///
/// Absence of a date is data, not an error: `NotFound` means the text carried
/// no usable signal, `Undated` means it explicitly disclaims one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateExtraction {
    Dated {
        year: i32,
        month: u32,
        day: Option<u32>,
    },
    Undated,
    NotFound,
}

impl DateExtraction {
    /// Normalized storage field: `YYYY-MM-DD`, `YYYY-MM`, the literal
    /// `Undated`, or `None` when nothing was found.
    pub fn as_field(&self) -> Option<String> {
        match self {
            DateExtraction::Dated {
                year,
                month,
                day: Some(day),
            } => Some(format!("{year:04}-{month:02}-{day:02}")),
            DateExtraction::Dated {
                year,
                month,
                day: None,
            } => Some(format!("{year:04}-{month:02}")),
            DateExtraction::Undated => Some("Undated".to_string()),
            DateExtraction::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, DateExtraction::NotFound)
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            DateExtraction::Dated { year, month, day } => {
                NaiveDate::from_ymd_opt(*year, *month, day.unwrap_or(1))
            }
            _ => None,
        }
    }
}

/// Tuning constants for the extraction heuristic. These are empirically
/// calibrated values, kept as data so recalibration does not touch the scan
/// logic.
#[derive(Debug, Clone, Deserialize)]
pub struct DateRules {
    /// Phrases that may sit between a day token and its month
    /// ("the 22d day of the month of April"). Checked in order; only the
    /// first hit widens the window.
    #[serde(default = "default_prefix_phrases")]
    pub prefix_phrases: Vec<String>,
    /// How far past the month name the numeral search extends.
    #[serde(default = "default_trailing_window")]
    pub trailing_window: usize,
    #[serde(default = "default_min_year")]
    pub min_year: i64,
    #[serde(default = "default_max_year")]
    pub max_year: i64,
}

impl Default for DateRules {
    fn default() -> Self {
        Self {
            prefix_phrases: default_prefix_phrases(),
            trailing_window: default_trailing_window(),
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

/// Heuristic date extractor over free historical-document prose.
///
/// Stateless between calls; holds only the compiled vocabulary and the
/// tuning rules, so one scanner can serve any number of documents.
pub struct DateScanner {
    month_re: Regex,
    digits_re: Regex,
    rules: DateRules,
}

impl DateScanner {
    pub fn new(rules: DateRules) -> Self {
        let vocabulary = MONTHS
            .iter()
            .map(|(surface, _)| regex::escape(surface))
            .collect::<Vec<_>>()
            .join("|");
        let month_re = Regex::new(&format!("(?i){vocabulary}"))
            .expect("month vocabulary regex must compile");
        let digits_re = Regex::new(r"\d+").expect("digit run regex must compile");

        Self {
            month_re,
            digits_re,
            rules,
        }
    }

    /// Scan `text` from `offset` for a date.
    ///
    /// Finds the leftmost month token, gathers the digit runs in a window
    /// around it (widened backward over a day-of phrase and the preceding
    /// word, extended forward by `trailing_window` characters), and reads
    /// the first two numerals as day/year with smaller-is-day
    /// disambiguation. Any rejection re-enters the scan past the rejected
    /// month token, so the routine always terminates after at most one pass
    /// per month occurrence and never fails.
    pub fn extract(&self, text: &str, offset: usize) -> DateExtraction {
        let mut cursor = floor_char_boundary(text, offset);

        loop {
            let tail = &text[cursor..];
            let Some(found) = self.month_re.find(tail) else {
                if tail.to_lowercase().contains("undated") {
                    return DateExtraction::Undated;
                }
                return DateExtraction::NotFound;
            };

            let month = month_number(found.as_str())
                .expect("month match must come from the vocabulary");

            let mut window_start = found.start();
            for phrase in &self.rules.prefix_phrases {
                if is_prefixed_by(tail, phrase, found.start()) {
                    window_start -= phrase.len();
                    break;
                }
            }
            window_start = previous_word_start(tail, window_start);
            let window_end =
                floor_char_boundary(tail, found.end() + self.rules.trailing_window);
            let window = &tail[window_start..window_end];

            let numerals: Vec<i64> = self
                .digits_re
                .find_iter(window)
                .map(|run| run.as_str().parse::<i64>().unwrap_or(i64::MAX))
                .collect();

            match numerals.as_slice() {
                [] => {}
                [year] => {
                    // A lone numeral is a year candidate; only the lower
                    // bound is checked on this path.
                    if *year >= self.rules.min_year
                        && let Ok(year) = i32::try_from(*year)
                    {
                        return DateExtraction::Dated {
                            year,
                            month,
                            day: None,
                        };
                    }
                }
                [a, b, ..] => {
                    // Numerals beyond the second are stray page or document
                    // numbers; the first two decide.
                    let day = *a.min(b);
                    let year = *a.max(b);
                    if day <= 31
                        && year >= self.rules.min_year
                        && year <= self.rules.max_year
                        && let Ok(year) = i32::try_from(year)
                    {
                        return DateExtraction::Dated {
                            year,
                            month,
                            day: Some(day as u32),
                        };
                    }
                }
            }

            // Rejected occurrence: resume strictly past it.
            cursor += found.end();
        }
    }
}

impl Default for DateScanner {
    fn default() -> Self {
        Self::new(DateRules::default())
    }
}

/// Start of the word group ending at `offset`, scanning backward character
/// by character over alphanumerics and whitespace.
///
/// Crossing a second whitespace gap stops the walk (so at most the two
/// previous words are captured), as does any other character class or the
/// start of the text. Leading whitespace is then skipped forward so the
/// returned index sits on the first character of the word. When the
/// character group at `offset` is fenced off by punctuation (brackets in
/// document headers, typically), `offset` comes back unchanged.
pub fn previous_word_start(text: &str, offset: usize) -> usize {
    let mut cursor = floor_char_boundary(text, offset);
    let mut gaps = 0usize;

    loop {
        let Some(ch) = text[cursor..].chars().next() else {
            break;
        };
        if !(ch.is_alphanumeric() || ch.is_whitespace()) {
            cursor += ch.len_utf8();
            break;
        }
        if ch.is_whitespace() {
            gaps += 1;
            if gaps == 2 {
                return cursor + ch.len_utf8();
            }
        }
        if cursor == 0 {
            return 0;
        }
        cursor = previous_char_boundary(text, cursor);
    }

    while let Some(ch) = text[cursor..].chars().next() {
        if !ch.is_whitespace() {
            break;
        }
        cursor += ch.len_utf8();
    }
    cursor
}

/// True iff `prefix` occupies the bytes immediately before `offset`.
/// Total over any inputs; a prefix longer than the preceding text is false.
pub fn is_prefixed_by(text: &str, prefix: &str, offset: usize) -> bool {
    offset
        .checked_sub(prefix.len())
        .and_then(|start| text.get(start..offset))
        .is_some_and(|slice| slice == prefix)
}

fn month_number(surface: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(surface))
        .map(|(_, number)| *number)
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn previous_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index - 1;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn default_prefix_phrases() -> Vec<String> {
    vec![
        " day of the month of ".to_string(),
        " day of ".to_string(),
        " of ".to_string(),
    ]
}

fn default_trailing_window() -> usize {
    30
}

fn default_min_year() -> i64 {
    1800
}

fn default_max_year() -> i64 {
    2100
}
