use crate::dates::DateRules;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pipeline configuration, loaded from a single TOML file. Every section and
/// field has a default so a missing file simply runs the stock pipeline.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub dates: DateRules,
    #[serde(default)]
    pub identify: IdentifyConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.catalog.url.trim().is_empty() {
            bail!("catalog.url must not be empty");
        }
        if self.extract.page_glob.trim().is_empty() {
            bail!("extract.page_glob must not be empty");
        }
        if self.extract.dateline_selector.trim().is_empty() {
            bail!("extract.dateline_selector must not be empty");
        }
        if self.dates.min_year > self.dates.max_year {
            bail!(
                "dates.min_year {} exceeds dates.max_year {}",
                self.dates.min_year,
                self.dates.max_year
            );
        }
        if self.identify.country_column.trim().is_empty() {
            bail!("identify.country_column must not be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Page listing the downloadable e-books.
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// Local cache of the catalog page, relative to the data directory.
    /// Present means no network round trip.
    #[serde(default = "default_catalog_cache")]
    pub cache_file: String,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            cache_file: default_catalog_cache(),
            manifest_file: default_manifest_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u8,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Subdirectory of an unpacked book holding the page documents.
    #[serde(default = "default_content_subdir")]
    pub content_subdir: String,
    /// Glob selecting document pages within the content directory.
    #[serde(default = "default_page_glob")]
    pub page_glob: String,
    /// CSS selector for the dateline fragment of a page.
    #[serde(default = "default_dateline_selector")]
    pub dateline_selector: String,
    /// Pages whose title contains any of these markers are not documents and
    /// are dropped.
    #[serde(default = "default_skip_title_markers")]
    pub skip_title_markers: Vec<String>,
    #[serde(default = "default_records_file")]
    pub output_file: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            content_subdir: default_content_subdir(),
            page_glob: default_page_glob(),
            dateline_selector: default_dateline_selector(),
            skip_title_markers: default_skip_title_markers(),
            output_file: default_records_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyConfig {
    /// Reference list of state names, one CSV column.
    #[serde(default = "default_countries_file")]
    pub countries_file: PathBuf,
    #[serde(default = "default_country_column")]
    pub country_column: String,
    /// JSON array of objects carrying a "demonym" field.
    #[serde(default = "default_demonyms_file")]
    pub demonyms_file: PathBuf,
    /// Titles containing this marker are indirect communication and are
    /// excluded from participant identification.
    #[serde(default = "default_memo_marker")]
    pub memo_marker: String,
    #[serde(default = "default_identified_file")]
    pub output_file: String,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            countries_file: default_countries_file(),
            country_column: default_country_column(),
            demonyms_file: default_demonyms_file(),
            memo_marker: default_memo_marker(),
            output_file: default_identified_file(),
        }
    }
}

/// Load the pipeline configuration, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        debug!(config = %path.display(), "config file absent; using defaults");
        return Ok(PipelineConfig::default());
    }
    load_config_file(path)
}

/// Load and validate an explicitly named configuration file; missing is an
/// error here, unlike `load_config`.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: PipelineConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Resolve a configured path against a base directory unless it is already
/// absolute.
pub fn resolve_path(base_dir: &Path, maybe_relative: &Path) -> PathBuf {
    if maybe_relative.is_absolute() {
        maybe_relative.to_path_buf()
    } else {
        base_dir.join(maybe_relative)
    }
}

fn default_catalog_url() -> String {
    "https://history.state.gov/historicaldocuments/ebooks".to_string()
}

fn default_catalog_cache() -> String {
    "ebooks.html".to_string()
}

fn default_manifest_file() -> String {
    "manifest.json".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retry_attempts() -> u8 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_content_subdir() -> String {
    "OEBPS".to_string()
}

fn default_page_glob() -> String {
    "d*.html".to_string()
}

fn default_dateline_selector() -> String {
    "p.dateline".to_string()
}

fn default_skip_title_markers() -> Vec<String> {
    vec!["Editorial Note".to_string()]
}

fn default_records_file() -> String {
    "raw.csv".to_string()
}

fn default_countries_file() -> PathBuf {
    PathBuf::from("countries.csv")
}

fn default_country_column() -> String {
    "StateNme".to_string()
}

fn default_demonyms_file() -> PathBuf {
    PathBuf::from("countries.json")
}

fn default_memo_marker() -> String {
    "Memorandum".to_string()
}

fn default_identified_file() -> String {
    "identified.csv".to_string()
}
