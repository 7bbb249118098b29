use crate::config::{CatalogConfig, FetchConfig};
use crate::model::{BookEntry, FetchReport, Manifest};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub fn build_client(config: &FetchConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(user_agent) = &config.user_agent {
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    }

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()
        .context("failed to build reqwest client")
}

/// The catalog page, from the on-disk cache when present, otherwise fetched
/// and cached for the next run.
pub fn load_catalog_page(
    client: &Client,
    catalog: &CatalogConfig,
    fetch: &FetchConfig,
    data_dir: &Path,
) -> Result<String> {
    let cache_path = data_dir.join(&catalog.cache_file);
    if cache_path.exists() {
        info!(cache = %cache_path.display(), "using cached catalog page");
        return std::fs::read_to_string(&cache_path)
            .with_context(|| format!("failed to read catalog cache {}", cache_path.display()));
    }

    let bytes = fetch_with_retries(
        client,
        &catalog.url,
        fetch.retry_attempts,
        fetch.retry_backoff_ms,
    )?;
    let html = String::from_utf8_lossy(&bytes).to_string();

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;
    std::fs::write(&cache_path, &html)
        .with_context(|| format!("failed to cache catalog page {}", cache_path.display()))?;
    info!(url = %catalog.url, cache = %cache_path.display(), "catalog page fetched");

    Ok(html)
}

/// All e-book links on the catalog page, absolutized against the catalog URL.
pub fn scrape_book_urls(catalog_html: &str, catalog_url: &str) -> Result<Vec<String>> {
    let parsed = Html::parse_document(catalog_html);
    let selector =
        Selector::parse("a").map_err(|err| anyhow::anyhow!("invalid anchor selector: {err:?}"))?;

    let mut urls = Vec::new();
    for anchor in parsed.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(".epub") {
            continue;
        }
        urls.push(absolutize_url(catalog_url, href));
    }

    Ok(urls)
}

/// Download every book URL into the data directory, skipping files the
/// manifest already accounts for. Each completed download is recorded with
/// its content digest.
pub fn download_books(
    client: &Client,
    fetch: &FetchConfig,
    book_urls: &[String],
    data_dir: &Path,
    manifest: &mut Manifest,
) -> Result<FetchReport> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

    let mut report = FetchReport {
        books_discovered: book_urls.len(),
        ..FetchReport::default()
    };

    for url in book_urls {
        let file_name = book_file_name(url);
        let target = data_dir.join(&file_name);

        if target.exists() && manifest.books.contains_key(&file_name) {
            info!(book = %file_name, "already downloaded; skipping");
            report.skipped += 1;
            continue;
        }

        let bytes = fetch_with_retries(client, url, fetch.retry_attempts, fetch.retry_backoff_ms)?;
        std::fs::write(&target, &bytes)
            .with_context(|| format!("failed to write book {}", target.display()))?;

        let digest = hex::encode(Sha256::digest(&bytes));
        manifest.books.insert(
            file_name.clone(),
            BookEntry {
                source_url: url.clone(),
                sha256: digest,
                bytes: bytes.len(),
                downloaded_at: Utc::now(),
            },
        );

        info!(book = %file_name, bytes = bytes.len(), url = %url, "book downloaded");
        report.downloaded += 1;
    }

    Ok(report)
}

fn fetch_with_retries(
    client: &Client,
    url: &str,
    retry_attempts: u8,
    retry_backoff_ms: u64,
) -> Result<Vec<u8>> {
    let attempts = retry_attempts.max(1);

    for attempt in 1..=attempts {
        match client.get(url).send() {
            Ok(resp) => {
                if !resp.status().is_success() {
                    let status = resp.status();
                    if attempt == attempts {
                        bail!("request to {url} failed with status {status}");
                    }
                    warn!(%url, %status, attempt, "request failed; retrying");
                } else {
                    return Ok(resp.bytes()?.to_vec());
                }
            }
            Err(err) => {
                if attempt == attempts {
                    return Err(err).with_context(|| format!("request to {url} failed"));
                }
                warn!(%url, attempt, error = %err, "request errored; retrying");
            }
        }

        std::thread::sleep(Duration::from_millis(retry_backoff_ms));
    }

    bail!("request to {url} failed after retries")
}

fn absolutize_url(base_url: &str, value: &str) -> String {
    if value.starts_with("http://") || value.starts_with("https://") {
        return value.to_string();
    }

    if let Ok(base) = Url::parse(base_url)
        && let Ok(joined) = base.join(value)
    {
        return joined.to_string();
    }

    value.to_string()
}

/// Last path segment of a book URL, sanitized enough to serve as a file name.
fn book_file_name(url: &str) -> String {
    let raw = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.last().map(ToString::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| url.rsplit('/').next().unwrap_or("book.epub").to_string());

    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
