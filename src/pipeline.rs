use crate::archive::{find_books, find_pages, unpack_book};
use crate::config::{load_config, load_config_file};
use crate::dates::{DateExtraction, DateScanner};
use crate::fetch::{build_client, download_books, load_catalog_page, scrape_book_urls};
use crate::identify::TitleClassifier;
use crate::model::{
    ExtractReport, FetchReport, IdentifyReport, PageRecord, TitleClassification,
};
use crate::page::scrape_page;
use crate::store::{
    load_manifest, read_records, save_manifest, write_classifications, write_records,
};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub work_dir: PathBuf,
    pub out_dir: PathBuf,
    pub book: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdentifyOptions {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub input: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub config_file: PathBuf,
}

/// Download the e-book catalog and every listed book into the data
/// directory, recording completed downloads in the manifest.
pub fn fetch_books(options: &FetchOptions) -> Result<FetchReport> {
    let config = load_config(&options.config_path)?;
    let client = build_client(&config.fetch)?;

    let catalog_html = load_catalog_page(&client, &config.catalog, &config.fetch, &options.data_dir)?;
    let book_urls = scrape_book_urls(&catalog_html, &config.catalog.url)?;
    if book_urls.is_empty() {
        warn!(url = %config.catalog.url, "catalog page lists no e-books");
    }

    let manifest_path = options.data_dir.join(&config.catalog.manifest_file);
    let mut manifest = load_manifest(&manifest_path)?;

    let report = download_books(
        &client,
        &config.fetch,
        &book_urls,
        &options.data_dir,
        &mut manifest,
    )?;

    save_manifest(&manifest_path, &manifest)?;
    info!(manifest = %manifest_path.display(), "manifest written");

    Ok(report)
}

/// Unpack every downloaded book, scrape its document pages, and write the
/// flat records CSV.
pub fn extract_books(options: &ExtractOptions) -> Result<ExtractReport> {
    let config = load_config(&options.config_path)?;
    let scanner = DateScanner::new(config.dates.clone());

    let mut books = find_books(&options.data_dir)?;
    if let Some(filter) = &options.book {
        books.retain(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name == filter)
        });
    }
    if books.is_empty() {
        bail!(
            "no matching e-books found under {}",
            options.data_dir.display()
        );
    }

    let mut report = ExtractReport::default();
    let mut records = Vec::new();

    for book in &books {
        info!(book = %book.display(), "extract start");
        unpack_book(book, &options.work_dir)?;
        let pages = find_pages(
            &options.work_dir,
            &config.extract.content_subdir,
            &config.extract.page_glob,
        )?;

        let book_name = file_name_of(book);
        let mut book_records = 0usize;

        for page in &pages {
            report.pages_scanned += 1;
            let html = std::fs::read_to_string(page)
                .with_context(|| format!("failed to read page {}", page.display()))?;

            let Some(contents) = scrape_page(&html, &config.extract, &scanner)? else {
                report.pages_skipped += 1;
                continue;
            };

            match contents.date {
                DateExtraction::Dated { .. } => report.dated += 1,
                DateExtraction::Undated => report.undated += 1,
                DateExtraction::NotFound => {
                    if contents.possible_date.is_found() {
                        report.possible_dated += 1;
                    }
                }
            }

            records.push(PageRecord {
                title: contents.title,
                date: contents.date.as_field(),
                possible_date: contents.possible_date.as_field(),
                text: contents.text,
                book: book_name.clone(),
                page: file_name_of(page),
            });
            book_records += 1;
        }

        info!(
            book = %book_name,
            pages = pages.len(),
            records = book_records,
            "extract book complete"
        );
        report.books_processed += 1;
    }

    report.records_written = records.len();
    let out_path = options.out_dir.join(&config.extract.output_file);
    write_records(&out_path, &records)?;
    info!(
        records = records.len(),
        file = %out_path.display(),
        "records written"
    );

    Ok(report)
}

/// Classify every extracted title against the country/demonym reference
/// lists and write the classification CSV.
pub fn identify_titles(options: &IdentifyOptions) -> Result<IdentifyReport> {
    let config = load_config(&options.config_path)?;
    let classifier = TitleClassifier::from_reference_files(&config.identify, &options.data_dir)?;

    let input_path = options
        .input
        .clone()
        .unwrap_or_else(|| options.out_dir.join(&config.extract.output_file));
    let records = read_records(&input_path)?;

    let mut report = IdentifyReport::default();
    let mut rows = Vec::new();

    for record in &records {
        let classification = classifier.classify(&record.title);

        match classification.status {
            crate::identify::STATUS_REPRESENTATIVE => {
                report.matched += 1;
                report.representatives += 1;
            }
            crate::identify::STATUS_MENTION => report.matched += 1,
            crate::identify::STATUS_MEMORANDUM => report.memoranda += 1,
            _ => report.unmatched += 1,
        }

        rows.push(TitleClassification {
            title: record.title.clone(),
            date: record.resolved_date().map(ToString::to_string),
            country: classification.country,
            matched_by: classification.matched_by.map(ToString::to_string),
            status: classification.status.to_string(),
        });
    }
    report.rows = rows.len();

    let out_path = options.out_dir.join(&config.identify.output_file);
    write_classifications(&out_path, &rows)?;
    info!(
        rows = rows.len(),
        representatives = report.representatives,
        file = %out_path.display(),
        "classifications written"
    );

    Ok(report)
}

/// Check an explicitly named configuration file and describe the result.
pub fn validate_config(options: &ValidateOptions) -> Result<Vec<String>> {
    let config = load_config_file(&options.config_file)?;
    Ok(vec![format!(
        "OK: {} ({} prefix phrases, window {})",
        options.config_file.display(),
        config.dates.prefix_phrases.len(),
        config.dates.trailing_window
    )])
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
