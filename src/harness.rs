use crate::pipeline::{ExtractOptions, IdentifyOptions, extract_books, identify_titles};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub work_dir: PathBuf,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub first_run_records: usize,
    pub second_run_records: usize,
    pub pages_scanned: usize,
    pub pages_skipped: usize,
    pub dated: usize,
    pub possible_dated: usize,
    pub undated: usize,
    pub identified_rows: usize,
    pub representatives: usize,
    pub csv_files: usize,
}

/// End-to-end smoke run over an already-populated data directory: extract
/// twice to confirm the output is stable, then identify, then count what
/// landed on disk.
pub fn run_harness(options: &HarnessOptions) -> Result<HarnessReport> {
    if options.out_dir.exists() {
        std::fs::remove_dir_all(&options.out_dir)?;
    }

    let extract_options = ExtractOptions {
        config_path: options.config_path.clone(),
        data_dir: options.data_dir.clone(),
        work_dir: options.work_dir.clone(),
        out_dir: options.out_dir.clone(),
        book: None,
    };

    let first = extract_books(&extract_options)?;
    let second = extract_books(&extract_options)?;

    let identify = identify_titles(&IdentifyOptions {
        config_path: options.config_path.clone(),
        data_dir: options.data_dir.clone(),
        out_dir: options.out_dir.clone(),
        input: None,
    })?;

    let mut csv_files = 0usize;
    for entry in WalkDir::new(&options.out_dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("csv")
        {
            csv_files += 1;
        }
    }

    Ok(HarnessReport {
        first_run_records: first.records_written,
        second_run_records: second.records_written,
        pages_scanned: second.pages_scanned,
        pages_skipped: second.pages_skipped,
        dated: second.dated,
        possible_dated: second.possible_dated,
        undated: second.undated,
        identified_rows: identify.rows,
        representatives: identify.representatives,
        csv_files,
    })
}
