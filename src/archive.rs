use anyhow::{Context, Result, bail};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

/// All e-book archives in the data directory, in deterministic order.
pub fn find_books(data_dir: &Path) -> Result<Vec<PathBuf>> {
    glob_paths(&data_dir.join("*.epub"))
}

/// Unpack one e-book into the working directory, replacing whatever a
/// previous book left there. Entry paths are sanitized so a hostile archive
/// cannot write outside the target.
pub fn unpack_book(book: &Path, work_dir: &Path) -> Result<()> {
    if work_dir.exists() {
        std::fs::remove_dir_all(work_dir)
            .with_context(|| format!("failed to clear work dir {}", work_dir.display()))?;
    }
    std::fs::create_dir_all(work_dir)
        .with_context(|| format!("failed to create work dir {}", work_dir.display()))?;

    let file =
        File::open(book).with_context(|| format!("failed to open book {}", book.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("invalid epub archive {}", book.display()))?;

    info!(book = %book.display(), entries = archive.len(), "unpacking book");

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            debug!(entry = %entry.name(), "skipping entry with unsafe path");
            continue;
        };
        let target = work_dir.join(relative);

        if entry.name().ends_with('/') {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
            std::io::copy(&mut entry, &mut out)
                .with_context(|| format!("failed to extract {}", target.display()))?;
        }
    }

    Ok(())
}

/// Document pages of an unpacked book, matched by the configured glob under
/// the content subdirectory.
pub fn find_pages(work_dir: &Path, content_subdir: &str, page_glob: &str) -> Result<Vec<PathBuf>> {
    glob_paths(&work_dir.join(content_subdir).join(page_glob))
}

fn glob_paths(pattern: &Path) -> Result<Vec<PathBuf>> {
    let Some(pattern_text) = pattern.to_str() else {
        bail!("glob pattern is not valid utf-8: {}", pattern.display());
    };

    let mut paths = Vec::new();
    for entry in glob::glob(pattern_text)
        .with_context(|| format!("invalid glob pattern {pattern_text}"))?
    {
        paths.push(entry.context("failed to read globbed path")?);
    }
    Ok(paths)
}
