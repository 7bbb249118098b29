use crate::model::{Manifest, PageRecord, TitleClassification};
use anyhow::{Context, Result};
use std::path::Path;

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Ok(Manifest::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let manifest = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse manifest {}", path.display()))?;
    Ok(manifest)
}

pub fn save_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create manifest directory {}", parent.display()))?;
    }

    let serialized = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, serialized)
        .with_context(|| format!("failed to write manifest {}", path.display()))?;
    Ok(())
}

pub fn write_records(path: &Path, records: &[PageRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open records file {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush records file {}", path.display()))?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<PageRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open records file {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: PageRecord =
            row.with_context(|| format!("malformed record row in {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}

pub fn write_classifications(path: &Path, rows: &[TitleClassification]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open classification file {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush classification file {}", path.display()))?;
    Ok(())
}
