use crate::{
    chunk_plan::ChunkPlan,
    config::Output,
    processor::ProcessedDocument,
    util::{ensure_dir, file_stem},
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one JSON object per line and returns how many were written.
pub fn write_jsonl<T, I>(records: I, path: &Path) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    let mut n = 0;
    for rec in records {
        serde_json::to_writer(&mut w, &rec)
            .with_context(|| format!("serialize record {n} for {}", path.display()))?;
        w.write_all(b"\n")?;
        n += 1;
    }
    w.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(n)
}

/// `<out_dir>/<identifier>/`
pub fn document_dir(out_dir: &Path, identifier: &str) -> PathBuf {
    out_dir.join(file_stem(identifier))
}

/// Writes the cleaned text, stats and chunks that `cfg` enables.
pub fn write_document(
    out_dir: &Path,
    cfg: &Output,
    doc: &ProcessedDocument,
    chunks: Option<&ChunkPlan<'_>>,
) -> Result<PathBuf> {
    let dir = document_dir(out_dir, &doc.identifier);
    ensure_dir(&dir)?;

    if cfg.write_cleaned_text {
        std::fs::write(dir.join("cleaned.txt"), &doc.text)
            .with_context(|| format!("write cleaned text for {}", doc.identifier))?;
    }
    if cfg.write_stats_json {
        std::fs::write(dir.join("stats.json"), serde_json::to_string_pretty(&doc.stats)?)
            .with_context(|| format!("write stats for {}", doc.identifier))?;
    }
    if let Some(plan) = chunks.filter(|_| cfg.write_chunks_jsonl) {
        write_jsonl(plan.chunks(), &dir.join(&cfg.chunks_filename))?;
    }
    Ok(dir)
}
