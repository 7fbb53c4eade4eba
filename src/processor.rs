use crate::{
    error::{Error, Result},
    loader::Loader,
    pipeline::StepTrace,
    registry::{HandlerDescriptor, Registry},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    pub name: String,
    pub chars_in: usize,
    pub chars_out: usize,
    pub removed: usize,
    pub added: usize,
}

impl From<&StepTrace> for StepStats {
    fn from(t: &StepTrace) -> Self {
        Self {
            name: t.name.clone(),
            chars_in: t.chars_in,
            chars_out: t.chars_out,
            removed: t.removed,
            added: t.added,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub identifier: String,
    pub title: String,
    pub raw_chars: usize,
    pub cleaned_chars: usize,
    pub reduction_pct: f64,
    pub transforms_applied: usize,
    pub steps: Vec<StepStats>,
}

impl DocumentStats {
    /// The step that rewrote the most characters, if any step changed the text.
    pub fn busiest_step(&self) -> Option<&StepStats> {
        self.steps
            .iter()
            .filter(|s| s.removed + s.added > 0)
            .max_by_key(|s| s.removed + s.added)
    }
}

/// A cleaned document plus the provenance carried into its chunks.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub identifier: String,
    pub text: String,
    pub provenance: BTreeMap<String, serde_json::Value>,
    pub stats: DocumentStats,
}

pub struct DocumentProcessor<'r> {
    registry: &'r Registry,
}

impl<'r> DocumentProcessor<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn run(&self, identifier: &str, loader: &dyn Loader) -> Result<ProcessedDocument> {
        let descriptor = self.registry.resolve(identifier)?;
        let raw = loader.load(identifier)?;
        let doc = process_text(descriptor, &raw)?;
        info!(
            "{} cleaned: {} -> {} chars ({}% reduction)",
            identifier, doc.stats.raw_chars, doc.stats.cleaned_chars, doc.stats.reduction_pct
        );
        Ok(doc)
    }
}

/// Applies `descriptor`'s pipeline to already-loaded raw text.
pub fn process_text(descriptor: &HandlerDescriptor, raw: &str) -> Result<ProcessedDocument> {
    let applied = descriptor
        .pipeline
        .apply_traced(raw)
        .map_err(|f| Error::TransformFailure {
            identifier: descriptor.identifier.clone(),
            transform: f.transform,
            reason: f.source.to_string(),
        })?;

    let raw_chars = raw.chars().count();
    let cleaned_chars = applied.steps.last().map_or(raw_chars, |s| s.chars_out);
    let stats = DocumentStats {
        identifier: descriptor.identifier.clone(),
        title: descriptor.title.clone(),
        raw_chars,
        cleaned_chars,
        reduction_pct: reduction_pct(raw_chars, cleaned_chars),
        transforms_applied: applied.steps.len(),
        steps: applied.steps.iter().map(StepStats::from).collect(),
    };

    Ok(ProcessedDocument {
        identifier: descriptor.identifier.clone(),
        text: applied.text,
        provenance: provenance(descriptor),
        stats,
    })
}

fn reduction_pct(raw: usize, cleaned: usize) -> f64 {
    if raw == 0 {
        return 0.0;
    }
    let pct = (1.0 - cleaned as f64 / raw as f64) * 100.0;
    (pct * 100.0).round() / 100.0
}

fn provenance(d: &HandlerDescriptor) -> BTreeMap<String, serde_json::Value> {
    [("title", &d.title), ("author", &d.author), ("date", &d.date)]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
        .collect()
}
