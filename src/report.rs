use crate::processor::DocumentStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: String,
    pub started: String,
    pub finished: String,
    pub succeeded: usize,
    pub failed: usize,
    /// One entry per requested identifier, in request order.
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| !o.ok)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub identifier: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<DocumentStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    /// `config`, `not_found`, `load`, `transform_failure` or `io`.
    pub kind: String,
    pub message: String,
}

impl DocumentOutcome {
    pub fn success(stats: DocumentStats, chunk_count: Option<usize>) -> Self {
        Self {
            identifier: stats.identifier.clone(),
            ok: true,
            stats: Some(stats),
            chunk_count,
            error: None,
        }
    }

    pub fn failure(identifier: &str, kind: &str, message: impl Into<String>) -> Self {
        Self {
            identifier: identifier.to_string(),
            ok: false,
            stats: None,
            chunk_count: None,
            error: Some(OutcomeError {
                kind: kind.to_string(),
                message: message.into(),
            }),
        }
    }
}
