use crate::{
    chunk_plan,
    config::Output,
    loader::Loader,
    output,
    processor::DocumentProcessor,
    registry::Registry,
    report::{BatchReport, DocumentOutcome},
    util::{now_rfc3339, run_id},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub max_parallel: usize,
    /// Chunk every cleaned document with this budget.
    pub chunk_max_chars: Option<usize>,
    /// Normalized config, hashed into the run id.
    pub config_norm: String,
    /// Where to write per-document files; nothing is written when `None`.
    pub out_dir: Option<PathBuf>,
    pub output: Output,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_parallel: 1,
            chunk_max_chars: None,
            config_norm: String::new(),
            out_dir: None,
            output: Output::default(),
        }
    }
}

pub fn run(
    registry: &Registry,
    identifiers: &[String],
    loader: &(dyn Loader + Sync),
    opts: &BatchOptions,
) -> BatchReport {
    let run_id = run_id(&opts.config_norm, identifiers);
    let started = now_rfc3339();
    let workers = opts.max_parallel.clamp(1, identifiers.len().max(1));
    info!(
        "run {run_id}: {} documents on {workers} worker(s)",
        identifiers.len()
    );

    let processor = DocumentProcessor::new(registry);
    let outcomes: Vec<DocumentOutcome> = if workers == 1 {
        identifiers
            .iter()
            .map(|id| process_one(&processor, id, loader, opts))
            .collect()
    } else {
        let next = AtomicUsize::new(0);
        let mut indexed: Vec<(usize, DocumentOutcome)> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let i = next.fetch_add(1, Ordering::Relaxed);
                            let Some(id) = identifiers.get(i) else {
                                break;
                            };
                            done.push((i, process_one(&processor, id, loader, opts)));
                        }
                        done
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(done) => done,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });
        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, o)| o).collect()
    };

    let succeeded = outcomes.iter().filter(|o| o.ok).count();
    let failed = outcomes.len() - succeeded;
    info!("run {run_id}: {succeeded} ok, {failed} failed");

    BatchReport {
        run_id,
        started,
        finished: now_rfc3339(),
        succeeded,
        failed,
        outcomes,
    }
}

fn process_one(
    processor: &DocumentProcessor<'_>,
    identifier: &str,
    loader: &(dyn Loader + Sync),
    opts: &BatchOptions,
) -> DocumentOutcome {
    let doc = match processor.run(identifier, loader) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("{identifier}: {e}");
            return DocumentOutcome::failure(identifier, e.kind(), e.to_string());
        }
    };

    let plan = match opts.chunk_max_chars {
        None => None,
        Some(max) => match chunk_plan::chunk(&doc.text, &doc.identifier, max) {
            Ok(plan) => Some(plan.with_metadata(doc.provenance.clone())),
            Err(e) => {
                warn!("{identifier}: {e}");
                return DocumentOutcome::failure(identifier, e.kind(), e.to_string());
            }
        },
    };

    if let Some(out_dir) = &opts.out_dir {
        if let Err(e) = output::write_document(out_dir, &opts.output, &doc, plan.as_ref()) {
            warn!("{identifier}: {e:#}");
            return DocumentOutcome::failure(identifier, "io", format!("{e:#}"));
        }
    }

    let chunk_count = plan.as_ref().map(|p| p.len());
    DocumentOutcome::success(doc.stats, chunk_count)
}
