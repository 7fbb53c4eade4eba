use crate::{
    batch::{self, BatchOptions},
    books::BuiltinCatalog,
    chunk_plan,
    config::Config,
    loader::open_source,
    output::{document_dir, write_jsonl},
    processor::DocumentProcessor,
    registry::{DescriptorSource, Registry, TomlDirSource},
    segment::Segmenter,
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "grokken")]
#[command(about = "Per-book OCR cleanup pipelines, chunking and segmentation for scanned historical texts")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./grokken.toml if present, else built-in defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered identifiers, optionally only one collection.
    List {
        #[arg(long)]
        collection: Option<String>,
    },
    /// Show one handler and its pipeline.
    Info {
        #[arg(long)]
        id: String,
    },
    /// Clean documents and write per-document outputs plus a run report.
    #[command(group(ArgGroup::new("target").required(true).args(["id", "collection"])))]
    Process {
        #[arg(long)]
        id: Vec<String>,
        #[arg(long)]
        collection: Option<String>,
        /// Raw text source: a JSONL export or a directory of `<id>.txt`.
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Also chunk each cleaned document and write the chunks JSONL.
        #[arg(long)]
        chunks: bool,
    },
    /// Clean one document and write its training chunks.
    Chunk {
        #[arg(long)]
        id: String,
        #[arg(long)]
        max_chars: Option<usize>,
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Clean one document and write its overlapping segments.
    Segment {
        #[arg(long)]
        id: String,
        #[arg(long)]
        target_chars: Option<usize>,
        #[arg(long)]
        overlap_chars: Option<usize>,
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let loaded = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path),
        None => Ok(Config::default()),
    };

    // A broken config is still reported through the default logger.
    let log_cfg = loaded.as_ref().map_or_else(|_| Config::default(), Clone::clone);
    let log_path = resolve_log_path(&log_cfg);
    let _guard = init_logging(&args, &log_cfg, log_path.as_deref())?;
    let cfg = loaded?;
    let registry = build_registry(&cfg)?;

    match &args.cmd {
        Command::List { collection } => list(&registry, collection.as_deref()),
        Command::Info { id } => show(&registry, id),
        Command::Process {
            id,
            collection,
            source,
            out_dir,
            chunks,
        } => process(&cfg, &registry, id, collection.as_deref(), source.as_deref(), out_dir.as_deref(), *chunks),
        Command::Chunk {
            id,
            max_chars,
            source,
            out_dir,
        } => chunk(&cfg, &registry, id, *max_chars, source.as_deref(), out_dir.as_deref()),
        Command::Segment {
            id,
            target_chars,
            overlap_chars,
            source,
            out_dir,
        } => segment(
            &cfg,
            &registry,
            id,
            *target_chars,
            *overlap_chars,
            source.as_deref(),
            out_dir.as_deref(),
        ),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("grokken.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output; logs go to stderr.
    let console_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from(&cfg.paths.out_dir).join("grokken.log"))
}

fn build_registry(cfg: &Config) -> Result<Registry> {
    let builtin = BuiltinCatalog;
    let toml_dir = (!cfg.paths.handlers_dir.is_empty())
        .then(|| TomlDirSource::new(&cfg.paths.handlers_dir));

    let mut sources: Vec<&dyn DescriptorSource> = Vec::new();
    sources.push(&builtin);
    if let Some(dir) = &toml_dir {
        sources.push(dir);
    }
    Registry::discover(&sources).context("building handler registry")
}

fn list(registry: &Registry, collection: Option<&str>) -> Result<()> {
    let members = match collection {
        Some(tag) => registry.resolve_collection(tag)?,
        None => registry.iter().collect(),
    };
    let rows: Vec<_> = members
        .iter()
        .map(|d| {
            serde_json::json!({
                "identifier": d.identifier,
                "collection": d.collection,
                "title": d.title,
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "collections": registry.list_collections(),
            "handlers": rows,
        }))?
    );
    Ok(())
}

fn show(registry: &Registry, identifier: &str) -> Result<()> {
    let d = registry.resolve(identifier)?;
    let transforms: Vec<_> = d.pipeline.steps().iter().map(|t| t.spec()).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "identifier": d.identifier,
            "title": d.title,
            "author": d.author,
            "date": d.date,
            "notes": d.notes,
            "collection": d.collection,
            "origin": d.origin,
            "transforms": transforms,
            "finish": d.pipeline.finish().name(),
        }))?
    );
    Ok(())
}

fn source_path(cfg: &Config, user: Option<&Path>) -> PathBuf {
    user.map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.source))
}

fn out_root(cfg: &Config, user: Option<&Path>) -> PathBuf {
    user.map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir))
}

fn process(
    cfg: &Config,
    registry: &Registry,
    ids: &[String],
    collection: Option<&str>,
    source: Option<&Path>,
    out_dir: Option<&Path>,
    chunks: bool,
) -> Result<()> {
    let identifiers: Vec<String> = match collection {
        Some(tag) => registry
            .resolve_collection(tag)?
            .iter()
            .map(|d| d.identifier.clone())
            .collect(),
        None => ids.to_vec(),
    };
    if identifiers.is_empty() {
        info!("nothing to process");
    }

    let loader = open_source(&source_path(cfg, source))?;
    let out_root = out_root(cfg, out_dir);
    ensure_dir(&out_root)?;

    let mut output = cfg.output.clone();
    output.write_chunks_jsonl |= chunks;
    let opts = BatchOptions {
        max_parallel: cfg.global.max_parallel_documents,
        chunk_max_chars: output.write_chunks_jsonl.then_some(cfg.chunking.max_chars),
        config_norm: cfg.normalized_for_hash(),
        out_dir: Some(out_root.clone()),
        output,
    };

    let report = batch::run(registry, &identifiers, loader.as_ref(), &opts);
    let report_path = out_root.join(&cfg.output.report_filename);
    std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("write report: {}", report_path.display()))?;

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "run_id": report.run_id,
                "report": report_path,
                "succeeded": report.succeeded,
                "failed": report.failed,
            }))?
        );
    }

    if report.failed > 0 {
        return Err(anyhow!(
            "{} of {} documents failed; see {}",
            report.failed,
            report.outcomes.len(),
            report_path.display()
        ));
    }
    Ok(())
}

fn chunk(
    cfg: &Config,
    registry: &Registry,
    identifier: &str,
    max_chars: Option<usize>,
    source: Option<&Path>,
    out_dir: Option<&Path>,
) -> Result<()> {
    let loader = open_source(&source_path(cfg, source))?;
    let doc = DocumentProcessor::new(registry).run(identifier, loader.as_ref())?;
    let max_chars = max_chars.unwrap_or(cfg.chunking.max_chars);
    let plan = chunk_plan::chunk(&doc.text, &doc.identifier, max_chars)?
        .with_metadata(doc.provenance.clone());

    let path = document_dir(&out_root(cfg, out_dir), identifier).join(&cfg.output.chunks_filename);
    let written = write_jsonl(plan.chunks(), &path)?;
    info!("{identifier}: wrote {written} chunks to {}", path.display());

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "identifier": identifier,
            "max_chars": max_chars,
            "chunk_count": written,
            "path": path,
            "finished": now_rfc3339(),
        }))?
    );
    Ok(())
}

fn segment(
    cfg: &Config,
    registry: &Registry,
    identifier: &str,
    target_chars: Option<usize>,
    overlap_chars: Option<usize>,
    source: Option<&Path>,
    out_dir: Option<&Path>,
) -> Result<()> {
    let mut seg_cfg = cfg.segmenting.clone();
    if let Some(n) = target_chars {
        seg_cfg.target_chars = n;
    }
    if let Some(n) = overlap_chars {
        seg_cfg.overlap_chars = n;
    }
    let segmenter = Segmenter::from_config(&seg_cfg)?;

    let loader = open_source(&source_path(cfg, source))?;
    let doc = DocumentProcessor::new(registry).run(identifier, loader.as_ref())?;
    let plan = segmenter.plan(&doc.text);

    let path = document_dir(&out_root(cfg, out_dir), identifier).join(&cfg.output.segments_filename);
    let written = write_jsonl(plan.segments(), &path)?;
    info!("{identifier}: wrote {written} segments to {}", path.display());

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "identifier": identifier,
            "target_chars": segmenter.target_chars(),
            "overlap_chars": segmenter.overlap_chars(),
            "segment_count": written,
            "path": path,
            "finished": now_rfc3339(),
        }))?
    );
    Ok(())
}
