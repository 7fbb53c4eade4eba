use crate::error::Error;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub chunking: Chunking,
    #[serde(default)]
    pub segmenting: Segmenting,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }

    pub fn validate(&self) -> std::result::Result<(), Error> {
        if self.global.max_parallel_documents == 0 {
            return Err(Error::config("global.max_parallel_documents must be >= 1"));
        }
        if self.chunking.max_chars == 0 {
            return Err(Error::config("chunking.max_chars must be positive"));
        }
        self.segmenting.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Global {
    pub max_parallel_documents: usize,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            max_parallel_documents: 1,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// JSONL file of `{barcode, text}` records, or a directory of `<identifier>.txt`.
    pub source: String,
    /// Optional directory of TOML handler definitions, scanned after the built-ins.
    pub handlers_dir: String,
    pub out_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            source: "data/raw/books.jsonl".into(),
            handlers_dir: "".into(),
            out_dir: "out".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Chunking {
    pub max_chars: usize,
}
impl Default for Chunking {
    fn default() -> Self {
        Self { max_chars: 16_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Segmenting {
    pub target_chars: usize,
    pub overlap_chars: usize,
    /// How far back from the target offset a boundary may be searched.
    /// Defaults to a quarter of `target_chars`.
    pub lookback_chars: Option<usize>,
}
impl Default for Segmenting {
    fn default() -> Self {
        Self {
            target_chars: 24_000,
            overlap_chars: 1_000,
            lookback_chars: None,
        }
    }
}
impl Segmenting {
    pub fn validate(&self) -> std::result::Result<(), Error> {
        if self.target_chars == 0 {
            return Err(Error::config("segmenting.target_chars must be positive"));
        }
        if self.overlap_chars >= self.target_chars {
            return Err(Error::config(format!(
                "segmenting.overlap_chars ({}) must be smaller than target_chars ({})",
                self.overlap_chars, self.target_chars
            )));
        }
        if self.lookback_chars == Some(0) {
            return Err(Error::config("segmenting.lookback_chars must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub write_cleaned_text: bool,
    pub write_stats_json: bool,
    pub write_chunks_jsonl: bool,
    pub chunks_filename: String,
    pub segments_filename: String,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_cleaned_text: true,
            write_stats_json: true,
            write_chunks_jsonl: false,
            chunks_filename: "chunks.jsonl".into(),
            segments_filename: "segments.jsonl".into(),
            report_filename: "report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
