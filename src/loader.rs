use crate::error::{Error, Result};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub trait Loader {
    /// Fails with [`Error::Load`] when the identifier has no backing raw data.
    fn load(&self, identifier: &str) -> Result<String>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> Result<String>,
{
    fn load(&self, identifier: &str) -> Result<String> {
        self(identifier)
    }
}

/// In-memory texts keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    docs: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, text: impl Into<String>) {
        self.docs.insert(identifier.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryLoader {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            docs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Loader for MemoryLoader {
    fn load(&self, identifier: &str) -> Result<String> {
        self.docs
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::load(identifier, "no raw text in source"))
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(alias = "barcode")]
    identifier: String,
    text: String,
}

/// A JSONL export with one `{"barcode": .., "text": ..}` record per line.
/// The file is read once; the first record for an identifier wins.
#[derive(Debug, Clone)]
pub struct JsonlLoader {
    path: PathBuf,
    docs: MemoryLoader,
}

impl JsonlLoader {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open source: {}", path.display()))?;
        let mut docs = MemoryLoader::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("read {}:{}", path.display(), n + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let rec: RawRecord = serde_json::from_str(&line)
                .with_context(|| format!("parse {}:{}", path.display(), n + 1))?;
            if docs.docs.contains_key(&rec.identifier) {
                warn!("{}:{} repeats identifier {}; keeping the first", path.display(), n + 1, rec.identifier);
                continue;
            }
            docs.insert(rec.identifier, rec.text);
        }
        debug!("loaded {} raw documents from {}", docs.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            docs,
        })
    }
}

impl Loader for JsonlLoader {
    fn load(&self, identifier: &str) -> Result<String> {
        self.docs.load(identifier).map_err(|_| {
            Error::load(identifier, format!("not present in {}", self.path.display()))
        })
    }
}

/// A directory of `<identifier>.txt` files, read on demand.
#[derive(Debug, Clone)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Loader for DirLoader {
    fn load(&self, identifier: &str) -> Result<String> {
        if identifier.contains(['/', '\\']) || identifier.starts_with('.') {
            return Err(Error::load(identifier, "identifier is not a plain file name"));
        }
        let path = self.root.join(format!("{identifier}.txt"));
        std::fs::read_to_string(&path).map_err(|e| Error::load(identifier, format!("{}: {e}", path.display())))
    }
}

/// Picks a loader for `path`: a directory of text files or a JSONL export.
pub fn open_source(path: &Path) -> anyhow::Result<Box<dyn Loader + Send + Sync>> {
    if path.is_dir() {
        return Ok(Box::new(DirLoader::new(path)));
    }
    if !path.exists() {
        anyhow::bail!("source does not exist: {}", path.display());
    }
    Ok(Box::new(JsonlLoader::open(path)?))
}
