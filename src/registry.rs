use crate::{
    books,
    error::{Error, Result},
    pipeline::{Finish, Pipeline},
    transform::TransformSpec,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_COLLECTION: &str = "default";

/// A handler definition as found by a source, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerDef {
    /// Where the definition came from; used in error messages.
    #[serde(skip)]
    pub origin: String,
    #[serde(alias = "barcode")]
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub date: String,
    pub notes: String,
    pub collection: Option<String>,
    pub transforms: Vec<TransformSpec>,
    /// Name of a finishing function from the book catalog.
    pub finish: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Discovered {
    /// Collection tags the source recognizes, including empty ones.
    pub collections: Vec<String>,
    pub defs: Vec<HandlerDef>,
}

pub trait DescriptorSource {
    fn origin(&self) -> String;
    fn scan(&self) -> Result<Discovered>;
}

/// A validated handler: identifier, descriptive metadata and its pipeline.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub date: String,
    pub notes: String,
    pub collection: String,
    pub origin: String,
    pub pipeline: Pipeline,
}

#[derive(Debug, Default)]
pub struct Registry {
    descriptors: Vec<HandlerDescriptor>,
    by_identifier: HashMap<String, usize>,
    collections: Vec<(String, Vec<usize>)>,
    by_collection: HashMap<String, usize>,
}

impl Registry {
    pub fn discover(sources: &[&dyn DescriptorSource]) -> Result<Self> {
        let mut reg = Registry::default();
        for source in sources {
            let found = source.scan()?;
            debug!(
                "source {} yielded {} handlers in {} collections",
                source.origin(),
                found.defs.len(),
                found.collections.len()
            );
            for tag in &found.collections {
                reg.collection_slot(tag);
            }
            for def in found.defs {
                reg.register(def)?;
            }
        }
        info!(
            "registry ready: {} handlers in {} collections",
            reg.len(),
            reg.collections.len()
        );
        Ok(reg)
    }

    /// The compiled-in book catalog only.
    pub fn builtin() -> Result<Self> {
        Self::discover(&[&books::BuiltinCatalog])
    }

    fn collection_slot(&mut self, tag: &str) -> usize {
        if let Some(&slot) = self.by_collection.get(tag) {
            return slot;
        }
        self.collections.push((tag.to_string(), Vec::new()));
        let slot = self.collections.len() - 1;
        self.by_collection.insert(tag.to_string(), slot);
        slot
    }

    fn register(&mut self, def: HandlerDef) -> Result<()> {
        let identifier = def.identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(Error::config(format!(
                "handler defined in {} has no identifier",
                def.origin
            )));
        }
        if def.transforms.is_empty() && def.finish.is_none() {
            return Err(Error::config(format!(
                "handler {identifier} ({}) defines no pipeline",
                def.origin
            )));
        }
        if let Some(&existing) = self.by_identifier.get(&identifier) {
            return Err(Error::config(format!(
                "duplicate identifier {identifier}: defined by {} and {}",
                self.descriptors[existing].origin, def.origin
            )));
        }

        let finish = match def.finish.as_deref() {
            None => Finish::None,
            Some(name) => books::finisher(name).map(Finish::Named).ok_or_else(|| {
                Error::config(format!(
                    "handler {identifier} ({}): unknown finishing function `{name}`",
                    def.origin
                ))
            })?,
        };
        let pipeline = Pipeline::from_specs(&def.transforms, finish).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("handler {identifier} ({}): {msg}", def.origin)),
            other => other,
        })?;

        let collection = def
            .collection
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
        let slot = self.collection_slot(&collection);
        let index = self.descriptors.len();
        self.collections[slot].1.push(index);
        self.by_identifier.insert(identifier.clone(), index);
        self.descriptors.push(HandlerDescriptor {
            identifier,
            title: def.title,
            author: def.author,
            date: def.date,
            notes: def.notes,
            collection,
            origin: def.origin,
            pipeline,
        });
        Ok(())
    }

    pub fn resolve(&self, identifier: &str) -> Result<&HandlerDescriptor> {
        self.by_identifier
            .get(identifier)
            .map(|&i| &self.descriptors[i])
            .ok_or_else(|| Error::unknown_identifier(identifier))
    }

    /// Members in discovery order. A recognized but empty collection yields an
    /// empty list; a tag never observed is an error.
    pub fn resolve_collection(&self, name: &str) -> Result<Vec<&HandlerDescriptor>> {
        let slot = self
            .by_collection
            .get(name)
            .ok_or_else(|| Error::unknown_collection(name))?;
        Ok(self.collections[*slot]
            .1
            .iter()
            .map(|&i| &self.descriptors[i])
            .collect())
    }

    pub fn list_identifiers(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.identifier.as_str()).collect()
    }

    pub fn list_collections(&self) -> Vec<&str> {
        self.collections.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Handler definitions stored as `*.toml` files. Every immediate
/// subdirectory of `root` is a collection tag.
pub struct TomlDirSource {
    root: PathBuf,
}

impl TomlDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn walk(&self, dir: &Path, top: Option<&str>, found: &mut Discovered) -> Result<()> {
        let read = std::fs::read_dir(dir)
            .map_err(|e| Error::config(format!("reading handlers dir {}: {e}", dir.display())))?;
        let mut entries = read
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| Error::config(format!("listing {}: {e}", dir.display())))?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_string();
                let tag = match top {
                    Some(t) => t.to_string(),
                    None => {
                        found.collections.push(name.clone());
                        name
                    }
                };
                self.walk(&path, Some(&tag), found)?;
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                let mut def = read_def(&path)?;
                if def.collection.is_none() {
                    def.collection = Some(top.unwrap_or(DEFAULT_COLLECTION).to_string());
                }
                found.defs.push(def);
            }
        }
        Ok(())
    }
}

fn read_def(path: &Path) -> Result<HandlerDef> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("reading {}: {e}", path.display())))?;
    let mut def: HandlerDef = toml::from_str(&raw)
        .map_err(|e| Error::config(format!("parsing {}: {e}", path.display())))?;
    def.origin = path.display().to_string();
    Ok(def)
}

impl DescriptorSource for TomlDirSource {
    fn origin(&self) -> String {
        self.root.display().to_string()
    }

    fn scan(&self) -> Result<Discovered> {
        if !self.root.is_dir() {
            return Err(Error::config(format!(
                "handlers dir is not a directory: {}",
                self.root.display()
            )));
        }
        let mut found = Discovered::default();
        self.walk(&self.root, None, &mut found)?;
        Ok(found)
    }
}
