//! Key-value stores for finished datasets.
//!
//! A [`Persister`] opens named stores; each store maps a candidate string to
//! its graph. Opening a store discards anything previously stored under the
//! same name, and a key written twice keeps only its last graph.

use crate::MolecularGraph;
use csv::{ReaderBuilder, Writer};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info};

const HEADER: [&str; 2] = ["key", "graph"];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{} is not a graph store: {reason}", .path.display())]
    Format { path: PathBuf, reason: String },
}

pub trait KeyValueStore {
    fn put(&mut self, key: &str, graph: &MolecularGraph) -> Result<(), StoreError>;

    /// Makes every entry durable. The store cannot be used afterwards.
    fn close(self) -> Result<(), StoreError>;
}

pub trait Persister {
    type Store: KeyValueStore;

    /// Creates the store `name`, replacing any existing one.
    fn open_fresh(&mut self, name: &str) -> Result<Self::Store, StoreError>;
}

/// Writes each store as `<output_dir>/<name>.csv` with a `key,graph` header
/// and the graph as JSON.
#[derive(Debug, Clone)]
pub struct CsvPersister {
    output_dir: PathBuf,
}

impl CsvPersister {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.csv"))
    }
}

impl Persister for CsvPersister {
    type Store = CsvStore;

    fn open_fresh(&mut self, name: &str) -> Result<CsvStore, StoreError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| StoreError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self.path_of(name);
        let file = File::create(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Opened store {}", path.display());
        Ok(CsvStore {
            path,
            writer: Writer::from_writer(file),
            entries: BTreeMap::new(),
        })
    }
}

/// An open CSV store. Rows are written in key order on [`close`].
///
/// [`close`]: KeyValueStore::close
pub struct CsvStore {
    path: PathBuf,
    writer: Writer<File>,
    entries: BTreeMap<String, String>,
}

impl CsvStore {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for CsvStore {
    fn put(&mut self, key: &str, graph: &MolecularGraph) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), graph.to_json()?);
        Ok(())
    }

    fn close(mut self) -> Result<(), StoreError> {
        self.writer.write_record(HEADER)?;
        for (key, graph) in &self.entries {
            self.writer.write_record([key, graph])?;
        }
        self.writer.flush().map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(
            "Wrote {} entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Loads a CSV store written by [`CsvPersister`].
pub fn read_csv_store(
    path: impl AsRef<Path>,
) -> Result<BTreeMap<String, MolecularGraph>, StoreError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader.headers()?;
    if headers.iter().ne(HEADER) {
        return Err(StoreError::Format {
            path: path.to_path_buf(),
            reason: format!(
                "expected header 'key,graph', found '{}'",
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        });
    }

    let mut entries = BTreeMap::new();
    for result in reader.records() {
        let record = result?;
        let (Some(key), Some(graph)) = (record.get(0), record.get(1)) else {
            return Err(StoreError::Format {
                path: path.to_path_buf(),
                reason: format!("short record {:?}", record),
            });
        };
        entries.insert(key.to_string(), MolecularGraph::from_json(graph)?);
    }
    debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

type MemoryStores = BTreeMap<String, BTreeMap<String, MolecularGraph>>;

#[derive(Debug, Default)]
struct MemoryState {
    stores: MemoryStores,
    history: Vec<String>,
}

/// Keeps closed stores in memory. Clones share the same stores.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersister {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entries of a closed store.
    pub fn store(&self, name: &str) -> Option<BTreeMap<String, MolecularGraph>> {
        self.state.borrow().stores.get(name).cloned()
    }

    pub fn store_names(&self) -> Vec<String> {
        self.state.borrow().stores.keys().cloned().collect()
    }

    /// Every open and close, in order, as `"open <name>"` / `"close <name>"`.
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }
}

impl Persister for MemoryPersister {
    type Store = MemoryStore;

    fn open_fresh(&mut self, name: &str) -> Result<MemoryStore, StoreError> {
        let mut state = self.state.borrow_mut();
        state.stores.remove(name);
        state.history.push(format!("open {name}"));
        Ok(MemoryStore {
            name: name.to_string(),
            entries: BTreeMap::new(),
            state: Rc::clone(&self.state),
        })
    }
}

pub struct MemoryStore {
    name: String,
    entries: BTreeMap<String, MolecularGraph>,
    state: Rc<RefCell<MemoryState>>,
}

impl KeyValueStore for MemoryStore {
    fn put(&mut self, key: &str, graph: &MolecularGraph) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), graph.clone());
        Ok(())
    }

    fn close(self) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        state.history.push(format!("close {}", self.name));
        state.stores.insert(self.name, self.entries);
        Ok(())
    }
}
