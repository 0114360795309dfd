//! Flat-file persistence: one JSON document per view, plus one each for the rules
//! catalog and the timeline. Every write overwrites the whole document.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{defaults, Graph, Rule, TimelinePhase, ViewId};

const ROOT_FILE: &str = "architecture.json";
const RULES_FILE: &str = "useCases.json";
const TIMELINE_FILE: &str = "timeline.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no stored graph for view '{view}'")]
    NotFound { view: ViewId },
    #[error("malformed document {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no rule with id '{0}'")]
    UnknownRule(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Load and save graphs by view. The diagram editor only needs this much of a store.
pub trait GraphStore {
    fn load_view(&self, view: &ViewId) -> Result<Graph, StoreError>;
    fn save_view(&self, view: &ViewId, graph: &Graph) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct FlatFileStore {
    dir: PathBuf,
}

impl FlatFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FlatFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a view: `architecture.json` for root, `architecture_{id}.json` otherwise.
    pub fn view_path(&self, view: &ViewId) -> PathBuf {
        if view.is_root() {
            self.dir.join(ROOT_FILE)
        } else {
            self.dir.join(format!("architecture_{}.json", view.as_str()))
        }
    }

    pub fn rules_path(&self) -> PathBuf {
        self.dir.join(RULES_FILE)
    }

    pub fn timeline_path(&self) -> PathBuf {
        self.dir.join(TIMELINE_FILE)
    }

    /// Persisted root graph, or `None` if it is missing or unreadable.
    pub fn read_root_graph(&self) -> Option<Graph> {
        match self.load_view(&ViewId::root()) {
            Ok(graph) => Some(graph),
            Err(StoreError::NotFound { .. }) => None,
            Err(e) => {
                warn!(error = %e, "root architecture unreadable");
                None
            }
        }
    }

    // --- Rules ---

    pub fn load_rules(&self) -> Vec<Rule> {
        self.load_seeded(&self.rules_path(), defaults::rules)
    }

    pub fn save_rules(&self, rules: &[Rule]) -> Result<(), StoreError> {
        write_json(&self.rules_path(), rules)
    }

    // --- Timeline ---

    pub fn load_timeline(&self) -> Vec<TimelinePhase> {
        self.load_seeded(&self.timeline_path(), defaults::timeline)
    }

    pub fn save_timeline(&self, phases: &[TimelinePhase]) -> Result<(), StoreError> {
        write_json(&self.timeline_path(), phases)
    }

    /// Stored collection, or the built-in seed. A missing document is seeded on disk so
    /// later reads see the same data; a broken one is left alone.
    fn load_seeded<T>(&self, path: &Path, seed: fn() -> Vec<T>) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
    {
        match read_json::<Vec<T>>(path) {
            Ok(Some(items)) => items,
            Ok(None) => {
                let items = seed();
                match write_json(path, &items) {
                    Ok(()) => info!(path = %path.display(), count = items.len(), "seeded collection"),
                    Err(e) => warn!(error = %e, "could not seed collection"),
                }
                items
            }
            Err(e) => {
                warn!(error = %e, "falling back to built-in collection");
                seed()
            }
        }
    }
}

impl GraphStore for FlatFileStore {
    fn load_view(&self, view: &ViewId) -> Result<Graph, StoreError> {
        let path = self.view_path(view);
        match read_json::<Graph>(&path)? {
            Some(graph) => Ok(graph),
            None if view.is_root() => Err(StoreError::NotFound { view: view.clone() }),
            None => {
                debug!(view = %view, "no document yet, serving empty graph");
                Ok(Graph::default())
            }
        }
    }

    fn save_view(&self, view: &ViewId, graph: &Graph) -> Result<(), StoreError> {
        write_json(&self.view_path(view), graph)?;
        info!(
            view = %view,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "saved view"
        );
        Ok(())
    }
}

/// `Ok(None)` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

/// Pretty-printed atomic write. Each call gets its own temp file in the target directory,
/// so concurrent saves of one document race only on the final rename.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".ruleboard-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
