//! Local registry of provisioned agents
//!
//! A flat JSON object mapping the operator's agent name to the identifier the
//! service assigned. Keys are kept sorted so the file diffs cleanly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default registry file, relative to the working directory
pub const REGISTRY_FILE: &str = ".agents.json";

/// Agent name -> agent id
pub type AgentMap = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Agent store {} not found. Run create-agent first.", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Agent name '{name}' not found in {}. Create it first.", path.display())]
    NotRegistered { name: String, path: PathBuf },
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// File-backed agent registry
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    path: PathBuf,
}

impl AgentRegistry {
    /// Registry backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Registry at the default location in the working directory
    pub fn default_path() -> PathBuf {
        PathBuf::from(REGISTRY_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the mapping, treating a missing or unreadable file as empty
    pub fn load(&self) -> AgentMap {
        match self.load_required() {
            Ok(map) => map,
            Err(RegistryError::Missing { .. }) => AgentMap::new(),
            Err(e) => {
                tracing::warn!("Ignoring unusable agent store: {}", e);
                AgentMap::new()
            }
        }
    }

    /// Load the mapping, failing if the file is absent or malformed
    pub fn load_required(&self) -> Result<AgentMap> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::Missing {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(RegistryError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the file with the full mapping
    pub fn save(&self, map: &AgentMap) -> Result<()> {
        let write_err = |source| RegistryError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        // BTreeMap serializes in key order; to_string_pretty indents by two spaces
        let mut content = serde_json::to_string_pretty(map).map_err(|source| {
            RegistryError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        content.push('\n');

        std::fs::write(&self.path, content).map_err(write_err)
    }

    /// Look a name up in an already loaded mapping
    pub fn get<'a>(&self, map: &'a AgentMap, name: &str) -> Result<&'a str> {
        map.get(name)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::NotRegistered {
                name: name.to_string(),
                path: self.path.clone(),
            })
    }

    /// Strict load followed by a lookup
    pub fn lookup(&self, name: &str) -> Result<String> {
        let map = self.load_required()?;
        self.get(&map, name).map(str::to_string)
    }

    /// Store `name -> agent_id`, keeping every other entry
    pub fn record(&self, name: &str, agent_id: &str) -> Result<()> {
        let mut map = self.load();
        if let Some(previous) = map.insert(name.to_string(), agent_id.to_string()) {
            tracing::info!("Replacing agent '{}' ({} -> {})", name, previous, agent_id);
        }
        self.save(&map)
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}
