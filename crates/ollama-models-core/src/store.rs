//! The record store: one JSON file per model in a models directory,
//! system-wide with a per-user fallback. The query engine only sees the
//! [`RecordSource`] capability, never paths.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{OmError, Result};
use crate::record::ModelRecord;

const SYSTEM_DIR: &str = "/usr/local/share/ollama/models";
const USER_DIR_SUFFIX: &str = ".local/share/ollama/models";

/// Anything that can produce the record set for one query.
pub trait RecordSource {
    fn load(&self) -> Result<Vec<ModelRecord>>;
}

/// A directory of `<model>.json` files.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The canonical models directory: the system location when readable,
    /// the per-user location otherwise.
    pub fn locate() -> Result<Self> {
        let system = Path::new(SYSTEM_DIR);
        if system.is_dir() {
            return Ok(Self::new(system));
        }
        if let Some(home) = dirs::home_dir() {
            let user = home.join(USER_DIR_SUFFIX);
            if user.is_dir() {
                return Ok(Self::new(user));
            }
        }
        Err(OmError::NoModelsDir {
            system: SYSTEM_DIR.to_string(),
            user: format!("~/{USER_DIR_SUFFIX}"),
        })
    }

    /// The writable models directory for the extraction stage: the system
    /// location when writable, the per-user location (created on demand)
    /// otherwise.
    pub fn locate_writable() -> Result<Self> {
        let system = Path::new(SYSTEM_DIR);
        if system.is_dir() && dir_is_writable(system) {
            return Ok(Self::new(system));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| OmError::Io("cannot determine home directory".into()))?;
        let user = home.join(USER_DIR_SUFFIX);
        fs::create_dir_all(&user).map_err(|e| OmError::Io(e.to_string()))?;
        Ok(Self::new(user))
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Persist one record as `<model>.json`, pretty-printed.
    pub fn write_record(&self, record: &ModelRecord) -> Result<()> {
        let path = self.dir.join(format!("{}.json", record.model));
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).map_err(|e| OmError::Io(e.to_string()))
    }

    /// Ensure the directory exists before writing.
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| OmError::Io(e.to_string()))
    }
}

/// Effective writability, not mode bits: a root-owned `0755` system
/// directory must not be chosen for an unprivileged user.
fn dir_is_writable(dir: &Path) -> bool {
    let probe = dir.join(".ollama-models-write-probe");
    match fs::OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

impl RecordSource for DirStore {
    /// Load every `*.json` file, in sorted filename order so repeated runs
    /// on the same store see the same input order. Files that fail to
    /// parse are skipped with a diagnostic; a directory with no record
    /// files at all is an error, distinct from a zero-match query.
    fn load(&self) -> Result<Vec<ModelRecord>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            OmError::Io(format!("cannot read models directory {}: {e}", self.dir.display()))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
            .collect();
        if paths.is_empty() {
            // An empty store is not a zero-match query; the caller must be
            // able to tell the two apart.
            return Err(OmError::NoRecords {
                dir: self.dir.display().to_string(),
            });
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let content =
                fs::read_to_string(&path).map_err(|e| OmError::Io(e.to_string()))?;
            match serde_json::from_str::<ModelRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    debug!(file = %path.display(), error = %e, "skipping unparseable record file");
                }
            }
        }
        Ok(records)
    }
}
