//! Durable storage of genomes by key.
//!
//! Records are JSON documents holding the four tensors in storage order
//! (`w1`, `b1`, `w2`, `b2`). Loading distinguishes three outcomes: nothing
//! stored (`Ok(None)`), a valid genome, and stored data that cannot be used
//! (an error, never a silent fallback).

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::brain::{Genome, Topology};
use crate::error::{Error, Result};

/// Version written into new records.
pub const RECORD_FORMAT: u32 = 1;

/// Storage for genomes addressed by key.
pub trait GenomeStore {
    /// Replaces whatever is stored under `key`. Readers see either the old or
    /// the new record, never a partial one.
    fn save(&self, key: &str, genome: &Genome) -> Result<()>;

    /// Loads the genome stored under `key`, validated against `topology`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    fn load(&self, key: &str, topology: &Topology) -> Result<Option<Genome>>;
}

/// On-disk representation of a genome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeRecord {
    /// Record layout version.
    pub format: u32,
    /// When the record was written.
    pub saved_at: DateTime<Utc>,
    /// Tensors in storage order.
    pub tensors: Vec<Array2<f32>>,
}

impl GenomeRecord {
    /// Wraps a genome, stamping the current time.
    pub fn new(genome: &Genome) -> Self {
        Self {
            format: RECORD_FORMAT,
            saved_at: Utc::now(),
            tensors: genome.tensors().into_iter().cloned().collect(),
        }
    }

    /// Encodes the record as JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Decodes and validates a stored record.
    pub fn decode(key: &str, bytes: &[u8], topology: &Topology) -> Result<Genome> {
        let record: GenomeRecord =
            serde_json::from_slice(bytes).map_err(|err| Error::CorruptRecord {
                key: key.to_string(),
                reason: err.to_string(),
            })?;
        if record.format != RECORD_FORMAT {
            return Err(Error::CorruptRecord {
                key: key.to_string(),
                reason: format!("unsupported record format {}", record.format),
            });
        }
        Genome::from_tensors(record.tensors, topology).inspect_err(|err| {
            tracing::warn!(key, error = %err, "rejected stored genome");
        })
    }
}

/// Keys become file names, so they are limited to `[A-Za-z0-9_.-]` and may
/// not start with a dot.
fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}

/// Stores each genome as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`; the directory is created on first save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl GenomeStore for FileStore {
    fn save(&self, key: &str, genome: &Genome) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // write next to the target, then rename over it
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&GenomeRecord::new(genome).to_bytes()?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|err| Error::Io(err.error))?;

        tracing::debug!(path = %path.display(), "saved genome");
        Ok(())
    }

    fn load(&self, key: &str, topology: &Topology) -> Result<Option<Genome>> {
        let path = self.path_for(key)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        GenomeRecord::decode(key, &bytes, topology).map(Some)
    }
}

/// In-process store holding encoded records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw bytes under `key`, bypassing encoding.
    pub fn insert_raw(&self, key: &str, bytes: Vec<u8>) {
        self.lock().insert(key.to_string(), bytes);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // a poisoned map still holds complete records
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl GenomeStore for MemoryStore {
    fn save(&self, key: &str, genome: &Genome) -> Result<()> {
        check_key(key)?;
        let bytes = GenomeRecord::new(genome).to_bytes()?;
        self.lock().insert(key.to_string(), bytes);
        Ok(())
    }

    fn load(&self, key: &str, topology: &Topology) -> Result<Option<Genome>> {
        check_key(key)?;
        let bytes = self.lock().get(key).cloned();
        bytes
            .map(|bytes| GenomeRecord::decode(key, &bytes, topology))
            .transpose()
    }
}
