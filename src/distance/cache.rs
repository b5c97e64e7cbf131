//! On-disk cache of distance matrices keyed by the location set.
//!
//! Identical coordinate lists hash to the same key, so repeated requests for
//! the same pickup set skip the O(N²) haversine pass. The cache is advisory:
//! unreadable, corrupt, or mismatched entries are ignored and rebuilt.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::CostMatrix;
use crate::error::RoutingError;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    matrix: CostMatrix,
}

/// Directory-backed distance matrix cache.
#[derive(Debug, Clone)]
pub struct MatrixCache {
    dir: PathBuf,
}

impl MatrixCache {
    /// Uses `dir` as the cache root, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Content hash of an ordered coordinate list.
    pub fn key(points: &[(f64, f64)]) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(points.len() as u64).to_le_bytes());
        for &(lat, lon) in points {
            hasher.update(&lat.to_bits().to_le_bytes());
            hasher.update(&lon.to_bits().to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Returns the cached matrix for `points`, if present and consistent.
    pub fn load(&self, points: &[(f64, f64)]) -> Option<CostMatrix> {
        let key = Self::key(points);
        let path = self.path_for(&key);
        let bytes = fs::read(&path).ok()?;
        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry)
                if entry.key == key
                    && entry.matrix.size() == points.len()
                    && entry.matrix.as_slice().len() == points.len() * points.len()
                    && entry.matrix.first_bad_cell().is_none() =>
            {
                debug!(%key, "distance matrix cache hit");
                Some(entry.matrix)
            }
            Ok(_) => {
                warn!(path = %path.display(), "ignoring mismatched matrix cache entry");
                None
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring corrupt matrix cache entry");
                None
            }
        }
    }

    /// Writes `matrix` under the key of `points`.
    pub fn store(&self, points: &[(f64, f64)], matrix: &CostMatrix) -> io::Result<()> {
        let key = Self::key(points);
        let entry = CacheEntry {
            key: key.clone(),
            matrix: matrix.clone(),
        };
        let json = serde_json::to_vec(&entry).map_err(io::Error::other)?;
        let path = self.path_for(&key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        debug!(%key, "stored distance matrix");
        Ok(())
    }

    /// Loads the matrix for `points` or builds and stores it.
    ///
    /// A failed write is logged and does not fail the request.
    pub fn get_or_build(&self, points: &[(f64, f64)]) -> Result<CostMatrix, RoutingError> {
        if let Some(matrix) = self.load(points) {
            return Ok(matrix);
        }
        let matrix = CostMatrix::from_coordinates(points)?;
        if let Err(err) = self.store(points, &matrix) {
            warn!(%err, "could not write matrix cache entry");
        }
        Ok(matrix)
    }
}
