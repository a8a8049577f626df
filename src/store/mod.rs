//! Bounded readings store mirrored to a single JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::warn;

use crate::Reading;
use crate::error::StationError;

/// Bounded FIFO store for sensor readings.
///
/// The mirror file is the source of truth between calls: every operation
/// re-reads it, and `append` runs a full load-modify-persist cycle under an
/// internal mutex so concurrent requests cannot lose each other's records.
/// The file is replaced atomically, so readers never observe a half-written
/// array.
#[derive(Debug)]
pub struct ReadingsStore {
    data_file: PathBuf,
    max_records: usize,
    append_lock: Mutex<()>,
}

impl ReadingsStore {
    /// Opens a store backed by `data_file`, creating the containing
    /// directory on first use.
    pub fn open(data_file: impl Into<PathBuf>, max_records: usize) -> Result<Self, StationError> {
        let data_file = data_file.into();
        if let Some(dir) = data_file.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(Self {
            data_file,
            max_records,
            append_lock: Mutex::new(()),
        })
    }

    /// Path of the mirror file, reported by the health endpoint.
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Reads the mirror file. A missing, unreadable or malformed file and a
    /// top-level value that is not an array of readings all degrade to empty
    /// history, never to an error.
    pub fn load(&self) -> Vec<Reading> {
        let bytes = match fs::read(&self.data_file) {
            Ok(bytes) => bytes,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(readings) => readings,
            Err(e) => {
                warn!(
                    file = %self.data_file.display(),
                    "Discarding unreadable readings file: {e}"
                );
                Vec::new()
            }
        }
    }

    /// Appends a reading at the tail, evicting the oldest entries once the
    /// store holds more than `max_records`, and persists the result. Returns
    /// the stored count after the append.
    pub async fn append(&self, reading: Reading) -> Result<usize, StationError> {
        let _guard = self.append_lock.lock().await;
        let mut readings = self.load();
        readings.push(reading);
        if readings.len() > self.max_records {
            let excess = readings.len() - self.max_records;
            readings.drain(..excess);
        }
        self.persist(&readings)?;
        Ok(readings.len())
    }

    /// Returns the last `limit` readings in arrival order. A zero or absent
    /// limit, or one larger than the stored length, returns everything.
    pub fn query(&self, limit: Option<usize>) -> Vec<Reading> {
        let readings = self.load();
        match limit {
            Some(limit) if limit > 0 && limit < readings.len() => {
                readings[readings.len() - limit..].to_vec()
            }
            _ => readings,
        }
    }

    /// Number of currently stored readings.
    pub fn count(&self) -> usize {
        self.load().len()
    }

    // Write-to-temp-then-rename keeps the mirror file a complete JSON array
    // at every instant.
    fn persist(&self, readings: &[Reading]) -> Result<(), StationError> {
        let payload = serde_json::to_vec_pretty(readings)?;
        let tmp_file = self.data_file.with_extension("tmp");
        fs::write(&tmp_file, payload)?;
        fs::rename(&tmp_file, &self.data_file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn reading(n: i64) -> Reading {
        Reading::from_payload(json!({
            "temperature": 20.0 + n as f64,
            "humidity": 40.0,
            "pressure": 1013.25,
            "gas": 120_000 + n
        }))
        .unwrap()
    }

    fn gas_values(readings: &[Reading]) -> Vec<i64> {
        readings
            .iter()
            .map(|r| serde_json::to_value(r).unwrap()["gas"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = ReadingsStore::open(dir.path().join("sensor-data.json"), 500).unwrap();
        assert!(store.load().is_empty());
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn appends_preserve_arrival_order() {
        let dir = tempdir().unwrap();
        let store = ReadingsStore::open(dir.path().join("sensor-data.json"), 500).unwrap();

        for n in 0..4 {
            let count = store.append(reading(n)).await.unwrap();
            assert_eq!(count, n as usize + 1);
        }

        let stored = store.query(None);
        assert_eq!(
            gas_values(&stored),
            vec![120_000, 120_001, 120_002, 120_003]
        );
    }

    #[tokio::test]
    async fn capacity_bound_evicts_oldest_first() {
        let dir = tempdir().unwrap();
        let store = ReadingsStore::open(dir.path().join("sensor-data.json"), 5).unwrap();

        for n in 0..8 {
            store.append(reading(n)).await.unwrap();
        }

        let stored = store.query(None);
        assert_eq!(stored.len(), 5);
        assert_eq!(
            gas_values(&stored),
            vec![120_003, 120_004, 120_005, 120_006, 120_007]
        );
        assert_eq!(store.count(), 5);
    }

    #[tokio::test]
    async fn query_limit_returns_most_recent_entries() {
        let dir = tempdir().unwrap();
        let store = ReadingsStore::open(dir.path().join("sensor-data.json"), 500).unwrap();

        for n in 0..3 {
            store.append(reading(n)).await.unwrap();
        }

        assert_eq!(gas_values(&store.query(Some(2))), vec![120_001, 120_002]);
        assert_eq!(store.query(Some(3)).len(), 3);
        // zero, absent and oversized limits all mean "everything"
        assert_eq!(store.query(Some(0)).len(), 3);
        assert_eq!(store.query(None).len(), 3);
        assert_eq!(store.query(Some(10)).len(), 3);
    }

    #[tokio::test]
    async fn repeated_queries_are_identical() {
        let dir = tempdir().unwrap();
        let store = ReadingsStore::open(dir.path().join("sensor-data.json"), 500).unwrap();

        for n in 0..3 {
            store.append(reading(n)).await.unwrap();
        }

        let first = serde_json::to_value(store.query(Some(2))).unwrap();
        let second = serde_json::to_value(store.query(Some(2))).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty_and_recovers() {
        let dir = tempdir().unwrap();
        let data_file = dir.path().join("sensor-data.json");
        fs::write(&data_file, "{\"truncated\": [").unwrap();

        let store = ReadingsStore::open(&data_file, 500).unwrap();
        assert!(store.load().is_empty());

        store.append(reading(0)).await.unwrap();
        let persisted: serde_json::Value =
            serde_json::from_slice(&fs::read(&data_file).unwrap()).unwrap();
        assert_eq!(persisted.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_array_file_contents_load_as_empty() {
        let dir = tempdir().unwrap();
        let data_file = dir.path().join("sensor-data.json");
        fs::write(&data_file, "{\"temperature\": 21.5}").unwrap();

        let store = ReadingsStore::open(&data_file, 500).unwrap();
        assert!(store.load().is_empty());
    }

    #[tokio::test]
    async fn readings_survive_reopen() {
        let dir = tempdir().unwrap();
        let data_file = dir.path().join("sensor-data.json");

        {
            let store = ReadingsStore::open(&data_file, 500).unwrap();
            store.append(reading(0)).await.unwrap();
            store.append(reading(1)).await.unwrap();
        }

        let store = ReadingsStore::open(&data_file, 500).unwrap();
        assert_eq!(store.count(), 2);
        assert_eq!(gas_values(&store.query(None)), vec![120_000, 120_001]);
    }

    #[tokio::test]
    async fn creates_containing_directory_on_open() {
        let dir = tempdir().unwrap();
        let data_file = dir.path().join("data").join("sensor-data.json");

        let store = ReadingsStore::open(&data_file, 500).unwrap();
        store.append(reading(0)).await.unwrap();
        assert!(data_file.exists());
    }
}
