use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::model::{Dataset, CURRENT_VERSION};
use crate::Result;

#[allow(unused_imports)]
use crate::engine::RecordStore;

/// The key-value slot backing a [`RecordStore`].
///
/// Each key is stored as `<data_dir>/<key>.json`. Writes use an atomic
/// "write-then-rename" strategy so a reader never sees a half-written blob.
pub struct Persistence {
    data_dir: PathBuf,
}

impl Persistence {
    /// Initializes a new `Persistence` handler in the specified directory.
    ///
    /// If the directory does not exist, it will be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { data_dir: dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    /// Writes `bytes` under `key`, replacing any previous value.
    pub fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let file_path = self.path_for(key);
        let temp_path = file_path.with_extension("json.tmp");

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    /// Reads the value under `key`, or `None` when the slot is empty.
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }

    /// Serializes the full data set under `key`.
    pub fn save(&self, key: &str, data: &Dataset) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(data)?;
        self.write(key, &bytes)
    }

    /// Loads the data set stored under `key`.
    ///
    /// Returns `None` when the slot is empty, unreadable, malformed, holds a
    /// zero or duplicate id, or was written by a newer schema version. Older
    /// versions are migrated in memory.
    pub fn load(&self, key: &str) -> Option<Dataset> {
        let content = match self.read(key) {
            Ok(Some(c)) => c,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read slot {:?}: {}", self.path_for(key), e);
                return None;
            }
        };

        let data: Dataset = match serde_json::from_slice(&content) {
            Ok(d) => d,
            Err(e) => {
                warn!("Could not unmarshal data set from {:?}: {}", self.path_for(key), e);
                return None;
            }
        };

        if let Err(e) = data.validate_ids() {
            warn!("Rejecting data set from {:?}: {}", self.path_for(key), e);
            return None;
        }

        migrate(data)
    }
}

/// Brings a loaded data set up to [`CURRENT_VERSION`].
fn migrate(mut data: Dataset) -> Option<Dataset> {
    if data.version > CURRENT_VERSION {
        warn!(
            "Data set version {} is newer than supported version {}",
            data.version, CURRENT_VERSION
        );
        return None;
    }
    // version 0 is the unversioned layout; its records already match version 1
    data.version = CURRENT_VERSION;
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::seed;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path()).unwrap();

        let data = seed::initial_data();
        persistence.save("slot", &data).unwrap();

        let loaded = persistence.load("slot").unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_atomic_rename() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path()).unwrap();

        persistence.save("slot", &Dataset::default()).unwrap();

        assert!(dir.path().join("slot.json").exists());
        assert!(!dir.path().join("slot.json.tmp").exists());
    }

    #[test]
    fn test_missing_slot() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path().join("nested")).unwrap();
        assert!(persistence.read("slot").unwrap().is_none());
        assert!(persistence.load("slot").is_none());
    }

    #[test]
    fn test_corrupt_slot() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path()).unwrap();
        persistence.write("slot", b"{\"departments\": [").unwrap();
        assert!(persistence.load("slot").is_none());
    }

    #[test]
    fn test_unversioned_layout_is_migrated() {
        let legacy = r#"{
  "departments": [{"id": 1, "name": "MERN DEC BATCH 01", "code": "mern1dec25", "students": 45}],
  "subjects": [],
  "students": [{
    "id": 1,
    "name": "John Doe",
    "email": "john@example.com",
    "department": "MERN",
    "rollNumber": "MERN2024001"
  }],
  "teachers": []
}"#;
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path()).unwrap();
        persistence.write("slot", legacy.as_bytes()).unwrap();

        let loaded = persistence.load("slot").unwrap();
        assert_eq!(loaded.version, CURRENT_VERSION);
        assert_eq!(loaded.students[0].roll_number, "MERN2024001");
        assert_eq!(loaded.departments[0].start_date, None);
    }

    #[test]
    fn test_duplicate_or_zero_ids_are_rejected() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path()).unwrap();

        let duplicate = r#"{"departments": [], "subjects": [], "teachers": [], "students": [
  {"id": 1, "name": "A", "email": "a@x"},
  {"id": 1, "name": "B", "email": "b@x"}
]}"#;
        persistence.write("slot", duplicate.as_bytes()).unwrap();
        assert!(persistence.load("slot").is_none());

        let zero = r#"{"departments": [], "subjects": [], "students": [], "teachers": [
  {"id": 0, "name": "Z", "email": "z@x"}
]}"#;
        persistence.write("slot", zero.as_bytes()).unwrap();
        assert!(persistence.load("slot").is_none());
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let dir = tempdir().unwrap();
        let persistence = Persistence::new(dir.path()).unwrap();
        let mut data = Dataset::default();
        data.version = CURRENT_VERSION + 1;
        persistence.save("slot", &data).unwrap();
        assert!(persistence.load("slot").is_none());
    }
}
