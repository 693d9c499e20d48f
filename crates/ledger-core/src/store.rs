//! Flat-file persistence: the whole account map is one JSON document at a
//! configured path, rewritten in full on every save. Replacement goes through
//! a temp file and rename so a crash mid-write cannot truncate the store.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use contracts::AccountRecord;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "store io error: {err}"),
            Self::Serde(err) => write!(f, "store serde error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Open the store at `path`, creating the parent directory and an empty
    /// document on first boot.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !path.exists() {
            fs::write(&path, "{}")?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full document. A missing or corrupt file is an error; the
    /// caller must not proceed with a mutation in that case.
    pub fn load(&self) -> Result<BTreeMap<String, AccountRecord>, StoreError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Serialize the whole map and replace the document atomically.
    pub fn save(&self, accounts: &BTreeMap<String, AccountRecord>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(accounts)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, encoded)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();

        std::env::temp_dir().join(format!("hermes_ledger_{name}_{nanos}/economy.json"))
    }

    #[test]
    fn open_creates_directory_and_empty_document() {
        let path = temp_store_path("bootstrap");
        let store = JsonStore::open(&path).expect("open should create the store");

        let accounts = store.load().expect("empty store loads");
        assert!(accounts.is_empty());

        let _ = fs::remove_dir_all(path.parent().expect("parent dir"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_store_path("round_trip");
        let store = JsonStore::open(&path).expect("open store");

        let mut accounts = BTreeMap::new();
        let mut record = AccountRecord::default();
        record.balance = 150;
        record.bank = 40;
        record.daily_streak = 3;
        record.last_daily = Some(1_700_000_000);
        accounts.insert("user:1".to_string(), record);

        store.save(&accounts).expect("save succeeds");
        let loaded = store.load().expect("load succeeds");
        assert_eq!(loaded, accounts);

        let _ = fs::remove_dir_all(path.parent().expect("parent dir"));
    }

    #[test]
    fn corrupt_document_is_rejected() {
        let path = temp_store_path("corrupt");
        let store = JsonStore::open(&path).expect("open store");
        fs::write(&path, "{ not json").expect("write corrupt payload");

        let err = store.load().expect_err("corrupt store must not load");
        assert!(matches!(err, StoreError::Serde(_)));

        let _ = fs::remove_dir_all(path.parent().expect("parent dir"));
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let path = temp_store_path("tmp_cleanup");
        let store = JsonStore::open(&path).expect("open store");

        store.save(&BTreeMap::new()).expect("save succeeds");
        assert!(!path.with_extension("json.tmp").exists());

        let _ = fs::remove_dir_all(path.parent().expect("parent dir"));
    }
}
