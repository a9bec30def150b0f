use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{DataFile, SettingsFile, SCHEMA_VERSION};

const DATA_FILE: &str = "data.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{file} has schema_version {found}, expected at most {max}", max = SCHEMA_VERSION)]
    UnsupportedSchema { file: &'static str, found: u32 },
}

impl StorageError {
    /// A missing file is the normal first-run state, not corruption.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn load_data(&self) -> Result<DataFile, StorageError> {
        let data: DataFile = self.load_json(self.root.join(DATA_FILE))?;
        check_schema(DATA_FILE, data.schema_version)?;
        Ok(data)
    }

    pub fn load_settings(&self) -> Result<SettingsFile, StorageError> {
        let data: SettingsFile = self.load_json(self.root.join(SETTINGS_FILE))?;
        check_schema(SETTINGS_FILE, data.schema_version)?;
        Ok(data)
    }

    pub fn save_data(&self, data: &DataFile) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(DATA_FILE), data)
    }

    pub fn save_settings(&self, data: &SettingsFile) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(SETTINGS_FILE), data)
    }

    fn load_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T, StorageError> {
        let mut file = File::open(path)?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    fn write_atomic<T: Serialize>(&self, path: PathBuf, data: &T) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

fn check_schema(file: &'static str, found: u32) -> Result<(), StorageError> {
    if found > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedSchema { file, found });
    }
    Ok(())
}
