use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::model::maintenance::MaintenanceRecord;
use crate::model::user::User;
use crate::model::vehicle::Vehicle;
use crate::repository::decode_collection;
use crate::repository::traits::FleetSource;

pub const VEHICLES_FILE_NAME: &str = "vehicles.json";
pub const MAINTENANCES_FILE_NAME: &str = "maintenances.json";
pub const USERS_FILE_NAME: &str = "users.json";

/// Fleet snapshot stored as one JSON list per collection, as returned by the backend.
#[derive(Clone, Debug)]
pub struct FileFleetSource {
    data_dir: PathBuf,
}

impl FileFleetSource {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn read_collection<T>(&self, file_name: &str, name: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.data_dir.join(file_name);
        let file = File::open(&path)
            .with_context(|| format!("Could not open {}", path.display()))?;
        let value: Value = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        let items = decode_collection(name, &value)?;
        debug!(path = %path.display(), count = items.len(), "loaded collection");
        Ok(items)
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".fleetdash").join("data"))
}

impl FleetSource for FileFleetSource {
    fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.read_collection(VEHICLES_FILE_NAME, "vehicles")
    }

    fn maintenances(&self) -> Result<Vec<MaintenanceRecord>> {
        self.read_collection(MAINTENANCES_FILE_NAME, "maintenances")
    }

    fn users(&self) -> Result<Vec<User>> {
        self.read_collection(USERS_FILE_NAME, "users")
    }
}
