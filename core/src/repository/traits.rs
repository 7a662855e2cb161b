use crate::model::maintenance::MaintenanceRecord;
use crate::model::user::User;
use crate::model::vehicle::Vehicle;
use anyhow::Result;

/// Supplier of the raw fleet collections (the REST backend, a file snapshot, a test double).
pub trait FleetSource {
    fn vehicles(&self) -> Result<Vec<Vehicle>>;
    fn maintenances(&self) -> Result<Vec<MaintenanceRecord>>;
    fn users(&self) -> Result<Vec<User>>;
}
