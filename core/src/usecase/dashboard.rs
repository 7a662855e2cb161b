use crate::model::maintenance::MaintenanceRecord;
use crate::model::stats::{StatisticsSummary, VehicleCostProfile};
use crate::model::user::User;
use crate::model::vehicle::Vehicle;
use crate::repository::FleetSource;
use crate::service::report_service::{summary_report, Report};
use crate::service::stats_service::{aggregate, profile_vehicle};
use crate::validate::{check_snapshot, RecordIssues};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tracing::info;

/// One materialised copy of the three collections.
#[derive(Debug, Clone, Default)]
pub struct FleetSnapshot {
    pub vehicles: Vec<Vehicle>,
    pub maintenances: Vec<MaintenanceRecord>,
    pub users: Vec<User>,
}

impl FleetSnapshot {
    pub fn load<S: FleetSource>(source: &S) -> Result<Self> {
        let snapshot = Self {
            vehicles: source.vehicles()?,
            maintenances: source.maintenances()?,
            users: source.users()?,
        };
        info!(
            vehicles = snapshot.vehicles.len(),
            maintenances = snapshot.maintenances.len(),
            users = snapshot.users.len(),
            "fleet snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn summarize(&self, now: DateTime<Utc>) -> StatisticsSummary {
        aggregate(&self.vehicles, &self.maintenances, &self.users, now)
    }

    pub fn issues(&self) -> Vec<RecordIssues> {
        check_snapshot(&self.vehicles, &self.maintenances, &self.users)
    }
}

/// Fetches the collections from a source and derives dashboard data from them.
pub struct DashboardUseCase<'a, S: FleetSource> {
    source: &'a S,
}

impl<'a, S: FleetSource> DashboardUseCase<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub fn snapshot(&self) -> Result<FleetSnapshot> {
        FleetSnapshot::load(self.source)
    }

    pub fn get_summary(&self, now: DateTime<Utc>) -> Result<StatisticsSummary> {
        Ok(self.snapshot()?.summarize(now))
    }

    pub fn get_summary_report(&self, now: DateTime<Utc>) -> Result<Report> {
        Ok(summary_report(&self.get_summary(now)?))
    }

    /// Cost profile of the vehicle with the given id or plate.
    pub fn get_vehicle_profile(&self, key: &str) -> Result<(Vehicle, VehicleCostProfile)> {
        let snapshot = self.snapshot()?;
        let vehicle = snapshot
            .vehicles
            .iter()
            .find(|v| v.id.as_deref() == Some(key) || v.plate.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(key)))
            .ok_or_else(|| anyhow!("Vehicle not found: {}", key))?;
        let profile = profile_vehicle(vehicle, &snapshot.maintenances);
        Ok((vehicle.clone(), profile))
    }
}
