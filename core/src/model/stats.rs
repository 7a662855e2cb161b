use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MonthlyCost {
    pub month: u32,
    pub year: i32,
    pub cost: f64,
}

impl MonthlyCost {
    /// "1/2024" style key, as shown on the dashboard axis.
    pub fn label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }
}

/// Accumulates cost per (month, year); one entry per key by construction.
#[derive(Debug, Clone, Default)]
pub struct MonthlyCostSeries {
    months: BTreeMap<(i32, u32), f64>,
}

impl MonthlyCostSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, month: u32, year: i32, cost: f64) {
        *self.months.entry((year, month)).or_default() += cost;
    }

    /// Entries in chronological order.
    pub fn into_entries(self) -> Vec<MonthlyCost> {
        self.months
            .into_iter()
            .map(|((year, month), cost)| MonthlyCost { month, year, cost })
            .collect()
    }
}

/// Dashboard metrics derived from one snapshot of the fleet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub total_vehicles: usize,
    pub available_vehicles: usize,
    pub in_use_vehicles: usize,
    pub in_maintenance: usize,
    pub sold_vehicles: usize,
    pub vehicles_by_status: BTreeMap<String, usize>,
    pub total_maintenance_cost: f64,
    pub average_maintenance_cost: f64,
    pub average_mileage: f64,
    pub upcoming_inspections: usize,
    pub total_drivers: usize,
    /// Available vehicles as a percentage of the fleet.
    pub availability_rate: f64,
    /// Vehicles in use as a percentage of the fleet.
    pub utilization_rate: f64,
    pub maintenances_per_vehicle: f64,
    pub maintenance_by_type: BTreeMap<String, usize>,
    pub vehicles_by_type: BTreeMap<String, usize>,
    pub monthly_maintenance_cost: Vec<MonthlyCost>,
}

/// Maintenance economics of a single vehicle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCostProfile {
    pub vehicle_id: Option<String>,
    pub total_cost: f64,
    pub maintenance_count: usize,
    pub average_cost: f64,
    /// Maintenance spend as a percentage of the purchase price.
    pub cost_value_ratio: f64,
    pub maintenance_by_type: BTreeMap<String, usize>,
    pub monthly_cost: Vec<MonthlyCost>,
}
