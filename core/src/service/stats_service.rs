use crate::error::FleetError;
use crate::model::category::{label_of, VehicleStatus};
use crate::model::maintenance::MaintenanceRecord;
use crate::model::stats::{MonthlyCostSeries, StatisticsSummary, VehicleCostProfile};
use crate::model::user::User;
use crate::model::vehicle::Vehicle;
use crate::repository::decode_collection;
use crate::time::{month_key, parse_datetime};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Days ahead of `now` in which a technical inspection counts as upcoming.
pub const INSPECTION_HORIZON_DAYS: i64 = 30;

pub fn aggregate(
    vehicles: &[Vehicle],
    maintenances: &[MaintenanceRecord],
    users: &[User],
    now: DateTime<Utc>,
) -> StatisticsSummary {
    let total_vehicles = vehicles.len();

    let count_status = |status: VehicleStatus| {
        vehicles
            .iter()
            .filter(|v| v.status.as_ref() == Some(&status))
            .count()
    };

    let total_maintenance_cost: f64 = maintenances.iter().map(|m| m.cost_or_zero()).sum();
    // f64: oversized odometer values must not overflow an integer sum.
    let total_mileage: f64 = vehicles.iter().map(|v| v.mileage_or_zero() as f64).sum();
    let available_vehicles = count_status(VehicleStatus::Available);
    let in_use_vehicles = count_status(VehicleStatus::InUse);

    let per_vehicle = |amount: f64| {
        if total_vehicles > 0 {
            amount / total_vehicles as f64
        } else {
            0.0
        }
    };

    let upcoming_inspections = vehicles
        .iter()
        .filter(|v| has_upcoming_inspection(v, now))
        .count();

    let summary = StatisticsSummary {
        total_vehicles,
        available_vehicles,
        in_use_vehicles,
        in_maintenance: count_status(VehicleStatus::InMaintenance),
        sold_vehicles: count_status(VehicleStatus::Sold),
        vehicles_by_status: group_by(vehicles, |v| label_of(v.status.as_ref())),
        total_maintenance_cost,
        average_maintenance_cost: per_vehicle(total_maintenance_cost),
        average_mileage: per_vehicle(total_mileage),
        upcoming_inspections,
        total_drivers: users.iter().filter(|u| u.is_driver()).count(),
        availability_rate: per_vehicle(available_vehicles as f64 * 100.0),
        utilization_rate: per_vehicle(in_use_vehicles as f64 * 100.0),
        maintenances_per_vehicle: per_vehicle(maintenances.len() as f64),
        maintenance_by_type: group_by(maintenances, |m| label_of(m.kind.as_ref())),
        vehicles_by_type: group_by(vehicles, |v| label_of(v.kind.as_ref())),
        monthly_maintenance_cost: monthly_series(maintenances.iter()).into_entries(),
    };

    debug!(
        vehicles = summary.total_vehicles,
        maintenances = maintenances.len(),
        users = users.len(),
        "aggregated fleet statistics"
    );
    summary
}

/// Same as [`aggregate`] over raw JSON payloads.
///
/// Fails only when one of the inputs is not a list; malformed elements are normalised.
pub fn aggregate_json(
    vehicles: &Value,
    maintenances: &Value,
    users: &Value,
    now: DateTime<Utc>,
) -> Result<StatisticsSummary, FleetError> {
    let vehicles: Vec<Vehicle> = decode_collection("vehicles", vehicles)?;
    let maintenances: Vec<MaintenanceRecord> = decode_collection("maintenances", maintenances)?;
    let users: Vec<User> = decode_collection("users", users)?;
    Ok(aggregate(&vehicles, &maintenances, &users, now))
}

/// Inspection alert within `[now, now + 30 days]`, both bounds inclusive.
pub fn has_upcoming_inspection(vehicle: &Vehicle, now: DateTime<Utc>) -> bool {
    let Some(date) = vehicle.inspection_alert_date.as_deref().and_then(parse_datetime) else {
        return false;
    };
    let horizon = now + Duration::days(INSPECTION_HORIZON_DAYS);
    date >= now && date <= horizon
}

pub fn profile_vehicle(vehicle: &Vehicle, maintenances: &[MaintenanceRecord]) -> VehicleCostProfile {
    let records = records_for(vehicle, maintenances);

    let summed: f64 = records.iter().map(|m| m.cost_or_zero()).sum();
    // A zero backend total means "not computed yet".
    let total_cost = vehicle
        .total_maintenance_cost
        .filter(|total| *total > 0.0)
        .unwrap_or(summed);
    let maintenance_count = records.len().max(vehicle.maintenances.len());
    let average_cost = if maintenance_count > 0 {
        total_cost / maintenance_count as f64
    } else {
        0.0
    };
    let cost_value_ratio = match vehicle.price {
        Some(price) if price > 0.0 => total_cost / price * 100.0,
        _ => 0.0,
    };

    VehicleCostProfile {
        vehicle_id: vehicle.id.clone(),
        total_cost,
        maintenance_count,
        average_cost,
        cost_value_ratio,
        maintenance_by_type: group_by(&records, |m| label_of(m.kind.as_ref())),
        monthly_cost: monthly_series(records.iter().copied()).into_entries(),
    }
}

/// Embedded records plus those referencing the vehicle by id, without duplicates.
fn records_for<'a>(vehicle: &'a Vehicle, maintenances: &'a [MaintenanceRecord]) -> Vec<&'a MaintenanceRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::new();

    for record in vehicle.inline_maintenances() {
        if let Some(id) = record.id.as_deref() {
            seen.insert(id);
        }
        records.push(record);
    }

    if let Some(vehicle_id) = vehicle.id.as_deref() {
        for record in maintenances {
            if record.vehicle_id() != Some(vehicle_id) {
                continue;
            }
            match record.id.as_deref() {
                Some(id) if !seen.insert(id) => {}
                _ => records.push(record),
            }
        }
    }

    records
}

fn monthly_series<'a>(records: impl Iterator<Item = &'a MaintenanceRecord>) -> MonthlyCostSeries {
    let mut series = MonthlyCostSeries::new();
    for record in records {
        match record.service_date.as_deref().and_then(month_key) {
            Some((month, year)) => series.add(month, year, record.cost_or_zero()),
            None => debug!(id = ?record.id, "maintenance without usable date left out of monthly series"),
        }
    }
    series
}

fn group_by<T, F>(items: &[T], key: F) -> BTreeMap<String, usize>
where
    F: Fn(&T) -> String,
{
    let mut groups: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        *groups.entry(key(item)).or_default() += 1;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::{MaintenanceKind, Role, VehicleType, UNSPECIFIED};
    use crate::model::reference::Ref;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn vehicle_with_status(status: &str) -> Vehicle {
        Vehicle {
            status: Some(VehicleStatus::from(status)),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_counts_scenario() {
        let vehicles = vec![
            vehicle_with_status("disponible"),
            vehicle_with_status("en-maintenance"),
            vehicle_with_status("disponible"),
        ];

        let summary = aggregate(&vehicles, &[], &[], now());
        assert_eq!(summary.available_vehicles, 2);
        assert_eq!(summary.in_maintenance, 1);
        assert_eq!(summary.in_use_vehicles, 0);
        assert_eq!(summary.total_vehicles, 3);
    }

    #[test]
    fn test_monthly_series_scenario() {
        let maintenances = vec![
            MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-15", 100.0),
            MaintenanceRecord::new(MaintenanceKind::Repair, "2024-01-20", 50.0),
            MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-02-01", 200.0),
        ];

        let summary = aggregate(&[], &maintenances, &[], now());
        let series: Vec<(String, f64)> = summary
            .monthly_maintenance_cost
            .iter()
            .map(|m| (m.label(), m.cost))
            .collect();
        assert_eq!(
            series,
            vec![("1/2024".to_string(), 150.0), ("2/2024".to_string(), 200.0)]
        );
    }

    #[test]
    fn test_empty_collections_yield_zero_averages() {
        let summary = aggregate(&[], &[], &[], now());
        assert_eq!(summary.total_vehicles, 0);
        assert_eq!(summary.average_mileage, 0.0);
        assert_eq!(summary.average_maintenance_cost, 0.0);
        assert!(summary.monthly_maintenance_cost.is_empty());
        assert!(!summary.average_mileage.is_nan());
    }

    #[test]
    fn test_costs_and_averages() {
        let mut a = vehicle_with_status("disponible");
        a.mileage = Some(10_000);
        let mut b = vehicle_with_status("vendu");
        b.mileage = Some(30_000);
        let c = vehicle_with_status("en-utilisation");

        let mut missing_cost = MaintenanceRecord::new(MaintenanceKind::Repair, "2024-01-01", 0.0);
        missing_cost.cost = None;
        let maintenances = vec![
            MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-10", 120.0),
            missing_cost,
            MaintenanceRecord::new(MaintenanceKind::Repair, "2024-02-10", 180.0),
        ];

        let summary = aggregate(&[a, b, c], &maintenances, &[], now());
        assert_eq!(summary.total_maintenance_cost, 300.0);
        assert_eq!(summary.average_maintenance_cost, 100.0);
        assert!((summary.average_mileage - 40_000.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.sold_vehicles, 1);
        assert_eq!(summary.in_use_vehicles, 1);
    }

    #[test]
    fn test_groupings_cover_every_record() {
        let mut truck = vehicle_with_status("disponible");
        truck.kind = Some(VehicleType::Truck);
        let mut odd = vehicle_with_status("au garage");
        odd.kind = Some(VehicleType::from("tracteur"));
        let bare = Vehicle::default();
        let vehicles = vec![truck, odd, bare];

        let maintenances = vec![
            MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-10", 1.0),
            MaintenanceRecord::default(),
        ];

        let summary = aggregate(&vehicles, &maintenances, &[], now());

        assert_eq!(summary.vehicles_by_status.values().sum::<usize>(), vehicles.len());
        assert_eq!(summary.vehicles_by_type.values().sum::<usize>(), vehicles.len());
        assert_eq!(summary.maintenance_by_type.values().sum::<usize>(), maintenances.len());
        assert_eq!(summary.vehicles_by_status.get("au garage"), Some(&1));
        assert_eq!(summary.vehicles_by_status.get(UNSPECIFIED), Some(&1));
        assert_eq!(summary.vehicles_by_type.get("tracteur"), Some(&1));
        assert_eq!(summary.vehicles_by_type.get("camion"), Some(&1));
        assert_eq!(summary.maintenance_by_type.get(UNSPECIFIED), Some(&1));
    }

    #[test]
    fn test_undated_records_still_count_in_totals() {
        let maintenances = vec![
            MaintenanceRecord::new(MaintenanceKind::Repair, "someday", 75.0),
            MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-10", 25.0),
        ];

        let summary = aggregate(&[], &maintenances, &[], now());
        assert_eq!(summary.total_maintenance_cost, 100.0);
        assert_eq!(summary.monthly_maintenance_cost.len(), 1);
        assert_eq!(summary.monthly_maintenance_cost[0].cost, 25.0);
        assert_eq!(summary.maintenance_by_type.get("réparation"), Some(&1));
    }

    #[test]
    fn test_inspection_window_bounds() {
        let at = |date: DateTime<Utc>| Vehicle {
            inspection_alert_date: Some(date.to_rfc3339()),
            ..Default::default()
        };
        let horizon = now() + Duration::days(INSPECTION_HORIZON_DAYS);

        assert!(has_upcoming_inspection(&at(now()), now()));
        assert!(has_upcoming_inspection(&at(horizon), now()));
        assert!(!has_upcoming_inspection(&at(now() - Duration::seconds(1)), now()));
        assert!(!has_upcoming_inspection(&at(horizon + Duration::seconds(1)), now()));
        assert!(!has_upcoming_inspection(&Vehicle::default(), now()));

        let mut garbage = Vehicle::default();
        garbage.inspection_alert_date = Some("bientôt".to_string());
        assert!(!has_upcoming_inspection(&garbage, now()));

        let vehicles = vec![at(now()), at(horizon), at(horizon + Duration::days(1))];
        assert_eq!(aggregate(&vehicles, &[], &[], now()).upcoming_inspections, 2);
    }

    #[test]
    fn test_driver_count() {
        let users = vec![
            User::new("Amina", "Diallo", Role::Driver),
            User::new("Paul", "Martin", Role::Admin),
            User::new("Léa", "Roux", Role::Driver),
            User::default(),
        ];
        assert_eq!(aggregate(&[], &[], &users, now()).total_drivers, 2);
    }

    #[test]
    fn test_aggregate_json_rejects_non_lists() {
        let err = aggregate_json(&json!({"marque": "Toyota"}), &json!([]), &json!([]), now()).unwrap_err();
        assert!(matches!(err, FleetError::NotACollection { ref name, .. } if name == "vehicles"));

        let err = aggregate_json(&json!([]), &json!([]), &json!(null), now()).unwrap_err();
        assert!(matches!(err, FleetError::NotACollection { ref name, .. } if name == "users"));
    }

    #[test]
    fn test_aggregate_json_tolerates_bad_records() {
        let vehicles = json!([
            { "statut": "disponible", "kilometrage": 1000 },
            { "statut": null, "kilometrage": "abc" },
            17
        ]);
        let maintenances = json!([
            { "coutTotal": "40", "dateEntretien": "2024-01-02" },
            { "coutTotal": null, "dateEntretien": null },
            { "coutTotal": -5 }
        ]);

        let summary = aggregate_json(&vehicles, &maintenances, &json!([]), now()).unwrap();
        assert_eq!(summary.total_vehicles, 3);
        assert_eq!(summary.available_vehicles, 1);
        assert_eq!(summary.vehicles_by_status.get(UNSPECIFIED), Some(&2));
        assert_eq!(summary.total_maintenance_cost, 40.0);
        assert!((summary.average_mileage - 1000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_profile_vehicle_merges_embedded_and_referenced() {
        let mut embedded = MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-05", 100.0);
        embedded.id = Some("m1".to_string());

        let mut vehicle = vehicle_with_status("disponible");
        vehicle.id = Some("v1".to_string());
        vehicle.price = Some(10_000.0);
        vehicle.maintenances = vec![Ref::Inline(Box::new(embedded.clone())), Ref::Id("m2".to_string())];

        let mut same_as_embedded = embedded.clone();
        same_as_embedded.vehicle = Some(Ref::Id("v1".to_string()));
        let mut referenced = MaintenanceRecord::new(MaintenanceKind::Repair, "2024-02-05", 300.0);
        referenced.id = Some("m2".to_string());
        referenced.vehicle = Some(Ref::Id("v1".to_string()));
        let mut other = MaintenanceRecord::new(MaintenanceKind::Repair, "2024-02-05", 999.0);
        other.vehicle = Some(Ref::Id("v2".to_string()));

        let profile = profile_vehicle(&vehicle, &[same_as_embedded, referenced, other]);
        assert_eq!(profile.maintenance_count, 2);
        assert_eq!(profile.total_cost, 400.0);
        assert_eq!(profile.average_cost, 200.0);
        assert!((profile.cost_value_ratio - 4.0).abs() < 1e-9);
        assert_eq!(profile.monthly_cost.len(), 2);
        assert_eq!(profile.maintenance_by_type.get("réparation"), Some(&1));
    }

    #[test]
    fn test_profile_vehicle_without_records_or_price() {
        let profile = profile_vehicle(&Vehicle::default(), &[]);
        assert_eq!(profile.maintenance_count, 0);
        assert_eq!(profile.average_cost, 0.0);
        assert_eq!(profile.cost_value_ratio, 0.0);
    }

    #[test]
    fn test_oversized_mileage_does_not_overflow() {
        let vehicles = json!([{ "kilometrage": 1e19 }, { "kilometrage": 1e19 }]);
        let summary = aggregate_json(&vehicles, &json!([]), &json!([]), now()).unwrap();
        assert_eq!(summary.total_vehicles, 2);
        assert!(summary.average_mileage.is_finite());
        assert!(summary.average_mileage > 1e18);
    }

    #[test]
    fn test_performance_rates() {
        let vehicles = vec![
            vehicle_with_status("disponible"),
            vehicle_with_status("en-utilisation"),
            vehicle_with_status("en-utilisation"),
            vehicle_with_status("vendu"),
        ];
        let maintenances = vec![
            MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-10", 10.0),
            MaintenanceRecord::new(MaintenanceKind::Repair, "2024-01-11", 10.0),
            MaintenanceRecord::default(),
            MaintenanceRecord::default(),
            MaintenanceRecord::default(),
            MaintenanceRecord::default(),
        ];

        let summary = aggregate(&vehicles, &maintenances, &[], now());
        assert_eq!(summary.availability_rate, 25.0);
        assert_eq!(summary.utilization_rate, 50.0);
        assert_eq!(summary.maintenances_per_vehicle, 1.5);
    }

    #[test]
    fn test_performance_rates_on_empty_fleet() {
        let maintenances = vec![MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-10", 10.0)];
        let summary = aggregate(&[], &maintenances, &[], now());
        assert_eq!(summary.availability_rate, 0.0);
        assert_eq!(summary.utilization_rate, 0.0);
        assert_eq!(summary.maintenances_per_vehicle, 0.0);
    }

    #[test]
    fn test_profile_ignores_zero_backend_total() {
        let mut vehicle = vehicle_with_status("disponible");
        vehicle.id = Some("v1".to_string());
        vehicle.total_maintenance_cost = Some(0.0);
        let mut record = MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-05", 80.0);
        record.vehicle = Some(Ref::Id("v1".to_string()));

        let profile = profile_vehicle(&vehicle, &[record]);
        assert_eq!(profile.total_cost, 80.0);

        vehicle.total_maintenance_cost = Some(500.0);
        assert_eq!(profile_vehicle(&vehicle, &[]).total_cost, 500.0);
    }

    #[test]
    fn test_profile_counts_unresolved_references() {
        let mut vehicle = vehicle_with_status("disponible");
        vehicle.id = Some("v1".to_string());
        vehicle.maintenances = vec![Ref::Id("m1".to_string()), Ref::Id("m2".to_string())];

        let profile = profile_vehicle(&vehicle, &[]);
        assert_eq!(profile.maintenance_count, 2);
        assert_eq!(profile.total_cost, 0.0);
        assert_eq!(profile.average_cost, 0.0);
    }
}
