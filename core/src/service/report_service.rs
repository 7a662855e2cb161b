use crate::error::FleetError;
use crate::model::category::label_of;
use crate::model::maintenance::MaintenanceRecord;
use crate::model::stats::{StatisticsSummary, VehicleCostProfile};
use crate::model::user::User;
use crate::model::vehicle::Vehicle;
use crate::time::format_display_date;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Cell text for a missing optional value.
pub const PLACEHOLDER: &str = "-";

/// One exported line: column label → display value, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<(&'static str, String)>,
}

impl Row {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.cells.iter().map(|(l, _)| *l).collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (label, value) in &self.cells {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Section {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Row>,
}

impl Section {
    fn new(title: &str, columns: &[&'static str]) -> Self {
        Self {
            title: title.to_string(),
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    /// `values` must line up with `columns`.
    fn push(&mut self, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.columns.len());
        let cells = self.columns.iter().copied().zip(values).collect();
        self.rows.push(Row { cells });
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

/// Records with a fixed export layout.
pub trait Tabular {
    const COLUMNS: &'static [&'static str];

    /// One display value per column, same order as [`Tabular::COLUMNS`].
    fn values(&self) -> Vec<String>;
}

pub fn entity_rows<T: Tabular>(items: &[T]) -> Vec<Row> {
    entity_section("", items).rows
}

pub fn entity_report<T: Tabular>(title: &str, items: &[T]) -> Report {
    Report {
        sections: vec![entity_section(title, items)],
    }
}

fn entity_section<T: Tabular>(title: &str, items: &[T]) -> Section {
    let mut section = Section::new(title, T::COLUMNS);
    for item in items {
        section.push(item.values());
    }
    section
}

pub const SUMMARY_TITLE: &str = "Résumé";
pub const MAINTENANCE_BY_TYPE_TITLE: &str = "Maintenances par type";
pub const VEHICLES_BY_TYPE_TITLE: &str = "Véhicules par type";
pub const VEHICLES_BY_STATUS_TITLE: &str = "Véhicules par statut";
pub const MONTHLY_COST_TITLE: &str = "Coût mensuel des maintenances";

pub fn summary_report(summary: &StatisticsSummary) -> Report {
    let mut overview = Section::new(SUMMARY_TITLE, &["Indicateur", "Valeur"]);
    let indicators: [(&str, String); 14] = [
        ("Véhicules", summary.total_vehicles.to_string()),
        ("Disponibles", summary.available_vehicles.to_string()),
        ("En utilisation", summary.in_use_vehicles.to_string()),
        ("En maintenance", summary.in_maintenance.to_string()),
        ("Vendus", summary.sold_vehicles.to_string()),
        ("Coût total maintenance", money(summary.total_maintenance_cost)),
        ("Coût moyen maintenance", money(summary.average_maintenance_cost)),
        ("Kilométrage moyen", format!("{:.0}", summary.average_mileage)),
        ("Visites techniques à venir", summary.upcoming_inspections.to_string()),
        ("Conducteurs", summary.total_drivers.to_string()),
        ("Mois avec maintenance", summary.monthly_maintenance_cost.len().to_string()),
        ("Taux de disponibilité", format!("{:.0}%", summary.availability_rate)),
        ("Taux d'utilisation", format!("{:.0}%", summary.utilization_rate)),
        ("Maintenances par véhicule", format!("{:.1}", summary.maintenances_per_vehicle)),
    ];
    for (name, value) in indicators {
        overview.push(vec![name.to_string(), value]);
    }

    let mut monthly = Section::new(MONTHLY_COST_TITLE, &["Mois", "Coût"]);
    for entry in &summary.monthly_maintenance_cost {
        monthly.push(vec![entry.label(), money(entry.cost)]);
    }

    Report {
        sections: vec![
            overview,
            count_section(MAINTENANCE_BY_TYPE_TITLE, "Type", &summary.maintenance_by_type),
            count_section(VEHICLES_BY_TYPE_TITLE, "Type", &summary.vehicles_by_type),
            count_section(VEHICLES_BY_STATUS_TITLE, "Statut", &summary.vehicles_by_status),
            monthly,
        ],
    }
}

/// Cost breakdown of one vehicle, titled with its display name.
pub fn profile_report(name: &str, profile: &VehicleCostProfile) -> Report {
    let mut overview = Section::new(name, &["Indicateur", "Valeur"]);
    overview.push(vec!["Coût total maintenance".to_string(), money(profile.total_cost)]);
    overview.push(vec!["Interventions".to_string(), profile.maintenance_count.to_string()]);
    overview.push(vec!["Coût moyen".to_string(), money(profile.average_cost)]);
    overview.push(vec!["Ratio coût/valeur (%)".to_string(), format!("{:.1}", profile.cost_value_ratio)]);

    let mut monthly = Section::new(MONTHLY_COST_TITLE, &["Mois", "Coût"]);
    for entry in &profile.monthly_cost {
        monthly.push(vec![entry.label(), money(entry.cost)]);
    }

    Report {
        sections: vec![
            overview,
            count_section(MAINTENANCE_BY_TYPE_TITLE, "Type", &profile.maintenance_by_type),
            monthly,
        ],
    }
}

fn count_section(title: &str, key_label: &'static str, counts: &BTreeMap<String, usize>) -> Section {
    let mut section = Section::new(title, &[key_label, "Nombre"]);
    for (key, count) in counts {
        section.push(vec![key.clone(), count.to_string()]);
    }
    section
}

/// Comma-separated text. Section titles are written as one-cell lines only when the
/// report has several sections, with a blank line between sections.
pub fn to_csv(report: &Report) -> Result<String, FleetError> {
    let titled = report.sections.len() > 1;
    let mut out = String::new();

    for (index, section) in report.sections.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        if titled {
            writer.write_record([section.title.as_str()])?;
        }
        writer.write_record(&section.columns)?;
        for row in &section.rows {
            writer.write_record(row.values())?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        out.push_str(&String::from_utf8_lossy(&bytes));
    }

    Ok(out)
}

pub fn to_json(report: &Report) -> Result<String, FleetError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn text_or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_string()
}

fn date_or_placeholder(value: Option<&str>) -> String {
    value
        .and_then(format_display_date)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn or_placeholder<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

impl Tabular for Vehicle {
    const COLUMNS: &'static [&'static str] = &[
        "Immatriculation",
        "Marque",
        "Modèle",
        "Année",
        "Couleur",
        "Type",
        "Kilométrage",
        "Statut",
        "Date de mise en circulation",
        "Prix",
        "Prix de vente",
        "Date de vente",
        "Conducteurs",
        "Nombre d'entretiens",
        "Coût total maintenance",
        "Visite technique",
    ];

    fn values(&self) -> Vec<String> {
        let drivers = self.driver_names();
        vec![
            text_or_placeholder(self.plate.as_deref()),
            text_or_placeholder(self.brand.as_deref()),
            text_or_placeholder(self.model.as_deref()),
            or_placeholder(self.year),
            text_or_placeholder(self.color.as_deref()),
            label_of(self.kind.as_ref()),
            or_placeholder(self.mileage),
            label_of(self.status.as_ref()),
            date_or_placeholder(self.circulation_date.as_deref()),
            or_placeholder(self.price.map(money)),
            or_placeholder(self.sale_price.map(money)),
            date_or_placeholder(self.sale_date.as_deref()),
            if drivers.is_empty() { PLACEHOLDER.to_string() } else { drivers.join(", ") },
            self.maintenances.len().to_string(),
            money(self.maintenance_cost()),
            date_or_placeholder(self.inspection_alert_date.as_deref()),
        ]
    }
}

impl Tabular for MaintenanceRecord {
    const COLUMNS: &'static [&'static str] = &[
        "Véhicule",
        "Type d'entretien",
        "Kilométrage",
        "Date d'entretien",
        "Détail de l'intervention",
        "Coût total",
        "Fournisseur pièces",
        "Garage",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            or_placeholder(self.vehicle.as_ref().map(|v| v.display_name())),
            label_of(self.kind.as_ref()),
            or_placeholder(self.odometer),
            date_or_placeholder(self.service_date.as_deref()),
            text_or_placeholder(self.description.as_deref()),
            money(self.cost_or_zero()),
            text_or_placeholder(self.supplier.as_deref()),
            text_or_placeholder(self.garage.as_deref()),
        ]
    }
}

impl Tabular for User {
    const COLUMNS: &'static [&'static str] = &["Prénom", "Nom", "Email", "Rôle"];

    fn values(&self) -> Vec<String> {
        vec![
            text_or_placeholder(self.first_name.as_deref()),
            text_or_placeholder(self.last_name.as_deref()),
            text_or_placeholder(self.email.as_deref()),
            label_of(self.role.as_ref()),
        ]
    }
}
