use serde::{Deserialize, Serialize};

use crate::model::category::{VehicleStatus, VehicleType};
use crate::model::lenient;
use crate::model::maintenance::MaintenanceRecord;
use crate::model::reference::{Identified, Ref};
use crate::model::user::User;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Vehicle {
    #[serde(rename = "_id", deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(rename = "marque", deserialize_with = "lenient::text")]
    pub brand: Option<String>,
    #[serde(rename = "modele", deserialize_with = "lenient::text")]
    pub model: Option<String>,
    #[serde(rename = "annee", deserialize_with = "lenient::year")]
    pub year: Option<i32>,
    #[serde(rename = "couleur", deserialize_with = "lenient::text")]
    pub color: Option<String>,
    #[serde(rename = "plaqueImmatriculation", deserialize_with = "lenient::text")]
    pub plate: Option<String>,
    #[serde(rename = "typeVehicule", deserialize_with = "lenient::category")]
    pub kind: Option<VehicleType>,
    #[serde(rename = "kilometrage", deserialize_with = "lenient::count")]
    pub mileage: Option<u64>,
    #[serde(rename = "statut", deserialize_with = "lenient::category")]
    pub status: Option<VehicleStatus>,
    #[serde(
        rename = "dateMiseEnCirculation",
        alias = "dateAjout",
        deserialize_with = "lenient::text"
    )]
    pub circulation_date: Option<String>,
    #[serde(rename = "prix", deserialize_with = "lenient::amount")]
    pub price: Option<f64>,
    #[serde(rename = "prixVente", deserialize_with = "lenient::amount")]
    pub sale_price: Option<f64>,
    #[serde(rename = "dateVente", deserialize_with = "lenient::text")]
    pub sale_date: Option<String>,
    #[serde(rename = "conducteurs", deserialize_with = "lenient::list")]
    pub drivers: Vec<Ref<User>>,
    #[serde(rename = "maintenances", deserialize_with = "lenient::list")]
    pub maintenances: Vec<Ref<MaintenanceRecord>>,
    #[serde(rename = "alertDateVisiteTechnique", deserialize_with = "lenient::text")]
    pub inspection_alert_date: Option<String>,
    #[serde(rename = "totalCoutMaintenance", deserialize_with = "lenient::amount")]
    pub total_maintenance_cost: Option<f64>,
}

impl Vehicle {
    pub fn new(brand: &str, model: &str, status: VehicleStatus) -> Self {
        Self {
            brand: Some(brand.to_string()),
            model: Some(model.to_string()),
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn mileage_or_zero(&self) -> u64 {
        self.mileage.unwrap_or(0)
    }

    /// Maintenance records embedded in the payload (bare ids are skipped).
    pub fn inline_maintenances(&self) -> impl Iterator<Item = &MaintenanceRecord> {
        self.maintenances.iter().filter_map(|m| m.inline())
    }

    /// Backend-derived total when present, otherwise the sum over embedded records.
    pub fn maintenance_cost(&self) -> f64 {
        self.total_maintenance_cost
            .unwrap_or_else(|| self.inline_maintenances().map(|m| m.cost_or_zero()).sum())
    }

    pub fn driver_names(&self) -> Vec<String> {
        self.drivers.iter().map(|d| d.display_name()).collect()
    }
}

impl Identified for Vehicle {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_name(&self) -> String {
        let name = [self.brand.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        match self.plate.as_deref() {
            Some(plate) if name.is_empty() => plate.to_string(),
            Some(plate) => format!("{} ({})", name, plate),
            None => name,
        }
    }
}
