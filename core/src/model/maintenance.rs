use serde::{Deserialize, Serialize};

use crate::model::category::MaintenanceKind;
use crate::model::lenient;
use crate::model::reference::{Identified, Ref};
use crate::model::vehicle::Vehicle;

/// A logged service or repair event tied to one vehicle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct MaintenanceRecord {
    #[serde(rename = "_id", deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(rename = "vehicule", deserialize_with = "lenient::optional")]
    pub vehicle: Option<Ref<Vehicle>>,
    #[serde(rename = "typeMaintenance", deserialize_with = "lenient::category")]
    pub kind: Option<MaintenanceKind>,
    #[serde(rename = "kilometrage", deserialize_with = "lenient::count")]
    pub odometer: Option<u64>,
    #[serde(rename = "dateEntretien", deserialize_with = "lenient::text")]
    pub service_date: Option<String>,
    #[serde(rename = "detailIntervention", deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(rename = "coutTotal", deserialize_with = "lenient::amount")]
    pub cost: Option<f64>,
    #[serde(rename = "fournisseurPieces", deserialize_with = "lenient::text")]
    pub supplier: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub garage: Option<String>,
}

impl MaintenanceRecord {
    pub fn new(kind: MaintenanceKind, service_date: &str, cost: f64) -> Self {
        Self {
            kind: Some(kind),
            service_date: Some(service_date.to_string()),
            cost: Some(cost),
            ..Default::default()
        }
    }

    /// Cost with missing values counted as zero.
    pub fn cost_or_zero(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }

    pub fn vehicle_id(&self) -> Option<&str> {
        self.vehicle.as_ref().and_then(|v| v.id())
    }
}

impl Identified for MaintenanceRecord {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn display_name(&self) -> String {
        let kind = self.kind.as_ref().map(|k| k.to_string()).unwrap_or_default();
        match &self.service_date {
            Some(date) => format!("{} {}", kind, date).trim().to_string(),
            None => kind,
        }
    }
}
