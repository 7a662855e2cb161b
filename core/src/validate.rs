//! Required-field checks applied where records enter the system.
//!
//! Validation reports problems; it never blocks aggregation.

use crate::model::maintenance::MaintenanceRecord;
use crate::model::reference::Identified;
use crate::model::user::User;
use crate::model::vehicle::Vehicle;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Validation issues of one record, identified for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordIssues {
    pub collection: &'static str,
    pub index: usize,
    pub label: String,
    pub errors: Vec<ValidationError>,
}

fn require(errors: &mut Vec<ValidationError>, present: bool, field: &'static str, message: &'static str) {
    if !present {
        errors.push(ValidationError::new(field, message));
    }
}

pub fn validate_vehicle(vehicle: &Vehicle) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require(&mut errors, vehicle.brand.is_some(), "brand", "La marque est requise");
    require(&mut errors, vehicle.model.is_some(), "model", "Le modèle est requis");
    require(&mut errors, vehicle.year.is_some(), "year", "L'année est requise");
    require(&mut errors, vehicle.color.is_some(), "color", "La couleur est requise");
    require(&mut errors, vehicle.plate.is_some(), "plate", "La plaque d'immatriculation est requise");
    require(&mut errors, vehicle.mileage.is_some(), "mileage", "Le kilométrage est requis");
    errors
}

pub fn validate_maintenance(record: &MaintenanceRecord) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require(&mut errors, record.kind.is_some(), "type", "Le type de maintenance est requis");
    require(&mut errors, record.vehicle.is_some(), "vehicle", "Veuillez sélectionner un véhicule");
    require(&mut errors, record.odometer.is_some(), "mileage", "Le kilométrage est requis");
    require(&mut errors, record.service_date.is_some(), "date", "La date d'entretien est requise");
    require(
        &mut errors,
        record.description.is_some(),
        "description",
        "Le détail de l'intervention est requis",
    );
    require(&mut errors, record.cost.is_some(), "cost", "Le coût total est requis");
    errors
}

pub fn validate_user(user: &User) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require(&mut errors, user.first_name.is_some(), "first_name", "Le prénom est requis");
    require(&mut errors, user.last_name.is_some(), "last_name", "Le nom est requis");
    match user.email.as_deref() {
        None => errors.push(ValidationError::new("email", "L'email est requis")),
        Some(email) if !EMAIL_RE.is_match(email) => {
            errors.push(ValidationError::new("email", "Format d'email invalide"))
        }
        Some(_) => {}
    }
    errors
}

fn collect<T: Identified>(
    collection: &'static str,
    items: &[T],
    validate: fn(&T) -> Vec<ValidationError>,
) -> Vec<RecordIssues> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let errors = validate(item);
            if errors.is_empty() {
                return None;
            }
            let name = item.display_name();
            let label = if name.is_empty() {
                item.id().map(str::to_string).unwrap_or_else(|| format!("#{}", index + 1))
            } else {
                name
            };
            Some(RecordIssues {
                collection,
                index,
                label,
                errors,
            })
        })
        .collect()
}

/// Every invalid record across the three collections.
pub fn check_snapshot(
    vehicles: &[Vehicle],
    maintenances: &[MaintenanceRecord],
    users: &[User],
) -> Vec<RecordIssues> {
    let mut issues = collect("vehicles", vehicles, validate_vehicle);
    issues.extend(collect("maintenances", maintenances, validate_maintenance));
    issues.extend(collect("users", users, validate_user));
    issues
}
