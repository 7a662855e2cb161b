use crate::error::FleetError;
use crate::model::maintenance::MaintenanceRecord;
use crate::model::reference::Identified;
use crate::model::user::User;
use crate::model::vehicle::Vehicle;
use crate::time::timestamp_or_epoch;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;

/// Filter value that disables a categorical filter.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortStrategy {
    /// Keep input order.
    #[default]
    Insertion,
    Newest,
    Oldest,
    CostAsc,
    CostDesc,
    MileageAsc,
    MileageDesc,
    Name,
}

impl SortStrategy {
    pub const NAMES: &'static [&'static str] = &[
        "insertion",
        "newest",
        "oldest",
        "cost-asc",
        "cost-desc",
        "mileage-asc",
        "mileage-desc",
        "name",
    ];
}

impl FromStr for SortStrategy {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insertion" | "none" => Ok(SortStrategy::Insertion),
            "newest" | "recent" => Ok(SortStrategy::Newest),
            "oldest" => Ok(SortStrategy::Oldest),
            "cost-asc" => Ok(SortStrategy::CostAsc),
            "cost-desc" => Ok(SortStrategy::CostDesc),
            "mileage-asc" => Ok(SortStrategy::MileageAsc),
            "mileage-desc" => Ok(SortStrategy::MileageDesc),
            "name" => Ok(SortStrategy::Name),
            _ => Err(FleetError::InvalidSort(s.to_string())),
        }
    }
}

/// Exact-equality filter on a named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.value.eq_ignore_ascii_case(ALL)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewQuery {
    pub search: String,
    /// Fields the search scans; `None` means the record type's defaults.
    pub search_fields: Option<Vec<String>>,
    pub filters: Vec<FieldFilter>,
    pub sort: SortStrategy,
}

impl ViewQuery {
    pub fn new(search: &str, sort: SortStrategy) -> Self {
        Self {
            search: search.to_string(),
            search_fields: None,
            filters: Vec::new(),
            sort,
        }
    }

    pub fn search_in(mut self, fields: &[&str]) -> Self {
        self.search_fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn filter(mut self, field: &str, value: &str) -> Self {
        self.filters.push(FieldFilter::new(field, value));
        self
    }
}

/// Records the view engine can search, filter and order.
pub trait Searchable {
    /// Field names accepted by filters.
    const FIELDS: &'static [&'static str];
    /// Fields scanned by the free-text search.
    const SEARCH_FIELDS: &'static [&'static str];

    /// Display text of a field; `None` when the record has no value for it.
    fn field_text(&self, field: &str) -> Option<Cow<'_, str>>;

    /// Seconds since epoch of the record's reference date, epoch when missing.
    fn date_key(&self) -> i64 {
        0
    }

    fn cost_key(&self) -> f64 {
        0.0
    }

    fn mileage_key(&self) -> f64 {
        0.0
    }

    fn name_key(&self) -> String;
}

/// Derives a filtered, sorted view. The input is left untouched.
pub fn apply_view<'a, T: Searchable>(items: &'a [T], query: &ViewQuery) -> Result<Vec<&'a T>, FleetError> {
    for filter in &query.filters {
        check_field::<T>(&filter.field)?;
    }
    let search_fields: Vec<&str> = match &query.search_fields {
        Some(fields) => {
            for field in fields {
                check_field::<T>(field)?;
            }
            fields.iter().map(String::as_str).collect()
        }
        None => T::SEARCH_FIELDS.to_vec(),
    };

    let term = query.search.trim().to_lowercase();
    let active: Vec<&FieldFilter> = query.filters.iter().filter(|f| !f.is_disabled()).collect();

    let mut view: Vec<&T> = items
        .iter()
        .filter(|item| matches_search(*item, &search_fields, &term))
        .filter(|item| active.iter().all(|f| matches_filter(*item, f)))
        .collect();

    sort_records(&mut view, query.sort);
    Ok(view)
}

pub fn check_field<T: Searchable>(field: &str) -> Result<(), FleetError> {
    if T::FIELDS.contains(&field) {
        Ok(())
    } else {
        Err(FleetError::unknown_field(field, T::FIELDS))
    }
}

/// `term` is expected lowercased already; empty matches everything.
fn matches_search<T: Searchable>(item: &T, fields: &[&str], term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    fields.iter().any(|field| {
        item.field_text(field)
            .map(|text| text.to_lowercase().contains(term))
            .unwrap_or(false)
    })
}

fn matches_filter<T: Searchable>(item: &T, filter: &FieldFilter) -> bool {
    item.field_text(&filter.field).as_deref() == Some(filter.value.as_str())
}

/// Stable: equal keys keep their relative order.
pub fn sort_records<T: Searchable>(records: &mut [&T], strategy: SortStrategy) {
    match strategy {
        SortStrategy::Insertion => {}
        SortStrategy::Newest => records.sort_by(|a, b| b.date_key().cmp(&a.date_key())),
        SortStrategy::Oldest => records.sort_by(|a, b| a.date_key().cmp(&b.date_key())),
        SortStrategy::CostAsc => records.sort_by(|a, b| a.cost_key().total_cmp(&b.cost_key())),
        SortStrategy::CostDesc => records.sort_by(|a, b| b.cost_key().total_cmp(&a.cost_key())),
        SortStrategy::MileageAsc => records.sort_by(|a, b| a.mileage_key().total_cmp(&b.mileage_key())),
        SortStrategy::MileageDesc => records.sort_by(|a, b| b.mileage_key().total_cmp(&a.mileage_key())),
        SortStrategy::Name => records.sort_by(|a, b| compare_names(&a.name_key(), &b.name_key())),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn borrowed(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

impl Searchable for Vehicle {
    const FIELDS: &'static [&'static str] = &[
        "brand", "model", "year", "color", "plate", "type", "status", "mileage", "driver",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["brand", "model", "plate", "color"];

    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "brand" => borrowed(&self.brand),
            "model" => borrowed(&self.model),
            "year" => self.year.map(|y| Cow::Owned(y.to_string())),
            "color" => borrowed(&self.color),
            "plate" => borrowed(&self.plate),
            "type" => self.kind.as_ref().map(|k| Cow::Borrowed(k.as_str())),
            "status" => self.status.as_ref().map(|s| Cow::Borrowed(s.as_str())),
            "mileage" => self.mileage.map(|m| Cow::Owned(m.to_string())),
            "driver" => {
                let names = self.driver_names();
                (!names.is_empty()).then(|| Cow::Owned(names.join(", ")))
            }
            _ => None,
        }
    }

    fn date_key(&self) -> i64 {
        timestamp_or_epoch(self.circulation_date.as_deref())
    }

    fn cost_key(&self) -> f64 {
        self.maintenance_cost()
    }

    fn mileage_key(&self) -> f64 {
        self.mileage_or_zero() as f64
    }

    fn name_key(&self) -> String {
        self.display_name()
    }
}

impl Searchable for MaintenanceRecord {
    const FIELDS: &'static [&'static str] = &[
        "type", "vehicle", "garage", "supplier", "description", "date",
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["garage", "supplier", "description"];

    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "type" => self.kind.as_ref().map(|k| Cow::Borrowed(k.as_str())),
            "vehicle" => self.vehicle.as_ref().and_then(|v| v.id()).map(Cow::Borrowed),
            "garage" => borrowed(&self.garage),
            "supplier" => borrowed(&self.supplier),
            "description" => borrowed(&self.description),
            "date" => borrowed(&self.service_date),
            _ => None,
        }
    }

    fn date_key(&self) -> i64 {
        timestamp_or_epoch(self.service_date.as_deref())
    }

    fn cost_key(&self) -> f64 {
        self.cost_or_zero()
    }

    fn mileage_key(&self) -> f64 {
        self.odometer.unwrap_or(0) as f64
    }

    fn name_key(&self) -> String {
        self.vehicle
            .as_ref()
            .map(|v| v.display_name())
            .unwrap_or_default()
    }
}

impl Searchable for User {
    const FIELDS: &'static [&'static str] = &["first_name", "last_name", "email", "role"];
    const SEARCH_FIELDS: &'static [&'static str] = &["first_name", "last_name", "email"];

    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "first_name" => borrowed(&self.first_name),
            "last_name" => borrowed(&self.last_name),
            "email" => borrowed(&self.email),
            "role" => self.role.as_ref().map(|r| Cow::Borrowed(r.as_str())),
            _ => None,
        }
    }

    fn name_key(&self) -> String {
        format!(
            "{} {}",
            self.last_name.as_deref().unwrap_or_default(),
            self.first_name.as_deref().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::{MaintenanceKind, VehicleStatus};

    fn vehicle(brand: &str, model: &str, status: VehicleStatus) -> Vehicle {
        Vehicle::new(brand, model, status)
    }

    fn fleet() -> Vec<Vehicle> {
        let mut clio = vehicle("Renault", "Clio", VehicleStatus::InUse);
        clio.mileage = Some(80_000);
        clio.circulation_date = Some("2018-06-01".to_string());
        clio.total_maintenance_cost = Some(300.0);

        let mut corolla = vehicle("Toyota", "Corolla", VehicleStatus::Available);
        corolla.mileage = Some(20_000);
        corolla.circulation_date = Some("2022-01-10".to_string());
        corolla.total_maintenance_cost = Some(100.0);

        let mut hilux = vehicle("Toyota", "Hilux", VehicleStatus::Available);
        hilux.plate = Some("TY-404-LX".to_string());
        hilux.total_maintenance_cost = Some(200.0);

        vec![corolla, clio, hilux]
    }

    fn brands_models(view: &[&Vehicle]) -> Vec<String> {
        view.iter().map(|v| v.display_name()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let vehicles = vec![
            vehicle("Toyota", "Corolla", VehicleStatus::Available),
            vehicle("Renault", "Clio", VehicleStatus::Available),
        ];
        let view = apply_view(&vehicles, &ViewQuery::new("toyota", SortStrategy::Insertion)).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].brand.as_deref(), Some("Toyota"));

        let view = apply_view(&vehicles, &ViewQuery::new("LI", SortStrategy::Insertion)).unwrap();
        assert_eq!(brands_models(&view), vec!["Renault Clio"]);
    }

    #[test]
    fn test_search_covers_configured_fields_only() {
        let vehicles = fleet();
        let view = apply_view(&vehicles, &ViewQuery::new("404", SortStrategy::Insertion)).unwrap();
        assert_eq!(brands_models(&view), vec!["Toyota Hilux (TY-404-LX)"]);

        // Status is filterable but not searched.
        let view = apply_view(&vehicles, &ViewQuery::new("disponible", SortStrategy::Insertion)).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_search_restricted_to_chosen_fields() {
        let vehicles = vec![
            vehicle("Clio", "Megane", VehicleStatus::Available),
            vehicle("Renault", "Clio", VehicleStatus::Available),
        ];
        let query = ViewQuery::new("clio", SortStrategy::Insertion).search_in(&["model"]);
        let view = apply_view(&vehicles, &query).unwrap();
        assert_eq!(brands_models(&view), vec!["Renault Clio"]);

        // Non-default fields become searchable when asked for.
        let query = ViewQuery::new("disponible", SortStrategy::Insertion).search_in(&["status"]);
        assert_eq!(apply_view(&vehicles, &query).unwrap().len(), 2);

        let query = ViewQuery::new("clio", SortStrategy::Insertion).search_in(&[]);
        assert!(apply_view(&vehicles, &query).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_search_field_is_rejected() {
        let vehicles = fleet();
        let query = ViewQuery::new("x", SortStrategy::Insertion).search_in(&["brand", "colour"]);
        let err = apply_view(&vehicles, &query).unwrap_err();
        assert!(matches!(err, FleetError::UnknownField { ref field, .. } if field == "colour"));
    }

    #[test]
    fn test_empty_query_keeps_every_element() {
        let vehicles = fleet();
        let query = ViewQuery::new("  ", SortStrategy::MileageDesc)
            .filter("status", ALL)
            .filter("type", "ALL");
        let view = apply_view(&vehicles, &query).unwrap();

        assert_eq!(view.len(), vehicles.len());
        for v in &vehicles {
            assert!(view.iter().any(|x| std::ptr::eq(*x, v)));
        }
        assert_eq!(view[0].model.as_deref(), Some("Clio"));
    }

    #[test]
    fn test_categorical_filter_is_exact() {
        let vehicles = fleet();
        let query = ViewQuery::new("", SortStrategy::Insertion).filter("status", "disponible");
        let view = apply_view(&vehicles, &query).unwrap();
        assert_eq!(view.len(), 2);

        let query = ViewQuery::new("", SortStrategy::Insertion).filter("status", "dispo");
        assert!(apply_view(&vehicles, &query).unwrap().is_empty());

        let query = ViewQuery::new("toyota", SortStrategy::Insertion)
            .filter("status", "disponible")
            .filter("model", "Hilux");
        assert_eq!(apply_view(&vehicles, &query).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_filter_field_is_rejected() {
        let vehicles = fleet();
        let query = ViewQuery::new("", SortStrategy::Insertion).filter("colour", "red");
        let err = apply_view(&vehicles, &query).unwrap_err();
        assert!(matches!(err, FleetError::UnknownField { .. }));
    }

    #[test]
    fn test_cost_sort_reverses_cleanly() {
        let vehicles = fleet();
        let desc = apply_view(&vehicles, &ViewQuery::new("", SortStrategy::CostDesc)).unwrap();
        let mut asc = apply_view(&vehicles, &ViewQuery::new("", SortStrategy::CostAsc)).unwrap();
        asc.reverse();
        assert_eq!(brands_models(&desc), brands_models(&asc));
        assert_eq!(desc[0].model.as_deref(), Some("Clio"));
    }

    #[test]
    fn test_date_sort_puts_missing_dates_at_epoch() {
        let vehicles = fleet();
        let newest = apply_view(&vehicles, &ViewQuery::new("", SortStrategy::Newest)).unwrap();
        let models: Vec<_> = newest.iter().map(|v| v.model.clone().unwrap()).collect();
        assert_eq!(models, vec!["Corolla", "Clio", "Hilux"]);

        let oldest = apply_view(&vehicles, &ViewQuery::new("", SortStrategy::Oldest)).unwrap();
        assert_eq!(oldest[0].model.as_deref(), Some("Hilux"));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let vehicles: Vec<Vehicle> = ["A", "B", "C", "D"]
            .iter()
            .map(|m| vehicle("Fiat", m, VehicleStatus::Available))
            .collect();
        for strategy in [SortStrategy::CostDesc, SortStrategy::Newest, SortStrategy::MileageAsc] {
            let view = apply_view(&vehicles, &ViewQuery::new("", strategy)).unwrap();
            let models: Vec<_> = view.iter().map(|v| v.model.clone().unwrap()).collect();
            assert_eq!(models, vec!["A", "B", "C", "D"]);
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let vehicles = fleet();
        let before = vehicles.clone();
        let _ = apply_view(&vehicles, &ViewQuery::new("", SortStrategy::Name)).unwrap();
        assert_eq!(vehicles, before);
    }

    #[test]
    fn test_maintenance_search_and_sort() {
        let mut a = MaintenanceRecord::new(MaintenanceKind::Upkeep, "2024-01-15", 90.0);
        a.garage = Some("Garage du Centre".to_string());
        let mut b = MaintenanceRecord::new(MaintenanceKind::Repair, "2024-03-02", 450.0);
        b.supplier = Some("Pièces Auto Plus".to_string());
        b.description = Some("Remplacement embrayage".to_string());
        let c = MaintenanceRecord::default();
        let records = vec![a, b, c];

        let view = apply_view(&records, &ViewQuery::new("embrayage", SortStrategy::Insertion)).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].cost, Some(450.0));

        let view = apply_view(&records, &ViewQuery::new("", SortStrategy::Newest)).unwrap();
        let costs: Vec<f64> = view.iter().map(|m| m.cost_or_zero()).collect();
        assert_eq!(costs, vec![450.0, 90.0, 0.0]);

        let query = ViewQuery::new("", SortStrategy::Insertion).filter("type", "réparation");
        assert_eq!(apply_view(&records, &query).unwrap().len(), 1);
    }

    #[test]
    fn test_sort_strategy_from_str() {
        assert_eq!("cost-desc".parse::<SortStrategy>().unwrap(), SortStrategy::CostDesc);
        assert_eq!("Newest".parse::<SortStrategy>().unwrap(), SortStrategy::Newest);
        for name in SortStrategy::NAMES {
            assert!(name.parse::<SortStrategy>().is_ok());
        }
        assert!("fastest".parse::<SortStrategy>().is_err());
    }
}
