pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;
pub mod validate;

pub use error::FleetError;
pub use input::{build_query, expand_key, expand_search_fields, parse_args, ParsedInput};
pub use model::category::{MaintenanceKind, Role, VehicleStatus, VehicleType, UNSPECIFIED};
pub use model::maintenance::MaintenanceRecord;
pub use model::reference::{Identified, Ref};
pub use model::stats::{MonthlyCost, StatisticsSummary, VehicleCostProfile};
pub use model::user::User;
pub use model::vehicle::Vehicle;
pub use repository::{FileFleetSource, FleetSource};
pub use service::report_service::{entity_report, profile_report, summary_report, to_csv, to_json, Report, Row, Section, Tabular};
pub use service::stats_service::{aggregate, aggregate_json, profile_vehicle};
pub use service::view_service::{apply_view, FieldFilter, Searchable, SortStrategy, ViewQuery};
pub use usecase::dashboard::{DashboardUseCase, FleetSnapshot};
