pub mod report_service;
pub mod stats_service;
pub mod view_service;
