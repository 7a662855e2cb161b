pub mod category;
pub mod lenient;
pub mod maintenance;
pub mod reference;
pub mod stats;
pub mod user;
pub mod vehicle;
