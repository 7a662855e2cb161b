use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Expected '{name}' to be a list of records, found {found}")]
    NotACollection { name: String, found: &'static str },

    #[error("Unknown field '{field}' (known fields: {known})")]
    UnknownField { field: String, known: String },

    #[error("Ambiguous field '{field}' matches {matches}")]
    AmbiguousField { field: String, matches: String },

    #[error("Unknown sort strategy: {0}")]
    InvalidSort(String),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl FleetError {
    pub fn unknown_field(field: &str, known: &[&str]) -> Self {
        FleetError::UnknownField {
            field: field.to_string(),
            known: known.join(", "),
        }
    }
}
