pub mod file;
pub mod traits;

pub use file::FileFleetSource;
pub use traits::FleetSource;

use crate::error::FleetError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Decodes a JSON list element by element.
///
/// Only a payload that is not a list is an error; an element that cannot be decoded is
/// replaced by an empty record so it still shows up in counts.
pub fn decode_collection<T>(name: &str, value: &Value) -> Result<Vec<T>, FleetError>
where
    T: DeserializeOwned + Default,
{
    let Value::Array(items) = value else {
        return Err(FleetError::NotACollection {
            name: name.to_string(),
            found: json_kind(value),
        });
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item).unwrap_or_else(|e| {
                warn!(collection = name, index, error = %e, "undecodable record replaced by an empty one");
                T::default()
            })
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
