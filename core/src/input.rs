use crate::error::FleetError;
use crate::service::view_service::{FieldFilter, Searchable, SortStrategy, ViewQuery};

/// Command-line view arguments: bare words form the search term, `key:value` pairs filters.
#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub search: String,
    pub filters: Vec<(String, String)>,
}

pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut terms = Vec::new();
    let mut filters = Vec::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() {
                filters.push((key.to_string(), value.to_string()));
                continue;
            }
        }
        terms.push(arg.as_str());
    }

    ParsedInput {
        search: terms.join(" "),
        filters,
    }
}

/// Resolves an exact field name or an unambiguous prefix of one.
pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String, FleetError> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(FleetError::unknown_field(key, candidates)),
        _ => Err(FleetError::AmbiguousField {
            field: key.to_string(),
            matches: matches.join(", "),
        }),
    }
}

/// Builds a view query for `T`, expanding filter keys against its field names.
pub fn build_query<T: Searchable>(parsed: ParsedInput, sort: SortStrategy) -> Result<ViewQuery, FleetError> {
    let filters = parsed
        .filters
        .into_iter()
        .map(|(key, value)| {
            let field = expand_key(&key, T::FIELDS)?;
            Ok(FieldFilter { field, value })
        })
        .collect::<Result<Vec<_>, FleetError>>()?;

    Ok(ViewQuery {
        search: parsed.search,
        search_fields: None,
        filters,
        sort,
    })
}

/// Expands `--search-in` keys for `T`; no keys keeps the default search fields.
pub fn expand_search_fields<T: Searchable>(keys: &[String]) -> Result<Option<Vec<String>>, FleetError> {
    if keys.is_empty() {
        return Ok(None);
    }
    keys.iter()
        .map(|key| expand_key(key, T::FIELDS))
        .collect::<Result<Vec<_>, FleetError>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vehicle::Vehicle;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse_args(&args(&["toyota", "corolla", "status:disponible", "type:voiture"]));
        assert_eq!(parsed.search, "toyota corolla");
        assert_eq!(
            parsed.filters,
            vec![
                ("status".to_string(), "disponible".to_string()),
                ("type".to_string(), "voiture".to_string()),
            ]
        );
    }

    #[test]
    fn test_leading_colon_is_a_search_term() {
        let parsed = parse_args(&args(&[":x"]));
        assert_eq!(parsed.search, ":x");
        assert!(parsed.filters.is_empty());
    }

    #[test]
    fn test_expand_key() {
        let candidates = vec!["brand", "model", "mileage", "status"];

        assert_eq!(expand_key("b", &candidates).unwrap(), "brand");
        assert_eq!(expand_key("stat", &candidates).unwrap(), "status");
        assert_eq!(expand_key("model", &candidates).unwrap(), "model");
        assert_eq!(expand_key("mo", &candidates).unwrap(), "model");

        // Ambiguous
        assert!(matches!(expand_key("m", &candidates), Err(FleetError::AmbiguousField { .. })));

        // Unknown
        assert!(matches!(expand_key("x", &candidates), Err(FleetError::UnknownField { .. })));
    }

    #[test]
    fn test_build_query_expands_fields() {
        let parsed = parse_args(&args(&["clio", "stat:all", "ty:camion"]));
        let query = build_query::<Vehicle>(parsed, SortStrategy::Newest).unwrap();
        assert_eq!(query.search, "clio");
        assert_eq!(query.filters[0], FieldFilter::new("status", "all"));
        assert_eq!(query.filters[1], FieldFilter::new("type", "camion"));
        assert_eq!(query.sort, SortStrategy::Newest);
    }

    #[test]
    fn test_expand_search_fields() {
        assert_eq!(expand_search_fields::<Vehicle>(&[]).unwrap(), None);
        assert_eq!(
            expand_search_fields::<Vehicle>(&args(&["mod", "pl"])).unwrap(),
            Some(vec!["model".to_string(), "plate".to_string()])
        );
        assert!(matches!(
            expand_search_fields::<Vehicle>(&args(&["m"])),
            Err(FleetError::AmbiguousField { .. })
        ));
    }
}
