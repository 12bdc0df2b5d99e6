//! Database helper functions for safe type conversions.

use rusqlite::types::Type;
use std::collections::BTreeSet;

/// Parse a JSON string-set column, returning a rusqlite error on failure.
pub fn parse_string_set(s: &str) -> rusqlite::Result<BTreeSet<String>> {
    serde_json::from_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_set() {
        let set = parse_string_set(r#"["b","a","a"]"#).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_string_set_rejects_scalars() {
        assert!(parse_string_set("\"com.example\"").is_err());
    }
}
