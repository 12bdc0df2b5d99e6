//! Helper utility functions for CLI commands

use anyhow::{bail, Result};
use herald_storage::Rule;
use uuid::Uuid;

/// Safely truncate a string to a maximum number of characters (not bytes).
/// This avoids panics when slicing multi-byte UTF-8 characters.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// First eight characters of a UUID, enough to address a rule by hand
pub fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

/// Resolve a full rule ID or a unique prefix of one
pub fn find_rule_id(rules: &[Rule], identifier: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(identifier) {
        return Ok(id);
    }

    let prefix = identifier.to_lowercase();
    let matches: Vec<Uuid> = rules
        .iter()
        .map(|r| r.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No rule matches '{identifier}'"),
        _ => bail!("'{identifier}' matches {} rules, use a longer prefix", matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_storage::{Condition, Disposition};

    fn rule_with_id(id: &str) -> Rule {
        let mut rule = Rule::new(
            "test".to_string(),
            Condition::AppInCategory {
                category_id: "games".to_string(),
            },
            Disposition::Block,
        );
        rule.id = Uuid::parse_str(id).unwrap();
        rule
    }

    #[test]
    fn test_truncate_str_short() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_str_long() {
        assert_eq!(truncate_str("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_str_unicode() {
        assert_eq!(truncate_str("\u{4f60}\u{597d}\u{4e16}\u{754c}", 2), "\u{4f60}\u{597d}...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id(Uuid::nil()), "00000000");
    }

    #[test]
    fn test_find_rule_id_by_prefix() {
        let rules = vec![
            rule_with_id("aaaa1111-0000-0000-0000-000000000000"),
            rule_with_id("aaaa2222-0000-0000-0000-000000000000"),
            rule_with_id("bbbb1111-0000-0000-0000-000000000000"),
        ];

        assert_eq!(find_rule_id(&rules, "bbbb").unwrap(), rules[2].id);
        assert_eq!(find_rule_id(&rules, "AAAA1").unwrap(), rules[0].id);
        assert!(find_rule_id(&rules, "aaaa").is_err());
        assert!(find_rule_id(&rules, "cccc").is_err());
    }

    #[test]
    fn test_find_rule_id_full_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(find_rule_id(&[], &id.to_string()).unwrap(), id);
    }
}
