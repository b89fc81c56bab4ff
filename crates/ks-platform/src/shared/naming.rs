//! Entity name rules shared by modules and actions.

use std::sync::OnceLock;

use regex::Regex;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap())
}

/// A module or action name must be usable as an identifier in bindings:
/// letters, digits, `_` and `$`, not starting with a digit.
pub fn is_valid_entity_name(name: &str) -> bool {
    identifier_pattern().is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_entity_name("getUsers"));
        assert!(is_valid_entity_name("_private"));
        assert!(is_valid_entity_name("$query2"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_entity_name(""));
        assert!(!is_valid_entity_name("2fast"));
        assert!(!is_valid_entity_name("has space"));
        assert!(!is_valid_entity_name("dotted.name"));
        assert!(!is_valid_entity_name("dash-name"));
    }
}
