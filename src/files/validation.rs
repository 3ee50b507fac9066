use regex::Regex;
use std::sync::LazyLock;

/// Upper bound on a name, in characters.
pub const NAME_MAX_LEN: usize = 32;

/// Default upper bound on a description, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 128;

/// Description word that marks an upload as invalid.
pub const DEFAULT_INVALID_MARKER: &str = "API";

static NAME_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static name pattern"));

/// The description contains the forbidden marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForbiddenMarker;

/// Business rules shared by every validator.
///
/// The marker is `42c-<owner>`: names must contain it, descriptions must not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    marker: String,
    invalid_marker: String,
    description_max_len: usize,
}

impl ValidationRules {
    pub fn new(owner: &str) -> Self {
        Self {
            marker: format!("42c-{owner}"),
            invalid_marker: DEFAULT_INVALID_MARKER.to_string(),
            description_max_len: DESCRIPTION_MAX_LEN,
        }
    }

    pub fn with_invalid_marker(mut self, marker: impl Into<String>) -> Self {
        self.invalid_marker = marker.into();
        self
    }

    pub fn with_description_max_len(mut self, max: usize) -> Self {
        self.description_max_len = max;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn description_max_len(&self) -> usize {
        self.description_max_len
    }

    /// Name must be 1-32 ASCII letters, digits, `_` or `-`, and contain the marker.
    pub fn is_valid_name(&self, name: &str) -> bool {
        let len = name.chars().count();
        (1..=NAME_MAX_LEN).contains(&len)
            && NAME_CHARSET.is_match(name)
            && name.contains(&self.marker)
    }

    /// Rejects a description that mentions the marker in any case.
    ///
    /// Missing or empty input passes. Length is checked separately.
    pub fn validate_description(&self, value: Option<&str>) -> Result<(), ForbiddenMarker> {
        match value {
            Some(v) if contains_ignore_case(v, &self.marker) => Err(ForbiddenMarker),
            _ => Ok(()),
        }
    }

    /// Upload-time rule deciding `StoredFile::valid`.
    pub fn is_flagged_invalid(&self, description: &str) -> bool {
        !self.invalid_marker.is_empty()
            && description
                .to_uppercase()
                .contains(&self.invalid_marker.to_uppercase())
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new("demo")
    }
}

/// True iff the name ends with `.json`, ignoring case.
pub fn is_valid_json_file(name: &str) -> bool {
    let ext_start = match name.len().checked_sub(".json".len()) {
        Some(i) => i,
        None => return false,
    };
    name.get(ext_start..)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(".json"))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_extension_is_case_insensitive() {
        assert!(is_valid_json_file("a.JSON"));
        assert!(is_valid_json_file("data.json"));
        assert!(!is_valid_json_file("a.json.txt"));
        assert!(!is_valid_json_file(""));
        assert!(!is_valid_json_file("json"));
    }

    #[test]
    fn json_extension_handles_multibyte_names() {
        assert!(is_valid_json_file("données.json"));
        assert!(!is_valid_json_file("é"));
    }

    #[test]
    fn name_requires_marker_charset_and_length() {
        let rules = ValidationRules::new("demo");
        assert_eq!(rules.marker(), "42c-demo");

        assert!(rules.is_valid_name("x-42c-demo"));
        assert!(!rules.is_valid_name("x 42c-demo"));
        assert!(!rules.is_valid_name("no-marker"));
        assert!(!rules.is_valid_name(""));

        let long = format!("{}42c-demo", "a".repeat(32));
        assert_eq!(long.len(), 40);
        assert!(!rules.is_valid_name(&long));

        let exact = format!("{}42c-demo", "b".repeat(24));
        assert!(rules.is_valid_name(&exact));
    }

    #[test]
    fn description_rejects_marker_in_any_case() {
        let rules = ValidationRules::new("demo");
        assert_eq!(rules.validate_description(None), Ok(()));
        assert_eq!(rules.validate_description(Some("")), Ok(()));
        assert_eq!(rules.validate_description(Some("plain text")), Ok(()));
        assert_eq!(
            rules.validate_description(Some("see 42C-DEMO here")),
            Err(ForbiddenMarker)
        );
    }

    #[test]
    fn description_length_is_not_checked_here() {
        let rules = ValidationRules::new("demo");
        let long = "x".repeat(500);
        assert_eq!(rules.validate_description(Some(&long)), Ok(()));
    }

    #[test]
    fn invalid_marker_flags_description() {
        let rules = ValidationRules::default();
        assert!(rules.is_flagged_invalid("public api schema"));
        assert!(!rules.is_flagged_invalid("plain schema"));

        let custom = rules.with_invalid_marker("draft");
        assert!(custom.is_flagged_invalid("DRAFT copy"));
    }
}
