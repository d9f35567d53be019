//! Rule-based slug validation.
//!
//! A [`SlugRules`] set is an ordered list of human-readable descriptions,
//! each paired with a predicate that must hold for a valid slug. Reports list
//! violated rules in set order so the output is stable across runs.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Sentinel violation reported when a document declares no slug at all.
pub const NO_SLUG: &str = "No slug";

pub const RULE_NOT_EMPTY: &str = "Cannot be empty";
pub const RULE_LEADING: &str = "Cannot start with `-` or `_`";
pub const RULE_TRAILING: &str = "Cannot end with `-` or `_`";
pub const RULE_REPEATED_HYPHEN: &str = "Cannot have multiple `-` in a row";
pub const RULE_CHARSET: &str = "Must only contain letters, numbers, hyphens, and underscores";

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

struct SlugRule {
    description: String,
    predicate: Predicate,
}

/// Ordered mapping from rule description to predicate.
pub struct SlugRules {
    rules: Vec<SlugRule>,
}

fn charset() -> &'static Regex {
    static CHARSET: OnceLock<Regex> = OnceLock::new();
    CHARSET.get_or_init(|| Regex::new(r"^[a-z0-9\-_]+$").expect("static slug pattern"))
}

fn is_separator(c: char) -> bool {
    c == '-' || c == '_'
}

impl SlugRules {
    /// A rule set with no rules; every present slug is valid.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Later rules are reported after earlier ones.
    pub fn with_rule<F>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.rules.push(SlugRule {
            description: description.into(),
            predicate: Box::new(predicate),
        });
        self
    }

    /// Rule descriptions in evaluation order.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `false` for an absent slug, otherwise `true` iff every rule holds.
    pub fn is_valid(&self, slug: Option<&str>) -> bool {
        match slug {
            None => false,
            Some(slug) => self.rules.iter().all(|r| (r.predicate)(slug)),
        }
    }

    /// Descriptions of every rule `slug` violates, in rule-set order.
    ///
    /// An absent slug yields the single [`NO_SLUG`] entry.
    pub fn violated(&self, slug: Option<&str>) -> Vec<String> {
        let Some(slug) = slug else {
            return vec![NO_SLUG.to_string()];
        };
        self.rules
            .iter()
            .filter(|r| !(r.predicate)(slug))
            .map(|r| r.description.clone())
            .collect()
    }
}

impl Default for SlugRules {
    fn default() -> Self {
        SlugRules::empty()
            .with_rule(RULE_NOT_EMPTY, |s| !s.is_empty())
            .with_rule(RULE_LEADING, |s| !s.starts_with(is_separator))
            .with_rule(RULE_TRAILING, |s| !s.ends_with(is_separator))
            .with_rule(RULE_REPEATED_HYPHEN, |s| !s.contains("--"))
            .with_rule(RULE_CHARSET, |s| charset().is_match(s))
    }
}

impl fmt::Debug for SlugRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.descriptions()).finish()
    }
}

/// Validate against the default rule set.
pub fn is_valid(slug: Option<&str>) -> bool {
    SlugRules::default().is_valid(slug)
}

/// Violations against the default rule set.
pub fn violated_rules(slug: Option<&str>) -> Vec<String> {
    SlugRules::default().violated(slug)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("hello")]
    #[case("hello-world")]
    #[case("post_2024")]
    #[case("a")]
    #[case("9-lives")]
    #[case("snake_case-and-kebab")]
    fn accepts_well_formed_slugs(#[case] slug: &str) {
        assert!(is_valid(Some(slug)), "{slug} should be valid");
        assert!(violated_rules(Some(slug)).is_empty());
    }

    #[rstest]
    #[case("", RULE_NOT_EMPTY)]
    #[case("-abc", RULE_LEADING)]
    #[case("_abc", RULE_LEADING)]
    #[case("abc-", RULE_TRAILING)]
    #[case("abc_", RULE_TRAILING)]
    #[case("a--b", RULE_REPEATED_HYPHEN)]
    #[case("Hello", RULE_CHARSET)]
    #[case("with space", RULE_CHARSET)]
    #[case("caf\u{e9}", RULE_CHARSET)]
    fn rejects_malformed_slugs(#[case] slug: &str, #[case] rule: &str) {
        assert!(!is_valid(Some(slug)));
        let violations = violated_rules(Some(slug));
        assert!(
            violations.iter().any(|v| v == rule),
            "{slug:?} should violate {rule:?}, got {violations:?}"
        );
    }

    #[test]
    fn absent_slug_is_invalid_and_reports_sentinel() {
        assert!(!is_valid(None));
        assert_eq!(violated_rules(None), vec![NO_SLUG.to_string()]);
    }

    #[test]
    fn leading_hyphen_reports_only_that_rule() {
        assert_eq!(violated_rules(Some("-abc")), vec![RULE_LEADING.to_string()]);
    }

    #[test]
    fn violations_follow_rule_set_order() {
        let violations = violated_rules(Some("-A--"));
        assert_eq!(
            violations,
            vec![
                RULE_LEADING.to_string(),
                RULE_TRAILING.to_string(),
                RULE_REPEATED_HYPHEN.to_string(),
                RULE_CHARSET.to_string(),
            ]
        );
    }

    #[test]
    fn empty_string_violates_every_content_rule_it_can() {
        let violations = violated_rules(Some(""));
        assert_eq!(
            violations,
            vec![RULE_NOT_EMPTY.to_string(), RULE_CHARSET.to_string()]
        );
    }

    #[test]
    fn custom_rule_sets_are_honoured() {
        let rules = SlugRules::empty().with_rule("Max 5 chars", |s| s.len() <= 5);
        assert!(rules.is_valid(Some("Short")));
        assert!(!rules.is_valid(Some("too-long")));
        assert_eq!(rules.violated(Some("too-long")), vec!["Max 5 chars".to_string()]);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn empty_rule_set_still_rejects_absent_slug() {
        let rules = SlugRules::empty();
        assert!(rules.is_empty());
        assert!(rules.is_valid(Some("ANYTHING goes")));
        assert!(!rules.is_valid(None));
    }

    #[test]
    fn debug_lists_descriptions() {
        let dbg = format!("{:?}", SlugRules::default());
        assert!(dbg.contains(RULE_CHARSET));
    }
}
