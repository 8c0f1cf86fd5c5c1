//! Ordered label rules for guessing an investor's type or location from free text.
//!
//! Each rule lists phrases; the first rule with ANY phrase present in the
//! lowercased text decides the label. No match yields `fallback`.
//!
//! TOML shape:
//! ```toml
//! [type_rules]
//! fallback = "VC"
//! [[type_rules.rules]]
//! any_contains = ["angel"]
//! label = "Angel"
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub any_contains: Vec<String>,
    pub label: String,
}

impl LabelRule {
    pub fn new(phrases: &[&str], label: &str) -> Self {
        Self {
            any_contains: phrases.iter().map(|p| p.to_string()).collect(),
            label: label.to_string(),
        }
    }

    fn matches(&self, lower: &str) -> bool {
        self.any_contains.iter().any(|p| {
            let p = p.trim().to_lowercase();
            !p.is_empty() && lower.contains(&p)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRules {
    #[serde(default)]
    pub rules: Vec<LabelRule>,
    pub fallback: String,
}

impl LabelRules {
    pub fn classify(&self, text: &str) -> &str {
        self.matched(text).unwrap_or(self.fallback.as_str())
    }

    /// Label of the first matching rule; `None` when only the fallback applies.
    pub fn matched(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.matches(&lower))
            .map(|r| r.label.as_str())
    }

    /// Investor type from page title/snippet.
    pub fn default_types() -> Self {
        Self {
            rules: vec![
                LabelRule::new(&["angel"], "Angel"),
                LabelRule::new(&["accelerator", "incubator"], "Accelerator"),
                LabelRule::new(&["family office"], "Family Office"),
                LabelRule::new(&["corporate venture", "cvc"], "CVC"),
                LabelRule::new(&["venture", "capital", " vc", "fund"], "VC"),
            ],
            fallback: "VC".to_string(),
        }
    }

    /// US metro from page title/snippet.
    pub fn default_locations() -> Self {
        Self {
            rules: vec![
                LabelRule::new(&["san francisco", "bay area"], "San Francisco, US"),
                LabelRule::new(
                    &["silicon valley", "palo alto", "menlo park"],
                    "Silicon Valley, US",
                ),
                LabelRule::new(&["new york", "nyc"], "New York, US"),
                LabelRule::new(&["boston"], "Boston, US"),
                LabelRule::new(&["california", "los angeles"], "California, US"),
            ],
            fallback: "US".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins() {
        let rules = LabelRules::default_types();
        // both "angel" and "fund" appear; angel rule is earlier
        assert_eq!(rules.classify("Angel fund for SaaS founders"), "Angel");
        assert_eq!(rules.classify("CVC arm of BigCo"), "CVC");
        assert_eq!(rules.classify("Seed Capital Partners"), "VC");
    }

    #[test]
    fn fallback_when_nothing_matches() {
        assert_eq!(LabelRules::default_types().classify("hello"), "VC");
        assert_eq!(LabelRules::default_locations().classify(""), "US");
    }

    #[test]
    fn location_rules() {
        let rules = LabelRules::default_locations();
        assert_eq!(rules.classify("Based in Palo Alto"), "Silicon Valley, US");
        assert_eq!(rules.classify("NYC seed fund"), "New York, US");
    }

    #[test]
    fn parses_from_toml() {
        let src = r#"
fallback = "Other"
[[rules]]
any_contains = ["syndicate"]
label = "Syndicate"
"#;
        let rules: LabelRules = toml::from_str(src).unwrap();
        assert_eq!(rules.classify("AngelList Syndicate"), "Syndicate");
        assert_eq!(rules.classify("x"), "Other");
    }
}
