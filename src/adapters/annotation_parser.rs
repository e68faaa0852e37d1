//! Directive-attribute grammar.
//!
//! A directive's text is a primary value optionally interleaved with
//! `key=value` attributes. Values may be bare, `"double quoted"` or
//! `'single quoted'`:
//!
//! ```text
//! App\Models\User states=admin,verified
//! App\Models\User states="admin, verified"
//! ```

use crate::domain::{ExampleError, ExampleResult};
use regex::Regex;
use std::collections::HashMap;

/// Primary value plus every recognized attribute (absent ones map to `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDirective {
    pub content: String,
    pub attributes: HashMap<String, Option<String>>,
}

impl ParsedDirective {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_deref())
    }
}

/// Attribute grammar compiled for a fixed set of recognized keys.
///
/// Attributes not listed stay part of the content. When a key repeats, the
/// last occurrence wins.
#[derive(Debug, Clone)]
pub struct AttributeGrammar {
    keys: Vec<String>,
    pattern: Option<Regex>,
}

impl AttributeGrammar {
    pub fn new(allowed: &[&str]) -> ExampleResult<Self> {
        let keys = allowed.iter().map(|key| key.to_string()).collect();
        if allowed.is_empty() {
            return Ok(Self {
                keys,
                pattern: None,
            });
        }

        let names = allowed
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r#"\b({})=([^\s'"]+|".+?"|'.+?')\s*"#, names);
        let pattern = Regex::new(&pattern).map_err(|e| ExampleError::Directive(e.to_string()))?;

        Ok(Self {
            keys,
            pattern: Some(pattern),
        })
    }

    /// Split `raw` into its primary value and the recognized attributes.
    pub fn parse(&self, raw: &str) -> ParsedDirective {
        let mut attributes: HashMap<String, Option<String>> =
            self.keys.iter().map(|key| (key.clone(), None)).collect();

        let Some(re) = &self.pattern else {
            return ParsedDirective {
                content: raw.trim().to_string(),
                attributes,
            };
        };

        for caps in re.captures_iter(raw) {
            let value = caps[2].trim_matches(|c| c == '"' || c == '\'' || c == ' ');
            attributes.insert(caps[1].to_string(), Some(value.to_string()));
        }
        let content = re.replace_all(raw, "").trim().to_string();

        ParsedDirective {
            content,
            attributes,
        }
    }
}

/// One-off parse of `raw` against the attributes named in `allowed`.
pub fn parse_into_content_and_attributes(
    raw: &str,
    allowed: &[&str],
) -> ExampleResult<ParsedDirective> {
    Ok(AttributeGrammar::new(allowed)?.parse(raw))
}
