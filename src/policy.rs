use std::collections::HashSet;
use tracing::warn;

use crate::error::{Error, Result};

/// Allowed tag and attribute names. Comparison is case-insensitive.
///
/// The attribute set applies to every allowed tag alike. `style` and `on*`
/// attributes never survive sanitizing even when listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    allowed_tags: HashSet<String>,
    allowed_attributes: HashSet<String>,
}

/// Builder for [`Policy`]. Empty sets are rejected unless [`allow_empty`] is set.
///
/// [`allow_empty`]: PolicyBuilder::allow_empty
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    tags: Vec<String>,
    attributes: Vec<String>,
    allow_empty: bool,
}

/// Names end up inside markup, so they must not be able to break out of a tag
fn normalize(kind: &str, name: &str) -> Result<String> {
    let name = name.trim();
    let bad = |c: char| c.is_whitespace() || c.is_control() || "\"'<>/=".contains(c);
    if name.is_empty() || name.contains(bad) {
        return Err(Error::InvalidPolicy(format!("invalid {} name {:?}", kind, name)));
    }
    Ok(name.to_ascii_lowercase())
}

pub(crate) fn is_handler_or_style(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "style" || name.starts_with("on")
}

impl PolicyBuilder {
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags
            .extend(tags.into_iter().map(|t| t.as_ref().to_string()));
        self
    }

    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    /// Accept empty sets, meaning "allow nothing of that kind"
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn build(self) -> Result<Policy> {
        if !self.allow_empty {
            if self.tags.is_empty() {
                return Err(Error::InvalidPolicy("no allowed tags".into()));
            }
            if self.attributes.is_empty() {
                return Err(Error::InvalidPolicy("no allowed attributes".into()));
            }
        }
        let allowed_tags = self
            .tags
            .iter()
            .map(|t| normalize("tag", t))
            .collect::<Result<HashSet<_>>>()?;
        let allowed_attributes = self
            .attributes
            .iter()
            .map(|a| normalize("attribute", a))
            .collect::<Result<HashSet<_>>>()?;
        for attribute in allowed_attributes.iter().filter(|a| is_handler_or_style(a)) {
            warn!(%attribute, "attribute is allowed by policy but will always be stripped");
        }
        Ok(Policy {
            allowed_tags,
            allowed_attributes,
        })
    }
}

impl Policy {
    /// A policy allowing exactly `tags` and `attributes`; both must be non-empty
    pub fn new<T, A>(tags: T, attributes: A) -> Result<Self>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        Self::builder().tags(tags).attributes(attributes).build()
    }

    /// Strips every tag and attribute, leaving only text
    pub fn strip_all() -> Self {
        Policy {
            allowed_tags: HashSet::new(),
            allowed_attributes: HashSet::new(),
        }
    }

    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn is_tag_allowed(&self, name: &str) -> bool {
        self.allowed_tags.contains(&name.to_ascii_lowercase())
    }

    pub fn is_attribute_allowed(&self, name: &str) -> bool {
        self.allowed_attributes.contains(&name.to_ascii_lowercase())
    }

    pub fn allowed_tags(&self) -> impl Iterator<Item = &str> {
        self.allowed_tags.iter().map(String::as_str)
    }

    pub fn allowed_attributes(&self) -> impl Iterator<Item = &str> {
        self.allowed_attributes.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        let policy = Policy::new(["B", " a "], ["HREF"]).unwrap();
        assert!(policy.is_tag_allowed("b"));
        assert!(policy.is_tag_allowed("A"));
        assert!(!policy.is_tag_allowed("i"));
        assert!(policy.is_attribute_allowed("href"));
        assert!(policy.is_attribute_allowed("Href"));
        assert!(!policy.is_attribute_allowed("src"));
    }

    #[test]
    fn test_empty_sets() {
        let no_tags: [&str; 0] = [];
        assert!(Policy::new(no_tags, ["href"]).unwrap_err().is_invalid_policy());
        assert!(Policy::new(["a"], no_tags).unwrap_err().is_invalid_policy());

        let policy = Policy::builder().tags(["a"]).allow_empty(true).build().unwrap();
        assert!(policy.is_tag_allowed("a"));
        assert_eq!(policy.allowed_attributes().count(), 0);

        let policy = Policy::strip_all();
        assert!(!policy.is_tag_allowed("b"));
        assert!(!policy.is_attribute_allowed("href"));
        assert_eq!(Policy::builder().allow_empty(true).build().unwrap(), policy);
        assert!(Policy::builder().build().unwrap_err().is_invalid_policy());
    }

    #[test]
    fn test_malformed_names() {
        for name in ["", "   ", "a b", "x\"", "<b>", "a=b", "a/b", "\u{0}"] {
            let err = Policy::new([name], ["href"]).unwrap_err();
            assert!(err.is_invalid_policy(), "{:?} should be rejected", name);
            let err = Policy::new(["a"], [name]).unwrap_err();
            assert!(err.is_invalid_policy(), "{:?} should be rejected", name);
        }
    }

    #[test]
    fn test_handlers_are_flagged() {
        assert!(is_handler_or_style("onclick"));
        assert!(is_handler_or_style("ONLOAD"));
        assert!(is_handler_or_style("Style"));
        assert!(!is_handler_or_style("class"));
        // Listing them is allowed, the walker drops them anyway
        assert!(Policy::new(["a"], ["style", "onclick"]).is_ok());
    }
}
