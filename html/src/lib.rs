//! Forgiving HTML fragment parsing into an owned DOM tree, and serialization
//! of that tree back to markup.

mod entities;
mod parsing;
mod serialize;
#[cfg(test)]
mod tests;

pub use entities::decode_entities;
pub use parsing::{fragment, MAX_DEPTH};
pub use serialize::{escape_attribute, escape_text, to_html};

/// Elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose contents are taken literally up to the matching end tag
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Roots of foreign content, where raw-text elements lose their special parsing
pub const FOREIGN_ELEMENTS: &[&str] = &["svg", "math"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|r| r.eq_ignore_ascii_case(name))
}

pub fn is_foreign_element(name: &str) -> bool {
    FOREIGN_ELEMENTS.iter().any(|f| f.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DOMContent {
    Element(DOMElement),
    Text(String),
    Comment(String),
    Doctype(String),
    ProcessingInstruction(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DOMElement {
    pub name: String,
    pub attributes: DOMAttributes,
    pub contents: Vec<DOMContent>,
}

/// Attributes in source order. Values are stored decoded.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DOMAttributes(pub Vec<(String, String)>);

impl DOMAttributes {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Case-insensitive lookup of the first attribute called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Appends an attribute unless one with the same name is already present
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.get(&name).is_some() {
            return false;
        }
        self.0.push((name, value.into()));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for DOMAttributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds a [`DOMAttributes`] from `name => value` pairs, keeping their order
#[macro_export]
macro_rules! attributes {
    ($($name:expr => $value:expr),* $(,)?) => {
        $crate::DOMAttributes(vec![$(($name.to_string(), $value.to_string())),*])
    };
}

impl DOMElement {
    pub fn new(
        name: impl Into<String>,
        attributes: Option<DOMAttributes>,
        contents: Vec<DOMContent>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.unwrap_or_default(),
            contents,
        }
    }
}

impl From<DOMElement> for DOMContent {
    fn from(e: DOMElement) -> Self {
        DOMContent::Element(e)
    }
}

impl From<&str> for DOMContent {
    fn from(s: &str) -> Self {
        DOMContent::Text(s.to_string())
    }
}

impl From<String> for DOMContent {
    fn from(s: String) -> Self {
        DOMContent::Text(s)
    }
}
