//! Allow-list HTML sanitizing.
//!
//! An untrusted fragment is parsed into a tree, rebuilt keeping only the tags
//! and attributes a [`Policy`] allows, and serialized again. Disallowed
//! elements are unwrapped so their text survives in place, `style` and `on*`
//! attributes are always removed, and URL attributes carrying `javascript:`,
//! `data:` or `vbscript:` are dropped.
//!
//! ```
//! use sanitizer::{sanitize, Policy};
//!
//! let policy = Policy::new(["b", "u"], ["class"]).unwrap();
//! let clean = sanitize("<b>1</b><i>2</i><u>3</u>", &policy).unwrap();
//! assert_eq!(clean, "<b>1</b>2<u>3</u>");
//! ```

use tracing::warn;

/// Pluggable parser and serializer
mod backend;
/// Sorting tree nodes into elements, text and ignorable nodes
mod classify;
mod error;
/// Allowed tag and attribute names
mod policy;
mod sanitizer;
/// The tree rewrite itself
mod walker;

pub use backend::{HtmlParser, HtmlSerializer, NomHtml};
pub use classify::{classify, Element, Node};
pub use error::{Error, Result};
pub use html::{DOMAttributes, DOMContent, DOMElement};
pub use policy::{Policy, PolicyBuilder};
pub use sanitizer::Sanitizer;
pub use walker::{has_forbidden_scheme, is_url_attribute, sanitize_fragment, strip_schemes};

/// Sanitize an HTML fragment with the built-in parser and serializer
pub fn sanitize(input: &str, policy: &Policy) -> Result<String> {
    Sanitizer::new().sanitize(input, policy)
}

/// Sanitize a fragment given as bytes. Anything that is not UTF-8 is rejected
/// with [`Error::InvalidInput`].
pub fn sanitize_bytes(input: &[u8], policy: &Policy) -> Result<String> {
    Sanitizer::new().sanitize_bytes(input, policy)
}

/// Sanitize, logging any error and falling back to an empty string
pub fn sanitize_or_empty(input: &[u8], policy: &Policy) -> String {
    sanitize_bytes(input, policy).unwrap_or_else(|err| {
        warn!(%err, "sanitizing failed, returning empty fragment");
        String::new()
    })
}
