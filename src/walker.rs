use html::{is_foreign_element, is_raw_text_element, DOMAttributes, DOMContent, DOMElement};
use tracing::{debug, span, trace, Level};

use crate::classify::{classify, Node};
use crate::policy::{is_handler_or_style, Policy};

/// Attributes whose value the browser follows or loads as a URL
pub const URL_ATTRIBUTES: &[&str] = &[
    "href",
    "src",
    "action",
    "formaction",
    "xlink:href",
    "poster",
    "cite",
    "background",
    "data",
    "longdesc",
    "lowsrc",
    "dynsrc",
    "ping",
    "manifest",
    "codebase",
    "icon",
];

/// Schemes removed from text wherever they appear
pub const TEXT_SCHEMES: &[&str] = &["javascript:", "data:"];

/// Schemes that disqualify a URL attribute
pub const URL_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:"];

pub fn is_url_attribute(name: &str) -> bool {
    URL_ATTRIBUTES.iter().any(|a| a.eq_ignore_ascii_case(name))
}

/// Whether `value` starts with an executable scheme once leading whitespace and
/// control characters, and any embedded tabs or newlines, are ignored
pub fn has_forbidden_scheme(value: &str) -> bool {
    let scheme: String = value
        .trim_start_matches(|c: char| c <= ' ' || c.is_control())
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    URL_SCHEMES.iter().any(|s| scheme.starts_with(s))
}

/// Append `text` to `buf`, cutting `javascript:` and `data:` off the end of
/// `buf` whenever one is completed. `buf` never contains either scheme, also
/// when a removal joins the pieces of a new one.
fn push_stripped(buf: &mut String, text: &str) {
    for c in text.chars() {
        buf.push(c);
        if c != ':' {
            continue;
        }
        for scheme in TEXT_SCHEMES {
            let start = buf.len().saturating_sub(scheme.len());
            if buf.as_bytes()[start..].eq_ignore_ascii_case(scheme.as_bytes()) {
                buf.truncate(start);
                break;
            }
        }
    }
}

/// Remove every `javascript:` and `data:`, including those that only appear
/// once another has been removed
pub fn strip_schemes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_stripped(&mut out, text);
    out
}

fn keep_attribute(tag: &str, name: &str, value: &str, policy: &Policy) -> bool {
    if !policy.is_attribute_allowed(name) {
        trace!(%tag, attribute = %name, "attribute not allowed");
        return false;
    }
    if is_handler_or_style(name) {
        debug!(%tag, attribute = %name, "dropping handler or style attribute");
        return false;
    }
    if is_url_attribute(name) && has_forbidden_scheme(value) {
        debug!(%tag, attribute = %name, "dropping attribute with forbidden URL scheme");
        return false;
    }
    true
}

/// Push a sanitized node. Text is merged into a preceding text node and
/// stripped of schemes as it goes, so schemes split by markup are caught.
fn push(out: &mut Vec<DOMContent>, content: DOMContent) {
    match content {
        DOMContent::Text(text) => match out.last_mut() {
            Some(DOMContent::Text(last)) => push_stripped(last, &text),
            _ => out.push(DOMContent::Text(strip_schemes(&text))),
        },
        other => out.push(other),
    }
}

/// `foreign` is set below a kept `svg` or `math` element, where a browser
/// parses the children of `style`, `script` and friends as markup
fn sanitize_node(content: &DOMContent, policy: &Policy, foreign: bool, out: &mut Vec<DOMContent>) {
    let element = match classify(content) {
        Node::Text(text) => {
            push(out, text.into());
            return;
        }
        Node::Ignorable => {
            trace!("dropping ignorable node");
            return;
        }
        Node::Element(element) => element,
    };
    let name = element.tag_name();
    let kept = policy.is_tag_allowed(name);
    let contents = if kept && !foreign && is_raw_text_element(name) {
        // Outside foreign content only text can follow a raw-text start tag
        sanitize_children(element.children(), &Policy::strip_all(), false)
    } else {
        let foreign = foreign || (kept && is_foreign_element(name));
        sanitize_children(element.children(), policy, foreign)
    };
    if !kept {
        debug!(tag = %name, children = contents.len(), "unwrapping disallowed element");
        for child in contents {
            push(out, child);
        }
        return;
    }
    let attributes: DOMAttributes = element
        .attributes()
        .iter()
        .filter(|(attribute, value)| keep_attribute(name, attribute, value, policy))
        .map(|(attribute, value)| (attribute.to_string(), value.to_string()))
        .collect();
    push(out, DOMElement::new(name, Some(attributes), contents).into());
}

fn sanitize_children(contents: &[DOMContent], policy: &Policy, foreign: bool) -> Vec<DOMContent> {
    let mut out = Vec::with_capacity(contents.len());
    for content in contents {
        sanitize_node(content, policy, foreign, &mut out);
    }
    out.retain(|content| !matches!(content, DOMContent::Text(text) if text.is_empty()));
    out
}

/// Build the sanitized copy of a fragment.
///
/// Every element left has an allowed tag, every attribute left is allowed and
/// is neither `style` nor an `on*` handler, URL attributes never start with an
/// executable scheme, and text keeps its order and content apart from removed
/// schemes. Disallowed elements are replaced by their sanitized children.
pub fn sanitize_fragment(contents: &[DOMContent], policy: &Policy) -> Vec<DOMContent> {
    let span = span!(Level::DEBUG, "Sanitizing fragment", nodes = contents.len());
    let _enter = span.enter();
    sanitize_children(contents, policy, false)
}
