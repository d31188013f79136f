use crate::{is_foreign_element, is_raw_text_element, is_void_element, DOMContent, DOMElement};

/// Escape text content so it can never be read back as markup
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for use inside double quotes
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Raw text is written as is, except that nothing inside it may close `parent`
fn escape_raw_text(text: &str, parent: &str) -> String {
    let lowered = text.to_ascii_lowercase();
    let needle = format!("</{}", parent.to_ascii_lowercase());
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (pos, _) in lowered.match_indices(&needle) {
        out.push_str(&text[last..pos]);
        out.push_str("&lt;");
        last = pos + 1;
    }
    out.push_str(&text[last..]);
    out
}

fn write_element(out: &mut String, element: &DOMElement, foreign: bool) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in element.attributes.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push('>');
    if is_void_element(&element.name) {
        // Only hand-built trees get here with children; keep them as siblings
        write_contents(out, &element.contents, foreign, false);
        return;
    }
    let foreign = foreign || is_foreign_element(&element.name);
    if !foreign && is_raw_text_element(&element.name) {
        let mut inner = String::new();
        write_contents(&mut inner, &element.contents, false, true);
        out.push_str(&escape_raw_text(&inner, &element.name));
    } else {
        write_contents(out, &element.contents, foreign, false);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn write_contents(out: &mut String, contents: &[DOMContent], foreign: bool, raw: bool) {
    for content in contents {
        match content {
            DOMContent::Element(e) => write_element(out, e, foreign),
            DOMContent::Text(t) if raw => out.push_str(t),
            DOMContent::Text(t) => out.push_str(&escape_text(t)),
            DOMContent::Comment(c) => {
                out.push_str("<!--");
                out.push_str(&c.replace("-->", "--&gt;"));
                out.push_str("-->");
            }
            DOMContent::Doctype(d) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(&d.replace('>', "&gt;"));
                out.push('>');
            }
            DOMContent::ProcessingInstruction(p) => {
                out.push_str("<?");
                out.push_str(&p.replace('>', "&gt;"));
                out.push('>');
            }
        }
    }
}

/// Serialize a fragment back to HTML
pub fn to_html(contents: &[DOMContent]) -> String {
    let mut out = String::new();
    write_contents(&mut out, contents, false, false);
    out
}
