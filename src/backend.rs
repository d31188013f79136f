use html::DOMContent;

/// Turns markup into a tree. Implementations must be forgiving: malformed
/// input still produces a tree.
pub trait HtmlParser {
    fn parse(&self, input: &str) -> Vec<DOMContent>;
}

/// Turns a tree back into markup, escaping text so that it stays text
pub trait HtmlSerializer {
    fn serialize(&self, contents: &[DOMContent]) -> String;
}

/// The parser and serializer from the `html` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct NomHtml;

impl HtmlParser for NomHtml {
    fn parse(&self, input: &str) -> Vec<DOMContent> {
        html::fragment(input)
    }
}

impl HtmlSerializer for NomHtml {
    fn serialize(&self, contents: &[DOMContent]) -> String {
        html::to_html(contents)
    }
}

impl<F> HtmlParser for F
where
    F: Fn(&str) -> Vec<DOMContent>,
{
    fn parse(&self, input: &str) -> Vec<DOMContent> {
        self(input)
    }
}
