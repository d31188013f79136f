use html::{DOMAttributes, DOMContent, DOMElement};

/// The three kinds of node the walker has to decide about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Element(Element<'a>),
    Text(&'a str),
    /// Comments, doctypes and processing instructions
    Ignorable,
}

/// Read-only view of an element node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a>(&'a DOMElement);

impl<'a> Element<'a> {
    pub fn tag_name(&self) -> &'a str {
        &self.0.name
    }

    pub fn attributes(&self) -> &'a DOMAttributes {
        &self.0.attributes
    }

    pub fn children(&self) -> &'a [DOMContent] {
        &self.0.contents
    }
}

pub fn classify(content: &DOMContent) -> Node<'_> {
    match content {
        DOMContent::Element(e) => Node::Element(Element(e)),
        DOMContent::Text(t) => Node::Text(t),
        DOMContent::Comment(_) | DOMContent::Doctype(_) | DOMContent::ProcessingInstruction(_) => {
            Node::Ignorable
        }
    }
}

#[cfg(test)]
#[test]
fn test_classify() {
    use html::attributes;

    let element: DOMContent =
        DOMElement::new("a", Some(attributes!("href" => "/")), vec!["x".into()]).into();
    let Node::Element(view) = classify(&element) else {
        panic!("expected an element");
    };
    assert_eq!(view.tag_name(), "a");
    assert_eq!(view.attributes().get("href"), Some("/"));
    assert_eq!(view.children(), &[DOMContent::from("x")]);

    assert_eq!(classify(&"text".into()), Node::Text("text"));
    assert_eq!(classify(&DOMContent::Comment("[if IE]".into())), Node::Ignorable);
    assert_eq!(classify(&DOMContent::Doctype("html".into())), Node::Ignorable);
    assert_eq!(
        classify(&DOMContent::ProcessingInstruction("php x".into())),
        Node::Ignorable
    );
}
