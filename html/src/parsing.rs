use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_till1, take_until, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, recognize, rest},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use tracing::{span, trace, Level};

use crate::entities::decode_entities;
use crate::{is_foreign_element, is_raw_text_element, is_void_element, DOMAttributes, DOMContent, DOMElement};

/// Start tags nested deeper than this are ignored, their contents being kept
/// at the deepest open element
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, PartialEq)]
enum Token<'a> {
    StartTag {
        name: String,
        attributes: DOMAttributes,
        self_closing: bool,
    },
    EndTag(String),
    Text(&'a str),
    Comment(&'a str),
    Doctype(&'a str),
    ProcessingInstruction(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '_' | '.')
}

/// Attempt to parse a string as a valid tag name, lowercasing it
fn parse_tag_name(input: &str) -> IResult<&str, String> {
    let (remaining, name) = recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while(is_name_char),
    ))(input)?;
    Ok((remaining, name.to_ascii_lowercase()))
}

/// Parse a tag in the form `</name>`, returning `name`
fn parse_close_tag(input: &str) -> IResult<&str, Token> {
    let (remaining, (_, name, _, _)) =
        tuple((tag("</"), parse_tag_name, take_till(|c: char| c == '>'), char('>')))(input)?;
    Ok((remaining, Token::EndTag(name)))
}

/// Parse a tag in the form `<name attr=value ...>`
fn parse_open_tag(input: &str) -> IResult<&str, Token> {
    let (remaining, (_, name, attrs, _, slash, _)) = tuple((
        char('<'),
        parse_tag_name,
        all_attr_parser,
        multispace0,
        opt(char('/')),
        char('>'),
    ))(input)?;
    let mut attributes = DOMAttributes::empty();
    for (k, v) in attrs {
        if !attributes.insert(k, v) {
            trace!(tag = %name, "dropping duplicate attribute");
        }
    }
    Ok((
        remaining,
        Token::StartTag {
            name,
            attributes,
            self_closing: slash.is_some(),
        },
    ))
}

/// Parse `<!-- ... -->`. An unterminated comment runs to the end of input.
fn parse_comment(input: &str) -> IResult<&str, Token> {
    let body = alt((terminated(take_until("-->"), tag("-->")), rest));
    map(preceded(tag("<!--"), body), Token::Comment)(input)
}

/// Parse everything between `open` and the next `>`, which may be missing at end of input
fn bracketed<'a>(open: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(
        tag_no_case(open),
        terminated(take_till(|c: char| c == '>'), opt(char('>'))),
    )
}

fn doctype(body: &str) -> Token {
    Token::Doctype(body.trim())
}

fn parse_doctype(input: &str) -> IResult<&str, Token> {
    map(bracketed("<!doctype"), doctype)(input)
}

/// `<!...>` that is neither a comment nor a doctype
fn parse_bogus_comment(input: &str) -> IResult<&str, Token> {
    map(bracketed("<!"), Token::Comment)(input)
}

fn parse_processing_instruction(input: &str) -> IResult<&str, Token> {
    map(bracketed("<?"), Token::ProcessingInstruction)(input)
}

/// Parse the text up to the next `<`
fn parse_text(input: &str) -> IResult<&str, Token> {
    map(take_till1(|c: char| c == '<'), Token::Text)(input)
}

/// A `<` that does not open anything is plain text
fn parse_stray_lt(input: &str) -> IResult<&str, Token> {
    map(recognize(char('<')), Token::Text)(input)
}

fn parse_token(input: &str) -> IResult<&str, Token> {
    alt((
        parse_comment,
        parse_doctype,
        parse_bogus_comment,
        parse_processing_instruction,
        parse_close_tag,
        parse_open_tag,
        parse_text,
        parse_stray_lt,
    ))(input)
}

/// Split raw text off the front of `input`, stopping at the first `</name`
/// that is followed by whitespace, `/`, `>` or the end of input
fn parse_raw_text<'a>(input: &'a str, name: &str) -> (&'a str, &'a str) {
    let bytes = input.as_bytes();
    let mut from = 0;
    while let Some(found) = input[from..].find("</") {
        let end = from + found;
        let tail = &bytes[end + 2..];
        let closes = tail.len() >= name.len()
            && tail[..name.len()].eq_ignore_ascii_case(name.as_bytes())
            && tail
                .get(name.len())
                .map_or(true, |&b| b.is_ascii_whitespace() || b == b'/' || b == b'>');
        if closes {
            return (&input[end..], &input[..end]);
        }
        from = end + 2;
    }
    ("", input)
}

// Attribute parsing below

fn parse_single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till(|c: char| c == '\''), char('\''))(input)
}

fn parse_double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"'))(input)
}

fn parse_unquoted(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '>')(input)
}

fn value_parser(input: &str) -> IResult<&str, &str> {
    alt((parse_single_quoted, parse_double_quoted, parse_unquoted))(input)
}

fn name_parser(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'))(
        input,
    )
}

/// Whitespace and stray slashes between attributes
fn attr_separator(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_whitespace() || c == '/')(input)
}

fn single_attr_parser(input: &str) -> IResult<&str, (String, String)> {
    let (remaining, name) = name_parser(input)?;
    let (remaining, value) = opt(preceded(
        tuple((multispace0, char('='), multispace0)),
        value_parser,
    ))(remaining)?;
    Ok((
        remaining,
        (
            name.to_ascii_lowercase(),
            decode_entities(value.unwrap_or("")),
        ),
    ))
}

fn all_attr_parser(input: &str) -> IResult<&str, Vec<(String, String)>> {
    many0(preceded(attr_separator, single_attr_parser))(input)
}

/// Stack of open elements above the fragment root
#[derive(Default)]
struct TreeBuilder {
    root: Vec<DOMContent>,
    open: Vec<DOMElement>,
}

impl TreeBuilder {
    fn current(&mut self) -> &mut Vec<DOMContent> {
        match self.open.last_mut() {
            Some(e) => &mut e.contents,
            None => &mut self.root,
        }
    }

    fn append(&mut self, content: DOMContent) {
        let siblings = self.current();
        if let DOMContent::Text(text) = &content {
            if let Some(DOMContent::Text(last)) = siblings.last_mut() {
                last.push_str(text);
                return;
            }
            if text.is_empty() {
                return;
            }
        }
        siblings.push(content);
    }

    /// Inside `svg` or `math` the raw-text elements are parsed as ordinary markup
    fn in_foreign_content(&self) -> bool {
        self.open.iter().any(|e| is_foreign_element(&e.name))
    }

    fn close_top(&mut self) {
        if let Some(element) = self.open.pop() {
            self.append(element.into());
        }
    }

    fn close(&mut self, name: &str) {
        match self.open.iter().rposition(|e| e.name == name) {
            Some(pos) => {
                while self.open.len() > pos {
                    self.close_top();
                }
            }
            None => trace!(tag = %name, "dropping stray end tag"),
        }
    }

    fn finish(mut self) -> Vec<DOMContent> {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.root
    }
}

/// Parse an HTML fragment into its top-level nodes. This never fails: unclosed
/// elements are closed at the end of input, stray end tags are dropped and
/// anything unrecognisable is kept as text.
pub fn fragment(input: &str) -> Vec<DOMContent> {
    let span = span!(Level::TRACE, "Parsing fragment", len = input.len());
    let _enter = span.enter();
    let mut builder = TreeBuilder::default();
    let mut input = input;
    while !input.is_empty() {
        let (remaining, token) = match parse_token(input) {
            Ok(res) => res,
            Err(_) => {
                builder.append(decode_entities(input).into());
                break;
            }
        };
        input = remaining;
        match token {
            Token::Text(text) => builder.append(decode_entities(text).into()),
            Token::Comment(body) => builder.append(DOMContent::Comment(body.to_string())),
            Token::Doctype(body) => builder.append(DOMContent::Doctype(body.to_string())),
            Token::ProcessingInstruction(body) => {
                builder.append(DOMContent::ProcessingInstruction(body.to_string()))
            }
            Token::EndTag(name) => builder.close(&name),
            Token::StartTag { .. } if builder.open.len() >= MAX_DEPTH => {
                trace!("nesting limit reached, ignoring start tag");
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if self_closing || is_void_element(&name) {
                    builder.append(DOMElement::new(name, Some(attributes), vec![]).into());
                    continue;
                }
                let raw = is_raw_text_element(&name) && !builder.in_foreign_content();
                builder.open.push(DOMElement::new(name.as_str(), Some(attributes), vec![]));
                if raw {
                    let (remaining, text) = parse_raw_text(input, &name);
                    input = remaining;
                    builder.append(text.into());
                }
            }
        }
    }
    builder.finish()
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    use crate::attributes;

    let data = r#"<div>"#;
    let target = Token::StartTag {
        name: "div".to_string(),
        attributes: DOMAttributes::empty(),
        self_closing: false,
    };
    assert_eq!(parse_open_tag(data).unwrap(), ("", target));

    let data = r#"<DIV class=nothing>"#;
    let target = Token::StartTag {
        name: "div".to_string(),
        attributes: attributes!("class" => "nothing"),
        self_closing: false,
    };
    assert_eq!(parse_open_tag(data).unwrap(), ("", target));

    let data = r#"<div attr1 attr2=two attr3='three' ATTR4="number four" attr2=dup />"#;
    let target = Token::StartTag {
        name: "div".to_string(),
        attributes: attributes!(
            "attr1" => "",
            "attr2" => "two",
            "attr3" => "three",
            "attr4" => "number four",
        ),
        self_closing: true,
    };
    assert_eq!(parse_open_tag(data).unwrap(), ("", target));
}

#[cfg(test)]
#[test]
fn test_attribute_values_are_decoded() {
    let (_, token) = parse_open_tag(r#"<a href="&#106;avascript&colon;x" title='a &amp; b'>"#).unwrap();
    let Token::StartTag { attributes, .. } = token else {
        panic!("expected a start tag");
    };
    assert_eq!(attributes.get("href"), Some("javascript:x"));
    assert_eq!(attributes.get("title"), Some("a & b"));
}

#[cfg(test)]
#[test]
fn test_close_tag_parse() {
    assert_eq!(parse_close_tag("</P>rest"), Ok(("rest", Token::EndTag("p".into()))));
    assert_eq!(parse_close_tag("</p junk>"), Ok(("", Token::EndTag("p".into()))));
    assert!(parse_close_tag("</3>").is_err());
    assert!(parse_close_tag("</p").is_err());
}

#[cfg(test)]
#[test]
fn test_markup_declarations() {
    assert_eq!(parse_token("<!-- hi -->x"), Ok(("x", Token::Comment(" hi "))));
    assert_eq!(parse_token("<!-- open"), Ok(("", Token::Comment(" open"))));
    assert_eq!(parse_token("<!DOCTYPE html>"), Ok(("", Token::Doctype("html"))));
    assert_eq!(parse_token("<![CDATA[x]]>"), Ok(("", Token::Comment("[CDATA[x]]"))));
    assert_eq!(
        parse_token("<?xml version=\"1.0\"?>"),
        Ok(("", Token::ProcessingInstruction("xml version=\"1.0\"?")))
    );
}

#[cfg(test)]
#[test]
fn test_raw_text_split() {
    assert_eq!(parse_raw_text("a<b</SCRIPT>c", "script"), ("</SCRIPT>c", "a<b"));
    assert_eq!(parse_raw_text("never closed", "style"), ("", "never closed"));
    assert_eq!(parse_raw_text("a</scriptx>b</script", "script"), ("</script", "a</scriptx>b"));
    assert_eq!(parse_raw_text("</</xmp\t>", "xmp"), ("</xmp\t>", "</"));
}
