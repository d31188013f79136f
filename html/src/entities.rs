use lazy_static::lazy_static;
use nom::{
    branch::alt,
    character::complete::{alphanumeric1, char, digit1, hex_digit1, one_of},
    combinator::{map, map_opt, opt},
    sequence::{preceded, terminated},
    IResult,
};
use std::collections::HashMap;

lazy_static! {
    static ref NAMED_ENTITIES: HashMap<&'static str, char> = HashMap::from([
        ("amp", '&'),
        ("lt", '<'),
        ("gt", '>'),
        ("quot", '"'),
        ("apos", '\''),
        ("nbsp", '\u{a0}'),
        ("copy", '\u{a9}'),
        ("reg", '\u{ae}'),
        ("trade", '\u{2122}'),
        ("hellip", '\u{2026}'),
        ("ndash", '\u{2013}'),
        ("mdash", '\u{2014}'),
        ("lsquo", '\u{2018}'),
        ("rsquo", '\u{2019}'),
        ("ldquo", '\u{201c}'),
        ("rdquo", '\u{201d}'),
        ("bull", '\u{2022}'),
        ("middot", '\u{b7}'),
        ("deg", '\u{b0}'),
        ("times", '\u{d7}'),
        ("euro", '\u{20ac}'),
        ("colon", ':'),
        ("tab", '\t'),
        ("newline", '\n'),
    ]);
}

/// Maps a numeric reference to a char, substituting U+FFFD for NUL, surrogates
/// and anything past U+10FFFF
fn code_point(digits: &str, radix: u32) -> char {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .filter(|&c| c != '\0')
        .unwrap_or('\u{fffd}')
}

/// `#123` or `#x7b`, the trailing `;` being optional
fn parse_numeric(input: &str) -> IResult<&str, char> {
    let hex = preceded(one_of("xX"), map(hex_digit1, |d| code_point(d, 16)));
    let dec = map(digit1, |d| code_point(d, 10));
    terminated(preceded(char('#'), alt((hex, dec))), opt(char(';')))(input)
}

/// `name;` for one of the known named references
fn parse_named(input: &str) -> IResult<&str, char> {
    map_opt(terminated(alphanumeric1, char(';')), |name: &str| {
        NAMED_ENTITIES.get(name).copied()
    })(input)
}

/// Parse the reference following an `&`
fn parse_reference(input: &str) -> IResult<&str, char> {
    alt((parse_numeric, parse_named))(input)
}

/// Decodes character references in text or attribute values. Anything that is
/// not a recognised reference is kept literally.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match parse_reference(after) {
            Ok((remaining, c)) => {
                out.push(c);
                rest = remaining;
            }
            Err(_) => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&quot;&apos;&nbsp;"), "\"'\u{a0}");
    }

    #[test]
    fn test_numeric() {
        assert_eq!(decode_entities("&#106;avascript&#x3A;"), "javascript:");
        assert_eq!(decode_entities("&#0000106&#0000097"), "ja");
        assert_eq!(decode_entities("&#0;&#xD800;&#99999999999;"), "\u{fffd}\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_literal_ampersands() {
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&lt"), "&lt");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("&&amp;"), "&&");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }
}
