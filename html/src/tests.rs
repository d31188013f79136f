use super::*;
use crate::attributes;
use pretty_assertions::assert_eq;

#[test]
fn test_document() {
    let i = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8"/>
        <title>The minimal, valid HTML5 document</title>
    </head>
    <body>
        <!-- User-visible content goes in the body -->
        <p>Some paragraph</p>
        Some untagged text
    </body>
</html>"#;
    let target = vec![
        DOMContent::Doctype("html".into()),
        "\n".into(),
        DOMElement::new(
            "html",
            Some(attributes!("lang" => "en")),
            vec![
                "\n    ".into(),
                DOMElement::new(
                    "head",
                    None,
                    vec![
                        "\n        ".into(),
                        DOMElement::new("meta", Some(attributes!("charset" => "utf-8")), vec![])
                            .into(),
                        "\n        ".into(),
                        DOMElement::new(
                            "title",
                            None,
                            vec!["The minimal, valid HTML5 document".into()],
                        )
                        .into(),
                        "\n    ".into(),
                    ],
                )
                .into(),
                "\n    ".into(),
                DOMElement::new(
                    "body",
                    None,
                    vec![
                        "\n        ".into(),
                        DOMContent::Comment(" User-visible content goes in the body ".into()),
                        "\n        ".into(),
                        DOMElement::new("p", None, vec!["Some paragraph".into()]).into(),
                        "\n        Some untagged text\n    ".into(),
                    ],
                )
                .into(),
                "\n".into(),
            ],
        )
        .into(),
    ];
    assert_eq!(fragment(i), target);
}

#[test]
fn test_parse_malformed() {
    // Stray end tags vanish, unclosed elements are closed at the end
    let target = vec![DOMElement::new(
        "html",
        None,
        vec![DOMElement::new("opening", None, vec![]).into()],
    )
    .into()];
    assert_eq!(fragment("<html></closing><opening></html>"), target);

    assert_eq!(fragment("<---></--->"), vec!["<---></--->".into()]);
    assert_eq!(
        fragment("<b>bold <i>both</b> after"),
        vec![
            DOMElement::new(
                "b",
                None,
                vec![
                    "bold ".into(),
                    DOMElement::new("i", None, vec!["both".into()]).into(),
                ],
            )
            .into(),
            " after".into(),
        ]
    );
}

#[test]
fn test_unterminated_tag_is_text() {
    assert_eq!(
        fragment(r#"a <img src="x" onerror=y"#),
        vec![r#"a <img src="x" onerror=y"#.into()]
    );
}

#[test]
fn test_raw_text_elements() {
    let target = vec![
        DOMElement::new("script", None, vec!["if (a<b) { x = '<i>&amp;' }".into()]).into(),
        DOMElement::new("i", None, vec!["after".into()]).into(),
    ];
    assert_eq!(
        fragment("<SCRIPT>if (a<b) { x = '<i>&amp;' }</script ><i>after</i>"),
        target
    );
}

#[test]
fn test_text_is_decoded_and_merged() {
    assert_eq!(
        fragment("1 &lt; 2 < 3 &amp;&amp; 4"),
        vec!["1 < 2 < 3 && 4".into()]
    );
}

#[test]
fn test_nesting_limit() {
    let depth = MAX_DEPTH + 10;
    let input = format!("{}x{}", "<b>".repeat(depth), "</b>".repeat(depth));
    let tree = fragment(&input);
    let mut level = 0;
    let mut nodes = &tree;
    while let Some(DOMContent::Element(e)) = nodes.first() {
        level += 1;
        nodes = &e.contents;
    }
    assert_eq!(level, MAX_DEPTH);
    assert_eq!(nodes, &vec![DOMContent::from("x")]);
}

#[test]
fn test_round_trip_is_stable() {
    let i = r#"<p class="x">1 &lt; 2 &amp; <b>bold</b><br><img src="a.png" alt='"q"'></p>"#;
    let once = to_html(&fragment(i));
    assert_eq!(
        once,
        r#"<p class="x">1 &lt; 2 &amp; <b>bold</b><br><img src="a.png" alt="&quot;q&quot;"></p>"#
    );
    assert_eq!(to_html(&fragment(&once)), once);
}

#[test]
fn test_foreign_content_parses_raw_text_elements_as_markup() {
    let target: Vec<DOMContent> = vec![
        DOMElement::new(
            "svg",
            None,
            vec![DOMElement::new(
                "style",
                None,
                vec![DOMElement::new("img", Some(attributes!("src" => "x", "onerror" => "y")), vec![]).into()],
            )
            .into()],
        )
        .into(),
        DOMElement::new("style", None, vec!["<i>".into()]).into(),
    ];
    assert_eq!(
        fragment("<svg><style><img src=x onerror=y></style></svg><style><i></style>"),
        target
    );
}

#[test]
fn test_many_raw_text_elements_parse_in_linear_time() {
    let count = 40_000;
    let input = "<xmp>a</XMP>".repeat(count);
    let started = std::time::Instant::now();
    let tree = fragment(&input);
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert_eq!(tree.len(), count);
    assert_eq!(tree[count - 1], DOMContent::from(DOMElement::new("xmp", None, vec!["a".into()])));
}
