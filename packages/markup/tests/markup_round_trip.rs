//! Round-trip and recovery behaviour of the draft markup

use pitchcraft_markup::{parse, parse_with_diagnostics, serialize, Node};

#[test]
fn test_canonical_output_is_stable() {
    let source = concat!(
        "Dear [Enquiry.First_Name],\n\n",
        "<!--START_BLOCK:Costs & Budget-->",
        r#"<block title="Costs &amp; Budget" region="rgn-9" anchor="[Costs and Budget Placeholder]" multi>"#,
        r#"<snippet label="Initial Cost" snippet-id="7" original="We charge on a time basis. Budget [Amount].">"#,
        "<s>We charge on a time basis.</s><s>Budget [Amount].</s>",
        "</snippet></block>",
        "<!--END_BLOCK:Costs & Budget-->",
        "\n\nKind Regards"
    );

    let once = serialize(&parse(source));
    let twice = serialize(&parse(&once));
    assert_eq!(once, twice);
}

#[test]
fn test_markers_lost_region_survives() {
    // a free-text edit may strip the boundary comments
    let source = r#"Intro <block title="A" anchor="[A Placeholder]"><snippet label="x" original="Hi."><s>Hi.</s></snippet></block> outro"#;
    let output = parse_with_diagnostics(source);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.tree.nodes.len(), 3);
    assert!(matches!(output.tree.nodes[1], Node::Region(_)));
    assert!(!output.tree.nodes.iter().any(|n| matches!(n, Node::Marker(_))));
}

#[test]
fn test_plain_text_strips_markup() {
    let source = r#"Dear X,<block title="A"><snippet label="x" original=""><s>One.</s><s br>Two.</s></snippet></block>"#;
    assert_eq!(parse(source).plain_text(), "Dear X,One.\n\nTwo.");
}

#[test]
fn test_foreign_markup_is_preserved_as_text() {
    let source = "Hello <b>bold</b> world";
    let tree = parse(source);
    assert_eq!(tree.plain_text(), source);
    assert_eq!(serialize(&tree), "Hello &lt;b&gt;bold&lt;/b&gt; world");
}

#[test]
fn test_canonical_markup_round_trips_exactly() {
    let source = concat!(
        "Dear [Enquiry.First_Name],\n\n",
        "<!--START_BLOCK:Next Steps-->",
        r#"<block title="Next Steps" region="rgn-3" anchor="[Next Steps Placeholder]" multi>"#,
        r#"<snippet label="A" original="Call us. Then write.">"#,
        "<s>Call us.</s><s br>Then write.</s>",
        "</snippet></block>",
        "<!--END_BLOCK:Next Steps-->",
        "\n\nKind Regards,\n\n[FE]\n[Position]"
    );

    let tree = parse(source);
    let markers = tree
        .nodes
        .iter()
        .filter(|n| matches!(n, Node::Marker(_)))
        .count();
    assert_eq!(markers, 2);
    assert_eq!(serialize(&tree), source);
}
