use std::fmt::Write;

use crate::ast::{Edge, Node, Region, RegionChild, Sentence, Snippet, Tree};

/// Serialize a tree to canonical markup.
///
/// Attribute order and spacing are fixed, so two equal trees always
/// produce byte-identical output and `serialize(parse(serialize(t)))`
/// equals `serialize(t)`.
pub fn serialize(tree: &Tree) -> String {
    let mut out = String::new();
    for node in &tree.nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Marker(marker) => {
            let edge = match marker.edge {
                Edge::Start => "START_BLOCK",
                Edge::End => "END_BLOCK",
            };
            let _ = write!(out, "<!--{}:{}-->", edge, escape_attr(&marker.title));
        }
        Node::Region(region) => write_region(region, out),
    }
}

/// Serialize one region on its own, as handed to the rendering layer in patches
pub fn serialize_region(region: &Region) -> String {
    let mut out = String::new();
    write_region(region, &mut out);
    out
}

fn write_region(region: &Region, out: &mut String) {
    out.push_str("<block");
    if let Some(title) = &region.title {
        let _ = write!(out, " title=\"{}\"", escape_attr(title));
    }
    if let Some(id) = &region.region_id {
        let _ = write!(out, " region=\"{}\"", escape_attr(id));
    }
    if let Some(anchor) = &region.anchor {
        let _ = write!(out, " anchor=\"{}\"", escape_attr(anchor));
    }
    if region.multi {
        out.push_str(" multi");
    }
    if region.locked {
        out.push_str(" locked");
    }
    out.push('>');

    for child in &region.children {
        match child {
            RegionChild::Snippet(snippet) => write_snippet(snippet, out),
            RegionChild::Text(text) => out.push_str(&escape_text(text)),
        }
    }
    out.push_str("</block>");
}

fn write_snippet(snippet: &Snippet, out: &mut String) {
    let _ = write!(out, "<snippet label=\"{}\"", escape_attr(&snippet.label));
    if let Some(id) = snippet.snippet_id {
        let _ = write!(out, " snippet-id=\"{}\"", id);
    }
    let _ = write!(out, " original=\"{}\">", escape_attr(&snippet.original));
    for sentence in &snippet.sentences {
        write_sentence(sentence, out);
    }
    out.push_str("</snippet>");
}

fn write_sentence(sentence: &Sentence, out: &mut String) {
    out.push_str(if sentence.paragraph_break { "<s br>" } else { "<s>" });
    out.push_str(&escape_text(&sentence.text()));
    out.push_str("</s>");
}

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

pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Marker;
    use crate::parser::parse;

    fn sample_tree() -> Tree {
        let snippet = Snippet {
            label: "Cost/Benefit \"Analysis\"".to_string(),
            snippet_id: Some(42),
            original: "A < B & C.\n\nNext.".to_string(),
            sentences: vec![
                Sentence::new("A < B & C."),
                Sentence::with_break("Next [Enquiry.First_Name].", true),
            ],
        };
        Tree::new(vec![
            Node::Text("Dear [Enquiry.First_Name],\n\n".into()),
            Node::Marker(Marker::start("Risk Assessment")),
            Node::Region(Region {
                title: Some("Risk Assessment".into()),
                region_id: Some("rgn-1".into()),
                anchor: Some("[Risk Assessment Placeholder]".into()),
                locked: true,
                multi: true,
                children: vec![RegionChild::Snippet(snippet)],
            }),
            Node::Marker(Marker::end("Risk Assessment")),
            Node::Text("\n\nKind Regards".into()),
        ])
    }

    #[test]
    fn test_serialize_parse_is_lossless() {
        let tree = sample_tree();
        let markup = serialize(&tree);
        let reparsed = parse(&markup);
        assert_eq!(reparsed, tree);
        assert_eq!(serialize(&reparsed), markup);
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(unescape("&amp;lt;"), "&lt;");
        assert_eq!(unescape(&escape_attr("<\"&'>")), "<\"&'>");
    }

    #[test]
    fn test_flags_serialized_in_fixed_order() {
        let markup = serialize(&sample_tree());
        assert!(markup.contains(
            r#"<block title="Risk Assessment" region="rgn-1" anchor="[Risk Assessment Placeholder]" multi locked>"#
        ));
        assert!(markup.contains(r#"snippet-id="42""#));
        assert!(markup.contains("<s br>Next [Enquiry.First_Name].</s>"));
    }
}
