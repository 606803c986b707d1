//! Lenient parser for draft markup
//!
//! The editing surface hands back whatever the user typed, so the
//! parser never fails. Broken structure is repaired:
//!
//! - unknown tags and lone `<` are text
//! - unclosed elements close at the next structural boundary or at EOF
//! - stray close tags are dropped
//! - text inside a snippet but outside `<s>` becomes its own sentence
//! - text inside a block but outside any snippet is kept as block text
//!
//! Every repair is reported as a [`Diagnostic`].

use std::ops::Range;

use crate::ast::{Marker, Node, Region, RegionChild, Sentence, Snippet, Tree};
use crate::lexer::{parse_attributes, tokenize, Token};
use crate::serializer::unescape;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Range<usize>,
    pub message: String,
}

impl Diagnostic {
    fn new(span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub tree: Tree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse markup, discarding diagnostics
pub fn parse(source: &str) -> Tree {
    parse_with_diagnostics(source).tree
}

pub fn parse_with_diagnostics(source: &str) -> ParseOutput {
    let mut parser = Parser::default();
    for (token, span) in tokenize(source) {
        parser.feed(token, span);
    }
    parser.finish(source.len())
}

struct OpenSentence {
    paragraph_break: bool,
    text: String,
}

#[derive(Default)]
struct Parser {
    tree: Tree,
    region: Option<Region>,
    snippet: Option<Snippet>,
    sentence: Option<OpenSentence>,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    fn feed(&mut self, token: Token<'_>, span: Range<usize>) {
        match token {
            Token::Text(raw) => self.text(&unescape(raw), span),

            Token::StartMarker(title) => {
                self.close_all(&span, "marker");
                self.tree.push(Node::Marker(Marker::start(unescape(title))));
            }

            Token::EndMarker(title) => {
                self.close_all(&span, "marker");
                self.tree.push(Node::Marker(Marker::end(unescape(title))));
            }

            Token::BlockOpen(tag) => {
                self.close_all(&span, "<block>");
                self.region = Some(region_from_tag(tag));
            }

            Token::BlockClose => {
                if self.region.is_some() {
                    self.close_region();
                } else {
                    self.diagnostics
                        .push(Diagnostic::new(span, "stray </block> dropped"));
                }
            }

            Token::SnippetOpen(tag) => {
                if self.region.is_none() {
                    self.diagnostics
                        .push(Diagnostic::new(span, "<snippet> outside a block dropped"));
                    return;
                }
                if self.snippet.is_some() {
                    self.diagnostics
                        .push(Diagnostic::new(span.clone(), "unclosed <snippet> closed"));
                    self.close_snippet();
                }
                self.snippet = Some(snippet_from_tag(tag));
            }

            Token::SnippetClose => {
                if self.snippet.is_some() {
                    self.close_snippet();
                } else {
                    self.diagnostics
                        .push(Diagnostic::new(span, "stray </snippet> dropped"));
                }
            }

            Token::SentenceOpen(tag) => {
                if self.snippet.is_none() {
                    self.diagnostics
                        .push(Diagnostic::new(span, "<s> outside a snippet dropped"));
                    return;
                }
                if self.sentence.is_some() {
                    self.diagnostics
                        .push(Diagnostic::new(span.clone(), "unclosed <s> closed"));
                    self.close_sentence();
                }
                let paragraph_break = parse_attributes(tag).iter().any(|(name, _)| name == "br");
                self.sentence = Some(OpenSentence {
                    paragraph_break,
                    text: String::new(),
                });
            }

            Token::SentenceClose => {
                if self.sentence.is_some() {
                    self.close_sentence();
                } else {
                    self.diagnostics
                        .push(Diagnostic::new(span, "stray </s> dropped"));
                }
            }
        }
    }

    fn text(&mut self, text: &str, span: Range<usize>) {
        if let Some(sentence) = &mut self.sentence {
            sentence.text.push_str(text);
            return;
        }

        if let Some(snippet) = &mut self.snippet {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                self.diagnostics
                    .push(Diagnostic::new(span, "text outside <s> kept as a sentence"));
                snippet.sentences.push(Sentence::new(trimmed));
            }
            return;
        }

        if let Some(region) = &mut self.region {
            match region.children.last_mut() {
                Some(RegionChild::Text(prev)) => prev.push_str(text),
                _ => region.children.push(RegionChild::Text(text.to_string())),
            }
            return;
        }

        self.tree.push(Node::Text(text.to_string()));
    }

    fn close_sentence(&mut self) {
        if let (Some(open), Some(snippet)) = (self.sentence.take(), self.snippet.as_mut()) {
            snippet
                .sentences
                .push(Sentence::with_break(&open.text, open.paragraph_break));
        }
    }

    fn close_snippet(&mut self) {
        self.close_sentence();
        if let (Some(snippet), Some(region)) = (self.snippet.take(), self.region.as_mut()) {
            region.children.push(RegionChild::Snippet(snippet));
        }
    }

    fn close_region(&mut self) {
        self.close_snippet();
        if let Some(region) = self.region.take() {
            self.tree.push(Node::Region(region));
        }
    }

    fn close_all(&mut self, span: &Range<usize>, at: &str) {
        if self.region.is_some() {
            self.diagnostics.push(Diagnostic::new(
                span.clone(),
                format!("unclosed <block> closed at {}", at),
            ));
            self.close_region();
        }
    }

    fn finish(mut self, len: usize) -> ParseOutput {
        self.close_all(&(len..len), "end of input");
        ParseOutput {
            tree: self.tree,
            diagnostics: self.diagnostics,
        }
    }
}

fn region_from_tag(tag: &str) -> Region {
    let mut region = Region::default();
    for (name, value) in parse_attributes(tag) {
        match (name.as_str(), value) {
            ("title", Some(v)) => region.title = Some(v),
            ("region", Some(v)) => region.region_id = Some(v),
            ("anchor", Some(v)) => region.anchor = Some(v),
            ("locked", _) => region.locked = true,
            ("multi", _) => region.multi = true,
            _ => {}
        }
    }
    region
}

fn snippet_from_tag(tag: &str) -> Snippet {
    let mut snippet = Snippet {
        label: String::new(),
        snippet_id: None,
        original: String::new(),
        sentences: Vec::new(),
    };
    for (name, value) in parse_attributes(tag) {
        match (name.as_str(), value) {
            ("label", Some(v)) => snippet.label = v,
            ("original", Some(v)) => snippet.original = v,
            ("snippet-id", Some(v)) => snippet.snippet_id = v.parse().ok(),
            _ => {}
        }
    }
    snippet
}
