//! Tree types for the draft markup.

use serde::{Deserialize, Serialize};

use crate::tokens::split_fragments;

/// Root of a composed draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// Free prose, including unpopulated anchors
    Text(String),

    /// `<!--START_BLOCK:…-->` / `<!--END_BLOCK:…-->`
    Marker(Marker),

    /// A populated template block
    Region(Region),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub edge: Edge,
    pub title: String,
}

impl Marker {
    pub fn start(title: impl Into<String>) -> Self {
        Self {
            edge: Edge::Start,
            title: title.into(),
        }
    }

    pub fn end(title: impl Into<String>) -> Self {
        Self {
            edge: Edge::End,
            title: title.into(),
        }
    }
}

/// A populated block. Every attribute is optional because a free-text
/// edit may have dropped any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub title: Option<String>,
    pub region_id: Option<String>,
    pub anchor: Option<String>,
    pub locked: bool,
    pub multi: bool,
    pub children: Vec<RegionChild>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionChild {
    Snippet(Snippet),
    /// Prose typed inside a block but outside any snippet
    Text(String),
}

impl Region {
    pub fn snippets(&self) -> impl Iterator<Item = &Snippet> {
        self.children.iter().filter_map(|child| match child {
            RegionChild::Snippet(snippet) => Some(snippet),
            RegionChild::Text(_) => None,
        })
    }

    pub fn snippets_mut(&mut self) -> impl Iterator<Item = &mut Snippet> {
        self.children.iter_mut().filter_map(|child| match child {
            RegionChild::Snippet(snippet) => Some(snippet),
            RegionChild::Text(_) => None,
        })
    }

    pub fn snippet(&self, label: &str) -> Option<&Snippet> {
        self.snippets().find(|s| s.label == label)
    }

    pub fn snippet_mut(&mut self, label: &str) -> Option<&mut Snippet> {
        self.snippets_mut().find(|s| s.label == label)
    }

    /// Labels in document order
    pub fn labels(&self) -> Vec<String> {
        self.snippets().map(|s| s.label.clone()).collect()
    }

    /// Remove a snippet by label, returning it if present
    pub fn remove_snippet(&mut self, label: &str) -> Option<Snippet> {
        let index = self.children.iter().position(|child| {
            matches!(child, RegionChild::Snippet(snippet) if snippet.label == label)
        })?;
        match self.children.remove(index) {
            RegionChild::Snippet(snippet) => Some(snippet),
            RegionChild::Text(_) => None,
        }
    }

    /// Markup-free text of the region, snippets separated by paragraph breaks
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        for child in &self.children {
            match child {
                RegionChild::Snippet(snippet) => parts.push(snippet.plain_text()),
                RegionChild::Text(text) => {
                    if !text.trim().is_empty() {
                        parts.push(text.trim().to_string());
                    }
                }
            }
        }
        parts.join("\n\n")
    }
}

/// The materialized instance of an option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub label: String,
    pub snippet_id: Option<u64>,
    /// Literal text captured at insertion
    pub original: String,
    pub sentences: Vec<Sentence>,
}

impl Snippet {
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (i, sentence) in self.sentences.iter().enumerate() {
            if i > 0 {
                out.push_str(if sentence.paragraph_break { "\n\n" } else { " " });
            }
            out.push_str(&sentence.text());
        }
        out
    }
}

/// Smallest reorderable unit. Fragments alternate between literal text
/// and whole placeholder tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub paragraph_break: bool,
    pub fragments: Vec<String>,
}

impl Sentence {
    pub fn new(text: &str) -> Self {
        Self {
            paragraph_break: false,
            fragments: split_fragments(text),
        }
    }

    pub fn with_break(text: &str, paragraph_break: bool) -> Self {
        Self {
            paragraph_break,
            fragments: split_fragments(text),
        }
    }

    pub fn text(&self) -> String {
        self.fragments.concat()
    }
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        for node in nodes {
            tree.push(node);
        }
        tree
    }

    /// Append a node, merging adjacent text and dropping empty text
    pub fn push(&mut self, node: Node) {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Text(text) => match self.nodes.last_mut() {
                Some(Node::Text(prev)) => prev.push_str(&text),
                _ => self.nodes.push(Node::Text(text)),
            },
            other => self.nodes.push(other),
        }
    }

    /// Re-run text merging after in-place splicing
    pub fn normalize(&mut self) {
        let nodes = std::mem::take(&mut self.nodes);
        for node in nodes {
            self.push(node);
        }
    }

    pub fn regions(&self) -> impl Iterator<Item = (usize, &Region)> {
        self.nodes.iter().enumerate().filter_map(|(i, node)| match node {
            Node::Region(region) => Some((i, region)),
            _ => None,
        })
    }

    pub fn region_at(&self, index: usize) -> Option<&Region> {
        match self.nodes.get(index) {
            Some(Node::Region(region)) => Some(region),
            _ => None,
        }
    }

    pub fn region_at_mut(&mut self, index: usize) -> Option<&mut Region> {
        match self.nodes.get_mut(index) {
            Some(Node::Region(region)) => Some(region),
            _ => None,
        }
    }

    /// Markup-free text of the whole draft
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Marker(_) => {}
                Node::Region(region) => out.push_str(&region.plain_text()),
            }
        }
        out
    }
}
