//! # Edit Detection
//!
//! A snippet is edited when its current text, ignoring markup and
//! whitespace differences, no longer matches the text captured when it
//! was inserted.

use std::collections::BTreeMap;

use pitchcraft_common::{walk_region, Visitor};
use pitchcraft_markup::{Edge, Marker, Region, RegionChild, Snippet};
use serde::{Deserialize, Serialize};

use crate::document::Document;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditState {
    pub edited_blocks: BTreeMap<String, bool>,
    pub edited_snippets: BTreeMap<String, BTreeMap<String, bool>>,
}

impl EditState {
    pub fn is_block_edited(&self, title: &str) -> bool {
        self.edited_blocks.get(title).copied().unwrap_or(false)
    }

    pub fn is_snippet_edited(&self, title: &str, label: &str) -> bool {
        self.edited_snippets
            .get(title)
            .and_then(|snippets| snippets.get(label))
            .copied()
            .unwrap_or(false)
    }
}

/// Byte range of `current` that differs from the original text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRange {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Collapse whitespace runs and trim
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_snippet_edited(snippet: &Snippet) -> bool {
    normalize_text(&snippet.plain_text()) != normalize_text(&snippet.original)
}

/// Per-snippet edit flags for a region, plus whether the block as a
/// whole counts as edited (any edited snippet, or prose typed inside the
/// block outside every snippet)
pub fn region_edits(region: &Region) -> (bool, BTreeMap<String, bool>) {
    let snippets: BTreeMap<String, bool> = region
        .snippets()
        .map(|s| (s.label.clone(), is_snippet_edited(s)))
        .collect();
    let stray_text = region
        .children
        .iter()
        .any(|child| matches!(child, RegionChild::Text(text) if !text.trim().is_empty()));
    (stray_text || snippets.values().any(|edited| *edited), snippets)
}

/// Scan the whole draft. Block titles come from each region's own
/// `title` attribute, falling back to the enclosing boundary markers.
pub fn compute_edited_state(document: &Document) -> EditState {
    let mut collector = EditCollector::default();
    collector.visit_tree(document.tree());
    collector.state
}

#[derive(Default)]
struct EditCollector {
    open: Vec<String>,
    state: EditState,
}

impl Visitor for EditCollector {
    fn visit_marker(&mut self, marker: &Marker) {
        match marker.edge {
            Edge::Start => self.open.push(marker.title.clone()),
            Edge::End => {
                if let Some(pos) = self.open.iter().rposition(|t| *t == marker.title) {
                    self.open.remove(pos);
                }
            }
        }
    }

    fn visit_region(&mut self, region: &Region) {
        let Some(title) = region.title.clone().or_else(|| self.open.last().cloned()) else {
            walk_region(self, region);
            return;
        };
        let (edited, snippets) = region_edits(region);
        *self.state.edited_blocks.entry(title.clone()).or_default() |= edited;
        self.state
            .edited_snippets
            .entry(title)
            .or_default()
            .extend(snippets);
    }
}

/// Greedy word diff of `current` against `original`.
///
/// Both word lists are walked in lockstep. At a mismatch both sides
/// advance together until two words match again, and the current words
/// passed over form one range. Current words left over once the original
/// runs out form a final range; words only in the original are not
/// reported.
pub fn diff_words(current: &str, original: &str) -> Vec<EditRange> {
    let cur = words(current);
    let orig = words(original);
    let (mut i, mut j) = (0, 0);
    let mut ranges = Vec::new();

    while i < cur.len() && j < orig.len() {
        if cur[i].1 == orig[j].1 {
            i += 1;
            j += 1;
            continue;
        }
        let first = i;
        while i < cur.len() && j < orig.len() && cur[i].1 != orig[j].1 {
            i += 1;
            j += 1;
        }
        ranges.push(word_range(current, &cur[first..i]));
    }
    if i < cur.len() {
        ranges.push(word_range(current, &cur[i..]));
    }
    ranges
}

fn word_range(text: &str, span: &[(usize, &str)]) -> EditRange {
    let start = span[0].0;
    let (offset, word) = span[span.len() - 1];
    let end = offset + word.len();
    EditRange {
        start,
        end,
        text: text[start..end].to_string(),
    }
}

/// Edited ranges of a snippet's current plain text
pub fn snippet_edit_ranges(snippet: &Snippet) -> Vec<EditRange> {
    diff_words(&snippet.plain_text(), &snippet.original)
}

fn words(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                out.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}
