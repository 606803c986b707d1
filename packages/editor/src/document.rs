//! # Document Handle
//!
//! The live draft: one marked-up [`Tree`] plus a version counter.
//!
//! A block is found in the draft by a fallback chain, so a region whose
//! boundary markers were damaged by free-text editing is still usable:
//!
//! ```text
//! boundary markers → stable region id → anchor attribute
//!         ↓ (no region at all)
//!   anchor text in the prose  → block is unpopulated
//!         ↓
//!   BlockNotFound
//! ```

use pitchcraft_common::region_id;
use pitchcraft_markup::{parse_with_diagnostics, serialize, Edge, Marker, Node, Region, Tree};

use crate::catalog::{Catalog, TemplateBlock};
use crate::EditorError;

pub const SNAPSHOT_HEADER: &str = "#pitchcraft-snapshot v1\n";

const GREETING: &str = "Dear [Enquiry.First_Name],";
const SIGN_OFF: &str = "Kind Regards,\n\n[FE]\n[Position]";

/// Serialized form of a whole draft, as stored on the undo stack
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot(String);

impl Snapshot {
    fn of(tree: &Tree) -> Self {
        Self(format!("{}{}", SNAPSHOT_HEADER, serialize(tree)))
    }

    /// Accept a previously serialized snapshot blob
    pub fn parse(blob: impl Into<String>) -> Result<Self, EditorError> {
        let blob = blob.into();
        if !blob.starts_with(SNAPSHOT_HEADER) {
            return Err(EditorError::InvalidSnapshot(
                "missing snapshot header".to_string(),
            ));
        }
        Ok(Self(blob))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn markup(&self) -> &str {
        &self.0[SNAPSHOT_HEADER.len()..]
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Where a block currently lives in the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Populated; `index` is the region's node index
    Region { index: usize, via: Lookup },
    /// Unpopulated; the anchor starts at byte `offset` of text node `node`
    Anchor { node: usize, offset: usize },
}

/// Which step of the fallback chain found a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Markers,
    RegionId,
    Anchor,
}

/// Editable draft
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Current version number (increments on each change)
    pub version: u64,

    tree: Tree,
}

impl Document {
    pub fn from_tree(tree: Tree) -> Self {
        Self { version: 0, tree }
    }

    /// Parse markup leniently; structural damage is logged, not fatal
    pub fn from_markup(markup: &str) -> Self {
        let output = parse_with_diagnostics(markup);
        for diagnostic in &output.diagnostics {
            tracing::debug!(
                start = diagnostic.span.start,
                end = diagnostic.span.end,
                "Repaired markup: {}",
                diagnostic.message
            );
        }
        Self::from_tree(output.tree)
    }

    /// The base letter: greeting, every block anchor, sign-off
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut parts = vec![GREETING];
        parts.extend(catalog.anchors());
        parts.push(SIGN_OFF);
        Self::from_tree(Tree::new(vec![Node::Text(parts.join("\n\n"))]))
    }

    pub fn restore(snapshot: &Snapshot) -> Self {
        Self::from_markup(snapshot.markup())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.tree)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn markup(&self) -> String {
        serialize(&self.tree)
    }

    pub fn plain_text(&self) -> String {
        self.tree.plain_text()
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn locate(&self, block: &TemplateBlock) -> Option<Location> {
        if let Some(index) = self.region_by_markers(&block.title) {
            return Some(Location::Region {
                index,
                via: Lookup::Markers,
            });
        }

        let id = region_id(&block.title);
        if let Some((index, _)) = self
            .tree
            .regions()
            .find(|(_, r)| r.region_id.as_deref() == Some(id.as_str()))
        {
            return Some(Location::Region {
                index,
                via: Lookup::RegionId,
            });
        }

        if let Some((index, _)) = self
            .tree
            .regions()
            .find(|(_, r)| r.anchor.as_deref() == Some(block.anchor.as_str()))
        {
            return Some(Location::Region {
                index,
                via: Lookup::Anchor,
            });
        }

        self.tree
            .nodes
            .iter()
            .enumerate()
            .find_map(|(node, n)| match n {
                Node::Text(text) => text
                    .find(&block.anchor)
                    .map(|offset| Location::Anchor { node, offset }),
                _ => None,
            })
    }

    /// The populated region for `block`, if any
    pub fn region(&self, block: &TemplateBlock) -> Option<(usize, &Region)> {
        match self.locate(block)? {
            Location::Region { index, .. } => self.tree.region_at(index).map(|r| (index, r)),
            Location::Anchor { .. } => None,
        }
    }

    /// First region between a start and end marker for `title`
    fn region_by_markers(&self, title: &str) -> Option<usize> {
        let nodes = &self.tree.nodes;
        let start = nodes.iter().position(|node| {
            matches!(node, Node::Marker(m) if m.edge == Edge::Start && m.title == title)
        })?;

        let mut found = None;
        for (i, node) in nodes.iter().enumerate().skip(start + 1) {
            match node {
                Node::Region(_) if found.is_none() => found = Some(i),
                Node::Marker(m) if m.edge == Edge::End && m.title == title => return found,
                _ => {}
            }
        }
        None
    }

    /// Replace the anchor at `node`/`offset` with a bracketed region.
    /// Returns the new region's node index.
    pub(crate) fn populate(
        &mut self,
        node: usize,
        offset: usize,
        block: &TemplateBlock,
        region: Region,
    ) -> Option<usize> {
        let Some(Node::Text(text)) = self.tree.nodes.get(node) else {
            return None;
        };
        let end = offset + block.anchor.len();
        let before = text.get(..offset)?.to_string();
        let after = text.get(end..)?.to_string();

        let mut replacement = Vec::with_capacity(5);
        if !before.is_empty() {
            replacement.push(Node::Text(before));
        }
        replacement.push(Node::Marker(Marker::start(&block.title)));
        let index = node + replacement.len();
        replacement.push(Node::Region(region));
        replacement.push(Node::Marker(Marker::end(&block.title)));
        if !after.is_empty() {
            replacement.push(Node::Text(after));
        }

        self.tree.nodes.splice(node..=node, replacement);
        Some(index)
    }

    /// Swap the region at `index` and every marker for its block back to
    /// the bare anchor
    pub(crate) fn clear_region(&mut self, index: usize, block: &TemplateBlock) {
        let nodes = std::mem::take(&mut self.tree.nodes);
        let mut rebuilt = Vec::with_capacity(nodes.len());
        for (i, node) in nodes.into_iter().enumerate() {
            match node {
                _ if i == index => rebuilt.push(Node::Text(block.anchor.clone())),
                Node::Marker(ref m) if m.title == block.title => {}
                other => rebuilt.push(other),
            }
        }
        self.tree = Tree::new(rebuilt);
    }

    /// Bracket the region at `index` with exactly one pair of markers for
    /// `title`, dropping strays. Returns the region's new index.
    pub(crate) fn ensure_markers(&mut self, index: usize, title: &str) -> usize {
        let nodes = &self.tree.nodes;
        let bracketed = index > 0
            && matches!(nodes.get(index - 1), Some(Node::Marker(m)) if m.edge == Edge::Start && m.title == title)
            && matches!(nodes.get(index + 1), Some(Node::Marker(m)) if m.edge == Edge::End && m.title == title);
        let strays = nodes
            .iter()
            .filter(|n| matches!(n, Node::Marker(m) if m.title == title))
            .count();
        if bracketed && strays == 2 {
            return index;
        }

        let nodes = std::mem::take(&mut self.tree.nodes);
        let mut rebuilt = Vec::with_capacity(nodes.len() + 2);
        for (i, node) in nodes.into_iter().enumerate() {
            match node {
                Node::Marker(ref m) if m.title == title => {}
                region if i == index => {
                    rebuilt.push(Node::Marker(Marker::start(title)));
                    rebuilt.push(region);
                    rebuilt.push(Node::Marker(Marker::end(title)));
                }
                other => rebuilt.push(other),
            }
        }
        self.tree = Tree::new(rebuilt);
        self.region_by_markers(title).unwrap_or(index)
    }
}
