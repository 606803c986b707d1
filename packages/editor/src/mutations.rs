//! # Block Operations
//!
//! Structural edits expressed as values. Each [`BlockOp`] is a pure
//! reducer: it reads the current [`Document`] and yields a new one plus
//! the region patches a view needs to re-render, or a [`MutationError`]
//! with the input untouched.
//!
//! ## Semantics
//!
//! ### InsertOption
//! - Unpopulated block: the anchor is replaced by a bracketed region
//! - Populated single-select block: content is replaced only when
//!   `replace` is set, otherwise [`MutationError::ReplaceRequired`]
//! - Populated multi-select block: with `replace` the region is
//!   rebuilt, without it new options are appended; options already
//!   present are left alone
//!
//! ### RemoveOption
//! - Removing the last snippet clears the block
//!
//! ### Locks
//! - Every operation except ToggleLock fails with
//!   [`MutationError::Locked`] on a locked block

use pitchcraft_common::region_id;
use pitchcraft_markup::{serialize_region, split_sentences, Region, RegionChild, Snippet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, TemplateBlock, TemplateOption};
use crate::context::Context;
use crate::document::{Document, Location};
use crate::substitution::{expand, ExpandOptions};

/// One or many option labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionChoice {
    One(String),
    Many(Vec<String>),
}

impl OptionChoice {
    pub fn labels(&self) -> Vec<&str> {
        match self {
            OptionChoice::One(label) => vec![label.as_str()],
            OptionChoice::Many(labels) => labels.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for OptionChoice {
    fn from(label: &str) -> Self {
        OptionChoice::One(label.to_string())
    }
}

impl From<String> for OptionChoice {
    fn from(label: String) -> Self {
        OptionChoice::One(label)
    }
}

impl From<Vec<String>> for OptionChoice {
    fn from(labels: Vec<String>) -> Self {
        OptionChoice::Many(labels)
    }
}

impl From<&[&str]> for OptionChoice {
    fn from(labels: &[&str]) -> Self {
        OptionChoice::Many(labels.iter().map(|l| l.to_string()).collect())
    }
}

/// A snippet addressed by block title and option label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetRef {
    pub block: String,
    pub label: String,
}

impl SnippetRef {
    pub fn new(block: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            label: label.into(),
        }
    }
}

/// Structural operations on a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BlockOp {
    InsertOption {
        block: String,
        options: OptionChoice,
        #[serde(default = "default_replace")]
        replace: bool,
    },

    AppendOption {
        block: String,
        option: String,
    },

    RemoveOption {
        block: String,
        option: String,
    },

    ClearBlock {
        block: String,
    },

    ToggleLock {
        block: String,
    },

    ReorderSentence {
        snippet: SnippetRef,
        from: usize,
        to: usize,
    },

    DeleteSentence {
        snippet: SnippetRef,
        index: usize,
    },
}

fn default_replace() -> bool {
    true
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Unknown option '{option}' for block '{block}'")]
    UnknownOption { block: String, option: String },

    #[error("Block not found in draft: {0}")]
    BlockNotFound(String),

    #[error("Block '{0}' already has content; replace it explicitly")]
    ReplaceRequired(String),

    #[error("Block '{0}' is not multi-select")]
    NotMultiSelect(String),

    #[error("No snippet '{label}' in block '{block}'")]
    SnippetNotFound { block: String, label: String },

    #[error("Sentence index {index} out of range (snippet has {len})")]
    SentenceOutOfRange { index: usize, len: usize },

    #[error("Block '{0}' is locked")]
    Locked(String),
}

/// Re-render instruction for one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Patch {
    /// Block is populated; `markup` is the whole region
    Region { title: String, markup: String },
    /// Block is back to its bare anchor
    Anchor { title: String, anchor: String },
}

/// Output of a successful reduction
#[derive(Debug, Clone)]
pub struct Reduced {
    pub document: Document,
    pub patches: Vec<Patch>,
}

impl BlockOp {
    /// Title of the block this operation targets
    pub fn block(&self) -> &str {
        match self {
            BlockOp::InsertOption { block, .. }
            | BlockOp::AppendOption { block, .. }
            | BlockOp::RemoveOption { block, .. }
            | BlockOp::ClearBlock { block }
            | BlockOp::ToggleLock { block } => block,
            BlockOp::ReorderSentence { snippet, .. } | BlockOp::DeleteSentence { snippet, .. } => {
                &snippet.block
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockOp::InsertOption { .. } => "insert_option",
            BlockOp::AppendOption { .. } => "append_option",
            BlockOp::RemoveOption { .. } => "remove_option",
            BlockOp::ClearBlock { .. } => "clear_block",
            BlockOp::ToggleLock { .. } => "toggle_lock",
            BlockOp::ReorderSentence { .. } => "reorder_sentence",
            BlockOp::DeleteSentence { .. } => "delete_sentence",
        }
    }

    /// Produce the next document. `context` supplies values already known
    /// at insertion time; tokens it cannot resolve stay literal.
    pub fn reduce(
        &self,
        document: &Document,
        catalog: &Catalog,
        context: Option<&Context>,
    ) -> Result<Reduced, MutationError> {
        let block = catalog
            .block(self.block())
            .ok_or_else(|| MutationError::UnknownBlock(self.block().to_string()))?;

        let mut next = document.clone();
        match self {
            BlockOp::InsertOption {
                options, replace, ..
            } => Self::apply_insert(&mut next, block, &options.labels(), *replace, context)?,

            BlockOp::AppendOption { option, .. } => {
                if !block.is_multi_select {
                    return Err(MutationError::NotMultiSelect(block.title.clone()));
                }
                Self::apply_insert(&mut next, block, &[option.as_str()], false, context)?
            }

            BlockOp::RemoveOption { option, .. } => Self::apply_remove(&mut next, block, option)?,

            BlockOp::ClearBlock { .. } => Self::apply_clear(&mut next, block)?,

            BlockOp::ToggleLock { .. } => Self::apply_toggle_lock(&mut next, block)?,

            BlockOp::ReorderSentence { snippet, from, to } => {
                Self::with_snippet(&mut next, block, &snippet.label, |s| {
                    let len = s.sentences.len();
                    for index in [*from, *to] {
                        if index >= len {
                            return Err(MutationError::SentenceOutOfRange { index, len });
                        }
                    }
                    let sentence = s.sentences.remove(*from);
                    s.sentences.insert(*to, sentence);
                    clear_leading_break(s);
                    Ok(())
                })?
            }

            BlockOp::DeleteSentence { snippet, index } => {
                Self::with_snippet(&mut next, block, &snippet.label, |s| {
                    let len = s.sentences.len();
                    if *index >= len {
                        return Err(MutationError::SentenceOutOfRange { index: *index, len });
                    }
                    s.sentences.remove(*index);
                    clear_leading_break(s);
                    Ok(())
                })?
            }
        }

        let patch = patch_for(&next, block);
        Ok(Reduced {
            document: next,
            patches: vec![patch],
        })
    }

    fn apply_insert(
        doc: &mut Document,
        block: &TemplateBlock,
        labels: &[&str],
        replace: bool,
        context: Option<&Context>,
    ) -> Result<(), MutationError> {
        if labels.is_empty() {
            return Err(MutationError::UnknownOption {
                block: block.title.clone(),
                option: String::new(),
            });
        }
        if labels.len() > 1 && !block.is_multi_select {
            return Err(MutationError::NotMultiSelect(block.title.clone()));
        }
        let options = labels
            .iter()
            .map(|label| {
                block.option(label).ok_or_else(|| MutationError::UnknownOption {
                    block: block.title.clone(),
                    option: label.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match doc.locate(block) {
            None => Err(MutationError::BlockNotFound(block.title.clone())),

            Some(Location::Anchor { node, offset }) => {
                let mut region = Region::default();
                stamp_region(&mut region, block);
                region.children = options
                    .iter()
                    .map(|o| RegionChild::Snippet(render_snippet(o, context)))
                    .collect();
                doc.populate(node, offset, block, region)
                    .map(|_| ())
                    .ok_or_else(|| MutationError::BlockNotFound(block.title.clone()))
            }

            Some(Location::Region { index, .. }) => {
                let index = doc.ensure_markers(index, &block.title);
                let region = region_mut(doc, index, block)?;
                if region.locked {
                    return Err(MutationError::Locked(block.title.clone()));
                }

                let has_content = region.snippets().next().is_some();
                if replace || !has_content {
                    region.children = options
                        .iter()
                        .map(|o| RegionChild::Snippet(render_snippet(o, context)))
                        .collect();
                } else if block.is_multi_select {
                    for option in options {
                        if region.snippet(&option.label).is_none() {
                            region
                                .children
                                .push(RegionChild::Snippet(render_snippet(option, context)));
                        }
                    }
                } else {
                    return Err(MutationError::ReplaceRequired(block.title.clone()));
                }
                stamp_region(region, block);
                Ok(())
            }
        }
    }

    fn apply_remove(doc: &mut Document, block: &TemplateBlock, label: &str) -> Result<(), MutationError> {
        let index = populated_index(doc, block)?;
        let index = doc.ensure_markers(index, &block.title);
        let region = region_mut(doc, index, block)?;
        if region.locked {
            return Err(MutationError::Locked(block.title.clone()));
        }
        if region.remove_snippet(label).is_none() {
            return Err(MutationError::SnippetNotFound {
                block: block.title.clone(),
                label: label.to_string(),
            });
        }
        if region.snippets().next().is_none() {
            doc.clear_region(index, block);
        }
        Ok(())
    }

    fn apply_clear(doc: &mut Document, block: &TemplateBlock) -> Result<(), MutationError> {
        match doc.locate(block) {
            None => Err(MutationError::BlockNotFound(block.title.clone())),
            Some(Location::Anchor { .. }) => Ok(()),
            Some(Location::Region { index, .. }) => {
                if doc.tree().region_at(index).is_some_and(|r| r.locked) {
                    return Err(MutationError::Locked(block.title.clone()));
                }
                doc.clear_region(index, block);
                Ok(())
            }
        }
    }

    fn apply_toggle_lock(doc: &mut Document, block: &TemplateBlock) -> Result<(), MutationError> {
        let index = populated_index(doc, block)?;
        let index = doc.ensure_markers(index, &block.title);
        let region = region_mut(doc, index, block)?;
        region.locked = !region.locked;
        stamp_region(region, block);
        Ok(())
    }

    fn with_snippet(
        doc: &mut Document,
        block: &TemplateBlock,
        label: &str,
        edit: impl FnOnce(&mut Snippet) -> Result<(), MutationError>,
    ) -> Result<(), MutationError> {
        let index = populated_index(doc, block)?;
        let index = doc.ensure_markers(index, &block.title);
        let region = region_mut(doc, index, block)?;
        if region.locked {
            return Err(MutationError::Locked(block.title.clone()));
        }
        let snippet = region
            .snippet_mut(label)
            .ok_or_else(|| MutationError::SnippetNotFound {
                block: block.title.clone(),
                label: label.to_string(),
            })?;
        edit(snippet)
    }
}

fn populated_index(doc: &Document, block: &TemplateBlock) -> Result<usize, MutationError> {
    match doc.locate(block) {
        Some(Location::Region { index, .. }) => Ok(index),
        _ => Err(MutationError::BlockNotFound(block.title.clone())),
    }
}

fn region_mut<'a>(
    doc: &'a mut Document,
    index: usize,
    block: &TemplateBlock,
) -> Result<&'a mut Region, MutationError> {
    doc.tree_mut()
        .region_at_mut(index)
        .ok_or_else(|| MutationError::BlockNotFound(block.title.clone()))
}

/// Write the block's identifying attributes onto a region
fn stamp_region(region: &mut Region, block: &TemplateBlock) {
    region.title = Some(block.title.clone());
    region.region_id = Some(region_id(&block.title));
    region.anchor = Some(block.anchor.clone());
    region.multi = block.is_multi_select;
}

/// Materialize an option: literal text with known values filled in,
/// split into sentences, with the inserted text kept as the baseline
/// for edit detection
pub fn render_snippet(option: &TemplateOption, context: Option<&Context>) -> Snippet {
    let text = clean_preview(&option.preview_text);
    let text = match context {
        Some(ctx) => expand(&text, ctx, ExpandOptions::default()),
        None => text,
    };
    Snippet {
        label: option.label.clone(),
        snippet_id: option.snippet_id,
        sentences: split_sentences(&text),
        original: text,
    }
}

/// A snippet never opens with a paragraph break
fn clear_leading_break(snippet: &mut Snippet) {
    if let Some(first) = snippet.sentences.first_mut() {
        first.paragraph_break = false;
    }
}

/// Trim each line of catalog text and the text as a whole
fn clean_preview(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn patch_for(doc: &Document, block: &TemplateBlock) -> Patch {
    match doc.region(block) {
        Some((_, region)) => Patch::Region {
            title: block.title.clone(),
            markup: serialize_region(region),
        },
        None => Patch::Anchor {
            title: block.title.clone(),
            anchor: block.anchor.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_json(
            "production",
            r#"[
                { "title": "Risk Assessment", "anchor": "[Risk Assessment Placeholder]",
                  "options": [
                    { "label": "Low", "previewText": "This matter presents low risk." },
                    { "label": "High", "previewText": "Significant risk. Review needed." },
                    { "label": "Phased", "previewText": "First stage.\n\nSecond stage." }
                  ] },
                { "title": "Next Steps", "anchor": "[Next Steps Placeholder]", "isMultiSelect": true,
                  "options": [
                    { "label": "Call", "previewText": "We will call [Enquiry.First_Name]." },
                    { "label": "Docs", "previewText": "Send documents." }
                  ] }
            ]"#,
        )
        .unwrap()
    }

    fn insert(block: &str, label: &str, replace: bool) -> BlockOp {
        BlockOp::InsertOption {
            block: block.into(),
            options: label.into(),
            replace,
        }
    }

    fn run(doc: &Document, op: BlockOp) -> Result<Document, MutationError> {
        op.reduce(doc, &catalog(), None).map(|r| r.document)
    }

    #[test]
    fn test_insert_replaces_anchor() {
        let doc = Document::from_catalog(&catalog());
        let reduced = insert("Risk Assessment", "Low", true)
            .reduce(&doc, &catalog(), None)
            .unwrap();
        let markup = reduced.document.markup();
        assert!(!reduced.document.plain_text().contains("[Risk Assessment Placeholder]"));
        assert!(!reduced
            .document
            .tree()
            .nodes
            .iter()
            .any(|n| matches!(n, pitchcraft_markup::Node::Text(t) if t.contains("[Risk Assessment Placeholder]"))));
        assert!(markup.contains("<!--START_BLOCK:Risk Assessment-->"));
        assert!(matches!(&reduced.patches[0], Patch::Region { title, .. } if title == "Risk Assessment"));
        // reducer is pure
        assert!(doc.markup().contains("[Risk Assessment Placeholder]"));
    }

    #[test]
    fn test_single_select_requires_replace() {
        let doc = run(&Document::from_catalog(&catalog()), insert("Risk Assessment", "Low", true)).unwrap();
        assert_eq!(
            run(&doc, insert("Risk Assessment", "High", false)).unwrap_err(),
            MutationError::ReplaceRequired("Risk Assessment".into())
        );
        let doc = run(&doc, insert("Risk Assessment", "High", true)).unwrap();
        let (_, region) = doc.region(catalog().block("Risk Assessment").unwrap()).unwrap();
        assert_eq!(region.labels(), vec!["High".to_string()]);
    }

    #[test]
    fn test_multi_select_append_and_remove() {
        let cat = catalog();
        let block = cat.block("Next Steps").unwrap();
        let doc = run(&Document::from_catalog(&cat), insert("Next Steps", "Call", true)).unwrap();
        let op = BlockOp::AppendOption {
            block: "Next Steps".into(),
            option: "Docs".into(),
        };
        let doc = run(&doc, op.clone()).unwrap();
        // appending again is a no-op
        assert_eq!(run(&doc, op).unwrap().markup(), doc.markup());
        assert_eq!(doc.region(block).unwrap().1.labels(), vec!["Call", "Docs"]);

        let remove = |doc: &Document, label: &str| {
            run(
                doc,
                BlockOp::RemoveOption {
                    block: "Next Steps".into(),
                    option: label.into(),
                },
            )
        };
        let doc = remove(&doc, "Call").unwrap();
        let doc = remove(&doc, "Docs").unwrap();
        assert!(doc.markup().contains("[Next Steps Placeholder]"));
        assert!(!doc.markup().contains("START_BLOCK:Next Steps"));
    }

    #[test]
    fn test_append_on_single_select_rejected() {
        let doc = Document::from_catalog(&catalog());
        let op = BlockOp::AppendOption {
            block: "Risk Assessment".into(),
            option: "Low".into(),
        };
        assert_eq!(
            run(&doc, op).unwrap_err(),
            MutationError::NotMultiSelect("Risk Assessment".into())
        );
    }

    #[test]
    fn test_locked_block_rejects_edits() {
        let doc = run(&Document::from_catalog(&catalog()), insert("Risk Assessment", "Low", true)).unwrap();
        let doc = run(&doc, BlockOp::ToggleLock { block: "Risk Assessment".into() }).unwrap();
        assert_eq!(
            run(&doc, BlockOp::ClearBlock { block: "Risk Assessment".into() }).unwrap_err(),
            MutationError::Locked("Risk Assessment".into())
        );
        let doc = run(&doc, BlockOp::ToggleLock { block: "Risk Assessment".into() }).unwrap();
        assert!(run(&doc, BlockOp::ClearBlock { block: "Risk Assessment".into() }).is_ok());
    }

    #[test]
    fn test_toggle_lock_needs_region() {
        let doc = Document::from_catalog(&catalog());
        assert_eq!(
            run(&doc, BlockOp::ToggleLock { block: "Risk Assessment".into() }).unwrap_err(),
            MutationError::BlockNotFound("Risk Assessment".into())
        );
    }

    #[test]
    fn test_sentence_ops() {
        let doc = run(&Document::from_catalog(&catalog()), insert("Risk Assessment", "High", true)).unwrap();
        let snippet = SnippetRef::new("Risk Assessment", "High");
        let doc = run(
            &doc,
            BlockOp::ReorderSentence {
                snippet: snippet.clone(),
                from: 1,
                to: 0,
            },
        )
        .unwrap();
        let block = catalog().block("Risk Assessment").cloned().unwrap();
        let text = doc.region(&block).unwrap().1.plain_text();
        assert_eq!(text, "Review needed. Significant risk.");

        assert_eq!(
            run(
                &doc,
                BlockOp::DeleteSentence {
                    snippet: snippet.clone(),
                    index: 5
                }
            )
            .unwrap_err(),
            MutationError::SentenceOutOfRange { index: 5, len: 2 }
        );
        let doc = run(&doc, BlockOp::DeleteSentence { snippet, index: 0 }).unwrap();
        assert_eq!(doc.region(&block).unwrap().1.plain_text(), "Significant risk.");
    }

    #[test]
    fn test_reorder_moves_paragraph_break_off_the_front() {
        let doc = run(&Document::from_catalog(&catalog()), insert("Risk Assessment", "Phased", true)).unwrap();
        let block = catalog().block("Risk Assessment").cloned().unwrap();
        let before = doc.region(&block).unwrap().1.snippet("Phased").unwrap().clone();
        assert!(before.sentences[1].paragraph_break);

        let doc = run(
            &doc,
            BlockOp::ReorderSentence {
                snippet: SnippetRef::new("Risk Assessment", "Phased"),
                from: 1,
                to: 0,
            },
        )
        .unwrap();
        let (_, region) = doc.region(&block).unwrap();
        let after = region.snippet("Phased").unwrap();
        assert_eq!(after.sentences[0].text(), "Second stage.");
        assert!(!after.sentences[0].paragraph_break);
        assert!(!serialize_region(region).contains("<s br>"));
    }

    #[test]
    fn test_insert_expands_known_values_only() {
        let ctx = Context::new().with_field("Enquiry.First_Name", "Jo");
        let doc = Document::from_catalog(&catalog());
        let with_ctx = insert("Next Steps", "Call", true)
            .reduce(&doc, &catalog(), Some(&ctx))
            .unwrap()
            .document;
        assert!(with_ctx.plain_text().contains("We will call Jo."));
        let without = run(&doc, insert("Next Steps", "Call", true)).unwrap();
        assert!(without.plain_text().contains("We will call [Enquiry.First_Name]."));
    }

    #[test]
    fn test_unknown_block_and_option() {
        let doc = Document::from_catalog(&catalog());
        assert!(matches!(
            run(&doc, insert("Nope", "Low", true)),
            Err(MutationError::UnknownBlock(_))
        ));
        assert!(matches!(
            run(&doc, insert("Risk Assessment", "Medium", true)),
            Err(MutationError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_block_op_json() {
        let op: BlockOp = serde_json::from_str(
            r#"{ "op": "insertOption", "block": "Next Steps", "options": ["Call", "Docs"] }"#,
        )
        .unwrap();
        assert_eq!(
            op,
            BlockOp::InsertOption {
                block: "Next Steps".into(),
                options: OptionChoice::Many(vec!["Call".into(), "Docs".into()]),
                replace: true,
            }
        );
    }
}
