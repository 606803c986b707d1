use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::document::Document;
use crate::edit_detector::{region_edits, EditState};

/// Chosen option(s) for one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Single(String),
    Multi(Vec<String>),
}

impl Selection {
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Selection::Single(label) => vec![label.as_str()],
            Selection::Multi(labels) => labels.iter().map(String::as_str).collect(),
        }
    }
}

/// Queryable view of which blocks are populated, with what, and how
/// they have been changed since insertion.
///
/// Always derived from the draft in one pass; never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredIndex {
    pub inserted_blocks: BTreeSet<String>,
    pub selected_options: BTreeMap<String, Selection>,
    pub locked_blocks: BTreeSet<String>,
    pub edited_blocks: BTreeMap<String, bool>,
    pub edited_snippets: BTreeMap<String, BTreeMap<String, bool>>,
    pub original_snippet_content: BTreeMap<String, BTreeMap<String, String>>,
}

impl StructuredIndex {
    pub fn rebuild(document: &Document, catalog: &Catalog) -> Self {
        let mut index = Self::default();

        for block in catalog.blocks() {
            let Some((_, region)) = document.region(block) else {
                continue;
            };
            let title = block.title.clone();
            index.inserted_blocks.insert(title.clone());

            let labels = region.labels();
            if let Some(first) = labels.first() {
                let selection = if block.is_multi_select {
                    Selection::Multi(labels.clone())
                } else {
                    Selection::Single(first.clone())
                };
                index.selected_options.insert(title.clone(), selection);
            }

            if region.locked {
                index.locked_blocks.insert(title.clone());
            }

            let originals = region
                .snippets()
                .map(|s| (s.label.clone(), s.original.clone()))
                .collect();
            index
                .original_snippet_content
                .insert(title.clone(), originals);

            let (edited, snippets) = region_edits(region);
            index.edited_blocks.insert(title.clone(), edited);
            index.edited_snippets.insert(title, snippets);
        }

        index
    }

    pub fn is_inserted(&self, title: &str) -> bool {
        self.inserted_blocks.contains(title)
    }

    pub fn is_locked(&self, title: &str) -> bool {
        self.locked_blocks.contains(title)
    }

    pub fn selected(&self, title: &str) -> Vec<&str> {
        self.selected_options
            .get(title)
            .map(Selection::labels)
            .unwrap_or_default()
    }

    pub fn edit_state(&self) -> EditState {
        EditState {
            edited_blocks: self.edited_blocks.clone(),
            edited_snippets: self.edited_snippets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::BlockOp;

    fn catalog() -> Catalog {
        Catalog::from_json(
            "production",
            r#"[
                { "title": "Risk Assessment", "anchor": "[Risk Assessment Placeholder]",
                  "options": [ { "label": "Low", "previewText": "Low risk." } ] },
                { "title": "Next Steps", "anchor": "[Next Steps Placeholder]", "isMultiSelect": true,
                  "options": [ { "label": "Call", "previewText": "Call." }, { "label": "Docs", "previewText": "Docs." } ] }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_draft_has_empty_index() {
        let cat = catalog();
        let index = StructuredIndex::rebuild(&Document::from_catalog(&cat), &cat);
        assert_eq!(index, StructuredIndex::default());
    }

    #[test]
    fn test_rebuild_reflects_regions() {
        let cat = catalog();
        let mut doc = Document::from_catalog(&cat);
        for op in [
            BlockOp::InsertOption {
                block: "Risk Assessment".into(),
                options: "Low".into(),
                replace: true,
            },
            BlockOp::InsertOption {
                block: "Next Steps".into(),
                options: vec!["Docs".to_string(), "Call".to_string()].into(),
                replace: true,
            },
            BlockOp::ToggleLock {
                block: "Risk Assessment".into(),
            },
        ] {
            doc = op.reduce(&doc, &cat, None).unwrap().document;
        }

        let index = StructuredIndex::rebuild(&doc, &cat);
        assert!(index.is_inserted("Risk Assessment"));
        assert!(index.is_locked("Risk Assessment"));
        assert_eq!(
            index.selected_options.get("Risk Assessment"),
            Some(&Selection::Single("Low".into()))
        );
        assert_eq!(index.selected("Next Steps"), vec!["Docs", "Call"]);
        assert_eq!(
            index.original_snippet_content["Next Steps"]["Call"],
            "Call."
        );
        assert!(!index.edit_state().is_block_edited("Next Steps"));
    }

    #[test]
    fn test_selection_serializes_untagged() {
        let json = serde_json::to_string(&Selection::Multi(vec!["a".into()])).unwrap();
        assert_eq!(json, r#"["a"]"#);
        let json = serde_json::to_string(&Selection::Single("a".into())).unwrap();
        assert_eq!(json, r#""a""#);
    }
}
