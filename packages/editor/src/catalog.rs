//! # Template Catalog
//!
//! Read-only template definitions: blocks, each with a title, a stable
//! anchor and one or more selectable options carrying literal preview
//! text. A catalog is validated once on load; after that every lookup
//! can assume titles and labels are unique.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::EditorError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBlock {
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Position token an empty block occupies in the draft
    #[serde(alias = "placeholder")]
    pub anchor: String,

    #[serde(default)]
    pub is_multi_select: bool,

    pub options: Vec<TemplateOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOption {
    pub label: String,
    pub preview_text: String,

    /// Id of the server-side snippet this option was published from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet_id: Option<u64>,
}

impl TemplateBlock {
    pub fn option(&self, label: &str) -> Option<&TemplateOption> {
        self.options.iter().find(|o| o.label == label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    variant: String,
    blocks: Vec<TemplateBlock>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Blocks(Vec<TemplateBlock>),
    Named {
        #[serde(default)]
        variant: Option<String>,
        blocks: Vec<TemplateBlock>,
    },
}

impl Catalog {
    /// Build a catalog, rejecting duplicate titles, anchors or labels
    pub fn new(variant: impl Into<String>, blocks: Vec<TemplateBlock>) -> Result<Self, EditorError> {
        let variant = variant.into();
        let mut titles = HashSet::new();
        let mut anchors = HashSet::new();

        for block in &blocks {
            if block.title.trim().is_empty() {
                return Err(EditorError::CatalogLoad("block with empty title".to_string()));
            }
            if !titles.insert(block.title.as_str()) {
                return Err(EditorError::CatalogLoad(format!(
                    "duplicate block title '{}'",
                    block.title
                )));
            }
            if block.anchor.is_empty() || !anchors.insert(block.anchor.as_str()) {
                return Err(EditorError::CatalogLoad(format!(
                    "block '{}' has an empty or duplicate anchor",
                    block.title
                )));
            }
            let mut labels = HashSet::new();
            for option in &block.options {
                if !labels.insert(option.label.as_str()) {
                    return Err(EditorError::CatalogLoad(format!(
                        "duplicate option '{}' in block '{}'",
                        option.label, block.title
                    )));
                }
            }
        }

        Ok(Self { variant, blocks })
    }

    pub fn empty(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            blocks: Vec::new(),
        }
    }

    /// Parse a catalog file: either a bare array of blocks or
    /// `{ "variant": …, "blocks": [...] }`
    pub fn from_json(default_variant: &str, source: &str) -> Result<Self, EditorError> {
        let file: CatalogFile = pitchcraft_common::from_json(source)?;
        match file {
            CatalogFile::Blocks(blocks) => Self::new(default_variant, blocks),
            CatalogFile::Named { variant, blocks } => {
                Self::new(variant.unwrap_or_else(|| default_variant.to_string()), blocks)
            }
        }
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn blocks(&self) -> &[TemplateBlock] {
        &self.blocks
    }

    pub fn block(&self, title: &str) -> Option<&TemplateBlock> {
        self.blocks.iter().find(|b| b.title == title)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All block anchors, used to strip unpopulated blocks at send time
    pub fn anchors(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.anchor.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RISK: &str = r#"[
        {
            "title": "Risk Assessment",
            "placeholder": "[Risk Assessment Placeholder]",
            "options": [
                { "label": "Low", "previewText": "This matter presents low risk." },
                { "label": "High", "previewText": "This matter presents significant risk factors requiring review.", "snippetId": 12 }
            ]
        }
    ]"#;

    #[test]
    fn test_parse_bare_array() {
        let catalog = Catalog::from_json("production", RISK).unwrap();
        assert_eq!(catalog.variant(), "production");
        let block = catalog.block("Risk Assessment").unwrap();
        assert_eq!(block.anchor, "[Risk Assessment Placeholder]");
        assert!(!block.is_multi_select);
        assert_eq!(block.option("High").unwrap().snippet_id, Some(12));
    }

    #[test]
    fn test_parse_named_file() {
        let source = format!(r#"{{ "variant": "simplified", "blocks": {} }}"#, RISK);
        let catalog = Catalog::from_json("production", &source).unwrap();
        assert_eq!(catalog.variant(), "simplified");
        assert_eq!(catalog.blocks().len(), 1);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let block = TemplateBlock {
            title: "A".into(),
            description: String::new(),
            anchor: "[A Placeholder]".into(),
            is_multi_select: false,
            options: vec![
                TemplateOption { label: "x".into(), preview_text: "1".into(), snippet_id: None },
                TemplateOption { label: "x".into(), preview_text: "2".into(), snippet_id: None },
            ],
        };
        let err = Catalog::new("v", vec![block]).unwrap_err();
        assert!(matches!(err, EditorError::CatalogLoad(_)));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(Catalog::from_json("v", "{ not json").is_err());
    }
}
