//! # Materialization Pipeline
//!
//! Turns the live draft into the text that is actually sent:
//!
//! ```text
//! assemble → expand placeholders → expand computed → strip → normalize
//! ```
//!
//! The steps must run in exactly that order. Running one out of order is
//! a programming error: debug builds fail with
//! [`EditorError::SubstitutionOrderViolation`], release builds log a
//! warning and fall back to stripping and normalizing what they have, so
//! a letter is never sent with raw tokens in it.

use pitchcraft_markup::escape_text;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::{EngineConfig, OutputFormat};
use crate::context::Context;
use crate::document::Document;
use crate::substitution::{expand, expand_computed, strip_unresolved, ExpandOptions};
use crate::EditorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Assembled,
    Expanded,
    Computed,
    Stripped,
    Normalized,
}

/// One in-flight materialization
pub struct Materializer<'a> {
    stage: Stage,
    text: String,
    catalog: &'a Catalog,
    context: &'a Context,
    config: &'a EngineConfig,
}

impl<'a> Materializer<'a> {
    /// Assemble the draft's plain text; markup and boundary markers are
    /// dropped here
    pub fn assemble(
        document: &Document,
        catalog: &'a Catalog,
        context: &'a Context,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            stage: Stage::Assembled,
            text: document.plain_text(),
            catalog,
            context,
            config,
        }
    }

    /// Run every step in order
    pub fn run(
        document: &Document,
        catalog: &'a Catalog,
        context: &'a Context,
        config: &'a EngineConfig,
        strip: bool,
    ) -> Result<String, EditorError> {
        let mut materializer = Self::assemble(document, catalog, context, config);
        materializer
            .expand_placeholders()?
            .expand_computed()?
            .strip_unresolved(strip)?
            .normalize()?;
        materializer.finish()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expand_placeholders(&mut self) -> Result<&mut Self, EditorError> {
        if self.enter(Stage::Assembled, Stage::Expanded)? {
            self.text = expand(&self.text, self.context, ExpandOptions::default());
        }
        Ok(self)
    }

    pub fn expand_computed(&mut self) -> Result<&mut Self, EditorError> {
        if self.enter(Stage::Expanded, Stage::Computed)? {
            self.text = expand_computed(&self.text, self.context, self.config);
        }
        Ok(self)
    }

    /// With `strip`, remove leftover tokens and the anchors of blocks that
    /// were never populated
    pub fn strip_unresolved(&mut self, strip: bool) -> Result<&mut Self, EditorError> {
        if self.enter(Stage::Computed, Stage::Stripped)? && strip {
            self.text = strip_unresolved(&self.text, self.catalog.anchors());
        }
        Ok(self)
    }

    pub fn normalize(&mut self) -> Result<&mut Self, EditorError> {
        if self.enter(Stage::Stripped, Stage::Normalized)? {
            self.text = normalize_output(&self.text, self.config.output_format);
        }
        Ok(self)
    }

    pub fn finish(mut self) -> Result<String, EditorError> {
        if self.stage != Stage::Normalized {
            self.violation(Stage::Normalized)?;
        }
        Ok(self.text)
    }

    /// Advance `from` → `to`. Returns false when the step was out of order
    /// and the text has been degraded instead.
    fn enter(&mut self, from: Stage, to: Stage) -> Result<bool, EditorError> {
        if self.stage == from {
            self.stage = to;
            return Ok(true);
        }
        self.violation(from)?;
        Ok(false)
    }

    fn violation(&mut self, expected: Stage) -> Result<(), EditorError> {
        if cfg!(debug_assertions) {
            return Err(EditorError::SubstitutionOrderViolation {
                expected,
                found: self.stage,
            });
        }

        tracing::warn!(
            expected = ?expected,
            found = ?self.stage,
            "Materialize step out of order, degrading to strip and normalize"
        );
        if self.stage < Stage::Stripped {
            self.text = strip_unresolved(&self.text, self.catalog.anchors());
        }
        if self.stage < Stage::Normalized {
            self.text = normalize_output(&self.text, self.config.output_format);
        }
        self.stage = Stage::Normalized;
        Ok(())
    }
}

/// Group lines into paragraphs separated by blank lines
fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

pub fn normalize_output(text: &str, format: OutputFormat) -> String {
    let paragraphs = paragraphs(text);
    match format {
        OutputFormat::Text => paragraphs
            .iter()
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Html => paragraphs
            .iter()
            .map(|lines| {
                let body = lines
                    .iter()
                    .map(|line| escape_text(line))
                    .collect::<Vec<_>>()
                    .join("<br />");
                format!("<p>{}</p>", body)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
