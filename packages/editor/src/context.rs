//! Runtime values available to placeholder expansion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value record consulted when expanding `[Path.To.Value]` tokens.
///
/// Plain fields are keyed by their full dotted path. `amount` and
/// `access_code` feed the computed tokens, which only resolve when the
/// letter is materialized for sending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(path.into(), value.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_access_code(mut self, code: impl Into<String>) -> Self {
        self.access_code = Some(code.into());
        self
    }

    /// `[Rate]` reads as an hourly rate plus VAT
    pub fn with_rate(self, rate: &str, currency_symbol: &str) -> Self {
        let value = format!("{}{} + VAT", currency_symbol, rate.trim_start_matches(currency_symbol));
        self.with_field("Rate", value)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.fields.get(path).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.amount.is_none() && self.access_code.is_none()
    }

    /// Overlay `other` on top of `self`, later values winning
    pub fn merged(&self, other: &Context) -> Context {
        let mut merged = self.clone();
        merged
            .fields
            .extend(other.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        if other.amount.is_some() {
            merged.amount = other.amount;
        }
        if other.access_code.is_some() {
            merged.access_code = other.access_code.clone();
        }
        merged
    }
}
