//! # Placeholder Substitution
//!
//! Resolves `[Path.To.Value]` tokens against a [`Context`].
//!
//! Plain tokens resolve recursively: a context value may itself contain
//! tokens. A token whose resolution leads back to itself is left as its
//! literal text, which keeps [`expand`] idempotent for any context.
//!
//! Computed tokens (`[Amount]`, `[Passcode]`, `[CheckoutLink]`) are never
//! touched by [`expand`]; they resolve only through [`expand_computed`]
//! when a letter is materialized.

use pitchcraft_common::checksum;
use pitchcraft_markup::find_tokens;

use crate::config::EngineConfig;
use crate::context::Context;

pub const AMOUNT_TOKEN: &str = "Amount";
pub const PASSCODE_TOKEN: &str = "Passcode";
pub const CHECKOUT_LINK_TOKEN: &str = "CheckoutLink";

const COMPUTED_TOKENS: [&str; 3] = [AMOUNT_TOKEN, PASSCODE_TOKEN, CHECKOUT_LINK_TOKEN];

pub fn is_computed(path: &str) -> bool {
    COMPUTED_TOKENS.contains(&path)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Drop tokens with no context value instead of keeping them literally
    pub strip_unresolved: bool,
}

impl ExpandOptions {
    pub fn strip() -> Self {
        Self {
            strip_unresolved: true,
        }
    }
}

struct Cycle;

/// Replace every resolvable non-computed token in `text`.
pub fn expand(text: &str, ctx: &Context, options: ExpandOptions) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for token in find_tokens(text) {
        out.push_str(&text[last..token.range.start]);
        last = token.range.end;
        let literal = &text[token.range.clone()];

        if is_computed(token.path) {
            out.push_str(literal);
            continue;
        }

        match resolve(token.path, ctx, options, &mut Vec::new()) {
            Ok(Some(value)) => out.push_str(&value),
            Ok(None) if options.strip_unresolved => {}
            Ok(None) => out.push_str(literal),
            Err(Cycle) => {
                tracing::warn!(token = token.path, "Cyclic placeholder left unexpanded");
                out.push_str(literal);
            }
        }
    }

    out.push_str(&text[last..]);
    out
}

fn resolve<'a>(
    path: &'a str,
    ctx: &'a Context,
    options: ExpandOptions,
    visiting: &mut Vec<&'a str>,
) -> Result<Option<String>, Cycle> {
    if visiting.contains(&path) {
        return Err(Cycle);
    }
    let Some(value) = ctx.get(path) else {
        return Ok(None);
    };

    visiting.push(path);
    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for token in find_tokens(value) {
        out.push_str(&value[last..token.range.start]);
        last = token.range.end;
        if is_computed(token.path) {
            out.push_str(&value[token.range.clone()]);
            continue;
        }
        match resolve(token.path, ctx, options, visiting)? {
            Some(nested) => out.push_str(&nested),
            None if options.strip_unresolved => {}
            None => out.push_str(&value[token.range.clone()]),
        }
    }
    out.push_str(&value[last..]);
    visiting.pop();

    Ok(Some(out))
}

/// Resolve the computed tokens whose inputs are present in `ctx`
pub fn expand_computed(text: &str, ctx: &Context, config: &EngineConfig) -> String {
    let passcode = ctx
        .access_code
        .as_deref()
        .map(|raw| normalize_passcode(raw, &config.passcode_seed));

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in find_tokens(text) {
        out.push_str(&text[last..token.range.start]);
        last = token.range.end;

        let value = match token.path {
            AMOUNT_TOKEN => ctx
                .amount
                .map(|amount| format_amount(amount, &config.currency_symbol)),
            PASSCODE_TOKEN => passcode.clone(),
            CHECKOUT_LINK_TOKEN => passcode
                .as_deref()
                .map(|code| checkout_link(&config.checkout_base_url, code)),
            _ => None,
        };
        match value {
            Some(value) => out.push_str(&value),
            None => out.push_str(&text[token.range.clone()]),
        }
    }
    out.push_str(&text[last..]);
    out
}

/// `1500.0` → `£1,500.00`
pub fn format_amount(amount: f64, currency_symbol: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        sign,
        currency_symbol,
        group_thousands(cents / 100),
        cents % 100
    )
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Five-digit access code. A code that is already exactly five digits
/// passes through; anything else maps deterministically into
/// `10000..=99999`.
pub fn normalize_passcode(raw: &str, seed: &str) -> String {
    let raw = raw.trim();
    if raw.len() == 5 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }
    let hash = checksum(&[raw.as_bytes(), seed.as_bytes()]);
    (hash % 90_000 + 10_000).to_string()
}

pub fn checkout_link(base_url: &str, passcode: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}passcode={}", base_url, separator, passcode)
}

/// Remove every remaining token and unpopulated anchor, then collapse
/// the blank lines they leave behind
pub fn strip_unresolved<'a>(text: &str, anchors: impl IntoIterator<Item = &'a str>) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut last = 0;
    for token in find_tokens(text) {
        stripped.push_str(&text[last..token.range.start]);
        last = token.range.end;
    }
    stripped.push_str(&text[last..]);

    for anchor in anchors {
        if !anchor.is_empty() {
            stripped = stripped.replace(anchor, "");
        }
    }

    collapse_blank_lines(&stripped)
}

/// Trim trailing space on each line and fold runs of empty lines into one
pub fn collapse_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(if line.trim().is_empty() { "" } else { line });
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Paths of tokens still present in `text`, in order of appearance
pub fn unresolved_tokens(text: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for token in find_tokens(text) {
        if !paths.iter().any(|p| p == token.path) {
            paths.push(token.path.to_string());
        }
    }
    paths
}
