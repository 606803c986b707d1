//! Placeholder tokens: bracketed paths such as `[Enquiry.First_Name]`,
//! `[Amount]` or `[INSERT]`.
//!
//! Block anchors like `[Risk Assessment Placeholder]` contain spaces and
//! are deliberately not tokens.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([A-Za-z][A-Za-z0-9_]*(?:\.[A-Za-z][A-Za-z0-9_]*)*)\]")
        .expect("token pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch<'a> {
    /// Byte range of the whole token including brackets
    pub range: Range<usize>,
    /// Path between the brackets
    pub path: &'a str,
}

pub fn find_tokens(text: &str) -> impl Iterator<Item = TokenMatch<'_>> {
    TOKEN_RE.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let path = caps.get(1)?;
        Some(TokenMatch {
            range: whole.range(),
            path: path.as_str(),
        })
    })
}

/// Split text into alternating literal and token fragments. Empty
/// pieces are omitted, so concatenating the result yields `text`.
pub fn split_fragments(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut last = 0;
    for token in find_tokens(text) {
        if token.range.start > last {
            fragments.push(text[last..token.range.start].to_string());
        }
        fragments.push(text[token.range.clone()].to_string());
        last = token.range.end;
    }
    if last < text.len() {
        fragments.push(text[last..].to_string());
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tokens() {
        let text = "Dear [Enquiry.First_Name], fee [Amount] for [INSERT].";
        let paths: Vec<_> = find_tokens(text).map(|t| t.path).collect();
        assert_eq!(paths, vec!["Enquiry.First_Name", "Amount", "INSERT"]);
    }

    #[test]
    fn test_anchor_is_not_token() {
        assert_eq!(find_tokens("[Risk Assessment Placeholder]").count(), 0);
        assert_eq!(find_tokens("[Enquiry.]").count(), 0);
        let paths: Vec<_> = find_tokens("x[FE]").map(|t| t.path).collect();
        assert_eq!(paths, vec!["FE"]);
    }

    #[test]
    fn test_split_fragments() {
        assert_eq!(
            split_fragments("Hi [Enquiry.First_Name], bye"),
            vec!["Hi ", "[Enquiry.First_Name]", ", bye"]
        );
        assert_eq!(split_fragments("[FE]"), vec!["[FE]"]);
        assert!(split_fragments("").is_empty());
    }
}
