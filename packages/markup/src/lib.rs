//! # Pitchcraft Markup
//!
//! The marked-up text tree behind a composed letter.
//!
//! A draft is plain prose interleaved with populated template blocks.
//! Each populated block is a `<block>` region bracketed by boundary
//! markers, holding one `<snippet>` per chosen option, and each snippet
//! holds `<s>` sentence units:
//!
//! ```text
//! Dear [Enquiry.First_Name],
//!
//! <!--START_BLOCK:Risk Assessment--><block title="Risk Assessment" region="rgn-…" anchor="[Risk Assessment Placeholder]"><snippet label="Low" original="…"><s>…</s></snippet></block><!--END_BLOCK:Risk Assessment-->
//! ```
//!
//! Parsing is lenient: the free-form editing surface can hand back any
//! text, so malformed structure is repaired and reported as
//! [`Diagnostic`]s instead of failing.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sentence;
pub mod serializer;
pub mod tokens;

pub use ast::{Edge, Marker, Node, Region, RegionChild, Sentence, Snippet, Tree};
pub use lexer::{tokenize, Token};
pub use parser::{parse, parse_with_diagnostics, Diagnostic, ParseOutput};
pub use sentence::split_sentences;
pub use serializer::{escape_attr, escape_text, serialize, serialize_region, unescape};
pub use tokens::{find_tokens, split_fragments, TokenMatch};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_base_letter() {
        let source = "Dear [Enquiry.First_Name],\n\n[Risk Assessment Placeholder]\n\nKind Regards";
        let tree = parse(source);
        assert_eq!(serialize(&tree), source);
    }
}
