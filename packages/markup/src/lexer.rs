//! Lexer for draft markup using logos

use logos::Logos;

/// Structural tokens of the draft markup. Anything that is not a
/// recognised tag is text.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    #[token("<!--START_BLOCK:", marker_title)]
    StartMarker(&'src str),

    #[token("<!--END_BLOCK:", marker_title)]
    EndMarker(&'src str),

    #[regex(r#"<block(\s+[a-z-]+(="[^"]*")?)*\s*>"#, |lex| lex.slice())]
    BlockOpen(&'src str),

    #[token("</block>")]
    BlockClose,

    #[regex(r#"<snippet(\s+[a-z-]+(="[^"]*")?)*\s*>"#, |lex| lex.slice())]
    SnippetOpen(&'src str),

    #[token("</snippet>")]
    SnippetClose,

    #[regex(r#"<s(\s+[a-z-]+(="[^"]*")?)*\s*>"#, |lex| lex.slice())]
    SentenceOpen(&'src str),

    #[token("</s>")]
    SentenceClose,

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Consume a marker title up to and including the closing `-->`.
/// A marker without one, or whose title runs into another tag, is not a
/// marker.
fn marker_title<'src>(lex: &mut logos::Lexer<'src, Token<'src>>) -> Option<&'src str> {
    let rest = lex.remainder();
    let end = rest.find("-->")?;
    let title = &rest[..end];
    if title.contains(['<', '>']) {
        return None;
    }
    lex.bump(end + "-->".len());
    Some(title)
}

/// Tokenize markup. Input the lexer cannot match (a lone `<`, foreign
/// tags) comes back as [`Token::Text`] so no user content is lost.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => (token, span),
            Err(()) => (Token::Text(&source[span.clone()]), span),
        })
        .collect()
}

/// Parse the attributes of an open tag such as `<block title="A" locked>`.
/// Returns `(name, value)` pairs; flags have no value.
pub fn parse_attributes(tag: &str) -> Vec<(String, Option<String>)> {
    let inner = tag.trim_start_matches('<').trim_end_matches('>');
    let mut chars = inner.char_indices().peekable();

    // skip the tag name
    while let Some((_, c)) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        chars.next();
    }

    let mut attrs = Vec::new();
    loop {
        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
            chars.next();
        }
        let Some(&(start, _)) = chars.peek() else {
            break;
        };
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        let name = inner[start..end].to_string();
        if name.is_empty() {
            chars.next();
            continue;
        }

        if matches!(chars.peek(), Some((_, '='))) {
            chars.next();
            if matches!(chars.peek(), Some((_, '"'))) {
                chars.next();
            }
            let mut value = String::new();
            for (_, c) in chars.by_ref() {
                if c == '"' {
                    break;
                }
                value.push(c);
            }
            attrs.push((name, Some(crate::serializer::unescape(&value))));
        } else {
            attrs.push((name, None));
        }
    }
    attrs
}
