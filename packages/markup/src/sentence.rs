use crate::ast::Sentence;

/// Split prose into sentence units.
///
/// A boundary is `.`, `!` or `?` followed by whitespace, or any blank
/// line. Sentences are trimmed; a sentence that follows a whitespace run
/// containing a newline carries `paragraph_break`.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut pending_break = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_whitespace() {
            current.push(c);
            continue;
        }

        let mut run = String::from(c);
        while let Some(&next) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            run.push(next);
            chars.next();
        }

        let newlines = run.matches('\n').count();
        let after_terminator = current.ends_with(['.', '!', '?']);
        let at_end = chars.peek().is_none();

        if (after_terminator || newlines >= 2) && !at_end {
            flush(&mut sentences, &mut current, &mut pending_break);
            pending_break = newlines > 0;
        } else if !current.is_empty() {
            current.push_str(&run);
        }
    }
    flush(&mut sentences, &mut current, &mut pending_break);
    sentences
}

fn flush(sentences: &mut Vec<Sentence>, current: &mut String, pending_break: &mut bool) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        let paragraph_break = *pending_break && !sentences.is_empty();
        sentences.push(Sentence::with_break(trimmed, paragraph_break));
    }
    current.clear();
    *pending_break = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentences: &[Sentence]) -> Vec<String> {
        sentences.iter().map(|s| s.text()).collect()
    }

    #[test]
    fn test_split_on_terminators() {
        let sentences = split_sentences("This matter presents low risk. Are you sure? Yes!");
        assert_eq!(
            texts(&sentences),
            vec!["This matter presents low risk.", "Are you sure?", "Yes!"]
        );
        assert!(sentences.iter().all(|s| !s.paragraph_break));
    }

    #[test]
    fn test_no_split_without_whitespace() {
        let sentences = split_sentences("Fee is £1,500.00 plus VAT.");
        assert_eq!(texts(&sentences), vec!["Fee is £1,500.00 plus VAT."]);
    }

    #[test]
    fn test_paragraph_breaks() {
        let sentences = split_sentences("Initial Steps\n\nI am experienced. It helps.\nNext line.");
        assert_eq!(
            texts(&sentences),
            vec!["Initial Steps", "I am experienced.", "It helps.", "Next line."]
        );
        let breaks: Vec<_> = sentences.iter().map(|s| s.paragraph_break).collect();
        assert_eq!(breaks, vec![false, true, false, true]);
    }

    #[test]
    fn test_single_newline_mid_sentence_is_kept() {
        let sentences = split_sentences("one\ntwo.");
        assert_eq!(texts(&sentences), vec!["one\ntwo."]);
    }

    #[test]
    fn test_empty() {
        assert!(split_sentences("   \n ").is_empty());
    }
}
