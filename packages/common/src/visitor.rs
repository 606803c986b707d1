use pitchcraft_markup::ast::*;

/// Visitor pattern for traversing the draft tree immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_tree(&mut self, tree: &Tree) {
        walk_tree(self, tree);
    }

    fn visit_text(&mut self, _text: &str) {
        // Leaf node, no children to walk
    }

    fn visit_marker(&mut self, _marker: &Marker) {
        // Leaf node, no children to walk
    }

    fn visit_region(&mut self, region: &Region) {
        walk_region(self, region);
    }

    fn visit_snippet(&mut self, snippet: &Snippet) {
        walk_snippet(self, snippet);
    }

    fn visit_sentence(&mut self, sentence: &Sentence) {
        for fragment in &sentence.fragments {
            self.visit_text(fragment);
        }
    }
}

// Default walk implementations for immutable visitor

pub fn walk_tree<V: Visitor>(visitor: &mut V, tree: &Tree) {
    for node in &tree.nodes {
        match node {
            Node::Text(text) => visitor.visit_text(text),
            Node::Marker(marker) => visitor.visit_marker(marker),
            Node::Region(region) => visitor.visit_region(region),
        }
    }
}

pub fn walk_region<V: Visitor>(visitor: &mut V, region: &Region) {
    for child in &region.children {
        match child {
            RegionChild::Snippet(snippet) => visitor.visit_snippet(snippet),
            RegionChild::Text(text) => visitor.visit_text(text),
        }
    }
}

pub fn walk_snippet<V: Visitor>(visitor: &mut V, snippet: &Snippet) {
    for sentence in &snippet.sentences {
        visitor.visit_sentence(sentence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcraft_markup::parse;

    struct SnippetCounter {
        snippets: usize,
        sentences: usize,
    }

    impl Visitor for SnippetCounter {
        fn visit_snippet(&mut self, snippet: &Snippet) {
            self.snippets += 1;
            walk_snippet(self, snippet);
        }

        fn visit_sentence(&mut self, _sentence: &Sentence) {
            self.sentences += 1;
        }
    }

    const SOURCE: &str = r#"Hi <block title="A"><snippet label="x" original=""><s>One.</s><s>Two.</s></snippet><snippet label="y" original=""><s>Three.</s></snippet></block>"#;

    #[test]
    fn test_visitor_counts() {
        let tree = parse(SOURCE);
        let mut counter = SnippetCounter {
            snippets: 0,
            sentences: 0,
        };
        counter.visit_tree(&tree);
        assert_eq!(counter.snippets, 2);
        assert_eq!(counter.sentences, 3);
    }
}
