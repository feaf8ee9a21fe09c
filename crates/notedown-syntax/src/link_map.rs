//! Link reference definitions of a document, keyed by normalized label.

use std::collections::HashMap;

use crate::ast::{AstNode, LinkDefinition};
use crate::syntax_kind::SyntaxNode;

/// Destination and title of a definition, as written (escapes and entity
/// references are not yet decoded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub destination: String,
    pub title: Option<String>,
}

/// Label to definition map. The first definition of a label wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMap {
    links: HashMap<String, LinkInfo>,
}

impl LinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-folds a label and collapses internal whitespace, so `Foo  Bar`
    /// and `foo\nbar` refer to the same definition.
    pub fn normalize_label(label: &str) -> String {
        label
            .split(char::is_whitespace)
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
            .to_uppercase()
    }

    /// Records a definition. Returns false if the label was already defined.
    pub fn insert(&mut self, label: &str, info: LinkInfo) -> bool {
        let key = Self::normalize_label(label);
        if key.is_empty() || self.links.contains_key(&key) {
            return false;
        }
        self.links.insert(key, info);
        true
    }

    pub fn get(&self, label: &str) -> Option<&LinkInfo> {
        self.links.get(&Self::normalize_label(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Rebuilds the map from the `LINK_DEFINITION` nodes of a parsed tree.
    pub fn from_tree(root: &SyntaxNode) -> Self {
        let mut map = Self::new();
        for def in root.descendants().filter_map(LinkDefinition::cast) {
            if let (Some(label), Some(destination)) = (def.label(), def.destination()) {
                map.insert(
                    &label,
                    LinkInfo {
                        destination,
                        title: def.title(),
                    },
                );
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Foo  Bar", "FOO BAR")]
    #[case(" foo\n\tbar ", "FOO BAR")]
    #[case("ẞ", "SS")]
    #[case("Толпой", "ТОЛПОЙ")]
    fn normalization(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(LinkMap::normalize_label(label), expected);
    }

    #[test]
    fn first_definition_wins() {
        let mut map = LinkMap::new();
        let info = |d: &str| LinkInfo {
            destination: d.to_string(),
            title: None,
        };
        assert!(map.insert("foo", info("/first")));
        assert!(!map.insert("FOO", info("/second")));
        assert_eq!(map.get("Foo").map(|i| i.destination.as_str()), Some("/first"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn blank_labels_are_rejected() {
        let mut map = LinkMap::new();
        assert!(!map.insert("  ", LinkInfo {
            destination: String::new(),
            title: None,
        }));
        assert!(map.is_empty());
    }
}
