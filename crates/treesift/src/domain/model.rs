//! Domain models for tree listings and filtered mappings.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One record of a tree listing. Fields beyond `path` and `sha` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub sha: String,
}

/// A parsed tree listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDocument {
    pub tree: Vec<TreeEntry>,
    /// Set when the provider reported the listing as incomplete.
    pub truncated: bool,
}

/// Insertion-ordered `path -> sha` mapping.
///
/// Re-inserting a path replaces its hash but keeps the position of the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredMapping {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl FilteredMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping, returning the previous hash when the path was already present.
    pub fn insert(&mut self, path: impl Into<String>, sha: impl Into<String>) -> Option<String> {
        let path = path.into();
        let sha = sha.into();
        match self.index.get(&path) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, sha)),
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, sha));
                None
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.index
            .get(path)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(path, sha)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, sha)| (path.as_str(), sha.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }
}

impl Serialize for FilteredMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, sha) in &self.entries {
            map.serialize_entry(path, sha)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinsert_keeps_first_position_and_last_value() {
        let mut mapping = FilteredMapping::new();
        assert_eq!(mapping.insert("src/lib/utils.ts", "old"), None);
        mapping.insert("src/components/ui/card.tsx", "c1");
        assert_eq!(
            mapping.insert("src/lib/utils.ts", "new"),
            Some("old".to_string())
        );

        let pairs: Vec<_> = mapping.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("src/lib/utils.ts", "new"),
                ("src/components/ui/card.tsx", "c1"),
            ]
        );
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn serializes_in_insertion_order() {
        let mut mapping = FilteredMapping::new();
        mapping.insert("z.ts", "1");
        mapping.insert("a.ts", "2");
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"z.ts":"1","a.ts":"2"}"#);
    }

    #[test]
    fn lookup_by_path() {
        let mut mapping = FilteredMapping::new();
        mapping.insert("src/lib/utils.ts", "def456");
        assert_eq!(mapping.get("src/lib/utils.ts"), Some("def456"));
        assert!(mapping.get("src/lib/other.ts").is_none());
    }
}
