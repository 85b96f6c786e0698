//! Ordered Entries Module
//!
//! Insertion-ordered key-value map behind the shipped backends, so they can
//! answer `key(index)` the way an ordered web storage area does.

use indexmap::IndexMap;

// == Ordered Entries ==
/// Insertion-ordered map of keys to stored strings.
///
/// - Index 0 = Oldest key
/// - Last index = Newest key
///
/// Overwriting an existing key keeps its position. Lookups are O(1); a
/// removal shifts the later keys down by one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrderedEntries {
    map: IndexMap<String, String>,
}

impl OrderedEntries {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.map.get(key)
    }

    // == Set ==
    /// Stores `value` under `key` and returns the value it replaced.
    pub fn set(&mut self, key: &str, value: &str) -> Option<String> {
        match self.map.get_mut(key) {
            Some(slot) => Some(std::mem::replace(slot, value.to_string())),
            None => {
                self.map.insert(key.to_string(), value.to_string());
                None
            }
        }
    }

    // == Remove ==
    /// Removes `key` and returns the position and value it had.
    pub fn remove(&mut self, key: &str) -> Option<(usize, String)> {
        self.map
            .shift_remove_full(key)
            .map(|(index, _, value)| (index, value))
    }

    /// Puts a removed entry back at `index`.
    pub fn restore(&mut self, index: usize, key: String, value: String) {
        let index = index.min(self.map.len());
        self.map.shift_insert(index, key, value);
    }

    /// Keeps the entries `keep` returns `true` for, in order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.map.retain(|key, value| keep(key, value));
    }

    // == Index Access ==
    /// Key at `index`, oldest first.
    pub fn key_at(&self, index: usize) -> Option<&String> {
        self.map.get_index(index).map(|(key, _)| key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }
}

impl FromIterator<(String, String)> for OrderedEntries {
    /// A repeated key keeps its first position and its last value.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(entries: &OrderedEntries) -> Vec<&str> {
        entries.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_entries_new() {
        let entries = OrderedEntries::new();
        assert!(entries.is_empty());
        assert_eq!(entries.key_at(0), None);
    }

    #[test]
    fn test_set_keeps_insertion_order() {
        let mut entries = OrderedEntries::new();

        entries.set("key1", "a");
        entries.set("key2", "b");
        entries.set("key3", "c");

        assert_eq!(keys(&entries), vec!["key1", "key2", "key3"]);
        assert_eq!(entries.get("key2"), Some(&"b".to_string()));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut entries = OrderedEntries::new();

        entries.set("a", "1");
        entries.set("b", "2");
        let previous = entries.set("a", "3");

        assert_eq!(previous, Some("1".to_string()));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.key_at(0), Some(&"a".to_string()));
        assert_eq!(entries.get("a"), Some(&"3".to_string()));
    }

    #[test]
    fn test_remove_shifts_later_keys() {
        let mut entries = OrderedEntries::new();

        entries.set("a", "1");
        entries.set("b", "2");
        entries.set("c", "3");

        assert_eq!(entries.remove("a"), Some((0, "1".to_string())));
        assert_eq!(entries.key_at(0), Some(&"b".to_string()));
        assert_eq!(entries.key_at(1), Some(&"c".to_string()));
        assert_eq!(entries.key_at(2), None);
        assert_eq!(entries.remove("nonexistent"), None);
    }

    #[test]
    fn test_restore_returns_entry_to_its_slot() {
        let mut entries = OrderedEntries::new();
        entries.set("a", "1");
        entries.set("b", "2");
        entries.set("c", "3");

        let (index, value) = entries.remove("b").unwrap();
        entries.restore(index, "b".to_string(), value);

        assert_eq!(keys(&entries), vec!["a", "b", "c"]);
        assert_eq!(entries.get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn test_retain_preserves_order() {
        let mut entries: OrderedEntries = ["w", "x", "y", "z"]
            .into_iter()
            .map(|k| (k.to_string(), k.to_string()))
            .collect();

        entries.retain(|key, _| key != "x" && key != "z");

        assert_eq!(keys(&entries), vec!["w", "y"]);
        assert!(!entries.contains("x"));
    }

    #[test]
    fn test_collect_drops_duplicate_keys() {
        let entries: OrderedEntries = vec![
            ("x".to_string(), "1".to_string()),
            ("y".to_string(), "2".to_string()),
            ("x".to_string(), "3".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(keys(&entries), vec!["x", "y"]);
        assert_eq!(entries.get("x"), Some(&"3".to_string()));
    }
}
