use std::collections::HashMap;
use std::hash::Hash;

/// Insertion-ordered map with get-or-insert-default access.
///
/// Report rows follow the order in which keys were first seen, so the
/// entries live in a `Vec` and the `HashMap` only stores positions.
#[derive(Clone, Debug)]
pub struct Tally<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone, V: Default> Tally<K, V> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }

    pub fn entry_or_default(&mut self, key: K) -> &mut V {
        let pos = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(key.clone(), i);
                self.entries.push((key, V::default()));
                i
            }
        };
        &mut self.entries[pos].1
    }

    #[cfg(test)]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize { self.entries.len() }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<K: Eq + Hash + Clone, V: Default> Default for Tally<K, V> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_seen_order() {
        let mut t: Tally<String, u64> = Tally::new();
        for k in ["b", "a", "b", "c", "a", "b"] { *t.entry_or_default(k.to_string()) += 1; }
        let got: Vec<(String, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(got, vec![("b".to_string(), 3), ("a".to_string(), 2), ("c".to_string(), 1)]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn get_missing_is_none() {
        let mut t: Tally<&str, u64> = Tally::default();
        assert!(t.is_empty());
        *t.entry_or_default("x") += 4;
        assert_eq!(t.get(&"x"), Some(&4));
        assert_eq!(t.get(&"y"), None);
    }
}
