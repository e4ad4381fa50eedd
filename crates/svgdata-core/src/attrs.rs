use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::units::{LengthResult, parse_length};

/// Attribute name to raw string value.
///
/// Typed decoders consume what they read, so whatever is left after decoding
/// is unknown to the model and is written back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttrMap(BTreeMap<String, String>);

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Take `key` as a length in pixels. Absent keys yield `Ok(None)`; the
    /// entry is only removed when it parses.
    pub fn extract_length(&mut self, key: &str) -> LengthResult<Option<f64>> {
        let Some(raw) = self.0.get(key) else {
            return Ok(None);
        };
        let value = parse_length(raw)?;
        self.0.remove(key);
        Ok(Some(value))
    }

    /// Like [`AttrMap::extract_length`], falling back to `default` when absent.
    pub fn extract_length_or(&mut self, key: &str, default: f64) -> LengthResult<f64> {
        Ok(self.extract_length(key)?.unwrap_or(default))
    }
}

impl<K, V> FromIterator<(K, V)> for AttrMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a AttrMap {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::LengthError;

    #[test]
    fn extraction_consumes_the_entry() {
        let mut attrs: AttrMap = [("x", "1in"), ("fill", "red")].into_iter().collect();
        assert_eq!(attrs.extract_length("x").unwrap(), Some(96.0));
        assert!(!attrs.contains("x"));
        assert_eq!(attrs.get("fill"), Some("red"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn absent_key_uses_default() {
        let mut attrs = AttrMap::new();
        assert_eq!(attrs.extract_length("y").unwrap(), None);
        assert_eq!(attrs.extract_length_or("y", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn failed_extraction_keeps_the_entry() {
        let mut attrs: AttrMap = [("r", "3furlongs")].into_iter().collect();
        assert!(matches!(
            attrs.extract_length("r"),
            Err(LengthError::UnknownUnit { .. })
        ));
        assert_eq!(attrs.get("r"), Some("3furlongs"));
    }
}
