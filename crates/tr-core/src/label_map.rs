//! Ordered label lookup tables.
//!
//! A [`LabelMap`] turns raw client/project/task names into display labels.
//! Keys are tried as exact literals first, then as anchored regular
//! expressions in the order they were defined. Labels with no match pass
//! through unchanged so unknown names stay visible in the report.

use std::fmt;

use regex::Regex;
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};

#[derive(Debug, Clone)]
struct LabelRule {
    key: String,
    label: String,
    /// `None` when the key is not a valid pattern; such keys only match literally.
    pattern: Option<Regex>,
}

/// Ordered mapping from literal-or-pattern keys to display labels.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    rules: Vec<LabelRule>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule at the end of the table.
    ///
    /// Re-inserting an existing key replaces its label but keeps its original
    /// position, so the scan order matches the first time the key was seen.
    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        let key = key.into();
        let label = label.into();

        if let Some(rule) = self.rules.iter_mut().find(|rule| rule.key == key) {
            rule.label = label;
            return;
        }

        let pattern = compile_anchored(&key);
        self.rules.push(LabelRule {
            key,
            label,
            pattern,
        });
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates `(key, label)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules
            .iter()
            .map(|rule| (rule.key.as_str(), rule.label.as_str()))
    }

    /// Resolves a raw label to its display label.
    ///
    /// 1. An exact key match with a non-empty label wins.
    /// 2. Otherwise the first key (in definition order) whose pattern matches
    ///    the whole input wins.
    /// 3. Otherwise the input is returned unchanged.
    ///
    /// An empty label only disqualifies the exact-key step; a pattern match
    /// maps to its label even when that label is empty.
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.key == raw && !rule.label.is_empty())
        {
            return &rule.label;
        }

        self.rules
            .iter()
            .find(|rule| rule.pattern.as_ref().is_some_and(|re| re.is_match(raw)))
            .map_or(raw, |rule| rule.label.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, label) in iter {
            map.insert(key, label);
        }
        map
    }
}

/// Compiles `key` so that it must match the entire input.
fn compile_anchored(key: &str) -> Option<Regex> {
    match Regex::new(&format!("^(?:{key})$")) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!(key, error = %err, "label key is not a valid pattern, matching literally");
            None
        }
    }
}

/// Accepts either a map (`{"pattern": "label"}`) or a list of pairs
/// (`[["pattern", "label"]]`). Map entries keep document order.
impl<'de> Deserialize<'de> for LabelMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LabelMapVisitor;

        impl<'de> Visitor<'de> for LabelMapVisitor {
            type Value = LabelMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of pattern to label, or a list of [pattern, label] pairs")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = LabelMap::new();
                while let Some((key, label)) = access.next_entry::<String, String>()? {
                    map.insert(key, label);
                }
                Ok(map)
            }

            fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut map = LabelMap::new();
                while let Some((key, label)) = access.next_element::<(String, String)>()? {
                    map.insert(key, label);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_any(LabelMapVisitor)
    }
}
