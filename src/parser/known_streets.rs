use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use crate::core::error::Result;
use crate::core::model::Record;

/// Minimum similarity for a fuzzy match against a known spelling.
pub const MATCH_THRESHOLD: f64 = 0.85;

/// Street-name dictionary mapping recognized spellings to canonical names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownStreets {
    names: BTreeMap<String, String>,
}

impl KnownStreets {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Identity map of every distinct street name in `records`.
    pub fn from_records(records: &[Record]) -> Self {
        Self::from_pairs(records.iter().map(|r| (r.street.clone(), r.street.clone())))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical spelling of `name`; unchanged when nothing is close enough.
    pub fn normalize(&self, name: &str) -> String {
        if let Some(canonical) = self.names.get(name) {
            return canonical.clone();
        }

        let mut best: Option<(f64, &String)> = None;
        for (known, canonical) in &self.names {
            let score = normalized_levenshtein(name, known);
            if score >= MATCH_THRESHOLD && best.map_or(true, |(s, _)| score > s) {
                best = Some((score, canonical));
            }
        }
        best.map_or_else(|| name.to_string(), |(_, canonical)| canonical.clone())
    }
}
