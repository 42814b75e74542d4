use serde::{Deserialize, Serialize};

use crate::core::model::Record;

fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f32)
}

/// Weaker of the mean `new` and mean `old` recognition confidence.
pub fn column_confidence(records: &[Record]) -> Option<f32> {
    let new = mean(records.iter().map(|r| r.new_conf))?;
    let old = mean(records.iter().map(|r| r.old_conf))?;
    Some(new.min(old))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub streets: usize,
    pub pairs: usize,
    pub flagged: usize,
    pub confidence: Option<f32>,
}

impl ColumnSummary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut streets: Vec<&str> = records.iter().map(|r| r.street.as_str()).collect();
        streets.dedup();
        Self {
            streets: streets.len(),
            pairs: records.len(),
            flagged: records.iter().filter(|r| r.flag).count(),
            confidence: column_confidence(records),
        }
    }
}
