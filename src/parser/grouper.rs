use std::collections::BTreeMap;

use crate::core::model::{RawToken, Token};
use crate::core::stats::mode;

/// Separator recognition leaves between fields it failed to space apart.
pub const FIELD_SEPARATOR: char = '|';

/// Structural identity of a recognized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    pub block_num: u32,
    pub par_num: u32,
    pub line_num: u32,
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.block_num, self.par_num, self.line_num)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: RowKey,
    /// Smallest recognized word height on the line.
    pub height: i32,
    pub tokens: Vec<Token>,
}

impl Row {
    pub fn combined_text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Most common word height across the whole stream.
pub fn modal_row_height(tokens: &[RawToken]) -> Option<i32> {
    mode(tokens.iter().map(|t| t.height))
}

/// Groups tokens into rows ordered by block, paragraph and line. Tokens
/// keep their stream order within a row and are split on `|`.
pub fn group_rows(tokens: &[RawToken]) -> Vec<Row> {
    let mut groups: BTreeMap<RowKey, Vec<&RawToken>> = BTreeMap::new();
    for raw in tokens {
        let key = RowKey {
            block_num: raw.block_num,
            par_num: raw.par_num,
            line_num: raw.line_key(),
        };
        groups.entry(key).or_default().push(raw);
    }

    groups
        .into_iter()
        .map(|(key, raws)| {
            let height = raws.iter().map(|r| r.height).min().unwrap_or(0);
            let tokens = raws
                .iter()
                .flat_map(|raw| Token::from_raw(raw).split_on(FIELD_SEPARATOR))
                .collect();
            Row {
                key,
                height,
                tokens,
            }
        })
        .collect()
}
