use serde::{Deserialize, Serialize};

use crate::core::geometry::{BBox, Span};

/// One word record as emitted by the recognition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawToken {
    pub text: String,
    pub conf: f32,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub block_num: u32,
    pub par_num: u32,
    pub line_num: u32,
}

impl RawToken {
    /// Line number made unique across paragraphs of the same block.
    pub fn line_key(&self) -> u32 {
        self.line_num + self.par_num.saturating_sub(1) * 1000
    }

    pub fn bbox(&self) -> BBox {
        BBox::from_size(self.left, self.top, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub conf: f32,
    pub bbox: BBox,
    pub block_num: u32,
    pub par_num: u32,
    pub line_num: u32,
    pub flag: bool,
}

impl Token {
    pub fn from_raw(raw: &RawToken) -> Self {
        Self {
            text: raw.text.clone(),
            conf: raw.conf,
            bbox: raw.bbox(),
            block_num: raw.block_num,
            par_num: raw.par_num,
            line_num: raw.line_key(),
            flag: false,
        }
    }

    /// Non-empty and made only of numeric characters.
    pub fn is_numeric(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_numeric)
    }

    /// Integer value of the text, if it has one.
    pub fn number(&self) -> Option<i64> {
        self.text.trim().parse().ok()
    }

    /// Splits on an internal separator; empty pieces are dropped and each
    /// piece keeps the source box.
    pub fn split_on(&self, separator: char) -> Vec<Token> {
        if !self.text.contains(separator) {
            return vec![self.clone()];
        }
        self.text
            .split(separator)
            .filter(|piece| !piece.is_empty())
            .map(|piece| Token {
                text: piece.to_string(),
                ..self.clone()
            })
            .collect()
    }

    /// Joins two tokens that recognition split apart.
    pub fn merge(a: &Token, b: &Token) -> Token {
        Token {
            text: format!("{} {}", a.text, b.text),
            conf: a.conf.min(b.conf),
            bbox: a.bbox.envelope(&b.bbox),
            block_num: a.block_num,
            par_num: a.par_num,
            line_num: a.line_num,
            flag: a.flag || b.flag,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressPair {
    pub new: Token,
    pub old: Token,
}

impl AddressPair {
    pub fn new(new: Token, old: Token) -> Self {
        Self { new, old }
    }

    pub fn flagged(&self) -> bool {
        self.new.flag || self.old.flag
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Street {
    pub name: String,
    pub page_id: String,
    pub pairs: Vec<AddressPair>,
}

impl Street {
    pub fn new(name: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_id: page_id.into(),
            pairs: Vec::new(),
        }
    }

    pub fn push(&mut self, pair: AddressPair) {
        self.pairs.push(pair);
    }

    pub fn records(&self, column: usize) -> Vec<Record> {
        self.pairs
            .iter()
            .map(|pair| Record {
                page: self.page_id.clone(),
                column,
                line_num: pair.new.line_num,
                street: self.name.clone(),
                new: pair.new.text.clone(),
                old: pair.old.text.clone(),
                new_conf: pair.new.conf,
                old_conf: pair.old.conf,
                new_bbox: pair.new.bbox.to_string(),
                old_bbox: pair.old.bbox.to_string(),
                flag: pair.flagged(),
            })
            .collect()
    }
}

/// One emitted address pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub page: String,
    pub column: usize,
    pub line_num: u32,
    pub street: String,
    pub new: String,
    pub old: String,
    pub new_conf: f32,
    pub old_conf: f32,
    pub new_bbox: String,
    pub old_bbox: String,
    pub flag: bool,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub id: usize,
    /// Horizontal extent on the prepared page, when segmented here.
    pub span: Option<Span>,
    pub streets: Vec<Street>,
}

impl Column {
    pub fn records(&self) -> Vec<Record> {
        self.streets
            .iter()
            .flat_map(|street| street.records(self.id))
            .collect()
    }

    /// Street of the last emitted record; what the next column continues.
    pub fn handoff_street(&self) -> Option<&str> {
        self.streets
            .iter()
            .rev()
            .find(|street| !street.pairs.is_empty())
            .map(|street| street.name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub id: String,
    pub columns: Vec<Column>,
    pub continuation: Option<String>,
}

impl Page {
    pub fn records(&self) -> Vec<Record> {
        self.columns.iter().flat_map(Column::records).collect()
    }

    /// Street name a following page would continue with.
    pub fn last_street(&self) -> Option<&str> {
        self.columns
            .iter()
            .rev()
            .find_map(Column::handoff_street)
            .or(self.continuation.as_deref())
    }
}
