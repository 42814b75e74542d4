use serde::{Deserialize, Serialize};

/// Axis-aligned pixel box. `right` and `bot` are exclusive edges
/// (`right = left + width`, `bot = top + height`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bot: i32,
}

impl BBox {
    pub fn new(left: i32, top: i32, right: i32, bot: i32) -> Self {
        Self {
            left,
            top,
            right,
            bot,
        }
    }

    pub fn from_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bot - self.top).max(0)
    }

    pub fn is_well_formed(&self) -> bool {
        self.left <= self.right && self.top <= self.bot
    }

    /// Smallest box enclosing both.
    pub fn envelope(&self, other: &Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bot: self.bot.max(other.bot),
        }
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bot
        )
    }
}

/// Half-open pixel interval `[start, end)` along one axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
