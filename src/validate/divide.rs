use tracing::debug;

use crate::core::model::AddressPair;

/// Positions of a street's pairs in its left and right printed sub-columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubColumns {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

/// Splits pairs at the `new` edge of the pair whose `old` starts furthest
/// right. Pairs whose `new` ends at or before that edge form the left
/// sub-column. The first sub-column returned is never empty unless both are.
pub fn divide_into_columns(pairs: &[AddressPair]) -> SubColumns {
    let mut furthest_old = 0;
    let mut split_x = 0;
    for pair in pairs {
        if pair.old.bbox.left > furthest_old {
            furthest_old = pair.old.bbox.left;
            split_x = pair.new.bbox.left;
        }
    }

    let (left, right): (Vec<usize>, Vec<usize>) =
        (0..pairs.len()).partition(|&i| pairs[i].new.bbox.right <= split_x);
    debug!("found {} left pairs and {} right pairs", left.len(), right.len());

    if left.is_empty() {
        SubColumns { left: right, right: left }
    } else {
        SubColumns { left, right }
    }
}
