use crate::core::stats::mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn of(value: i64) -> Self {
        if value.rem_euclid(2) == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }
}

/// Parity shared by most defined values; ties count as even.
pub fn majority_parity(values: &[Option<i64>]) -> Option<Parity> {
    mode(values.iter().flatten().map(|v| v.rem_euclid(2))).map(Parity::of)
}

/// Clears every value not of parity `keep`. Returns how many were cleared.
pub fn keep_parity(values: &mut [Option<i64>], keep: Parity) -> usize {
    let mut cleared = 0;
    for value in values.iter_mut() {
        if matches!(value, Some(v) if Parity::of(*v) != keep) {
            *value = None;
            cleared += 1;
        }
    }
    cleared
}

/// Squared count of defined peers whose order relative to `values[i]`
/// contradicts a strictly increasing sequence, over the sequence length.
pub fn order_score(values: &[Option<i64>], i: usize) -> f64 {
    let Some(current) = values[i] else {
        return 0.0;
    };
    let mismatches = values
        .iter()
        .enumerate()
        .filter_map(|(n, v)| v.map(|v| (n, v)))
        .filter(|&(n, v)| (current > v) != (n < i))
        .count();
    (mismatches * mismatches) as f64 / values.len() as f64
}

/// Clears values scoring above 1, front to back, each score taken after
/// the earlier clears. Returns how many were cleared.
pub fn clear_out_of_order(values: &mut [Option<i64>]) -> usize {
    let mut cleared = 0;
    for i in 0..values.len() {
        if values[i].is_some() && order_score(values, i) > 1.0 {
            values[i] = None;
            cleared += 1;
        }
    }
    cleared
}
