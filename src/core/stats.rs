/// Median with the midpoint average for even-length input.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value; ties resolve to the smallest.
pub fn mode<T: Ord + Copy>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut sorted: Vec<T> = values.into_iter().collect();
    sorted.sort_unstable();

    let mut best: Option<(T, usize)> = None;
    let mut iter = sorted.into_iter().peekable();
    while let Some(value) = iter.next() {
        let mut count = 1;
        while iter.peek() == Some(&value) {
            iter.next();
            count += 1;
        }
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Population variance.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Collapses a mask into `(run_length, value)` pairs.
pub fn run_lengths(mask: &[bool]) -> Vec<(usize, bool)> {
    let mut runs: Vec<(usize, bool)> = Vec::new();
    for &value in mask {
        match runs.last_mut() {
            Some((len, v)) if *v == value => *len += 1,
            _ => runs.push((1, value)),
        }
    }
    runs
}

/// `value * (1 - pct) <= x <= value * (1 + pct)`
pub fn within(x: f64, pct: f64, value: f64) -> bool {
    value * (1.0 - pct) <= x && x <= value * (1.0 + pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn mode_prefers_smallest_on_tie() {
        assert_eq!(mode([40, 38, 40, 38, 12]), Some(38));
        assert_eq!(mode([5, 7, 7]), Some(7));
        assert_eq!(mode(Vec::<i32>::new()), None);
    }

    #[test]
    fn run_lengths_alternate() {
        let mask = [true, true, false, true, false, false];
        assert_eq!(
            run_lengths(&mask),
            vec![(2, true), (1, false), (1, true), (2, false)]
        );
    }

    #[test]
    fn variance_of_constant_is_zero() {
        assert_eq!(variance(&[2.0, 2.0, 2.0]), 0.0);
        assert_eq!(variance(&[0.0, 2.0]), 1.0);
    }
}
