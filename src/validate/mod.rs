pub mod checks;
pub mod divide;

pub use checks::{clear_out_of_order, keep_parity, majority_parity, order_score, Parity};
pub use divide::{divide_into_columns, SubColumns};

use tracing::{debug, info};

use crate::core::model::Street;

/// Checks one printed sub-column: values of the wrong parity and values out
/// of increasing order are flagged on their `new` token. Returns the number
/// of entries left without a trusted value, unparsable ones included.
fn check_sub_column(street: &mut Street, indices: &[usize], keep: Option<Parity>) -> usize {
    let mut values: Vec<Option<i64>> = indices
        .iter()
        .map(|&i| street.pairs[i].new.number())
        .collect();

    if let Some(parity) = keep {
        keep_parity(&mut values, parity);
    }
    clear_out_of_order(&mut values);

    let mut errors = 0;
    for (&i, value) in indices.iter().zip(&values) {
        if value.is_none() {
            let new = &mut street.pairs[i].new;
            debug!("{} doesn't seem right in row {}", new.text, new.line_num);
            new.flag = true;
            errors += 1;
        }
    }
    errors
}

/// Flags numbering anomalies in a street and returns how many were found.
///
/// With two sub-columns the left one is expected odd and the right one
/// even. A single sub-column keeps whichever parity most of its numbers
/// share.
pub fn validate(street: &mut Street) -> usize {
    let SubColumns { left, right } = divide_into_columns(&street.pairs);

    let left_parity = if right.is_empty() {
        let values: Vec<Option<i64>> = left.iter().map(|&i| street.pairs[i].new.number()).collect();
        let majority = majority_parity(&values);
        debug!("{}: a single {:?} column", street.name, majority);
        majority
    } else {
        debug!("{}: column 1 is odd and column 2 is even", street.name);
        Some(Parity::Odd)
    };

    let mut errors = check_sub_column(street, &left, left_parity);
    if !right.is_empty() {
        errors += check_sub_column(street, &right, Some(Parity::Even));
    }

    info!(
        "{}: {} pairs, {} numeric order errors",
        street.name,
        street.pairs.len(),
        errors
    );
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::{AddressPair, Token};
    use pretty_assertions::assert_eq;

    fn token(text: &str, left: i32, line: u32) -> Token {
        Token {
            text: text.to_string(),
            conf: 90.0,
            bbox: BBox::new(left, line as i32 * 40, left + 40, line as i32 * 40 + 30),
            block_num: 1,
            par_num: 1,
            line_num: line,
            flag: false,
        }
    }

    fn street(news: &[&str]) -> Street {
        let mut street = Street::new("Main Street", "p1");
        for (line, new) in news.iter().enumerate() {
            street.push(AddressPair::new(token(new, 0, line as u32), token("17", 60, line as u32)));
        }
        street
    }

    fn flags(street: &Street) -> Vec<bool> {
        street.pairs.iter().map(AddressPair::flagged).collect()
    }

    #[test]
    fn clean_odd_run_has_no_errors() {
        let mut s = street(&["101", "103", "105", "107"]);
        assert_eq!(validate(&mut s), 0);
        assert_eq!(flags(&s), vec![false; 4]);
    }

    #[test]
    fn minority_parity_is_flagged() {
        let mut s = street(&["101", "103", "104", "107"]);
        assert_eq!(validate(&mut s), 1);
        assert_eq!(flags(&s), vec![false, false, true, false]);
    }

    #[test]
    fn out_of_order_value_is_flagged() {
        let mut s = street(&["101", "103", "105", "999", "109", "111", "113"]);
        assert_eq!(validate(&mut s), 1);
        assert!(s.pairs[3].new.flag);
        assert!(!s.pairs[3].old.flag);
    }

    #[test]
    fn non_numeric_entries_count_as_errors() {
        let mut s = street(&["101", "1O3", "105"]);
        assert_eq!(validate(&mut s), 1);
        assert_eq!(flags(&s), vec![false, true, false]);
    }

    #[test]
    fn two_sub_columns_expect_odd_then_even() {
        let mut s = Street::new("Elm Street", "p1");
        let rows = [("101", "2"), ("103", "4"), ("106", "7"), ("107", "8")];
        for (line, (odd, even)) in rows.iter().enumerate() {
            let line = line as u32;
            s.push(AddressPair::new(token(odd, 0, line), token("1", 60, line)));
            s.push(AddressPair::new(token(even, 200, line), token("2", 260, line)));
        }
        assert_eq!(validate(&mut s), 2);
        let flagged: Vec<&str> = s
            .pairs
            .iter()
            .filter(|p| p.new.flag)
            .map(|p| p.new.text.as_str())
            .collect();
        assert_eq!(flagged, vec!["106", "7"]);
    }
}
