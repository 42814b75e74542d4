use crate::core::model::{AddressPair, Token};

/// What a data row turned out to hold.
#[derive(Debug, Clone, PartialEq)]
pub enum RowParse {
    /// Column heading or continuation marker; nothing to record.
    Heading,
    Pairs(Vec<AddressPair>),
    Unparsable,
}

fn is_heading(first: &Token) -> bool {
    first.text.starts_with("CONTINUED") || matches!(first.text.as_str(), "Odd" | "Old" | "New")
}

fn pair(new: &Token, old: &Token) -> AddressPair {
    AddressPair::new(new.clone(), old.clone())
}

fn merged(a: &Token, b: &Token) -> Token {
    Token::merge(a, b)
}

/// Reconstructs `(new, old)` pairs from one row of tokens, choosing the
/// layout by token count and which tokens are numeric.
///
/// Layouts recognized (N = numeric, x = any, `a+b` = tokens merged):
///
/// | tokens | mask         | pairs                          |
/// |--------|--------------|--------------------------------|
/// | 2      | any          | (t0, t1)                       |
/// | 3      | N, one of t1/t2 N | (t0, t1+t2)               |
/// | 4      | N x N x      | (t0, t1), (t2, t3)             |
/// | 5      | N x N, not t3&t4 N | (t0, t1), (t2, t3+t4)    |
/// | 5      | N, not t1&t2 N | (t0, t1+t2), (t3, t4)        |
/// | 6      | N . . N, one of t1/t2 and t4/t5 N | (t0, t1+t2), (t0, t4+t5) |
pub fn parse_row(tokens: &[Token]) -> RowParse {
    let Some(first) = tokens.first() else {
        return RowParse::Unparsable;
    };
    if is_heading(first) {
        return RowParse::Heading;
    }

    let t = tokens;
    let mask: Vec<bool> = t.iter().map(Token::is_numeric).collect();
    let pairs = match mask.as_slice() {
        [_, _] => vec![pair(&t[0], &t[1])],
        [true, n1, n2] if *n1 || *n2 => vec![pair(&t[0], &merged(&t[1], &t[2]))],
        [true, _, true, _] => vec![pair(&t[0], &t[1]), pair(&t[2], &t[3])],
        [true, _, true, n3, n4] if !(*n3 && *n4) => {
            vec![pair(&t[0], &t[1]), pair(&t[2], &merged(&t[3], &t[4]))]
        }
        [true, n1, n2, _, _] if !(*n1 && *n2) => {
            vec![pair(&t[0], &merged(&t[1], &t[2])), pair(&t[3], &t[4])]
        }
        // The second pair reuses t0 as its new number; t3 is never emitted.
        [true, n1, n2, true, n4, n5] if (*n1 || *n2) && (*n4 || *n5) => vec![
            pair(&t[0], &merged(&t[1], &t[2])),
            pair(&t[0], &merged(&t[4], &t[5])),
        ],
        _ => return RowParse::Unparsable,
    };
    RowParse::Pairs(pairs)
}
