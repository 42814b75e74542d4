use tracing::debug;

use crate::core::model::RawToken;
use crate::core::stats::mode;

/// Tokens that are always recognition noise.
const FILTER_OUT: &[&str] = &["|"];
/// Characters printed rules tend to be read as.
const RULE_CHARS: &[char] = &['—', '.', '_', '-', '~', '='];

/// Drops tokens that cannot belong to an address row: heights far from the
/// modal word height, stray separators, and runs of rule characters.
pub fn prepare_tokens(tokens: Vec<RawToken>) -> Vec<RawToken> {
    let Some(height_mode) = mode(tokens.iter().map(|t| t.height)) else {
        return tokens;
    };
    let height_mode = f64::from(height_mode);
    let before = tokens.len();

    let kept: Vec<RawToken> = tokens
        .into_iter()
        .filter(|t| {
            let h = f64::from(t.height);
            h <= height_mode * 3.0 && h > height_mode * 0.75
        })
        .filter(|t| !FILTER_OUT.contains(&t.text.as_str()))
        .filter(|t| !is_rule_text(&t.text))
        .collect();

    debug!(before, after = kept.len(), height_mode, "filtered tokens");
    kept
}

/// True when nothing but rule characters and whitespace remain.
fn is_rule_text(text: &str) -> bool {
    text.chars()
        .filter(|c| !RULE_CHARS.contains(c))
        .all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, height: i32) -> RawToken {
        RawToken {
            text: text.to_string(),
            conf: 90.0,
            left: 0,
            top: 0,
            width: 20,
            height,
            block_num: 1,
            par_num: 1,
            line_num: 1,
        }
    }

    #[test]
    fn drops_noise_tokens() {
        let tokens = vec![
            raw("101", 40),
            raw("45", 40),
            raw("|", 40),
            raw("--_—", 40),
            raw("103", 40),
            raw("tiny", 20),
            raw("banner", 130),
            raw("Main Street", 60),
        ];
        let kept: Vec<String> = prepare_tokens(tokens).into_iter().map(|t| t.text).collect();
        assert_eq!(kept, vec!["101", "45", "103", "Main Street"]);
    }

    #[test]
    fn rule_text_detection() {
        assert!(is_rule_text("..--=="));
        assert!(!is_rule_text("1.5"));
    }
}
