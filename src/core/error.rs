use thiserror::Error;

/// Errors raised by the segmentation and reconstruction stages.
#[derive(Debug, Error)]
pub enum SlipError {
    #[error("expected 4 column dividers, found {found}")]
    Segmentation { found: usize },

    #[error("no horizontal rule found at the top of the page")]
    TopRuleNotFound,

    #[error(
        "too many rejected rows: {failures} of {total} ({pct:.1}%)",
        total = .failures + .successes,
        pct = failure_percent(.failures, .successes)
    )]
    ErrorRateExceeded { failures: usize, successes: usize },

    #[error("malformed token stream: {0}")]
    TokenStream(String),

    #[error("recognition engine failed: {0}")]
    Recognizer(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn failure_percent(failures: &usize, successes: &usize) -> f64 {
    let total = (failures + successes).max(1);
    100.0 * *failures as f64 / total as f64
}

pub type Result<T> = std::result::Result<T, SlipError>;
