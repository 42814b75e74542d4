pub mod bridge;
pub mod filter;
pub mod stream;

use std::path::Path;

use crate::core::model::RawToken;
use crate::core::Result;

pub use bridge::OcrBridge;
pub use filter::prepare_tokens;
pub use stream::{read_token_stream, write_token_stream};

/// Anything that turns a column image into word tokens.
pub trait TokenSource {
    fn recognize(&self, image_path: &Path) -> Result<Vec<RawToken>>;
}
