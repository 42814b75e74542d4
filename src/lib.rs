pub mod core;
pub mod export;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod segment;
pub mod validate;

pub use crate::core::model::{AddressPair, Column, Page, RawToken, Record, Street, Token};
pub use crate::core::{Result, SlipError};
