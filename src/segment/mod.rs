pub mod columns;
pub mod crop;
pub mod deskew;
pub mod histogram;
pub mod rows;
pub mod slip;

pub use columns::{extract_columns, find_five_columns, COLUMN_COUNT};
pub use crop::{crop_below_top_rule, prepare_page};
pub use deskew::{deskew, DeskewParams, Deskewed};
pub use histogram::{histogram, project, Axis};
pub use rows::divide_into_rows;
pub use slip::{divide_slip, extract_slips, Slip, SlipSplit};
