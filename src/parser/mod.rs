pub mod grouper;
pub mod known_streets;
pub mod shape;
pub mod street;

pub use grouper::{group_rows, modal_row_height, Row, RowKey};
pub use known_streets::KnownStreets;
pub use shape::{parse_row, RowParse};
pub use street::{parse_rows, ColumnParse, ParseOptions, ParseReport, ParserState, StreetParser};
