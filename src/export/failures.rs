use std::io::Write;

use serde::Serialize;

use crate::core::error::Result;
use crate::parser::{ParseReport, Row};

#[derive(Serialize)]
struct FailureRow<'a> {
    row_key: String,
    block_num: u32,
    par_num: u32,
    line_num: u32,
    text: &'a str,
    error: &'a str,
}

/// Writes every token of every rejected row alongside its annotation.
pub fn write_failures<W: Write>(writer: W, rows: &[Row], report: &ParseReport) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;
    for row in rows {
        let Some(error) = report.annotations.get(&row.key) else {
            continue;
        };
        for token in &row.tokens {
            wtr.serialize(FailureRow {
                row_key: row.key.to_string(),
                block_num: row.key.block_num,
                par_num: row.key.par_num,
                line_num: row.key.line_num,
                text: &token.text,
                error,
            })?;
            written += 1;
        }
    }
    wtr.flush()?;
    Ok(written)
}
