use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::core::error::Result;
use crate::core::model::{Record, Street};

pub const RECORD_FIELDS: [&str; 11] = [
    "page", "column", "line_num", "street", "new", "old", "new_conf", "old_conf", "new_bbox",
    "old_bbox", "flag",
];

/// Streams address-pair records as CSV. The header is written up front so
/// an empty column still yields a readable file.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        inner.write_record(RECORD_FIELDS)?;
        Ok(Self { inner })
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.inner.serialize(record)?;
        Ok(())
    }

    pub fn write_street(&mut self, street: &Street, column: usize) -> Result<()> {
        for record in street.records(column) {
            self.write_record(&record)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for record in rdr.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

#[derive(Deserialize)]
struct StreetField {
    street: String,
}

/// Street of the final record in a record stream.
pub fn last_street<R: Read>(reader: R) -> Result<Option<String>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut last = None;
    for row in rdr.deserialize::<StreetField>() {
        last = Some(row?.street);
    }
    Ok(last)
}

/// Last street emitted by the column before `column_id`, looked up as
/// `column-{id-1}-ocr.csv` next to `output_path`.
pub fn previous_street(column_id: usize, output_path: &Path) -> Result<Option<String>> {
    if column_id <= 1 {
        return Ok(None);
    }
    let previous = output_path.with_file_name(format!("column-{}-ocr.csv", column_id - 1));
    if !previous.exists() {
        warn!("can't find expected previous column {}", previous.display());
        return Ok(None);
    }
    info!("looking in {} for previous street name", previous.display());
    let street = last_street(File::open(&previous)?)?;
    if street.is_none() {
        warn!("can't find a previous street name in {}", previous.display());
    }
    Ok(street)
}
