pub mod csv_export;
pub mod failures;
pub mod json_export;

use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::Page;

pub use csv_export::{last_street, previous_street, read_records, RecordWriter};
pub use failures::write_failures;
pub use json_export::JsonExporter;

pub trait Exporter {
    fn export(&self, page: &Page) -> Result<()>;
}

/// Writes `page.csv` holding every record of the page.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for CsvExporter {
    fn export(&self, page: &Page) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let file = File::create(self.out_dir.join("page.csv"))?;
        let mut writer = RecordWriter::new(file)?;
        for record in page.records() {
            writer.write_record(&record)?;
        }
        writer.finish()?;
        Ok(())
    }
}
