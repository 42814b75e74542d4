use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::confidence::ColumnSummary;
use crate::core::geometry::Span;
use crate::core::model::{Page, Record};
use crate::export::Exporter;

#[derive(Serialize)]
struct ColumnJson {
    id: usize,
    span: Option<Span>,
    summary: ColumnSummary,
    records: Vec<Record>,
}

#[derive(Serialize)]
struct PageJson<'a> {
    id: &'a str,
    continuation: Option<&'a str>,
    columns: Vec<ColumnJson>,
}

/// Writes `page.json`: per-column summaries alongside the records.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, page: &Page) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        let columns = page
            .columns
            .iter()
            .map(|column| {
                let records = column.records();
                ColumnJson {
                    id: column.id,
                    span: column.span,
                    summary: ColumnSummary::from_records(&records),
                    records,
                }
            })
            .collect();
        let doc = PageJson {
            id: &page.id,
            continuation: page.continuation.as_deref(),
            columns,
        };
        let data = serde_json::to_string_pretty(&doc)?;
        fs::write(self.out_dir.join("page.json"), data)?;
        Ok(())
    }
}
