use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::GrayImage;
use tracing::{info, warn};

use crate::core::error::SlipError;
use crate::core::geometry::Span;
use crate::core::model::{Column, Page, RawToken, Street};
use crate::export::{
    previous_street, read_records, write_failures, CsvExporter, Exporter, JsonExporter,
    RecordWriter,
};
use crate::ocr::{prepare_tokens, read_token_stream, write_token_stream, TokenSource};
use crate::parser::{
    group_rows, modal_row_height, parse_rows, KnownStreets, ParseOptions, ParseReport, Row,
};
use crate::segment::{extract_columns, extract_slips, prepare_page, DeskewParams, COLUMN_COUNT};
use crate::validate::validate;

pub const PAGE_CROP: &str = "page-crop.png";
pub const PAGE_HANDCROP: &str = "page-handcrop.png";
pub const PAGE_RECORDS: &str = "page.csv";
/// Marker file that lifts the rejected-row limit for a page.
pub const FORCE_MARKER: &str = "force-ocr";

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub deskew: DeskewParams,
    pub parse: ParseOptions,
}

impl PipelineConfig {
    pub fn new(deskew: DeskewParams, parse: ParseOptions) -> Self {
        Self { deskew, parse }
    }
}

/// A column's streets before the rejected-row gate and validation.
#[derive(Debug, Clone)]
pub struct ParsedColumn {
    pub rows: Vec<Row>,
    pub streets: Vec<Street>,
    pub report: ParseReport,
}

/// Groups tokens into rows and runs the street parser over them.
pub fn parse_column(
    tokens: &[RawToken],
    page_id: &str,
    continuation: Option<&str>,
    options: &ParseOptions,
) -> ParsedColumn {
    let rows = group_rows(tokens);
    let Some(modal_height) = modal_row_height(tokens) else {
        warn!("{page_id}: no tokens to parse");
        return ParsedColumn {
            rows,
            streets: Vec::new(),
            report: ParseReport::default(),
        };
    };
    let parse = parse_rows(
        &rows,
        page_id,
        modal_height,
        continuation,
        options.known_streets.as_ref(),
    );
    ParsedColumn {
        rows,
        streets: parse.streets,
        report: parse.report,
    }
}

/// Applies the rejected-row gate, then flags numbering anomalies.
pub fn finish_column(
    parsed: ParsedColumn,
    page_id: &str,
    column_id: usize,
    span: Option<Span>,
    options: &ParseOptions,
) -> Result<Column, SlipError> {
    parsed.report.enforce(page_id, options)?;
    let mut streets = parsed.streets;
    for street in &mut streets {
        validate(street);
    }
    Ok(Column {
        id: column_id,
        span,
        streets,
    })
}

pub fn process_column(
    tokens: &[RawToken],
    page_id: &str,
    column_id: usize,
    continuation: Option<&str>,
    options: &ParseOptions,
) -> Result<Column, SlipError> {
    let parsed = parse_column(tokens, page_id, continuation, options);
    finish_column(parsed, page_id, column_id, None, options)
}

/// Reconstructs a whole page. Columns are handled in order, each one
/// continuing the street the previous one ended in.
pub fn process_page(
    page_id: &str,
    columns: Vec<(Span, Vec<RawToken>)>,
    continuation: Option<String>,
    options: &ParseOptions,
) -> Result<Page, SlipError> {
    let mut page = Page {
        id: page_id.to_string(),
        columns: Vec::with_capacity(columns.len()),
        continuation,
    };
    let mut carry = page.continuation.clone();
    for (idx, (span, tokens)) in columns.into_iter().enumerate() {
        let parsed = parse_column(&tokens, page_id, carry.as_deref(), options);
        let column = finish_column(parsed, page_id, idx + 1, Some(span), options)?;
        carry = column.handoff_street().map(str::to_string);
        if carry.is_none() {
            warn!("{page_id}: column {} emitted no records", idx + 1);
        }
        page.columns.push(column);
    }
    Ok(page)
}

fn load_gray(path: &Path) -> Result<GrayImage> {
    let img = image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;
    Ok(img.to_luma8())
}

/// Deskews and crops a scanned page. A `page-handcrop.png` beside the page
/// is used as-is unless `force` is set.
pub fn prepare_page_file(page: &Path, output: &Path, force: bool, params: &DeskewParams) -> Result<()> {
    let handcrop = page.with_file_name(PAGE_HANDCROP);
    if handcrop.exists() && !force {
        info!("using hand-cropped {}", handcrop.display());
        fs::copy(&handcrop, output)
            .with_context(|| format!("Failed to copy {}", handcrop.display()))?;
        return Ok(());
    }
    let prepared = prepare_page(&load_gray(page)?, params)
        .with_context(|| format!("Failed to crop page: {}", page.display()))?;
    prepared.save(output)?;
    Ok(())
}

/// Writes `column-1.png` … `column-5.png` into `out_dir`.
pub fn split_page_file(page: &Path, out_dir: &Path, params: &DeskewParams) -> Result<Vec<PathBuf>> {
    let columns = extract_columns(&load_gray(page)?, params)
        .with_context(|| format!("Failed to split page into columns: {}", page.display()))?;
    fs::create_dir_all(out_dir)?;
    let mut paths = Vec::with_capacity(columns.len());
    for (idx, (span, image)) in columns.iter().enumerate() {
        let path = out_dir.join(format!("column-{}.png", idx + 1));
        info!(start = span.start, end = span.end, "writing {}", path.display());
        image.save(&path)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Recognizes a column image and writes the filtered token stream.
pub fn recognize_column_file(source: &dyn TokenSource, image: &Path, output: &Path) -> Result<usize> {
    let tokens = source
        .recognize(image)
        .with_context(|| format!("Failed to recognize {}", image.display()))?;
    let tokens = prepare_tokens(tokens);
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_token_stream(file, &tokens)?;
    Ok(tokens.len())
}

/// Column number encoded in a `column-N…` file name.
pub fn column_id_from_path(path: &Path) -> Result<usize> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let digits: String = stem
        .strip_prefix("column-")
        .unwrap_or_default()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    match digits.parse() {
        Ok(id) => Ok(id),
        Err(_) => bail!("Not a column file: {}", path.display()),
    }
}

fn page_id_from_path(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parses a column token stream into `output` records. The continuation is
/// read from the previous column's records beside `output`; rejected rows
/// go to `errors` when given.
pub fn parse_column_file(
    input: &Path,
    output: &Path,
    errors: Option<&Path>,
    options: &ParseOptions,
) -> Result<Column> {
    let column_id = column_id_from_path(input)?;
    let page_id = page_id_from_path(input);

    let mut options = options.clone();
    if input.with_file_name(FORCE_MARKER).exists() {
        info!("{page_id}: force marker present");
        options.force = true;
    }

    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let tokens = read_token_stream(file)
        .with_context(|| format!("Failed to read tokens from {}", input.display()))?;
    let continuation = previous_street(column_id, output)?;

    let parsed = parse_column(&tokens, &page_id, continuation.as_deref(), &options);
    if let Some(path) = errors {
        if parsed.report.failures > 0 {
            let written = write_failures(File::create(path)?, &parsed.rows, &parsed.report)?;
            info!("wrote {written} rejected tokens to {}", path.display());
        }
    }
    let column = match finish_column(parsed, &page_id, column_id, None, &options) {
        Ok(column) => column,
        Err(err) => {
            if output.exists() {
                fs::remove_file(output)
                    .with_context(|| format!("Failed to remove stale {}", output.display()))?;
                warn!("removed stale {}", output.display());
            }
            return Err(err).with_context(|| format!("Failed to parse column {}", input.display()));
        }
    };

    let mut writer = RecordWriter::new(File::create(output)?)?;
    for street in &column.streets {
        writer.write_street(street, column_id)?;
    }
    writer.finish()?;
    Ok(column)
}

/// Writes each row's halves as `{stem}-{row:02}-{0,1}.png`.
pub fn extract_slips_file(column: &Path, out_dir: &Path) -> Result<usize> {
    let image = load_gray(column)?;
    let stem = column
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "column".to_string());
    fs::create_dir_all(out_dir)?;

    let slips = extract_slips(&image);
    for (idx, slip) in slips.iter().enumerate() {
        let halves = std::iter::once(slip.new).chain(slip.old);
        for (half, bbox) in halves.enumerate() {
            let crop = image::imageops::crop_imm(
                &image,
                bbox.left as u32,
                bbox.top as u32,
                bbox.width() as u32,
                bbox.height() as u32,
            )
            .to_image();
            crop.save(out_dir.join(format!("{stem}-{idx:02}-{half}.png")))?;
        }
    }
    Ok(slips.len())
}

/// Concatenates `column-N-ocr.csv` records of a page directory into `page.csv`.
pub fn combine_page(page_dir: &Path) -> Result<usize> {
    let page_id = page_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut writer = RecordWriter::new(File::create(page_dir.join(PAGE_RECORDS))?)?;
    let mut count = 0;
    for column_id in 1..=COLUMN_COUNT {
        let path = page_dir.join(format!("column-{column_id}-ocr.csv"));
        if !path.exists() {
            warn!("{page_id}: missing {}", path.display());
            continue;
        }
        for record in read_records(File::open(&path)?)? {
            writer.write_record(&record)?;
            count += 1;
        }
    }
    writer.finish()?;
    Ok(count)
}

/// Writes `page.csv` and `page.json` for an in-memory page.
pub fn export_page(page: &Page, out_dir: &Path) -> Result<()> {
    CsvExporter::new(out_dir.to_path_buf()).export(page)?;
    JsonExporter::new(out_dir.to_path_buf()).export(page)?;
    Ok(())
}

/// Builds the identity dictionary of every street in a record file.
pub fn build_known_streets(records: &Path, output: &Path) -> Result<KnownStreets> {
    let records = read_records(File::open(records)?)
        .with_context(|| format!("Failed to read records from {}", records.display()))?;
    let known = KnownStreets::from_records(&records);
    known.save(output)?;
    Ok(known)
}

/// Page directories stuck at each stage of the workflow. A page is listed
/// only under the first stage it is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Survey {
    pub uncropped: Vec<String>,
    pub unsplit: Vec<String>,
    pub unrecognized: Vec<String>,
}

impl Survey {
    pub fn is_clean(&self) -> bool {
        self.uncropped.is_empty() && self.unsplit.is_empty() && self.unrecognized.is_empty()
    }
}

pub fn survey(working_dir: &Path) -> Result<Survey> {
    let mut pages: Vec<PathBuf> = fs::read_dir(working_dir)
        .with_context(|| format!("Failed to read {}", working_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    pages.sort();

    let mut result = Survey::default();
    for page in pages {
        let name = page
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !page.join(PAGE_CROP).exists() {
            result.uncropped.push(name);
        } else if !page.join("column-1.png").exists() {
            result.unsplit.push(name);
        } else if !page.join(PAGE_RECORDS).exists() {
            result.unrecognized.push(name);
        }
    }
    Ok(result)
}
