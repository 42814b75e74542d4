use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::core::model::RawToken;
use crate::core::{Result, SlipError};
use crate::ocr::TokenSource;

/// Runs the `tesseract` binary and reads its word-level TSV output.
#[derive(Debug, Clone)]
pub struct OcrBridge {
    binary: PathBuf,
    tessdata_dir: Option<PathBuf>,
    model: String,
    psm: u32,
}

impl Default for OcrBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBridge {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            tessdata_dir: None,
            model: "1909".to_string(),
            psm: 6,
        }
    }

    pub fn with_binary(mut self, binary: PathBuf) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_tessdata_dir(mut self, dir: PathBuf) -> Self {
        self.tessdata_dir = Some(dir);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_psm(mut self, psm: u32) -> Self {
        self.psm = psm;
        self
    }

    fn command(&self, image_path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image_path).arg("stdout");
        if let Some(dir) = &self.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.arg("-l")
            .arg(&self.model)
            .arg("--psm")
            .arg(self.psm.to_string())
            .arg("tsv");
        cmd
    }
}

impl TokenSource for OcrBridge {
    fn recognize(&self, image_path: &Path) -> Result<Vec<RawToken>> {
        info!(image = %image_path.display(), model = %self.model, "running recognition");
        let output = self.command(image_path).output().map_err(|err| {
            SlipError::Recognizer(format!(
                "failed to invoke {}: {err}",
                self.binary.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlipError::Recognizer(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let tokens = parse_tsv(&stdout)?;
        debug!(count = tokens.len(), "parsed word records");
        Ok(tokens)
    }
}

/// Reads word-level (level 5) records from tesseract TSV output. Records with
/// empty text or negative confidence are skipped.
pub fn parse_tsv(tsv: &str) -> Result<Vec<RawToken>> {
    let mut tokens = Vec::new();
    for (idx, row) in tsv.lines().enumerate() {
        if idx == 0 || row.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            return Err(SlipError::TokenStream(format!(
                "line {}: expected 12 fields, found {}",
                idx + 1,
                cols.len()
            )));
        }
        if cols[0] != "5" {
            continue;
        }
        let text = cols[11].trim();
        let conf: f32 = field(cols[10], idx)?;
        if text.is_empty() || conf < 0.0 {
            continue;
        }
        let token = RawToken {
            text: text.to_string(),
            conf,
            left: field(cols[6], idx)?,
            top: field(cols[7], idx)?,
            width: field(cols[8], idx)?,
            height: field(cols[9], idx)?,
            block_num: field(cols[2], idx)?,
            par_num: field(cols[3], idx)?,
            line_num: field(cols[4], idx)?,
        };
        if !token.bbox().is_well_formed() {
            return Err(SlipError::TokenStream(format!(
                "line {}: negative box size",
                idx + 1
            )));
        }
        tokens.push(token);
    }
    Ok(tokens)
}

fn field<T: std::str::FromStr>(value: &str, idx: usize) -> Result<T> {
    value.trim().parse().map_err(|_| {
        SlipError::TokenStream(format!("line {}: bad numeric field {value:?}", idx + 1))
    })
}
