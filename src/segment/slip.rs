use image::{imageops, GrayImage};
use tracing::{debug, warn};

use crate::core::geometry::BBox;
use crate::core::stats::run_lengths;
use crate::segment::histogram::{binarize, histogram, max_value, Axis};
use crate::segment::rows::{divide_into_rows, CONTENT_THRESHOLD};

/// Column-projection value above which a pixel column is not whitespace.
pub const WHITESPACE_THRESHOLD: f64 = 5.0;
/// Minimum vertical coverage of a centerline relative to the row's best.
const MIN_FILL_RATIO: f64 = 0.78;
const MAX_LINE_WIDTH: usize = 12;
const SPURIOUS_LINE_WIDTH: usize = 15;
/// Bands this short are not worth splitting.
const MIN_SLIP_HEIGHT: i32 = 10;

/// A row split at its centerline. `old` is absent when no line was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlipSplit {
    pub new: BBox,
    pub old: Option<BBox>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    width: usize,
    /// Mean column sum normalized by row height.
    density: f64,
}

/// Finds the thin vertical rule near the middle of a row image and splits the
/// row on either side of it.
pub fn divide_slip(row: &GrayImage, threshold: f64) -> SlipSplit {
    let (width, height) = row.dimensions();
    let full = SlipSplit {
        new: BBox::new(0, 0, width as i32, height as i32),
        old: None,
    };
    if width == 0 || height == 0 {
        return full;
    }

    let hist = histogram(row, Axis::X);
    let mask: Vec<bool> = hist.iter().map(|&v| v > threshold).collect();

    let center = f64::from(width) / 2.0;
    let window = f64::from(width) / 20.0;
    let mut candidates = Vec::new();
    let mut start = 0;
    for (len, ink) in run_lengths(&mask) {
        if ink && (start as f64 - center).abs() < window {
            let sum: f64 = hist[start..start + len].iter().sum();
            candidates.push(Candidate {
                start,
                width: len,
                density: sum / (len as f64 * f64::from(height)),
            });
        }
        start += len;
    }
    debug!(?candidates, "centerline candidates");

    if candidates.is_empty() {
        return full;
    }

    let binary = binarize(row);
    let row_fill = max_value(&hist) / f64::from(height);
    let mut lines: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| {
            vertical_coverage(&binary, c.start, c.width) / row_fill > MIN_FILL_RATIO
                && c.width <= MAX_LINE_WIDTH
        })
        .collect();

    if lines.len() > 1 {
        warn!(
            count = lines.len(),
            "more than one possible center line detected, choosing the thickest"
        );
        lines.sort_by(|a, b| b.density.total_cmp(&a.density));
    }
    let Some(line) = lines.first() else {
        return full;
    };
    if line.width > SPURIOUS_LINE_WIDTH {
        return full;
    }

    let end = line.start + line.width;
    SlipSplit {
        new: BBox::new(0, 0, line.start as i32, height as i32),
        old: Some(BBox::new(end as i32 + 1, 0, width as i32, height as i32)),
    }
}

/// Fraction of pixel rows with any ink inside `[start, start + width)`.
fn vertical_coverage(binary: &GrayImage, start: usize, width: usize) -> f64 {
    let height = binary.height();
    let covered = (0..height)
        .filter(|&y| (start..start + width).any(|x| binary.get_pixel(x as u32, y)[0] > 0))
        .count();
    covered as f64 / f64::from(height)
}

/// One row band of a column and its new/old halves, in column coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slip {
    pub band: BBox,
    pub new: BBox,
    pub old: Option<BBox>,
}

/// Row bands of a column, each split at its centerline.
pub fn extract_slips(column: &GrayImage) -> Vec<Slip> {
    divide_into_rows(column, CONTENT_THRESHOLD)
        .into_iter()
        .filter(|band| band.height() > MIN_SLIP_HEIGHT)
        .map(|band| {
            let row = imageops::crop_imm(
                column,
                band.left as u32,
                band.top as u32,
                band.width() as u32,
                band.height() as u32,
            )
            .to_image();
            let split = divide_slip(&row, WHITESPACE_THRESHOLD);
            let shift = |b: BBox| BBox::new(b.left, b.top + band.top, b.right, b.bot + band.top);
            Slip {
                band,
                new: shift(split.new),
                old: split.old.map(shift),
            }
        })
        .collect()
}
