use image::{imageops, GrayImage};
use tracing::{debug, error, info};

use crate::core::geometry::Span;
use crate::core::stats::median;
use crate::core::{Result, SlipError};
use crate::segment::deskew::{deskew, DeskewParams};
use crate::segment::histogram::{find_peaks, histogram, max_value, Axis};

/// Number of printed columns on a directory page.
pub const COLUMN_COUNT: usize = 5;
/// Divider peaks must reach this fraction of the tallest peak.
pub const PEAK_THRESHOLD: f64 = 0.75;
/// Allowed relative deviation of a divider gap from the median gap.
pub const GAP_TOLERANCE: f64 = 0.02;

/// Locates the four divider rules and returns the five column intervals,
/// left to right, covering `[0, width)`.
pub fn find_five_columns(image: &GrayImage) -> Result<Vec<Span>> {
    let width = image.width();
    let hist = histogram(image, Axis::X);
    let peaks = find_peaks(
        &hist,
        PEAK_THRESHOLD * max_value(&hist),
        f64::from(width) / 7.0,
    );
    debug!(?peaks, "divider candidates");

    let dividers = evenly_spaced(&peaks);
    if dividers.len() != COLUMN_COUNT - 1 {
        error!(?dividers, "found {} dividers, not 4", dividers.len());
        return Err(SlipError::Segmentation {
            found: dividers.len(),
        });
    }

    let mut spans = Vec::with_capacity(COLUMN_COUNT);
    let mut start = 0_u32;
    for &divider in &dividers {
        spans.push(Span::new(start, divider as u32));
        start = divider as u32;
    }
    spans.push(Span::new(start, width));
    Ok(spans)
}

/// Keeps peaks with at least one neighbour gap close to the median gap.
/// Page borders and stray marks sit at irregular distances and drop out.
fn evenly_spaced(peaks: &[usize]) -> Vec<usize> {
    let gaps: Vec<f64> = peaks
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64)
        .collect();
    let Some(median_gap) = median(&gaps) else {
        return Vec::new();
    };
    let regular = |gap: f64| (1.0 - gap / median_gap).abs() < GAP_TOLERANCE;

    peaks
        .iter()
        .enumerate()
        .filter(|&(i, _)| {
            let left = i > 0 && regular(gaps[i - 1]);
            let right = i < gaps.len() && regular(gaps[i]);
            left || right
        })
        .map(|(_, &peak)| peak)
        .collect()
}

/// Crops each column out of the page and straightens it on its own.
pub fn extract_columns(page: &GrayImage, params: &DeskewParams) -> Result<Vec<(Span, GrayImage)>> {
    let spans = find_five_columns(page)?;
    let height = page.height();
    let columns = spans
        .into_iter()
        .map(|span| {
            let crop = imageops::crop_imm(page, span.start, 0, span.len(), height).to_image();
            let straightened = deskew(&crop, Axis::X, params);
            (span, straightened.image)
        })
        .collect::<Vec<_>>();
    info!(count = columns.len(), "extracted columns");
    Ok(columns)
}
