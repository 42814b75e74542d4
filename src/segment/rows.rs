use image::GrayImage;
use tracing::debug;

use crate::core::geometry::BBox;
use crate::core::stats::{median, run_lengths};
use crate::segment::histogram::{histogram, Axis};

/// Row-projection value above which a pixel row holds content.
pub const CONTENT_THRESHOLD: f64 = 10.0;
/// Content runs shorter than this are specks, not rows.
pub const MIN_ROW_HEIGHT: usize = 17;

/// Splits a column image into horizontal row bands, top to bottom.
///
/// The median run length (content and whitespace alike) stands in for one
/// row's height. Content runs that are a near-exact multiple of it are cut
/// into that many equal bands; whitespace is dropped.
pub fn divide_into_rows(column: &GrayImage, threshold: f64) -> Vec<BBox> {
    let width = column.width() as i32;
    let hist = histogram(column, Axis::Y);
    let mask: Vec<bool> = hist.iter().map(|&v| v > threshold).collect();
    let runs = run_lengths(&mask);

    let lengths: Vec<f64> = runs.iter().map(|&(len, _)| len as f64).collect();
    let Some(median) = median(&lengths) else {
        return Vec::new();
    };

    let mut bands = Vec::new();
    let mut offset = 0.0_f64;
    for (len, content) in runs {
        let run = len as f64;
        if !content {
            debug!(len, "whitespace run");
        } else if len < MIN_ROW_HEIGHT {
            debug!(len, "short run skipped");
        } else if run > median * 1.1 && is_multiple_rows(run, median) {
            let count = (run / median).round();
            let step = run / count;
            debug!(len, count, step, "splitting merged rows");
            for i in 0..count as usize {
                let top = offset + step * i as f64;
                let bot = offset + step * (i + 1) as f64;
                bands.push(BBox::new(0, top.round() as i32, width, bot.round() as i32));
            }
        } else {
            bands.push(BBox::new(0, offset as i32, width, (offset + run) as i32));
        }
        offset += run;
    }
    bands
}

/// Whether `run` is within 5% of a whole number of `median`-high rows.
fn is_multiple_rows(run: f64, median: f64) -> bool {
    let remainder = run % median;
    let slop = (median - remainder).min(remainder);
    slop < median * 0.05
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use pretty_assertions::assert_eq;

    /// Stacks full-width ink runs (`true`) and paper runs (`false`).
    fn column_from_runs(width: u32, runs: &[(u32, bool)]) -> GrayImage {
        let height = runs.iter().map(|&(len, _)| len).sum();
        let mut img = GrayImage::from_pixel(width, height, Luma([255]));
        let mut y = 0;
        for &(len, ink) in runs {
            if ink {
                for row in y..y + len {
                    for x in 0..width {
                        img.put_pixel(x, row, Luma([0]));
                    }
                }
            }
            y += len;
        }
        img
    }

    fn heights(bands: &[BBox]) -> Vec<i32> {
        bands.iter().map(BBox::height).collect()
    }

    #[test]
    fn three_separated_rows() {
        let col = column_from_runs(
            60,
            &[(40, true), (10, false), (40, true), (10, false), (40, true), (10, false)],
        );
        let bands = divide_into_rows(&col, CONTENT_THRESHOLD);
        assert_eq!(heights(&bands), vec![40, 40, 40]);
        assert_eq!(bands[1], BBox::new(0, 50, 60, 90));
    }

    #[test]
    fn merged_run_is_split_evenly() {
        let col = column_from_runs(
            60,
            &[
                (40, true),
                (10, false),
                (40, true),
                (10, false),
                (80, true),
                (10, false),
                (40, true),
                (40, false),
                (40, true),
            ],
        );
        let bands = divide_into_rows(&col, CONTENT_THRESHOLD);
        assert_eq!(heights(&bands), vec![40, 40, 40, 40, 40, 40]);
        assert_eq!(bands[2], BBox::new(0, 100, 60, 140));
        assert_eq!(bands[3], BBox::new(0, 140, 60, 180));
    }

    #[test]
    fn specks_are_dropped() {
        let col = column_from_runs(
            60,
            &[
                (40, true),
                (10, false),
                (8, true),
                (10, false),
                (40, true),
                (40, false),
                (40, true),
            ],
        );
        let bands = divide_into_rows(&col, CONTENT_THRESHOLD);
        assert_eq!(heights(&bands), vec![40, 40, 40]);
        assert_eq!(bands[1].top, 68);
    }

    #[test]
    fn faint_rows_fall_under_threshold() {
        // 8 ink pixels per row never clears the threshold of 10
        let col = column_from_runs(8, &[(40, true), (10, false)]);
        assert!(divide_into_rows(&col, CONTENT_THRESHOLD).is_empty());
    }
}
