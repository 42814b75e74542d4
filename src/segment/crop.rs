use image::{imageops, GrayImage};
use tracing::{debug, info};

use crate::core::{Result, SlipError};
use crate::segment::deskew::{deskew, DeskewParams};
use crate::segment::histogram::{find_peaks, histogram, max_value, Axis};

/// Top rules must reach this fraction of the strongest pixel row.
const RULE_THRESHOLD: f64 = 0.9;

/// Drops everything above the last strong horizontal rule.
pub fn crop_below_top_rule(page: &GrayImage) -> Result<GrayImage> {
    let hist = histogram(page, Axis::Y);
    let peaks = find_peaks(&hist, RULE_THRESHOLD * max_value(&hist), 0.0);
    debug!(?peaks, "horizontal rule candidates");
    let top = *peaks.last().ok_or(SlipError::TopRuleNotFound)? as u32;
    let (width, height) = page.dimensions();
    Ok(imageops::crop_imm(page, 0, top, width, height - top).to_image())
}

/// Straightens a scanned page against its vertical rules, removes the
/// header above the top rules, then straightens against horizontal lines.
pub fn prepare_page(page: &GrayImage, params: &DeskewParams) -> Result<GrayImage> {
    info!(width = page.width(), height = page.height(), "preparing page");
    let upright = deskew(page, Axis::X, params).image;
    let cropped = crop_below_top_rule(&upright)?;
    let level = deskew(&cropped, Axis::Y, params).image;
    info!(width = level.width(), height = level.height(), "page prepared");
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn page_with_top_rules() -> GrayImage {
        let mut img = GrayImage::from_pixel(300, 400, Luma([255]));
        // title text, then two rules at y=30..33 and y=40..43
        for x in 100..200 {
            for y in 5..15 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        for y in (30..33).chain(40..43) {
            for x in 10..290 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        img
    }

    #[test]
    fn crops_at_the_last_top_rule() {
        let cropped = crop_below_top_rule(&page_with_top_rules()).expect("rule");
        assert_eq!(cropped.dimensions(), (300, 400 - 41));
        assert_eq!(cropped.get_pixel(50, 0)[0], 0);
    }

    #[test]
    fn blank_page_has_no_rule() {
        let blank = GrayImage::from_pixel(50, 50, Luma([255]));
        assert!(matches!(
            crop_below_top_rule(&blank),
            Err(SlipError::TopRuleNotFound)
        ));
    }

    #[test]
    fn prepared_page_starts_at_rule() {
        let prepared = prepare_page(&page_with_top_rules(), &DeskewParams::default()).expect("page");
        assert_eq!(prepared.width(), 300);
        assert!(prepared.height() < 400);
    }
}
