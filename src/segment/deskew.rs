use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use tracing::{debug, info};

use crate::core::stats::variance;
use crate::segment::histogram::{binarize, project, Axis};

/// Parameters for the skew-angle search.
#[derive(Debug, Clone, Copy)]
pub struct DeskewParams {
    /// Search range in degrees on either side of zero.
    pub limit_degrees: f32,
    /// Step between candidate angles in degrees.
    pub step_degrees: f32,
}

impl Default for DeskewParams {
    fn default() -> Self {
        Self {
            limit_degrees: 0.5,
            step_degrees: 0.025,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Deskewed {
    pub image: GrayImage,
    pub angle_degrees: f32,
}

/// Finds the rotation that maximizes projection variance along `axis` and
/// applies it to `image`.
///
/// Each direction is scanned outward from zero and abandoned as soon as the
/// score drops, so the score curve is assumed unimodal near zero. The output
/// keeps the input dimensions.
pub fn deskew(image: &GrayImage, axis: Axis, params: &DeskewParams) -> Deskewed {
    let binary = binarize(image);
    let steps = if params.step_degrees > 0.0 {
        (params.limit_degrees / params.step_degrees).round() as i32
    } else {
        0
    };

    let best_angle = scan_angles(steps, params.step_degrees, |angle| {
        let current = score(&binary, angle, axis);
        debug!(angle, score = current, "deskew candidate");
        current
    });

    info!(angle = best_angle, ?axis, "best deskew angle");
    Deskewed {
        image: rotate(image, best_angle, 255),
        angle_degrees: best_angle,
    }
}

/// Walks outward from zero in both directions, abandoning a direction at the
/// first drop in score. Returns the best-scoring angle; ties keep the earlier.
fn scan_angles(steps: i32, step_degrees: f32, mut score_at: impl FnMut(f32) -> f64) -> f32 {
    let zero_score = score_at(0.0);
    let mut best_angle = 0.0_f32;
    let mut best_score = zero_score;

    for direction in [1, -1] {
        let mut last_score = zero_score;
        for i in 1..=steps {
            let angle = (direction * i) as f32 * step_degrees;
            let current = score_at(angle);
            if current < last_score {
                break;
            }
            last_score = current;
            if current > best_score {
                best_score = current;
                best_angle = angle;
            }
        }
    }
    best_angle
}

fn score(binary: &GrayImage, angle_degrees: f32, axis: Axis) -> f64 {
    let rotated = rotate(binary, angle_degrees, 0);
    variance(&project(&rotated, axis))
}

/// Nearest-neighbour rotation about the centre, same canvas size.
pub fn rotate(image: &GrayImage, angle_degrees: f32, fill: u8) -> GrayImage {
    if angle_degrees == 0.0 {
        return image.clone();
    }
    rotate_about_center(
        image,
        angle_degrees.to_radians(),
        Interpolation::Nearest,
        Luma([fill]),
    )
}
