use image::{GrayImage, Luma};

/// Luma values below this count as ink.
pub const INK_THRESHOLD: u8 = 128;

/// Which index a projection histogram is laid out along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// One bin per pixel column (sums down each column).
    X,
    /// One bin per pixel row (sums across each row).
    Y,
}

/// Inverted binary view: ink pixels become 1, paper becomes 0.
pub fn binarize(image: &GrayImage) -> GrayImage {
    let mut out = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let ink = u8::from(pixel[0] < INK_THRESHOLD);
        out.put_pixel(x, y, Luma([ink]));
    }
    out
}

/// Sums an already binarized image along `axis`.
pub fn project(binary: &GrayImage, axis: Axis) -> Vec<f64> {
    let (width, height) = binary.dimensions();
    let mut hist = match axis {
        Axis::X => vec![0.0; width as usize],
        Axis::Y => vec![0.0; height as usize],
    };
    for (x, y, pixel) in binary.enumerate_pixels() {
        let bin = match axis {
            Axis::X => x,
            Axis::Y => y,
        };
        hist[bin as usize] += f64::from(pixel[0]);
    }
    hist
}

/// Binarize then project.
pub fn histogram(image: &GrayImage, axis: Axis) -> Vec<f64> {
    project(&binarize(image), axis)
}

pub fn max_value(hist: &[f64]) -> f64 {
    hist.iter().copied().fold(0.0, f64::max)
}

/// Local maxima at or above `threshold`, at least `min_dist` apart.
///
/// A flat-topped maximum reports its middle index. Maxima touching either end
/// of the histogram are not peaks. When two peaks are closer than `min_dist`
/// the taller one wins (the leftmost on equal height).
pub fn find_peaks(hist: &[f64], threshold: f64, min_dist: f64) -> Vec<usize> {
    let n = hist.len();
    let mut candidates = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        if hist[i] > hist[i - 1] {
            let mut j = i;
            while j + 1 < n && hist[j + 1] == hist[i] {
                j += 1;
            }
            if j + 1 < n && hist[j + 1] < hist[i] && hist[i] >= threshold {
                candidates.push((i + j) / 2);
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }

    if min_dist <= 1.0 {
        return candidates;
    }

    let mut by_height = candidates;
    by_height.sort_by(|&a, &b| hist[b].total_cmp(&hist[a]).then(a.cmp(&b)));

    let mut kept: Vec<usize> = Vec::new();
    for peak in by_height {
        if kept
            .iter()
            .all(|&other| (peak as f64 - other as f64).abs() >= min_dist)
        {
            kept.push(peak);
        }
    }
    kept.sort_unstable();
    kept
}
