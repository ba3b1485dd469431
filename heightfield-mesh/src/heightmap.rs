/// Grayscale heightmap loading, normalisation and sampling
use crate::error::{MeshError, Result};
use constants::tile::{LUMA_MAX, LUMA_ROUNDING, LUMA_SHIFT, LUMA_WEIGHTS};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageError, Luma};
use std::path::Path;

/// Normalised height field, row-major, row 0 at the top of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    width: usize,
    height: usize,
    samples: Vec<f64>,
}

impl Heightmap {
    /// Load an image as 8-bit luma, optionally resampled to
    /// `resolution x resolution` with a Lanczos filter, normalised to [0, 1].
    ///
    /// Colour images are reduced with the ITU-R 601 weights, see [`to_luma`].
    pub fn load(path: &Path, resolution: Option<u32>) -> Result<Self> {
        let image = to_luma(image::open(path).map_err(open_error)?);
        if image.width() == 0 || image.height() == 0 {
            return Err(MeshError::InvalidInput(format!(
                "heightmap {} has zero size",
                path.display()
            )));
        }

        let image = match resolution {
            Some(res) => resample(&image, res)?,
            None => image,
        };

        Self::from_luma(&image)
    }

    /// Normalise an in-memory luma image.
    pub fn from_luma(image: &GrayImage) -> Result<Self> {
        let samples = image
            .pixels()
            .map(|pixel| pixel.0[0] as f64 / LUMA_MAX)
            .collect();
        Self::from_samples(image.width() as usize, image.height() as usize, samples)
    }

    /// Build from already-normalised samples in row-major order.
    pub fn from_samples(width: usize, height: usize, samples: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MeshError::InvalidInput(format!(
                "heightmap must not be empty, got {}x{}",
                width, height
            )));
        }
        if samples.len() != width * height {
            return Err(MeshError::InvalidInput(format!(
                "expected {} samples for a {}x{} heightmap, got {}",
                width * height,
                width,
                height,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Direct lookup of column `x`, row `y`.
    pub fn sample(&self, x: usize, y: usize) -> f64 {
        self.samples[y * self.width + x]
    }

    /// Look up the sample under a texture coordinate. V is flipped so that
    /// `v = 1` reads the top row; indices truncate toward zero.
    ///
    /// Coordinates outside [0, 1] are clamped to the nearest edge.
    pub fn sample_uv(&self, u: f64, v: f64) -> f64 {
        let col = uv_to_index(u, self.width);
        let row = uv_to_index(1.0 - v, self.height);
        self.sample(col, row)
    }

    pub fn min_max(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            })
    }
}

/// `trunc(t * (len - 1))`, clamped into `[0, len - 1]`. NaN maps to 0.
fn uv_to_index(t: f64, len: usize) -> usize {
    let last = (len - 1) as f64;
    let scaled = (t * last).trunc();
    // `as` saturates and turns NaN into 0
    (scaled.clamp(0.0, last)) as usize
}

/// Single-channel images keep their luma. Colour images are reduced with
/// fixed-point `(299 R + 587 G + 114 B) / 1000`, rounded to nearest, which
/// differs from `DynamicImage::to_luma8` and its Rec. 709 weights.
fn to_luma(image: DynamicImage) -> GrayImage {
    if !image.color().has_color() {
        return image.to_luma8();
    }

    let rgb = image.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([rec601_luma(r, g, b)])
    })
}

fn rec601_luma(r: u8, g: u8, b: u8) -> u8 {
    let [wr, wg, wb] = LUMA_WEIGHTS;
    let weighted = r as u32 * wr + g as u32 * wg + b as u32 * wb + LUMA_ROUNDING;
    (weighted >> LUMA_SHIFT) as u8
}

/// A missing or unreadable file is an IO failure, anything else a decode failure.
fn open_error(err: ImageError) -> MeshError {
    match err {
        ImageError::IoError(io) => MeshError::Io(io),
        other => MeshError::Decode(other),
    }
}

fn resample(image: &GrayImage, resolution: u32) -> Result<GrayImage> {
    if resolution == 0 {
        return Err(MeshError::InvalidInput(
            "resample resolution must be at least 1".to_string(),
        ));
    }
    Ok(imageops::resize(
        image,
        resolution,
        resolution,
        FilterType::Lanczos3,
    ))
}
