//! Image loading and optional preprocessing before classification.
//!
//! The filter stage (grayscale, blur, edges) is compiled in with the
//! `filters` feature. Without it [`preprocess`] still resizes, so callers
//! never have to handle a failure here.

use std::path::Path;

use anyhow::Context;
use image::imageops::{self, FilterType};
use image::RgbImage;
#[cfg(feature = "filters")]
use image::{GrayImage, Rgb};
#[cfg(not(feature = "filters"))]
use tracing::debug;

/// Sigma of the light Gaussian blur (roughly a 3x3 footprint).
#[cfg(feature = "filters")]
const BLUR_SIGMA: f32 = 0.8;

/// 4-neighbour Laplacian.
#[cfg(feature = "filters")]
const LAPLACIAN: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

/// Laplacian response at or above this is an edge.
#[cfg(feature = "filters")]
const EDGE_THRESHOLD: u8 = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub grayscale: bool,
    pub blur: bool,
    pub edge_detect: bool,
}

impl PreprocessOptions {
    pub fn any(&self) -> bool {
        self.grayscale || self.blur || self.edge_detect
    }
}

/// Whether the filter stage is compiled in.
pub fn filters_available() -> bool {
    cfg!(feature = "filters")
}

/// Decode an image file and force it to 8-bit RGB.
pub fn load_image(path: &Path) -> anyhow::Result<RgbImage> {
    let img = image::open(path).with_context(|| format!("could not open image {}", path.display()))?;
    Ok(img.to_rgb8())
}

/// Resize to `target` and apply the requested filters, in the order
/// grayscale → blur → edges. The result is always 3-channel RGB.
pub fn preprocess(image: &RgbImage, target: (u32, u32), options: PreprocessOptions) -> RgbImage {
    let (width, height) = (target.0.max(1), target.1.max(1));
    let resized = imageops::resize(image, width, height, FilterType::Triangle);
    apply_filters(resized, options)
}

#[cfg(feature = "filters")]
fn apply_filters(mut img: RgbImage, options: PreprocessOptions) -> RgbImage {
    if options.grayscale {
        img = gray_to_rgb(&imageops::grayscale(&img));
    }
    if options.blur {
        img = imageops::blur(&img, BLUR_SIGMA);
    }
    if options.edge_detect {
        let luma = imageops::grayscale(&img);
        let mut edges: GrayImage = imageops::filter3x3(&luma, &LAPLACIAN);
        for px in edges.pixels_mut() {
            px.0[0] = if px.0[0] >= EDGE_THRESHOLD { 255 } else { 0 };
        }
        img = gray_to_rgb(&edges);
    }
    img
}

#[cfg(not(feature = "filters"))]
fn apply_filters(img: RgbImage, options: PreprocessOptions) -> RgbImage {
    if options.any() {
        debug!(?options, "image filters not compiled in; resize only");
    }
    img
}

#[cfg(feature = "filters")]
fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

/// Resize to `size`×`size` and lay the pixels out as a normalized NCHW
/// `f32` buffer: `(v / 255 - mean) / std` per channel.
pub fn normalized_chw(image: &RgbImage, size: u32, mean: [f32; 3], std: [f32; 3]) -> Vec<f32> {
    let resized = imageops::resize(image, size, size, FilterType::Triangle);
    let plane = (size * size) as usize;
    let mut data = vec![0.0f32; 3 * plane];

    for (x, y, px) in resized.enumerate_pixels() {
        let offset = (y * size + x) as usize;
        for c in 0..3 {
            data[c * plane + offset] = (px.0[c] as f32 / 255.0 - mean[c]) / std[c];
        }
    }
    data
}
