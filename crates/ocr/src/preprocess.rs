use image::{imageops, DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Longest edge handed to the OCR engine; phone photos are scaled down.
const MAX_EDGE: u32 = 2800;
/// Gaussian sigma for the denoising pass.
const DENOISE_SIGMA: f32 = 0.8;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Load an image file, binarize it, and return PNG bytes ready for OCR.
pub fn prepare_for_ocr(path: &Path) -> Result<Vec<u8>, PreprocessError> {
    let img = image::open(path)?;
    encode_as_png(binarize(img))
}

/// Process raw image bytes (JPEG / PNG / WEBP / …) and return binarized PNG bytes.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(binarize(img))
}

/// Downscale, grayscale, denoise, then black/white at Otsu's threshold.
fn binarize(img: DynamicImage) -> DynamicImage {
    let img = if img.width() > MAX_EDGE || img.height() > MAX_EDGE {
        img.resize(MAX_EDGE, MAX_EDGE, imageops::FilterType::Lanczos3)
    } else {
        img
    };

    let gray: GrayImage = gaussian_blur_f32(&img.to_luma8(), DENOISE_SIGMA);
    let level = otsu_level(&gray);
    DynamicImage::ImageLuma8(threshold(&gray, level, ThresholdType::Binary))
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
