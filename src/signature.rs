//! Fits the drawn signature into the form's signature cell and writes it to disk.

use crate::error::SignatureError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const SIGNATURE_CELL_WIDTH: u32 = 200;
pub const SIGNATURE_CELL_HEIGHT: u32 = 50;

/// The persisted canvas and its fitted copy. Only `resized_path` is embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureAsset {
    pub original_path: PathBuf,
    pub resized_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Target size for `width`x`height` inside a `max_width`x`max_height` box.
///
/// Width is corrected first, then height, both against the original aspect
/// ratio and truncated. Never scales up. A side truncated to zero is kept at one
/// pixel so the result stays encodable.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let aspect_ratio = width as f64 / height as f64;
    let (mut fitted_width, mut fitted_height) = (width, height);

    if fitted_width > max_width {
        fitted_width = max_width;
        fitted_height = (fitted_width as f64 / aspect_ratio) as u32;
    }

    if fitted_height > max_height {
        fitted_height = max_height;
        fitted_width = (fitted_height as f64 * aspect_ratio) as u32;
    }

    (fitted_width.max(1), fitted_height.max(1))
}

pub fn resize_image_to_fit_cell(image: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (fitted_width, fitted_height) = fit_dimensions(width, height, max_width, max_height);
    if (fitted_width, fitted_height) == (width, height) {
        return image.clone();
    }
    image.resize_exact(fitted_width, fitted_height, FilterType::CatmullRom)
}

/// File-name-safe form of the learner's name used for the signature images.
pub fn signature_file_stem(learner_name: &str) -> String {
    let safe_learner_name = learner_name.trim().replace(' ', "_").to_lowercase();
    sanitize_filename::sanitize(safe_learner_name)
}

/// Writes `signature_{name}.png`, reloads it and writes the fitted
/// `resized_signature_image_{name}.png` next to it. Existing files are overwritten.
pub fn prepare_signature(
    canvas: &RgbaImage,
    learner_name: &str,
    work_dir: &Path,
) -> Result<SignatureAsset, SignatureError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(SignatureError::EmptyCanvas);
    }
    fs::create_dir_all(work_dir)?;

    let stem = signature_file_stem(learner_name);
    let original_path = work_dir.join(format!("signature_{}.png", stem));
    let resized_path = work_dir.join(format!("resized_signature_image_{}.png", stem));

    // Save the raw canvas, then reload it from disk
    canvas.save(&original_path)?;

    info!("Opening image file: {}", original_path.display());
    let stored = image::open(&original_path)?;
    info!("Original image size: {}x{}", stored.width(), stored.height());

    // Fit into the cell and save next to it
    let resized = resize_image_to_fit_cell(&stored, SIGNATURE_CELL_WIDTH, SIGNATURE_CELL_HEIGHT);
    resized.save(&resized_path)?;
    info!("Resized image saved to: {}", resized_path.display());

    Ok(SignatureAsset {
        original_path,
        resized_path,
        width: resized.width(),
        height: resized.height(),
    })
}
