//! CLI image helpers.
//!
//! Normalizes extensions, loads RGBA buffers, and writes files with the
//! appropriate encoder.
use std::fs::File;
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::tiff::TiffEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use super::AppError;

/// Normalizes the extension of a path to lowercase.
pub(super) fn normalized_extension(path: impl AsRef<Path>) -> Option<String>
{
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Loads an image from the specified path and converts it to an RGBA buffer.
///
/// The decoder preserves dimensions and channel order exactly; no resampling
/// happens between the file and the codecs.
///
/// # Errors
///
/// Returns [`AppError::Image`] when the image cannot be decoded.
pub(super) fn load_image(path: impl AsRef<Path>)
    -> Result<RgbaImage, AppError>
{
    image::open(path.as_ref())
        .map(DynamicImage::into_rgba8)
        .map_err(AppError::from)
}

/// Writes the provided image using the encoder defined by the extension.
///
/// # Supported Extensions
///
/// * png
/// * bmp
/// * tiff / tif
///
/// # Errors
///
/// Returns:
/// * [`AppError::Io`] when the file cannot be created
/// * [`AppError::Image`] when the image cannot be encoded
/// * [`AppError::UnsupportedFormat`] when the extension is not supported
pub(super) fn write_image(
    image: &RgbaImage,
    extension: Option<&str>,
    output: impl AsRef<Path>,
) -> Result<(), AppError>
{
    let mut file = File::create(output.as_ref())?;

    match extension
    {
        Some("png") =>
        {
            let encoder = PngEncoder::new_with_quality(
                &mut file,
                CompressionType::Default,
                FilterType::Adaptive,
            );
            encoder.write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )?;
        },
        Some("bmp") =>
        {
            let mut encoder = BmpEncoder::new(&mut file);
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )?;
        },
        Some("tiff" | "tif") =>
        {
            let encoder = TiffEncoder::new(&mut file);
            encoder.write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )?;
        },
        _ =>
        {
            let extension = extension.unwrap_or("<unknown>").into();
            return Err(AppError::UnsupportedFormat { extension });
        },
    }

    Ok(())
}
