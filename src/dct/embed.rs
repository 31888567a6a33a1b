//! Embedding half of the block-transform codec.
//!
//! Writes one payload bit into the carrier coefficient of each 8x8 block's
//! luminance spectrum, then rebuilds the block from the modified luminance
//! and the untouched chrominance.
//!
//! # Errors
//!
//! Returns [`DctError`] when embedding text fails.
use image::RgbaImage;

use super::color::{rgb_to_ycbcr, ycbcr_to_rgb};
use super::transform::CosineTable;
use super::{
    BLOCK_PIXELS, BLOCK_SIZE, CARRIER_COEFFICIENT, DctEmbedding, DctError,
    Strength, block_origins, capacity_bits, sample_index,
};
use crate::metrics;

/// Embeds UTF-8 text inside the block spectra of the image.
///
/// Works on a copy; the input image stays untouched so it remains available
/// as the reference for the returned metrics. Blocks past the end of the
/// payload are left unmodified.
///
/// # Errors
///
/// Returns [`DctError::MessageTooLarge`] when the terminated payload needs
/// more bits than the block grid offers.
pub fn embed_text(
    image: &RgbaImage,
    text: &str,
    strength: Strength,
) -> Result<DctEmbedding, DctError>
{
    let bits = message_bits(text);
    let available_bits = capacity_bits(image);

    if bits.len() > available_bits
    {
        return Err(DctError::MessageTooLarge {
            required_bits: bits.len(),
            available_bits,
        });
    }

    let magnitude = strength.magnitude();
    let table = CosineTable::new();
    let width = image.width();
    let mut stamped = image.clone();

    let mut next_bit = 0;
    for row in block_origins(image.height())
    {
        if next_bit >= bits.len()
        {
            break;
        }
        for col in block_origins(width)
        {
            if next_bit >= bits.len()
            {
                break;
            }
            stamp_block(
                &mut stamped,
                width,
                row,
                col,
                bits[next_bit],
                magnitude,
                &table,
            );
            next_bit += 1;
        }
    }

    let metrics = metrics::measure(image.as_raw(), stamped.as_raw());

    Ok(DctEmbedding {
        image: stamped,
        metrics,
    })
}

/// Payload bits: the text's UTF-8 bytes plus the terminating zero byte,
/// most significant bit first.
fn message_bits(text: &str) -> Vec<u8>
{
    let mut bits = Vec::with_capacity((text.len() + 1) * 8);
    for byte in text.bytes().chain([0])
    {
        for shift in (0..8).rev()
        {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Writes one bit into the block at (row, col).
fn stamp_block(
    image: &mut RgbaImage,
    width: u32,
    row: u32,
    col: u32,
    bit: u8,
    magnitude: f64,
    table: &CosineTable,
)
{
    let data: &mut [u8] = image;

    let mut luma = [0.0; BLOCK_PIXELS];
    let mut chroma_b = [0.0; BLOCK_PIXELS];
    let mut chroma_r = [0.0; BLOCK_PIXELS];

    for dx in 0..BLOCK_SIZE
    {
        for dy in 0..BLOCK_SIZE
        {
            let idx = sample_index(width, row, col, dx, dy);
            let (y, cb, cr) = rgb_to_ycbcr(
                f64::from(data[idx]),
                f64::from(data[idx + 1]),
                f64::from(data[idx + 2]),
            );
            let cell = dx * BLOCK_SIZE + dy;
            luma[cell] = y;
            chroma_b[cell] = cb;
            chroma_r[cell] = cr;
        }
    }

    let mut coefficients = table.forward(&luma);
    coefficients[CARRIER_COEFFICIENT] =
        if bit == 1 { magnitude } else { -magnitude };
    let restored = table.inverse(&coefficients);

    for dx in 0..BLOCK_SIZE
    {
        for dy in 0..BLOCK_SIZE
        {
            let cell = dx * BLOCK_SIZE + dy;
            // Chrominance passes through unchanged; only luminance moved.
            let (r, g, b) =
                ycbcr_to_rgb(restored[cell], chroma_b[cell], chroma_r[cell]);
            let idx = sample_index(width, row, col, dx, dy);
            data[idx] = r.round() as u8;
            data[idx + 1] = g.round() as u8;
            data[idx + 2] = b.round() as u8;
            // data[idx + 3] is alpha and stays as it was.
        }
    }
}
