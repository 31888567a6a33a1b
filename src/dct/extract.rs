//! Extraction half of the block-transform codec.
//!
//! Reads the sign of each block's carrier coefficient and packs the signs
//! back into bytes until the terminator shows up.
use image::RgbaImage;

use super::color::rgb_to_ycbcr;
use super::transform::CosineTable;
use super::{
    BLOCK_PIXELS, BLOCK_SIZE, CARRIER_COEFFICIENT, block_origins, sample_index,
};

/// Extracts text previously embedded with the block-transform codec.
///
/// Walks the same block grid as embedding and reads one bit per block from
/// the sign of the carrier coefficient. On an image that was never
/// watermarked the result is noise up to the first accidental zero byte,
/// possibly empty.
#[must_use]
pub fn extract_text(image: &RgbaImage) -> String
{
    let table = CosineTable::new();
    let data = image.as_raw();
    let width = image.width();

    let mut bits = Vec::new();
    for row in block_origins(image.height())
    {
        for col in block_origins(width)
        {
            let mut luma = [0.0; BLOCK_PIXELS];
            for dx in 0..BLOCK_SIZE
            {
                for dy in 0..BLOCK_SIZE
                {
                    let idx = sample_index(width, row, col, dx, dy);
                    let (y, _, _) = rgb_to_ycbcr(
                        f64::from(data[idx]),
                        f64::from(data[idx + 1]),
                        f64::from(data[idx + 2]),
                    );
                    luma[dx * BLOCK_SIZE + dy] = y;
                }
            }

            let coefficients = table.forward(&luma);
            bits.push(u8::from(coefficients[CARRIER_COEFFICIENT] > 0.0));
        }
    }

    decode_bits(&bits)
}

/// Packs bits into bytes MSB-first, stopping at the first zero byte (the
/// embedded terminator) or when fewer than eight bits remain.
fn decode_bits(bits: &[u8]) -> String
{
    let mut bytes = Vec::new();
    for chunk in bits.chunks_exact(8)
    {
        let byte = chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit);
        if byte == 0
        {
            break;
        }
        bytes.push(byte);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
