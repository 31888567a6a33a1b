//! Block-transform steganography for RGBA images.
//!
//! Embeds and extracts text watermarks in the frequency domain: the image
//! is walked in 8x8 blocks, each block's luminance is cosine-transformed,
//! and one payload bit is written into the sign of a mid-frequency
//! coefficient. Chrominance and alpha pass through unchanged.
//!
//! # Encoding Format
//!
//! - The payload is the message's UTF-8 bytes plus one terminating zero byte
//! - Payload bytes are split into bits MSB-first (bit 7 to bit 0)
//! - Blocks are visited row-major with stride 8, stopping short of the last
//!   strip in each direction; one bit per block
//! - Bit 1 writes `+magnitude` into coefficient (4, 4), bit 0 writes
//!   `-magnitude`; extraction reads the coefficient's sign
//!
//! # Errors
//!
//! Returns [`DctError`] when embedding text fails. Extraction never fails,
//! but on an image that was never watermarked it returns whatever noise the
//! block signs spell out up to the first accidental zero byte.
use image::RgbaImage;
use thiserror::Error;

use crate::metrics::Metrics;

mod color;
mod embed;
mod extract;
mod transform;

pub use embed::embed_text;
pub use extract::extract_text;

/// Width and height of the transform window
pub(crate) const BLOCK_SIZE: usize = 8;

/// Samples per block
pub(crate) const BLOCK_PIXELS: usize = BLOCK_SIZE * BLOCK_SIZE;

/// Row-major index of the coefficient carrying the payload bit
// (4, 4) sits in the mid-frequency band: low enough to survive 8-bit
// rounding, high enough to stay invisible.
pub(crate) const CARRIER_COEFFICIENT: usize = 4 * BLOCK_SIZE + 4;

/// Errors that can be emitted while embedding text
#[derive(Debug, Error)]
pub enum DctError
{
    /// The strength parameter is outside the supported range
    #[error("strength must be within (0, 1], got {value}")]
    InvalidStrength
    {
        value: f64
    },

    /// The payload needs more blocks than the image offers
    #[error(
        "payload needs {required_bits} bits but the image offers \
         {available_bits} blocks of one bit each"
    )]
    MessageTooLarge
    {
        required_bits: usize,
        available_bits: usize,
    },
}

/// Embedding strength in (0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strength(f64);

impl Strength
{
    /// Validates a strength value.
    ///
    /// # Errors
    ///
    /// Returns [`DctError::InvalidStrength`] when `value` is not in (0, 1].
    pub fn new(value: f64) -> Result<Self, DctError>
    {
        if value > 0.0 && value <= 1.0
        {
            Ok(Self(value))
        }
        else
        {
            Err(DctError::InvalidStrength { value })
        }
    }

    /// The strength as a plain float.
    #[must_use]
    pub const fn get(self) -> f64
    {
        self.0
    }

    /// Coefficient magnitude written for each payload bit.
    #[must_use]
    pub fn magnitude(self) -> f64
    {
        20.0 + self.0 * 50.0
    }
}

/// A watermarked copy of the input image plus the distortion it cost
#[derive(Debug)]
pub struct DctEmbedding
{
    /// Watermarked image; the input buffer is never modified
    pub image: RgbaImage,
    /// Distortion between input and watermarked image
    pub metrics: Metrics,
}

/// Returns the number of payload bits the image's block grid can carry.
#[must_use]
pub fn capacity_bits(image: &RgbaImage) -> usize
{
    block_origins(image.height()).count() * block_origins(image.width()).count()
}

/// Returns the longest message (in bytes) that fits once the terminator is
/// accounted for.
#[must_use]
pub fn max_message_len(image: &RgbaImage) -> usize
{
    (capacity_bits(image) / 8).saturating_sub(1)
}

/// Block origins along one dimension.
///
/// Origins advance with stride 8 while strictly below `dim - 8`; the last
/// strip is never part of the grid, so embed and extract always agree on
/// usable positions.
pub(crate) fn block_origins(dim: u32) -> impl Iterator<Item = u32>
{
    (0..dim.saturating_sub(BLOCK_SIZE as u32)).step_by(BLOCK_SIZE)
}

/// Flat buffer index of the red sample at (row + dx, col + dy).
pub(crate) fn sample_index(
    width: u32,
    row: u32,
    col: u32,
    dx: usize,
    dy: usize,
) -> usize
{
    ((row as usize + dx) * width as usize + (col as usize + dy)) * 4
}
