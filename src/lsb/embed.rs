//! Embedding half of the bit-plane codec.
//!
//! Packs the delimited payload into the low bits of the colour channels and
//! reports the distortion the embedding cost.
//!
//! # Errors
//!
//! Returns [`LsbError`] when embedding text fails.
use image::RgbaImage;

use super::{BitDepth, DELIMITER, LsbEmbedding, LsbError, capacity_bits};
use crate::metrics;

/// Embeds UTF-8 text inside the low bits of the colour channels.
///
/// Works on a copy; the input image stays untouched so it remains available
/// as the reference for the returned metrics.
///
/// # Errors
///
/// Returns [`LsbError::MessageTooLarge`] when the delimited payload does not
/// fit in the image at the requested depth.
pub fn embed_text(
    image: &RgbaImage,
    text: &str,
    depth: BitDepth,
) -> Result<LsbEmbedding, LsbError>
{
    let payload = format!("{text}{DELIMITER}");
    let required_bits = payload.len() * 8;
    let available_bits = capacity_bits(image, depth);

    if required_bits > available_bits
    {
        return Err(LsbError::MessageTooLarge {
            required_bits,
            available_bits,
        });
    }

    let mut stamped = image.clone();
    let mut bits = MessageBits::new(payload.as_bytes());
    // Everything above the payload bits survives.
    let keep_mask = !depth.mask();

    for (index, sample) in stamped.iter_mut().enumerate()
    {
        if bits.exhausted()
        {
            break;
        }
        // Skip the alpha channel.
        if (index + 1) % 4 == 0
        {
            continue;
        }

        let mut packed = 0u8;
        let mut taken = 0;
        while taken < depth.get()
        {
            if let Some(bit) = bits.next()
            {
                packed = (packed << 1) | bit;
                taken += 1;
            }
            else
            {
                break;
            }
        }
        // The payload tail may not fill the plane; align it upward.
        packed <<= depth.get() - taken;

        *sample = (*sample & keep_mask) | packed;
    }

    let metrics = metrics::measure(image.as_raw(), stamped.as_raw());

    Ok(LsbEmbedding {
        image: stamped,
        metrics,
    })
}

/// Iterator over the payload's bits, most significant bit first per byte
struct MessageBits<'message>
{
    /// The delimited payload
    payload: &'message [u8],
    /// Index of the next byte to serve
    byte_index: usize,
    /// Index of the next bit in the current byte
    bit_index: u8,
}

impl<'message> MessageBits<'message>
{
    fn new(payload: &'message [u8]) -> Self
    {
        Self {
            payload,
            byte_index: 0,
            bit_index: 0,
        }
    }

    fn exhausted(&self) -> bool
    {
        self.byte_index >= self.payload.len()
    }
}

impl Iterator for MessageBits<'_>
{
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item>
    {
        let byte = *self.payload.get(self.byte_index)?;
        let bit = (byte >> (7 - self.bit_index)) & 1;

        self.bit_index += 1;
        if self.bit_index == 8
        {
            // Move to the next byte.
            self.bit_index = 0;
            self.byte_index += 1;
        }

        Some(bit)
    }
}
