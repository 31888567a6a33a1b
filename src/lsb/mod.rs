//! Bit-plane steganography for RGBA images.
//!
//! Embeds and extracts text watermarks by rewriting the low bits of the
//! colour channels.
//!
//! # Encoding Format
//!
//! - The payload is the message followed by the [`DELIMITER`] literal
//! - Payload bytes are split into bits MSB-first (bit 7 to bit 0)
//! - Each colour sample carries the next 1 to 4 payload bits in its least
//!   significant bits, depending on the chosen [`BitDepth`]
//! - Samples are consumed in buffer order, RGB channels only (alpha
//!   ignored); once the payload runs out the remaining samples are left
//!   untouched
//!
//! # Errors
//!
//! Returns [`LsbError`] when embedding text fails. Extraction never fails:
//! an unmarked image yields an empty result with an informational message.
use image::RgbaImage;
use thiserror::Error;

use crate::metrics::Metrics;

mod embed;
mod extract;

pub use embed::embed_text;
pub use extract::{extract_text, extract_text_auto};

/// Marker appended to every payload so extraction knows where the text ends
pub const DELIMITER: &str = "###END###";

/// Most samples a single extraction pass will visit
// Keeps extraction cost flat on very large buffers.
pub(crate) const SCAN_SAMPLE_LIMIT: usize = 100_000;

/// Errors that can be emitted while embedding text
#[derive(Debug, Error)]
pub enum LsbError
{
    /// The requested bit depth is outside the supported range
    #[error("bit depth must be between 1 and 4, got {bits}")]
    InvalidBitDepth
    {
        bits: u8
    },

    /// The payload is too large to fit in the image
    #[error(
        "payload needs {required_bits} bits but the image offers \
         {available_bits}"
    )]
    MessageTooLarge
    {
        required_bits: usize,
        available_bits: usize,
    },
}

/// Number of least-significant bits rewritten per colour sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitDepth(u8);

impl BitDepth
{
    /// Every supported depth, in auto-detection order.
    pub const ALL: [Self; 4] = [Self(1), Self(2), Self(3), Self(4)];

    /// Validates a bit depth.
    ///
    /// # Errors
    ///
    /// Returns [`LsbError::InvalidBitDepth`] when `bits` is not in `1..=4`.
    pub fn new(bits: u8) -> Result<Self, LsbError>
    {
        if (1..=4).contains(&bits)
        {
            Ok(Self(bits))
        }
        else
        {
            Err(LsbError::InvalidBitDepth { bits })
        }
    }

    /// The depth as a plain integer.
    #[must_use]
    pub const fn get(self) -> u8
    {
        self.0
    }

    /// Mask covering the low bits this depth rewrites.
    pub(crate) const fn mask(self) -> u8
    {
        (1 << self.0) - 1
    }
}

/// A watermarked copy of the input image plus the distortion it cost
#[derive(Debug)]
pub struct LsbEmbedding
{
    /// Watermarked image; the input buffer is never modified
    pub image: RgbaImage,
    /// Distortion between input and watermarked image
    pub metrics: Metrics,
}

/// Outcome of one extraction attempt
#[derive(Debug)]
pub struct LsbExtraction
{
    /// Recovered text, empty when nothing was found
    pub text: String,
    /// Informational note when no watermark could be recovered
    pub message: Option<String>,
    /// Bit depth the buffer was read at
    pub depth: BitDepth,
}

/// Returns the number of payload bits the image can carry at a depth.
#[must_use]
pub fn capacity_bits(image: &RgbaImage, depth: BitDepth) -> usize
{
    usable_channels(image) * usize::from(depth.get())
}

/// Returns the longest message (in bytes) that fits at the given depth once
/// the delimiter is accounted for.
#[must_use]
pub fn max_message_len(image: &RgbaImage, depth: BitDepth) -> usize
{
    (capacity_bits(image, depth) / 8).saturating_sub(DELIMITER.len())
}

/// Colour samples available for embedding (alpha carries no payload)
fn usable_channels(image: &RgbaImage) -> usize
{
    image.width() as usize * image.height() as usize * 3
}

#[cfg(test)]
mod tests
{
    use image::Rgba;
    use rand::fill;

    use super::*;

    fn depth(bits: u8) -> BitDepth
    {
        BitDepth::new(bits).expect("valid bit depth")
    }

    #[test]
    fn rejects_out_of_range_depths()
    {
        assert!(matches!(
            BitDepth::new(0),
            Err(LsbError::InvalidBitDepth { bits: 0 })
        ));
        assert!(matches!(
            BitDepth::new(5),
            Err(LsbError::InvalidBitDepth { bits: 5 })
        ));
        assert_eq!(depth(4).get(), 4);
    }

    #[test]
    fn round_trip_at_every_depth()
    {
        for bits in 1..=4
        {
            let image =
                RgbaImage::from_pixel(32, 32, Rgba([128, 128, 128, 255]));

            let embedded = embed_text(&image, "HELLO", depth(bits))
                .expect("failed to embed text");
            let extraction = extract_text(&embedded.image, depth(bits));

            assert_eq!(extraction.text, "HELLO", "depth {bits}");
            assert!(extraction.message.is_none(), "depth {bits}");
        }
    }

    #[test]
    fn round_trip_with_random_pixels()
    {
        let mut data = vec![0u8; 64 * 64 * 4];
        fill(data.as_mut_slice());
        let image = RgbaImage::from_raw(64, 64, data)
            .expect("failed to create image from raw data");

        let embedded = embed_text(&image, "Random carrier test", depth(2))
            .expect("failed to embed text");
        let extraction = extract_text(&embedded.image, depth(2));

        assert_eq!(extraction.text, "Random carrier test");
    }

    #[test]
    fn oversized_payload_is_rejected_with_both_counts()
    {
        // 4x4 pixels leave 48 usable bits at depth 1; "X" plus the
        // delimiter needs 80.
        let image = RgbaImage::new(4, 4);

        let error = embed_text(&image, "X", depth(1))
            .expect_err("should reject oversized payload");

        assert!(matches!(
            error,
            LsbError::MessageTooLarge {
                required_bits: 80,
                available_bits: 48
            }
        ));
    }

    #[test]
    fn payload_at_exact_capacity_fits()
    {
        // 8x4 pixels * 3 channels = 96 bits at depth 1; "abc" plus the
        // delimiter is exactly 12 bytes.
        let image = RgbaImage::from_pixel(8, 4, Rgba([200, 200, 200, 255]));
        assert_eq!(capacity_bits(&image, depth(1)), 96);
        assert_eq!(max_message_len(&image, depth(1)), 3);

        let embedded =
            embed_text(&image, "abc", depth(1)).expect("exact fit succeeds");

        assert_eq!(extract_text(&embedded.image, depth(1)).text, "abc");
    }

    #[test]
    fn one_byte_past_capacity_overflows()
    {
        let image = RgbaImage::from_pixel(8, 4, Rgba([200, 200, 200, 255]));

        let error = embed_text(&image, "abcd", depth(1))
            .expect_err("should reject payload past capacity");

        assert!(matches!(
            error,
            LsbError::MessageTooLarge {
                required_bits: 104,
                available_bits: 96
            }
        ));
    }

    #[test]
    fn embedding_reports_distortion()
    {
        let image = RgbaImage::from_pixel(32, 32, Rgba([128, 128, 128, 255]));

        let embedded = embed_text(&image, "HELLO", depth(1))
            .expect("failed to embed text");

        assert!(embedded.metrics.mse > 0.0);
        assert!(embedded.metrics.channels_modified > 0);
        assert!(embedded.metrics.psnr > 0.0);
    }

    #[test]
    fn auto_detection_recovers_depth()
    {
        // Wrong depths must surface as noise, so the carrier's low bits are
        // laid out to spell unprintable bytes at depths 1, 2 and 4.
        const LOW_BITS: [u8; 4] = [0b00, 0b10, 0b00, 0b01];
        let image = RgbaImage::from_fn(64, 64, |x, y| {
            let pixel = y as usize * 64 + x as usize;
            let channel =
                |c: usize| 0b1000_1000 | LOW_BITS[(pixel * 3 + c) % 4];
            Rgba([channel(0), channel(1), channel(2), 255])
        });

        let embedded = embed_text(&image, "Zineb123", depth(3))
            .expect("failed to embed text");
        let extraction = extract_text_auto(&embedded.image);

        assert_eq!(extraction.text, "Zineb123");
        assert_eq!(extraction.depth, depth(3));
        assert!(extraction.message.is_none());
    }

    #[test]
    fn auto_detection_falls_back_to_single_bit()
    {
        let image = RgbaImage::from_pixel(16, 16, Rgba([128, 128, 128, 255]));

        let extraction = extract_text_auto(&image);

        assert_eq!(extraction.text, "");
        assert_eq!(extraction.depth, depth(1));
        assert!(extraction.message.is_some());
    }

    #[test]
    fn unmarked_image_reports_no_watermark()
    {
        let image = RgbaImage::from_pixel(16, 16, Rgba([128, 128, 128, 255]));

        let extraction = extract_text(&image, depth(1));

        assert_eq!(extraction.text, "");
        assert!(extraction.message.is_some());
    }

    #[test]
    fn alpha_channel_is_never_touched()
    {
        let mut data = vec![0u8; 32 * 32 * 4];
        fill(data.as_mut_slice());
        let image = RgbaImage::from_raw(32, 32, data)
            .expect("failed to create image from raw data");

        let embedded = embed_text(&image, "alpha stays", depth(4))
            .expect("failed to embed text");

        let alphas_untouched = image
            .as_raw()
            .iter()
            .zip(embedded.image.as_raw())
            .enumerate()
            .filter(|(index, _)| (index + 1) % 4 == 0)
            .all(|(_, (before, after))| before == after);
        assert!(alphas_untouched);
    }
}
