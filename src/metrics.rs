//! Image quality metrics.
//!
//! Measures the distortion between an original and a modified pixel buffer:
//! mean squared error, peak signal-to-noise ratio, and the number of colour
//! channels that changed at all. The alpha channel never carries payload and
//! is left out of every figure.
//!
//! # Errors
//!
//! [`compare`] returns [`MetricsError`] when the buffers cannot be compared.
use thiserror::Error;

/// PSNR reported for bit-identical buffers.
///
/// A finite stand-in so numeric consumers never meet infinity; display
/// paths that prefer to spell out the unbounded case can check
/// [`Metrics::is_identical`] instead.
pub const PSNR_SENTINEL: f64 = 100.0;

/// Errors that can be emitted while comparing pixel buffers
#[derive(Debug, Error)]
pub enum MetricsError
{
    /// The buffers have different lengths
    #[error(
        "buffers must have the same length to be compared ({left_len} vs \
         {right_len} samples)"
    )]
    LengthMismatch
    {
        /// Length of the original buffer
        left_len: usize,
        /// Length of the modified buffer
        right_len: usize,
    },
}

/// Distortion figures for one original/modified buffer pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics
{
    /// Mean squared error over the colour channels
    pub mse: f64,
    /// Peak signal-to-noise ratio in decibels, [`PSNR_SENTINEL`] when the
    /// buffers are identical
    pub psnr: f64,
    /// Number of colour channels whose value changed
    pub channels_modified: u64,
}

impl Metrics
{
    /// Whether the two buffers were bit-identical on the colour channels.
    #[must_use]
    pub fn is_identical(&self) -> bool
    {
        self.mse == 0.0
    }
}

/// Compares two pixel buffers of equal length.
///
/// # Errors
///
/// Returns [`MetricsError::LengthMismatch`] when the buffer lengths differ.
pub fn compare(original: &[u8], modified: &[u8])
    -> Result<Metrics, MetricsError>
{
    if original.len() != modified.len()
    {
        return Err(MetricsError::LengthMismatch {
            left_len: original.len(),
            right_len: modified.len(),
        });
    }

    Ok(measure(original, modified))
}

/// Distortion between two same-length buffers.
///
/// Callers guarantee equal lengths; [`compare`] is the checked entry point.
pub(crate) fn measure(original: &[u8], modified: &[u8]) -> Metrics
{
    debug_assert_eq!(original.len(), modified.len());

    let mut squared_error_sum = 0.0;
    let mut channels_modified = 0u64;
    let mut channels_counted = 0u64;

    for (index, (&before, &after)) in original.iter().zip(modified).enumerate()
    {
        // Skip the alpha channel.
        if (index + 1) % 4 == 0
        {
            continue;
        }

        channels_counted += 1;
        let diff = f64::from(before) - f64::from(after);
        squared_error_sum += diff * diff;
        if before != after
        {
            channels_modified += 1;
        }
    }

    let mse = if channels_counted > 0
    {
        squared_error_sum / channels_counted as f64
    }
    else
    {
        0.0
    };
    let psnr = if mse == 0.0
    {
        PSNR_SENTINEL
    }
    else
    {
        20.0 * (255.0 / mse.sqrt()).log10()
    };

    Metrics {
        mse,
        psnr,
        channels_modified,
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn identical_buffers_report_zero_error()
    {
        let buffer = vec![7u8; 64];

        let metrics = compare(&buffer, &buffer).expect("equal lengths");

        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.psnr, PSNR_SENTINEL);
        assert_eq!(metrics.channels_modified, 0);
        assert!(metrics.is_identical());
    }

    #[test]
    fn single_channel_difference_is_averaged_over_colour_channels()
    {
        // 2x2 RGBA: 16 samples, 12 of them colour.
        let original = vec![100u8; 16];
        let mut modified = original.clone();
        modified[0] = 110;

        let metrics = compare(&original, &modified).expect("equal lengths");

        assert_eq!(metrics.channels_modified, 1);
        assert!((metrics.mse - 100.0 / 12.0).abs() < 1e-9);
        let expected_psnr = 20.0 * (255.0 / metrics.mse.sqrt()).log10();
        assert!((metrics.psnr - expected_psnr).abs() < 1e-9);
        assert!(!metrics.is_identical());
    }

    #[test]
    fn alpha_differences_are_invisible()
    {
        let original = vec![0u8; 16];
        let mut modified = original.clone();
        modified[3] = 255;
        modified[7] = 9;

        let metrics = compare(&original, &modified).expect("equal lengths");

        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.channels_modified, 0);
    }

    #[test]
    fn rejects_mismatched_lengths()
    {
        let error = compare(&[0u8; 8], &[0u8; 12])
            .expect_err("should reject mismatched lengths");

        assert!(matches!(
            error,
            MetricsError::LengthMismatch {
                left_len: 8,
                right_len: 12
            }
        ));
    }
}
