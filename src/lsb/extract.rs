//! Extraction half of the bit-plane codec.
//!
//! Reassembles bytes from the low bits of the colour channels, looks for the
//! delimiter, and filters the result through plausibility heuristics so an
//! unmarked image comes back as "nothing found" rather than as noise.
//!
//! Extraction never fails; "no watermark" is a successful result with an
//! informational message, distinct from a rejected call.
use image::RgbaImage;

use super::{BitDepth, DELIMITER, LsbExtraction, SCAN_SAMPLE_LIMIT};

/// Note returned when no watermark could be recovered
const NO_WATERMARK: &str = "no watermark detected or the image was never marked";

/// Words that frequently show up in test payloads
const COMMON_WORDS: [&str; 6] =
    ["hello", "test", "watermark", "secret", "message", "text"];

/// Extracts text previously embedded at a known bit depth.
///
/// Scans at most the first [`SCAN_SAMPLE_LIMIT`] samples. Returns the text
/// up to the delimiter when one is found; otherwise whatever printable
/// accumulation still passes the plausibility check, or an empty result
/// with an informational message.
#[must_use]
pub fn extract_text(image: &RgbaImage, depth: BitDepth) -> LsbExtraction
{
    let data = image.as_raw();
    let limit = data.len().min(SCAN_SAMPLE_LIMIT);
    let mask = depth.mask();

    let mut current_byte = 0u8;
    let mut collected = 0u8;
    let mut text = String::new();

    for (index, sample) in data[..limit].iter().enumerate()
    {
        // Skip the alpha channel.
        if (index + 1) % 4 == 0
        {
            continue;
        }

        let plane = sample & mask;
        // Unpack the plane MSB-first into the byte accumulator.
        for shift in (0..depth.get()).rev()
        {
            current_byte = (current_byte << 1) | ((plane >> shift) & 1);
            collected += 1;
            if collected < 8
            {
                continue;
            }

            if is_printable(current_byte)
            {
                text.push(char::from(current_byte));
                if text.ends_with(DELIMITER)
                {
                    text.truncate(text.len() - DELIMITER.len());
                    if !text.is_empty() && is_plausible_text(&text)
                    {
                        return LsbExtraction {
                            text,
                            message: None,
                            depth,
                        };
                    }
                }
            }
            else if current_byte == 0
                && !text.is_empty()
                && text.ends_with(DELIMITER)
            {
                // A null byte can terminate the message as well.
                text.truncate(text.len() - DELIMITER.len());
                if is_plausible_text(&text)
                {
                    return LsbExtraction {
                        text,
                        message: None,
                        depth,
                    };
                }
            }

            current_byte = 0;
            collected = 0;
        }
    }

    // No delimiter in range; keep the accumulation only while it still
    // reads like text. (Only printable characters ever get pushed.)
    if !text.is_empty() && is_plausible_text(&text)
    {
        return LsbExtraction {
            text,
            message: None,
            depth,
        };
    }

    LsbExtraction {
        text: String::new(),
        message: Some(NO_WATERMARK.into()),
        depth,
    }
}

/// Extracts text by trying every bit depth and keeping the best read.
///
/// Attempts depth 1 through 4 in order, scores each plausible result, and
/// short-circuits on a clearly convincing one. When no attempt yields
/// anything plausible the single-bit extraction is returned as-is so the
/// caller always gets a definite answer.
#[must_use]
pub fn extract_text_auto(image: &RgbaImage) -> LsbExtraction
{
    let mut best: Option<LsbExtraction> = None;
    let mut best_score = 0.0;

    for depth in BitDepth::ALL
    {
        let attempt = extract_text(image, depth);
        if attempt.text.is_empty() || attempt.message.is_some()
        {
            continue;
        }

        let score = extraction_score(&attempt.text);
        if score > best_score
        {
            best_score = score;
            best = Some(attempt);
            if best_score > 0.8
            {
                break;
            }
        }
    }

    match best
    {
        Some(extraction) => extraction,
        None => extract_text(image, BitDepth::ALL[0]),
    }
}

/// Printable ASCII plus the whitespace controls a payload may carry
const fn is_printable(byte: u8) -> bool
{
    matches!(byte, 32..=126 | b'\t' | b'\n' | b'\r')
}

/// Whether an extracted string plausibly is a watermark rather than noise.
fn is_plausible_text(text: &str) -> bool
{
    if text.len() < 3
    {
        return false;
    }

    let total = text.len() as f64;
    let alphanumeric =
        text.chars().filter(|c| c.is_ascii_alphanumeric()).count() as f64;
    if alphanumeric / total < 0.3
    {
        return false;
    }

    let special = text
        .chars()
        .filter(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace())
        .count() as f64;
    special / total <= 0.7
}

/// Scores an extracted string in [0, 1]; higher reads more like a real
/// watermark.
///
/// Best-effort tuning, not a guarantee: the weights reward plausible
/// lengths, alphanumeric content, sparse whitespace and familiar words, and
/// penalise symbol soup.
fn extraction_score(text: &str) -> f64
{
    if text.is_empty()
    {
        return 0.0;
    }

    let total = text.len() as f64;
    let mut score = 0.0;

    if (10..=200).contains(&text.len())
    {
        score += 0.3;
    }
    else
    {
        score += 0.1;
    }

    let alphanumeric =
        text.chars().filter(|c| c.is_ascii_alphanumeric()).count() as f64;
    score += alphanumeric / total * 0.3;

    let whitespace = text.chars().filter(|c| c.is_whitespace()).count() as f64;
    if whitespace > 0.0 && whitespace / total < 0.3
    {
        score += 0.2;
    }

    let special = text
        .chars()
        .filter(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace())
        .count() as f64;
    if special / total > 0.5
    {
        score -= 0.3;
    }

    let lowered = text.to_lowercase();
    if COMMON_WORDS.iter().any(|word| lowered.contains(word))
    {
        score += 0.2;
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn plausibility_needs_some_alphanumeric_content()
    {
        assert!(is_plausible_text("watermark 2024"));
        assert!(!is_plausible_text("ab"));
        assert!(!is_plausible_text("$%&!#~^*"));
    }

    #[test]
    fn score_rewards_readable_text()
    {
        let readable = extraction_score("hello watermark");
        let noise = extraction_score("a}$%&!#~^*+=@b");

        assert!(readable > noise);
        assert!(readable <= 1.0);
        assert!(noise >= 0.0);
    }

    #[test]
    fn score_is_zero_for_empty_text()
    {
        assert_eq!(extraction_score(""), 0.0);
    }
}
