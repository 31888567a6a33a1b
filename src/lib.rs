//! Text watermarking for images.
//!
//! Hides short text payloads in RGBA pixel buffers with two independent
//! codecs, a spatial-domain LSB bit-plane codec and a frequency-domain
//! 8x8 DCT codec, and measures the distortion each embedding costs.
pub mod cli;
pub mod dct;
pub mod lsb;
pub mod metrics;
