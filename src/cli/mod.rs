//! Command line interface for the application.
//!
//! Provides an entry point for the application and handles the CLI
//! arguments. Each subcommand is a thin wrapper that decodes an image,
//! calls one codec operation, and encodes or prints the result.
mod image_io;
mod payload;

use std::fs;
use std::path::Path;

use clap::{Args, Parser, Subcommand};
use const_format::formatcp;
use thiserror::Error;

use self::image_io::{load_image, normalized_extension, write_image};
use self::payload::resolve_message;
use crate::dct::{self, DctError, Strength};
use crate::lsb::{self, BitDepth, DELIMITER, LsbError};
use crate::metrics::{self, Metrics, MetricsError};

/// Errors that can be emitted while handling the CLI
#[derive(Debug, Error)]
pub enum AppError
{
    /// An I/O error occurred
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An image error occurred
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// A bit-plane codec error occurred
    #[error(transparent)]
    Lsb(#[from] LsbError),

    /// A block-transform codec error occurred
    #[error(transparent)]
    Dct(#[from] DctError),

    /// A comparison error occurred
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// The format is unsupported
    #[error("unsupported output format: {extension}")]
    UnsupportedFormat
    {
        /// Extension detected on the output file
        extension: Box<str>,
    },

    /// Input and output formats are different
    #[error(
        "input and output formats are different, both must be \
         {input_extension}"
    )]
    DifferentFormats
    {
        /// Extension detected on the input file
        input_extension: Box<str>,
        /// Extension detected on the output file
        output_extension: Box<str>,
    },

    /// Compared images have different dimensions
    #[error(
        "images must share dimensions to be compared ({left_width}x\
         {left_height} vs {right_width}x{right_height})"
    )]
    DimensionMismatch
    {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },
}

/// The main CLI parser
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Hide and recover text watermarks in images with LSB or DCT \
             embedding",
    after_help = formatcp!(
        "Bit-plane payloads end with the {} marker ({} bytes of capacity \
         overhead); block-transform payloads end with one zero byte",
        DELIMITER,
        DELIMITER.len()
    )
)]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

/// The main command
#[derive(Debug, Subcommand)]
enum Command
{
    LsbEmbed(LsbEmbedArgs),
    LsbExtract(LsbExtractArgs),
    LsbSweep(LsbSweepArgs),
    DctEmbed(DctEmbedArgs),
    DctExtract(DctExtractArgs),
    Compare(CompareArgs),
    Cap(CapacityArgs),
}

/// Payload source shared by every embedding command.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct MessageArgs
{
    /// Text to embed.
    #[arg(short = 't', long = "text", value_name = "TEXT")]
    text: Option<String>,
    /// Path to a UTF-8 text file to embed.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    text_file: Option<Box<Path>>,
}

/// Embed a message with the bit-plane (LSB) codec.
#[derive(Debug, Args)]
struct LsbEmbedArgs
{
    /// Image that will receive the text.
    input: Box<Path>,
    /// Output path for the watermarked image.
    output: Box<Path>,
    #[command(flatten)]
    message: MessageArgs,
    /// Least-significant bits rewritten per colour channel.
    #[arg(
        short = 'b',
        long = "bits",
        value_name = "1-4",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=4)
    )]
    bits: u8,
}

/// Extract a bit-plane (LSB) message from an image.
#[derive(Debug, Args)]
struct LsbExtractArgs
{
    /// Image that contains the text.
    input: Box<Path>,
    /// Bit depth used at embedding time. Auto-detected when omitted.
    #[arg(
        short = 'b',
        long = "bits",
        value_name = "1-4",
        value_parser = clap::value_parser!(u8).range(1..=4)
    )]
    bits: Option<u8>,
    /// Optional file to write the decoded text. Prints to stdout when
    /// omitted.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output_text: Option<Box<Path>>,
}

/// Embed at every bit depth and report the distortion of each.
#[derive(Debug, Args)]
struct LsbSweepArgs
{
    /// Image that would receive the text.
    input: Box<Path>,
    #[command(flatten)]
    message: MessageArgs,
}

/// Embed a message with the block-transform (DCT) codec.
#[derive(Debug, Args)]
struct DctEmbedArgs
{
    /// Image that will receive the text.
    input: Box<Path>,
    /// Output path for the watermarked image.
    output: Box<Path>,
    #[command(flatten)]
    message: MessageArgs,
    /// Embedding strength in (0, 1].
    #[arg(
        short = 's',
        long = "strength",
        value_name = "0-1",
        default_value_t = 0.5
    )]
    strength: f64,
}

/// Extract a block-transform (DCT) message from an image.
#[derive(Debug, Args)]
struct DctExtractArgs
{
    /// Image that contains the text.
    input: Box<Path>,
    /// Optional file to write the decoded text. Prints to stdout when
    /// omitted.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output_text: Option<Box<Path>>,
}

/// Measure the distortion between two images of equal dimensions.
#[derive(Debug, Args)]
struct CompareArgs
{
    /// Reference image.
    original: Box<Path>,
    /// Image to compare against the reference.
    modified: Box<Path>,
}

/// Calculate the maximum possible payload size for an image.
#[derive(Debug, Args)]
struct CapacityArgs
{
    /// Image to calculate the possible payload size for.
    input: Box<Path>,
}

/// Parses CLI arguments and executes the requested operation.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files, decoding images, or
/// running codec routines fails.
pub fn run() -> Result<(), AppError>
{
    let cli = Cli::parse();
    match cli.command
    {
        Command::LsbEmbed(mut args) => handle_lsb_embed(&mut args),
        Command::LsbExtract(args) => handle_lsb_extract(&args),
        Command::LsbSweep(mut args) => handle_lsb_sweep(&mut args),
        Command::DctEmbed(mut args) => handle_dct_embed(&mut args),
        Command::DctExtract(args) => handle_dct_extract(&args),
        Command::Compare(args) => handle_compare(&args),
        Command::Cap(args) => handle_capacity(&args),
    }
}

/// Handles bit-plane embedding.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files, or embedding fails.
fn handle_lsb_embed(args: &mut LsbEmbedArgs) -> Result<(), AppError>
{
    let input_ext = ensure_matching_formats(&args.input, &args.output)?;
    let depth = BitDepth::new(args.bits)?;
    let image = load_image(&args.input)?;
    let text = resolve_message(&mut args.message)?;

    let embedding = lsb::embed_text(&image, &text, depth)?;

    write_image(&embedding.image, input_ext.as_deref(), &args.output)?;
    print_metrics(&embedding.metrics);
    Ok(())
}

/// Handles bit-plane extraction, auto-detecting the depth when needed.
///
/// # Errors
///
/// Returns [`AppError`] when reading the image or writing the text fails.
fn handle_lsb_extract(args: &LsbExtractArgs) -> Result<(), AppError>
{
    let image = load_image(&args.input)?;
    let extraction = match args.bits
    {
        Some(bits) => lsb::extract_text(&image, BitDepth::new(bits)?),
        None => lsb::extract_text_auto(&image),
    };

    println!("Bit depth: {}", extraction.depth.get());
    match &extraction.message
    {
        Some(message) => println!("{message}"),
        None => emit_text(&extraction.text, args.output_text.as_deref())?,
    }

    Ok(())
}

/// Embeds the message at every depth and reports the metrics of each.
///
/// # Errors
///
/// Returns [`AppError`] when reading files fails.
fn handle_lsb_sweep(args: &mut LsbSweepArgs) -> Result<(), AppError>
{
    let image = load_image(&args.input)?;
    let text = resolve_message(&mut args.message)?;

    for depth in BitDepth::ALL
    {
        match lsb::embed_text(&image, &text, depth)
        {
            Ok(embedding) =>
            {
                let m = embedding.metrics;
                println!(
                    "{} bit(s): MSE {:.4}, PSNR {:.2} dB, {} channels \
                     modified",
                    depth.get(),
                    m.mse,
                    m.psnr,
                    m.channels_modified
                );
            },
            Err(LsbError::MessageTooLarge {
                required_bits,
                available_bits,
            }) =>
            {
                println!(
                    "{} bit(s): payload does not fit (needs \
                     {required_bits} bits, {available_bits} available)",
                    depth.get()
                );
            },
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Handles block-transform embedding.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files, or embedding fails.
fn handle_dct_embed(args: &mut DctEmbedArgs) -> Result<(), AppError>
{
    let input_ext = ensure_matching_formats(&args.input, &args.output)?;
    let strength = Strength::new(args.strength)?;
    let image = load_image(&args.input)?;
    let text = resolve_message(&mut args.message)?;

    let embedding = dct::embed_text(&image, &text, strength)?;

    write_image(&embedding.image, input_ext.as_deref(), &args.output)?;
    print_metrics(&embedding.metrics);
    Ok(())
}

/// Handles block-transform extraction.
///
/// # Errors
///
/// Returns [`AppError`] when reading the image or writing the text fails.
fn handle_dct_extract(args: &DctExtractArgs) -> Result<(), AppError>
{
    let image = load_image(&args.input)?;
    let text = dct::extract_text(&image);

    emit_text(&text, args.output_text.as_deref())
}

/// Handles the comparison of two images.
///
/// # Errors
///
/// Returns [`AppError`] when reading files fails or the images cannot be
/// compared.
fn handle_compare(args: &CompareArgs) -> Result<(), AppError>
{
    let original = load_image(&args.original)?;
    let modified = load_image(&args.modified)?;

    if original.dimensions() != modified.dimensions()
    {
        let (left_width, left_height) = original.dimensions();
        let (right_width, right_height) = modified.dimensions();
        return Err(AppError::DimensionMismatch {
            left_width,
            left_height,
            right_width,
            right_height,
        });
    }

    let metrics = metrics::compare(original.as_raw(), modified.as_raw())?;

    println!("MSE: {:.4}", metrics.mse);
    if metrics.is_identical()
    {
        // Bit-identical images have unbounded PSNR; say so instead of
        // printing the numeric sentinel.
        println!("PSNR: infinite");
    }
    else
    {
        println!("PSNR: {:.2} dB", metrics.psnr);
    }
    println!("Modified channels: {}", metrics.channels_modified);
    Ok(())
}

/// Handles the capacity report for both codecs.
///
/// # Errors
///
/// Returns [`AppError`] when reading the image fails.
fn handle_capacity(args: &CapacityArgs) -> Result<(), AppError>
{
    let image = load_image(&args.input)?;

    for depth in BitDepth::ALL
    {
        println!(
            "LSB {} bit(s): up to {} message bytes ({} bits raw)",
            depth.get(),
            lsb::max_message_len(&image, depth),
            lsb::capacity_bits(&image, depth)
        );
    }
    println!(
        "DCT: up to {} message bytes ({} blocks of one bit)",
        dct::max_message_len(&image),
        dct::capacity_bits(&image)
    );

    Ok(())
}

/// Rejects mismatched input/output formats and returns the shared extension.
///
/// Watermark bits only survive a lossless re-encode of the same container.
fn ensure_matching_formats(
    input: &Path,
    output: &Path,
) -> Result<Option<String>, AppError>
{
    let input_ext = normalized_extension(input);
    let output_ext = normalized_extension(output);

    if input_ext != output_ext
    {
        return Err(AppError::DifferentFormats {
            input_extension: input_ext
                .as_deref()
                .unwrap_or("<unknown>")
                .into(),
            output_extension: output_ext
                .as_deref()
                .unwrap_or("<unknown>")
                .into(),
        });
    }

    Ok(input_ext)
}

/// Prints extracted text to stdout or writes it to the given path.
fn emit_text(text: &str, output: Option<&Path>) -> Result<(), AppError>
{
    if let Some(path) = output
    {
        fs::write(path, text.as_bytes())?;
    }
    else
    {
        println!("{text}");
    }

    Ok(())
}

/// Prints the distortion figures of an embedding.
fn print_metrics(metrics: &Metrics)
{
    println!("MSE: {:.4}", metrics.mse);
    println!("PSNR: {:.2} dB", metrics.psnr);
    println!("Modified channels: {}", metrics.channels_modified);
}
