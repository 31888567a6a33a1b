//! CLI payload resolution.
//!
//! Turns the user's payload source, inline text or a file path, into the
//! message string the codecs embed.
use std::fs;

use super::{AppError, MessageArgs};

/// Resolves the message to embed from the command line arguments.
///
/// # Errors
///
/// Returns [`AppError::Io`] when reading the message file fails.
pub(super) fn resolve_message(args: &mut MessageArgs)
    -> Result<String, AppError>
{
    match (args.text.take(), &args.text_file)
    {
        // take the ownership of the text
        (Some(text), None) => Ok(text),
        (None, Some(path)) =>
        {
            fs::read_to_string(path.as_ref()).map_err(AppError::from)
        },
        _ => unreachable!(
            "mutually exclusive group should ensure that either text or \
             text_file is provided"
        ),
    }
}

#[cfg(test)]
mod tests
{
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn resolve_message_prefers_inline_text()
    {
        let mut args = MessageArgs {
            text: Some("payload".into()),
            text_file: None,
        };

        let resolved =
            resolve_message(&mut args).expect("should resolve text");

        assert_eq!(resolved, "payload");
    }

    #[test]
    fn resolve_message_reads_from_file()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let text_path = dir.path().join("message.txt");
        fs::write(&text_path, "from file").expect("failed to write message");

        let mut args = MessageArgs {
            text: None,
            text_file: Some(text_path.into_boxed_path()),
        };

        let resolved =
            resolve_message(&mut args).expect("should resolve file");

        assert_eq!(resolved, "from file");
    }

    #[test]
    fn resolve_message_fails_on_missing_file()
    {
        let mut args = MessageArgs {
            text: None,
            text_file: Some(Path::new("definitely/not/here.txt").into()),
        };

        let error = resolve_message(&mut args)
            .expect_err("should fail on missing file");

        assert!(matches!(error, AppError::Io(_)));
    }
}
