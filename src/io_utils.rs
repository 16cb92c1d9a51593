//! Error formatting for the `lenzu` command line front end.
use std::fmt;
use std::io;
use std::path::Path;

use crate::LenZuError;

#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Format a user friendly I/O error message with suggestions.
pub fn format_io_error(operation: &str, path: &Path, err: &io::Error) -> String {
    use io::ErrorKind::*;
    let suggestion = match err.kind() {
        NotFound => "Check that the file exists and the path is correct.",
        PermissionDenied => "Check permissions or run as a different user.",
        UnexpectedEof => "File appears truncated.",
        WriteZero => "Disk may be full. Free up space and try again.",
        Other if err.raw_os_error() == Some(28) => "Disk may be full. Free up space and try again.",
        _ => "Check permissions or free up disk space.",
    };
    format!(
        "Error {} '{}': {}. {}",
        operation,
        path.display(),
        err,
        suggestion
    )
}

/// Convert an I/O error into a CLI error with context.
pub fn io_cli_error(operation: &str, path: &Path, err: io::Error) -> CliError {
    CliError {
        msg: format_io_error(operation, path, &err),
        source: Some(Box::new(err)),
    }
}

pub fn simple_cli_error(msg: &str) -> CliError {
    CliError {
        msg: msg.to_string(),
        source: None,
    }
}

/// Convert a codec error into a CLI error naming the file involved.
pub fn lenzu_cli_error(context: &str, path: &Path, err: LenZuError) -> CliError {
    if let LenZuError::Io(io) = err {
        return io_cli_error(context, path, io);
    }
    CliError {
        msg: format!("Error {} '{}': {}", context, path.display(), cli_hint(&err)),
        source: Some(Box::new(err)),
    }
}

/// Return an actionable hint for a codec error variant.
pub fn cli_hint(err: &LenZuError) -> String {
    use LenZuError::*;
    match err {
        HeaderInvalid(msg) => format!("{msg}. The file is not a LenZu stream."),
        OptionsOutOfRange(msg) => format!("{msg}. Check the option bytes at 0x30."),
        TruncatedStream { .. } | CorruptHuffmanCode { .. } | InvalidBackreference { .. } => {
            format!("{err}. The stream is damaged, extract it again.")
        }
        ChecksumMismatch { .. } => {
            format!("{err}. Retry with --no-verify to keep the output anyway.")
        }
        AllocationRefused { .. } => format!("{err}. Raise the limit with --max-output."),
        Io(io) => format!("{io}"),
    }
}
