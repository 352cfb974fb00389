//! Error types for the chat protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Extract the command keyword from raw line bytes (for error reporting).
///
/// Works on bytes so the keyword can be recovered even when the rest of the
/// line is not valid UTF-8.
pub(crate) fn extract_command_hint(raw_line: &[u8]) -> Option<String> {
    let end = raw_line
        .iter()
        .position(|b| !b.is_ascii_alphabetic())
        .unwrap_or(raw_line.len());

    if end == 0 {
        return None;
    }
    String::from_utf8(raw_line[..end].to_vec()).ok()
}

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in a line.
    #[error("invalid UTF-8 in line at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
        /// Decoder error text.
        details: String,
        /// Command keyword, if one could be recovered.
        command_hint: Option<String>,
    },

    /// Line exceeds the configured maximum length.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Observed length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
}
