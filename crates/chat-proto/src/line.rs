//! Line-based codec for tokio.
//!
//! This module provides a codec that reads/writes newline-terminated lines.
//! Inbound lines may end in `\n` or `\r\n`; outbound lines always end in a
//! single `\n`.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Default maximum inbound line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// Line-based codec that handles newline-terminated messages.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl LineCodec {
    /// Create a new codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// The configured line limit.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn decode_line(line: &[u8]) -> error::Result<String> {
        let trimmed = match line {
            [rest @ .., b'\r', b'\n'] | [rest @ .., b'\n'] => rest,
            other => other,
        };

        String::from_utf8(trimmed.to_vec()).map_err(|e| error::ProtocolError::InvalidUtf8 {
            byte_pos: e.utf8_error().valid_up_to(),
            details: e.utf8_error().to_string(),
            command_hint: error::extract_command_hint(trimmed),
        })
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        // Look for newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(error::ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            Self::decode_line(&line).map(Some)
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(error::ProtocolError::MessageTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        // A final unterminated line still counts as a line.
        if src.is_empty() {
            return Ok(None);
        }
        let rest = src.split();
        self.next_index = 0;
        Self::decode_line(&rest).map(Some)
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.reserve(msg.len() + 1);
        dst.extend_from_slice(msg.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
