//! Session identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identifier of one accepted connection.
///
/// Displayed as six base36 characters, e.g. `AAAAAB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for SessionId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base36_encode_6(self.0))
    }
}

/// Hands out session identifiers in increasing order.
pub struct SessionIdGenerator {
    counter: AtomicU64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Generate the next unique id.
    pub fn next(&self) -> SessionId {
        SessionId(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a number as a 6-character base36 string (wraps past 36^6).
fn base36_encode_6(mut n: u64) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut result = [b'A'; 6];

    for slot in result.iter_mut().rev() {
        *slot = CHARS[(n % 36) as usize];
        n /= 36;
    }

    String::from_utf8_lossy(&result).into_owned()
}
