//! Username validation.

/// Minimum username length.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length.
pub const USERNAME_MAX_LEN: usize = 14;

/// Extension trait for checking if a string is a valid login name.
pub trait UsernameExt {
    /// Check if this string is a valid username: 3 to 14 characters drawn
    /// from ASCII letters, digits and underscore.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat_proto::UsernameExt;
    ///
    /// assert!("alice123".is_valid_username());
    /// assert!("__x".is_valid_username());
    ///
    /// assert!(!"ab".is_valid_username());           // Too short
    /// assert!(!"alice-bob".is_valid_username());    // Hyphen
    /// assert!(!"fifteen_chars__".is_valid_username());
    /// ```
    fn is_valid_username(&self) -> bool;
}

impl UsernameExt for str {
    fn is_valid_username(&self) -> bool {
        (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&self.len())
            && self.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    }
}
