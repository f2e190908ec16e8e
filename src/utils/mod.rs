pub mod ip;
pub mod password;
pub mod url_validator;

/// Short-code alphabet: letters and digits only
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| CODE_CHARS[rand::random_range(0..CODE_CHARS.len())] as char)
        .take(length)
        .collect()
}

/// Generate a cryptographically random token (hex-encoded)
pub fn generate_secure_token(bytes: usize) -> String {
    (0..bytes)
        .map(|_| format!("{:02x}", rand::random_range(0..=255u16) as u8))
        .collect()
}

/// Short codes are 1..=64 characters of [A-Za-z0-9_-].
///
/// Rejecting everything else up front keeps garbage paths out of the
/// lookup cache and the database.
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
