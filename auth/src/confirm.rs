use rand::rngs::OsRng;
use rand::Rng;

/// Alphabet for confirmation codes: unambiguous to type from an email.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a short human-typeable confirmation code.
///
/// Drawn uniformly from uppercase letters and digits using the OS CSPRNG.
/// The code gates account activation, so even with a short TTL and
/// single-use consumption it must not be guessable from RNG state.
///
/// # Arguments
/// * `length` - Number of characters to generate
///
/// # Returns
/// Random code like `"7KQ2ZX"`
pub fn generate_confirm_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(generate_confirm_code(6).len(), 6);
        assert_eq!(generate_confirm_code(12).len(), 12);
        assert_eq!(generate_confirm_code(0).len(), 0);
    }

    #[test]
    fn test_charset() {
        let code = generate_confirm_code(256);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_codes_are_distinct() {
        // 36^16 keyspace, collision here would mean a broken RNG.
        let a = generate_confirm_code(16);
        let b = generate_confirm_code(16);
        assert_ne!(a, b);
    }
}
