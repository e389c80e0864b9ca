use sha2::{Digest, Sha256};

/// Normalize and one-way-hash a personal identifier for the graph API's
/// matching format: trimmed, lowercased, SHA-256, lowercase hex.
///
/// Absent and empty identifiers hash to nothing rather than to the digest
/// of the empty string, so an unknown email can never match another
/// unknown email on the platform side.
pub fn hash_identifier(value: Option<&str>) -> Option<String> {
    let normalized = value?.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    Some(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_identifiers_hash_to_none() {
        assert_eq!(hash_identifier(None), None);
        assert_eq!(hash_identifier(Some("")), None);
        assert_eq!(hash_identifier(Some("   ")), None);
    }

    #[test]
    fn test_case_and_whitespace_invariance() {
        assert_eq!(
            hash_identifier(Some("  A@B.com ")),
            hash_identifier(Some("a@b.com"))
        );
    }

    #[test]
    fn test_known_email_digest() {
        assert_eq!(
            hash_identifier(Some("a@b.com")).as_deref(),
            Some("fb98d44ad7501a959f3f4f4a3f004fe2d9e581ea6207e218c4b02c08a4d75adf")
        );
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = hash_identifier(Some("+7 999 123-45-67")).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
