use md5::{Digest, Md5};

/// Avatar-service fingerprint for an email address: the lowercase hex MD5 of
/// the trimmed, lowercased address.
pub fn email_fingerprint(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let mut hasher = Md5::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}
