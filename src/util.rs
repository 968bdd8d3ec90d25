use md5::{Digest, Md5};

pub(crate) fn md5_string(s: &str) -> String {
    hex::encode(Md5::digest(s))
}

/// Test whether `s` looks like a lowercase hex digest of any length
pub(crate) fn is_lower_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
