//! Label-safe string encoding.

/// Consonants and digits only, so encoded output never spells words and
/// never contains look-alike characters such as `0`/`o` or `1`/`l`.
const ALPHANUMS: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Maps every byte of `s` onto the safe alphabet by `byte % 27`.
///
/// The output has exactly one character per input byte.
pub fn safe_encode_string(s: &str) -> String {
    s.bytes()
        .map(|b| char::from(ALPHANUMS[usize::from(b) % ALPHANUMS.len()]))
        .collect()
}
