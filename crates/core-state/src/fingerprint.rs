//! Content fingerprints: a SHA-256 digest over the exact on-disk text.
//!
//! Used purely as an equality oracle for dirty tracking, never for security.
//! Callers must hash the materialized form (see `EditorSession::disk_text`)
//! rather than the LF-normalized buffer so a document whose line endings are
//! re-expanded on write does not compare dirty against itself.

use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering of the full digest.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Shorthand for `Fingerprint::of`.
pub fn fingerprint(content: &str) -> Fingerprint {
    Fingerprint::of(content)
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Short form keeps trace output readable.
impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_digest_of_empty_text() {
        assert_eq!(
            fingerprint("").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn line_ending_form_matters() {
        assert_ne!(fingerprint("a\nb"), fingerprint("a\r\nb"));
    }

    proptest! {
        #[test]
        fn deterministic(s in ".*") {
            prop_assert_eq!(fingerprint(&s), fingerprint(&s.clone()));
        }

        #[test]
        fn single_char_change_is_detected(s in ".{1,64}", idx in any::<prop::sample::Index>(), c in any::<char>()) {
            let chars: Vec<char> = s.chars().collect();
            let i = idx.index(chars.len());
            prop_assume!(chars[i] != c);
            let mut changed = chars.clone();
            changed[i] = c;
            let changed: String = changed.into_iter().collect();
            prop_assert_ne!(fingerprint(&s), fingerprint(&changed));
        }
    }
}
