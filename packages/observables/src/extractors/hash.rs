//! File hash extraction (MD5, SHA-1, SHA-256).

use lazy_static::lazy_static;
use regex::Regex;

use super::Extractor;
use crate::observable::{Form, Observable};

lazy_static! {
    // Whole hex words; the length decides the algorithm.
    static ref HEX_WORD: Regex = Regex::new(r"\b[0-9a-fA-F]{32,64}\b").expect("hex pattern is valid");
}

/// Hash algorithms recognized by digest length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Md5,
    Sha1,
    Sha256,
}

impl HashKind {
    /// Number of hex digits in a digest of this kind.
    pub fn hex_len(&self) -> usize {
        match self {
            HashKind::Md5 => 32,
            HashKind::Sha1 => 40,
            HashKind::Sha256 => 64,
        }
    }

    pub fn form(&self) -> Form {
        match self {
            HashKind::Md5 => Form::Md5,
            HashKind::Sha1 => Form::Sha1,
            HashKind::Sha256 => Form::Sha256,
        }
    }
}

/// Extracts hex digests of exactly one [`HashKind`].
///
/// `valu` is lower-cased; `repr` keeps the case found in the text.
#[derive(Debug, Clone, Copy)]
pub struct HashExtractor {
    kind: HashKind,
}

impl HashExtractor {
    pub fn new(kind: HashKind) -> Self {
        Self { kind }
    }

    pub fn md5() -> Self {
        Self::new(HashKind::Md5)
    }

    pub fn sha1() -> Self {
        Self::new(HashKind::Sha1)
    }

    pub fn sha256() -> Self {
        Self::new(HashKind::Sha256)
    }
}

impl Extractor for HashExtractor {
    fn form(&self) -> Form {
        self.kind.form()
    }

    fn scan<'t>(&self, clean: &'t str) -> Box<dyn Iterator<Item = Observable> + 't> {
        let kind = self.kind;
        Box::new(
            HEX_WORD
                .find_iter(clean)
                .filter(move |m| m.as_str().len() == kind.hex_len())
                .map(move |m| {
                    Observable::new(kind.form(), m.as_str().to_ascii_lowercase())
                        .with_repr(m.as_str())
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MD5: &str = "D41D8CD98F00B204E9800998ECF8427E";
    const SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    const SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_each_kind_matches_its_length_only() {
        let text = format!("md5 {MD5}\nsha1 {SHA1}\nsha256 {SHA256}\n");

        let md5 = HashExtractor::md5().extract(&text);
        assert_eq!(md5.len(), 1);
        assert_eq!(md5[0].form, Form::Md5);
        assert_eq!(md5[0].valu, MD5.to_ascii_lowercase());
        assert_eq!(md5[0].repr, MD5);

        let sha1 = HashExtractor::sha1().extract(&text);
        assert_eq!(sha1.len(), 1);
        assert_eq!(sha1[0].valu, SHA1);

        let sha256 = HashExtractor::sha256().extract(&text);
        assert_eq!(sha256.len(), 1);
        assert_eq!(sha256[0].form, Form::Sha256);
    }

    #[test]
    fn test_hash_glued_to_word_ignored() {
        let text = format!("x{SHA1} and {SHA1}_tail");
        assert!(HashExtractor::sha1().extract(&text).is_empty());
    }

    #[test]
    fn test_overlong_hex_ignored() {
        let text = format!("{SHA256}{SHA256}");
        assert!(HashExtractor::sha256().extract(&text).is_empty());
        assert!(HashExtractor::md5().extract(&text).is_empty());
    }
}
