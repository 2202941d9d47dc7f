//! Extractor implementations, one per observable form.
//!
//! All extractors share the same contract: scan already de-fanged text once,
//! in order, and yield an [`Observable`] for every span that satisfies the
//! form's grammar. Spans that do not parse are skipped silently.

mod email;
mod hash;
mod ip;
mod url;

pub use email::EmailExtractor;
pub use hash::{HashExtractor, HashKind};
pub use ip::IpExtractor;
pub use url::UrlExtractor;

pub(crate) use url::url_spans;

use crate::defang::defang;
use crate::observable::{Form, Observable};

/// Pulls one form of observable out of text.
///
/// Extractors are stateless and `Sync`; one instance can serve any number of
/// documents concurrently.
pub trait Extractor: Send + Sync {
    /// The form every yielded observable carries.
    fn form(&self) -> Form;

    /// Scan text that has already been passed through [`defang`].
    ///
    /// The iterator is lazy and single-pass; callers may stop early.
    fn scan<'t>(&self, clean: &'t str) -> Box<dyn Iterator<Item = Observable> + 't>;

    /// De-fang `text` and collect every match in scanning order.
    fn extract(&self, text: &str) -> Vec<Observable> {
        let clean = defang(text);
        self.scan(&clean).collect()
    }
}

/// True when the byte before `start` and the byte at `end` are not ASCII
/// alphanumerics, i.e. `text[start..end]` is not glued to a longer token.
pub(crate) fn is_isolated(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before = start
        .checked_sub(1)
        .and_then(|i| bytes.get(i))
        .is_some_and(|b| b.is_ascii_alphanumeric());
    let after = bytes.get(end).is_some_and(|b| b.is_ascii_alphanumeric());
    !before && !after
}
