//! Observable extraction from threat intelligence prose.
//!
//! Reports, pasted indicator lists and chat logs carry indicators (IPs,
//! URLs, hashes, emails) that are often deliberately de-fanged
//! (`hxxp://evil[.]com`) or mangled by copy-paste. This crate turns that
//! text into structured [`Observable`] records ready for knowledge-graph
//! ingestion.
//!
//! # Pipeline
//!
//! ```text
//! raw text
//!     │
//!     └─► defang()                  [.] → .   hxxp → http   \. → .
//!             └─► Extractor::scan() one pass per form, in text order
//!                     └─► Observable { form, valu, repr }
//! ```
//!
//! # Usage
//!
//! ```rust
//! use observables::{Extractor, ExtractorRegistry, Form, UrlExtractor};
//!
//! let text = "C2 at hxxp://193[.]56[.]29[.]123:8888/access.php)";
//!
//! let urls = UrlExtractor::new().extract(text);
//! assert_eq!(urls[0].valu, "http://193.56.29.123:8888/access.php");
//!
//! // Every form at once, de-duplicated
//! let all = ExtractorRegistry::default().extract_all(text);
//! assert!(all.iter().all(|o| o.form == Form::Url));
//! ```
//!
//! Extraction never fails: spans that do not parse simply yield nothing.

pub mod defang;
pub mod error;
pub mod extractors;
pub mod observable;
pub mod registry;

pub use defang::defang;
pub use error::FormParseError;
pub use extractors::{
    EmailExtractor, Extractor, HashExtractor, HashKind, IpExtractor, UrlExtractor,
};
pub use observable::{Form, Observable};
pub use registry::ExtractorRegistry;
