//! Typed errors for the observables library.
//!
//! Extraction itself is infallible; the only error surface is parsing
//! form tags coming from outside (configuration, serialized records).

use thiserror::Error;

/// A form tag that does not name a known observable kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown observable form: {0}")]
pub struct FormParseError(pub String);
