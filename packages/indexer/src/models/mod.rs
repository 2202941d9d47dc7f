//! Domain models the workers operate on.
//!
//! The `None` value of `last_index_date` is the "never processed" sentinel.

mod document;
mod tag;
mod user;

pub use document::{Document, DocumentStatus};
pub use tag::Tag;
pub use user::{AppUser, Permission};
