//! Email address extraction.

use lazy_static::lazy_static;
use regex::Regex;

use super::Extractor;
use crate::observable::{Form, Observable};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b")
        .expect("email pattern is valid");
}

/// Extracts `inet:email` observables. Addresses are case-folded.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailExtractor;

impl EmailExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for EmailExtractor {
    fn form(&self) -> Form {
        Form::Email
    }

    fn scan<'t>(&self, clean: &'t str) -> Box<dyn Iterator<Item = Observable> + 't> {
        Box::new(EMAIL.find_iter(clean).map(|m| {
            Observable::new(Form::Email, m.as_str().to_lowercase()).with_repr(m.as_str())
        }))
    }
}
