//! Multi-form scanning over one piece of text.

use indexmap::IndexSet;

use crate::defang::defang;
use crate::extractors::{EmailExtractor, Extractor, HashExtractor, IpExtractor, UrlExtractor};
use crate::observable::{Form, Observable};

/// An ordered list of extractors run against the same text.
///
/// The text is de-fanged once, then handed to each extractor in turn.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Default for ExtractorRegistry {
    /// Every built-in extractor.
    fn default() -> Self {
        Self::new()
            .with(IpExtractor::new())
            .with(UrlExtractor::new())
            .with(EmailExtractor::new())
            .with(HashExtractor::md5())
            .with(HashExtractor::sha1())
            .with(HashExtractor::sha256())
    }
}

impl ExtractorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Append an extractor.
    pub fn with(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Keep only the extractors producing one of `forms`.
    pub fn with_forms(mut self, forms: &[Form]) -> Self {
        self.extractors.retain(|e| forms.contains(&e.form()));
        self
    }

    /// Forms this registry can produce, in scanning order.
    pub fn forms(&self) -> Vec<Form> {
        self.extractors.iter().map(|e| e.form()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Run every extractor and return the distinct observables.
    ///
    /// Order is extractor order, then position in text. Duplicates (same form
    /// and value) keep their first occurrence.
    pub fn extract_all(&self, text: &str) -> Vec<Observable> {
        let clean = defang(text);
        let mut seen = IndexSet::new();
        for extractor in &self.extractors {
            seen.extend(extractor.scan(&clean));
        }
        seen.into_iter().collect()
    }
}
