//! URL extraction with report-aware boundary detection.
//!
//! The regex only finds where a URL starts and the longest run of characters
//! that could belong to it. Deciding where it really ends is the interesting
//! part, because prose wraps URLs in punctuation:
//!
//! ```text
//! see http://www.example.org/. Then…        → http://www.example.org/
//! (i.e. hxxp://mb.glbaitech[.]com/x.dll)   → http://mb.glbaitech.com/x.dll
//! https://en.wikipedia.org/wiki/Foo_(bar)  → kept whole, parentheses balance
//! https://www.example.com/hello,world.html → kept whole, comma is inside
//! ...&cmn=[Victim_HostName]                → ...&cmn=[Victim_HostName
//! ```
//!
//! A trailing `]` is dropped unless it closes a bracketed IPv6 host such as
//! `http://[::1]`. That loses the closing bracket of a placeholder token at
//! the very end of a URL's path or query; stray brackets from
//! `[http://...]` wrappers are dropped too.

use lazy_static::lazy_static;
use regex::Regex;

use super::Extractor;
use crate::observable::{Form, Observable};

lazy_static! {
    static ref URL_CANDIDATE: Regex =
        Regex::new(r#"(?i)\bhttps?://[^\s<>"'`“”‘’«»]+"#).expect("url pattern is valid");
}

/// A URL located in de-fanged text, after boundary trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UrlSpan {
    pub start: usize,
    pub end: usize,
    pub valu: String,
}

/// Locate every URL in `clean`, in order.
pub(crate) fn url_spans(clean: &str) -> impl Iterator<Item = UrlSpan> + '_ {
    URL_CANDIDATE.find_iter(clean).filter_map(|m| {
        let end = m.start() + trimmed_len(m.as_str());
        let valu = canonical(&clean[m.start()..end])?;
        Some(UrlSpan {
            start: m.start(),
            end,
            valu,
        })
    })
}

/// Length of `candidate` once sentence punctuation is peeled off its tail.
fn trimmed_len(candidate: &str) -> usize {
    let mut url = candidate;
    while let Some(last) = url.chars().next_back() {
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ']' => !closes_bracketed_host(url),
            ')' => url.matches('(').count() < url.matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url.len()
}

/// Whether `url` is all authority and its trailing `]` closes the `[` that
/// opens the host.
fn closes_bracketed_host(url: &str) -> bool {
    let Some((_, rest)) = url.split_once("://") else {
        return false;
    };
    if rest.contains(['/', '?', '#']) {
        return false;
    }
    let host = rest.rsplit('@').next().unwrap_or_default();
    host.starts_with('[') && host.matches('[').count() == host.matches(']').count()
}

/// Lower-case the scheme and reject URLs without a usable host.
fn canonical(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();

    let usable = host
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '[');
    if !usable {
        return None;
    }

    Some(format!("{}://{}", scheme.to_ascii_lowercase(), rest))
}

/// Extracts `inet:url` observables for `http` and `https` links.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlExtractor;

impl UrlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for UrlExtractor {
    fn form(&self) -> Form {
        Form::Url
    }

    fn scan<'t>(&self, clean: &'t str) -> Box<dyn Iterator<Item = Observable> + 't> {
        Box::new(url_spans(clean).map(|span| Observable::new(Form::Url, span.valu)))
    }
}
