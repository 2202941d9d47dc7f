//! IPv4 extraction.

use std::net::Ipv4Addr;

use lazy_static::lazy_static;
use regex::Regex;

use super::{is_isolated, url_spans, Extractor};
use crate::observable::{Form, Observable};

lazy_static! {
    static ref DOTTED_QUAD: Regex =
        Regex::new(r"\d{1,3}(?:\.\d{1,3}){3}").expect("ipv4 pattern is valid");
}

/// Extracts `inet:ipv4` observables from dotted-quad notation.
///
/// A candidate is rejected when any octet exceeds 255, when it is glued to
/// surrounding digits or letters, or when it continues with more dotted
/// numbers (`1.2.3.4.5` is a version, not an address). Addresses that sit
/// inside a URL are left to the URL extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpExtractor;

impl IpExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for IpExtractor {
    fn form(&self) -> Form {
        Form::Ipv4
    }

    fn scan<'t>(&self, clean: &'t str) -> Box<dyn Iterator<Item = Observable> + 't> {
        let urls: Vec<(usize, usize)> = url_spans(clean).map(|s| (s.start, s.end)).collect();

        Box::new(DOTTED_QUAD.find_iter(clean).filter_map(move |m| {
            if urls.iter().any(|&(start, end)| m.start() >= start && m.end() <= end) {
                return None;
            }
            if !is_isolated(clean, m.start(), m.end())
                || is_dotted_continuation(clean, m.start(), m.end())
            {
                return None;
            }

            let addr = parse_octets(m.as_str())?;
            Some(Observable::new(Form::Ipv4, addr.to_string()).with_repr(m.as_str()))
        }))
    }
}

/// True when a `.digit` sequence touches either end of the span.
fn is_dotted_continuation(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    let leads = start >= 2 && bytes.get(start - 1) == Some(&b'.') && digit_at(start - 2);
    let trails = bytes.get(end) == Some(&b'.') && digit_at(end + 1);
    leads || trails
}

fn parse_octets(quad: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(quad.split('.')) {
        *slot = part.parse().ok()?;
    }
    Some(Ipv4Addr::from(octets))
}
