//! Reversal of de-fanging conventions.
//!
//! Analysts neuter indicators before pasting them into reports so that mail
//! filters and chat clients do not turn them into live links:
//!
//! | de-fanged            | restored     |
//! |----------------------|--------------|
//! | `evil[.]com`         | `evil.com`   |
//! | `evil(.)com`         | `evil.com`   |
//! | `evil{.}com`         | `evil.com`   |
//! | `evil\.com`          | `evil.com`   |
//! | `1.2.3.4[:]80`       | `1.2.3.4:80` |
//! | `http[://]evil.com`  | `http://evil.com` |
//! | `bob[@]evil.com`     | `bob@evil.com` |
//! | `hxxp`, `HXXPS`      | `http`, `httpS` |
//!
//! Only brackets that wrap a single punctuation token are removed. Bracketed
//! free text such as `[Victim_HostName]` is left alone.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref DEFANGED: Regex = Regex::new(
        r"\[\.\]|\(\.\)|\{\.\}|\[://\]|\[:\]|\[@\]|\\\.|(?i:hxxp)"
    )
    .expect("defang pattern is valid");
}

/// Restore de-fanged indicators in `text`.
///
/// Borrows when the text carries no de-fanging. Rewriting runs to a fixpoint,
/// so nested forms like `[[.]]` collapse fully and `defang(defang(x)) ==
/// defang(x)` always holds.
pub fn defang(text: &str) -> Cow<'_, str> {
    if !DEFANGED.is_match(text) {
        return Cow::Borrowed(text);
    }

    // Every bracket rewrite shortens the text and `http` never re-matches,
    // so this terminates.
    let mut current = rewrite(text);
    while DEFANGED.is_match(&current) {
        current = rewrite(&current);
    }
    Cow::Owned(current)
}

fn rewrite(text: &str) -> String {
    DEFANGED
        .replace_all(text, |caps: &Captures| {
            let token = &caps[0];
            match token {
                "[.]" | "(.)" | "{.}" | "\\." => ".",
                "[:]" => ":",
                "[://]" => "://",
                "[@]" => "@",
                _ => "http",
            }
        })
        .into_owned()
}
