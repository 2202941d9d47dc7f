//! The Observable value type.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormParseError;

/// Kind of indicator, named after the knowledge-graph form it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Form {
    #[serde(rename = "inet:ipv4")]
    Ipv4,
    #[serde(rename = "inet:url")]
    Url,
    #[serde(rename = "inet:email")]
    Email,
    #[serde(rename = "hash:md5")]
    Md5,
    #[serde(rename = "hash:sha1")]
    Sha1,
    #[serde(rename = "hash:sha256")]
    Sha256,
}

impl Form {
    /// All known forms, in registry order.
    pub const ALL: [Form; 6] = [
        Form::Ipv4,
        Form::Url,
        Form::Email,
        Form::Md5,
        Form::Sha1,
        Form::Sha256,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Form::Ipv4 => "inet:ipv4",
            Form::Url => "inet:url",
            Form::Email => "inet:email",
            Form::Md5 => "hash:md5",
            Form::Sha1 => "hash:sha1",
            Form::Sha256 => "hash:sha256",
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Form {
    type Err = FormParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Form::ALL
            .into_iter()
            .find(|form| form.as_str() == s)
            .ok_or_else(|| FormParseError(s.to_string()))
    }
}

/// One extracted indicator.
///
/// `valu` is canonical and must satisfy the grammar of `form`; `repr` is
/// what a human should see and is ignored by equality and hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observable {
    pub form: Form,
    pub valu: String,
    pub repr: String,
}

impl Observable {
    /// Create an observable whose representation equals its value.
    pub fn new(form: Form, valu: impl Into<String>) -> Self {
        let valu = valu.into();
        Self {
            form,
            repr: valu.clone(),
            valu,
        }
    }

    /// Set a representation distinct from the canonical value.
    pub fn with_repr(mut self, repr: impl Into<String>) -> Self {
        self.repr = repr.into();
        self
    }
}

impl PartialEq for Observable {
    fn eq(&self, other: &Self) -> bool {
        self.form == other.form && self.valu == other.valu
    }
}

impl Eq for Observable {}

impl Hash for Observable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.form.hash(state);
        self.valu.hash(state);
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.form, self.valu)
    }
}
