//! Core type definitions for facet extraction
//!
//! These types are shared by every extractor stage and form the in-process
//! contract with the fetch/parse collaborator and with downstream consumers.

use std::fmt;

use serde::ser::{Serialize, SerializeTuple, Serializer};

// =============================================================================
// Facet Values
// =============================================================================

/// Value carried by a facet.
///
/// Absence of evidence is never represented: there is no `false` flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FacetValue {
    /// Boolean evidence, always the literal `true`
    Flag,
    /// Free-form string value (meta content, header value, tracking id, ...)
    Text(String),
    /// Counter (e.g. number of elements carrying `integrity`)
    Count(u64),
    /// Ordered pair, used for link relations as `(href, type)`
    Pair(String, String),
}

impl FacetValue {
    /// Whether this value is the boolean `true` flag.
    #[inline]
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag)
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("true"),
            Self::Text(s) => f.write_str(s),
            Self::Count(n) => write!(f, "{}", n),
            Self::Pair(a, b) => write!(f, "({}, {})", a, b),
        }
    }
}

impl Serialize for FacetValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Flag => serializer.serialize_bool(true),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Count(n) => serializer.serialize_u64(*n),
            Self::Pair(a, b) => {
                let mut tup = serializer.serialize_tuple(2)?;
                tup.serialize_element(a)?;
                tup.serialize_element(b)?;
                tup.end()
            }
        }
    }
}

// =============================================================================
// Facet
// =============================================================================

/// One labeled observation about a page's technology or tracking stack.
///
/// Labels are not unique across a facet sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Facet {
    pub label: String,
    pub value: FacetValue,
}

impl Facet {
    /// Boolean facet.
    pub fn flag(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: FacetValue::Flag,
        }
    }

    /// String-valued facet.
    pub fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: FacetValue::Text(value.into()),
        }
    }

    /// Count-valued facet.
    pub fn count(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            value: FacetValue::Count(count),
        }
    }

    /// Pair-valued facet.
    pub fn pair(label: impl Into<String>, first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: FacetValue::Pair(first.into(), second.into()),
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

// =============================================================================
// Response Headers
// =============================================================================

/// A single HTTP response header as received.
///
/// The key is lower-cased on construction; the value is kept verbatim.
/// Keys may repeat (e.g. several `set-cookie` entries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub key: String,
    pub value: String,
}

impl ResponseHeader {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            value: value.into(),
        }
    }

    /// Whether this header sets a cookie.
    #[inline]
    pub fn is_set_cookie(&self) -> bool {
        self.key == "set-cookie"
    }
}

impl<K: AsRef<str>, V: Into<String>> From<(K, V)> for ResponseHeader {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key.as_ref(), value)
    }
}

// =============================================================================
// Stages
// =============================================================================

/// Extractor stage, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    HeadStructured,
    HeadGrep,
    Headers,
    Embeds,
    Cookies,
}

impl Stage {
    /// Fixed stage order of the pipeline.
    pub const ORDER: [Stage; 5] = [
        Stage::HeadStructured,
        Stage::HeadGrep,
        Stage::Headers,
        Stage::Embeds,
        Stage::Cookies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeadStructured => "head",
            Self::HeadGrep => "grep",
            Self::Headers => "headers",
            Self::Embeds => "embeds",
            Self::Cookies => "cookies",
        }
    }

    /// The selection bit for this stage.
    pub fn bit(&self) -> Stages {
        match self {
            Self::HeadStructured => Stages::HEAD,
            Self::HeadGrep => Stages::GREP,
            Self::Headers => Stages::HEADERS,
            Self::Embeds => Stages::EMBEDS,
            Self::Cookies => Stages::COOKIES,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags::bitflags! {
    /// Set of stages to run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Stages: u8 {
        const HEAD = 1 << 0;
        const GREP = 1 << 1;
        const HEADERS = 1 << 2;
        const EMBEDS = 1 << 3;
        const COOKIES = 1 << 4;

        /// All stages
        const ALL = 0x1F;
    }
}

impl Stages {
    /// Parse a stage name as used on the command line.
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "head" => Some(Self::HEAD),
            "grep" => Some(Self::GREP),
            "headers" => Some(Self::HEADERS),
            "embeds" => Some(Self::EMBEDS),
            "cookies" => Some(Self::COOKIES),
            "all" => Some(Self::ALL),
            _ => None,
        }
    }
}
