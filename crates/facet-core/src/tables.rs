//! Fingerprint tables
//!
//! Read-only rule data consumed by every extractor: cookie-name and
//! cookie-prefix maps, cookie shape rules, meta/link interest sets, grep
//! patterns, embed substrings and the header capture policy.
//!
//! Tables are assembled once through [`TablesBuilder`] and are never mutated
//! afterwards. Extending vendor coverage means adding entries, not code.

use std::collections::{BTreeSet, HashMap, HashSet};

use regex::bytes::Regex as BytesRegex;
use regex::Regex;

/// Error type for rule construction.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Invalid pattern for '{label}': {source}")]
    InvalidPattern {
        label: String,
        #[source]
        source: regex::Error,
    },
    #[error("Shape rule '{label}': length {len} does not fit prefix '{prefix}'")]
    ShapeLength {
        label: String,
        prefix: String,
        len: usize,
    },
    #[error("Grep rule '{label}' has no needles")]
    EmptyLiteral { label: String },
}

// =============================================================================
// Rule Types
// =============================================================================

/// Prefix → label rule, evaluated in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRule {
    pub prefix: String,
    pub label: String,
}

impl PrefixRule {
    pub fn new(prefix: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            label: label.into(),
        }
    }

    #[inline]
    pub fn matches(&self, s: &str) -> bool {
        s.starts_with(self.prefix.as_str())
    }
}

/// How a grep rule inspects the raw head bytes.
#[derive(Debug, Clone)]
pub enum GrepMatcher {
    /// Emit one boolean facet if the pattern occurs anywhere.
    Presence(BytesRegex),
    /// Emit one value facet per match. The value is capture group 1 when the
    /// pattern has one, the whole match otherwise.
    Capture(BytesRegex),
}

/// A raw-text scan rule over the head bytes.
#[derive(Debug, Clone)]
pub struct GrepRule {
    pub label: String,
    pub matcher: GrepMatcher,
}

impl GrepRule {
    /// Presence rule that fires when any of the literal needles occurs.
    pub fn literal(label: &str, needles: &[&str]) -> Result<Self, TableError> {
        if needles.is_empty() {
            return Err(TableError::EmptyLiteral {
                label: label.to_string(),
            });
        }
        let alternation = needles
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            label: label.to_string(),
            matcher: GrepMatcher::Presence(compile_bytes(label, &alternation)?),
        })
    }

    /// Presence rule from a regex.
    pub fn presence(label: &str, pattern: &str) -> Result<Self, TableError> {
        Ok(Self {
            label: label.to_string(),
            matcher: GrepMatcher::Presence(compile_bytes(label, pattern)?),
        })
    }

    /// Value-capturing rule from a regex.
    pub fn capture(label: &str, pattern: &str) -> Result<Self, TableError> {
        Ok(Self {
            label: label.to_string(),
            matcher: GrepMatcher::Capture(compile_bytes(label, pattern)?),
        })
    }
}

/// Query parameter captured from a matched embed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCapture {
    /// Parameter key, compared exactly
    pub key: String,
    /// Required value prefix (may be empty)
    pub value_prefix: String,
    /// Label of the emitted value facet
    pub label: String,
}

/// Substring rule over embedded-resource URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRule {
    /// Case-sensitive URL substring
    pub needle: String,
    /// Boolean facet emitted on match, if any
    pub label: Option<String>,
    /// Query parameters to capture on match
    pub captures: Vec<QueryCapture>,
}

/// Shape-based cookie classification ("mystery cookie" rule).
///
/// A cookie name matches when it has exactly `len` bytes, starts with the
/// literal `prefix`, and the remainder fully matches `pattern`.
#[derive(Debug, Clone)]
pub struct ShapeRule {
    pub label: String,
    pub prefix: String,
    pub len: usize,
    pattern: Regex,
    source: String,
}

impl ShapeRule {
    pub fn new(label: &str, prefix: &str, len: usize, pattern: &str) -> Result<Self, TableError> {
        if len <= prefix.len() {
            return Err(TableError::ShapeLength {
                label: label.to_string(),
                prefix: prefix.to_string(),
                len,
            });
        }
        let anchored = format!("^(?:{})$", pattern);
        let compiled = Regex::new(&anchored).map_err(|source| TableError::InvalidPattern {
            label: label.to_string(),
            source,
        })?;
        Ok(Self {
            label: label.to_string(),
            prefix: prefix.to_string(),
            len,
            pattern: compiled,
            source: pattern.to_string(),
        })
    }

    /// Pattern over the characters following the prefix, as declared.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        name.len() == self.len
            && name.starts_with(self.prefix.as_str())
            && self.pattern.is_match(&name[self.prefix.len()..])
    }
}

fn compile_bytes(label: &str, pattern: &str) -> Result<BytesRegex, TableError> {
    BytesRegex::new(pattern).map_err(|source| TableError::InvalidPattern {
        label: label.to_string(),
        source,
    })
}

// =============================================================================
// Header Policy
// =============================================================================

/// Which response headers become `header-<key>` facets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Every header is captured
    #[default]
    CaptureAll,
    /// Only the listed (lower-case) keys are captured
    AllowList(BTreeSet<String>),
}

/// Historical interest list of search-relevant headers.
const LEGACY_ALLOW_LIST: &[&str] = &[
    "refresh",
    "server",
    "set-cookie",
    "strict-transport-security",
    "tk",
];

impl HeaderPolicy {
    pub fn allow_list<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::AllowList(
            keys.into_iter()
                .map(|k| k.as_ref().trim().to_ascii_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn legacy_allow_list() -> Self {
        Self::allow_list(LEGACY_ALLOW_LIST)
    }

    #[inline]
    pub fn captures(&self, key: &str) -> bool {
        match self {
            Self::CaptureAll => true,
            Self::AllowList(keys) => keys.contains(key),
        }
    }
}

// =============================================================================
// Fingerprint Tables
// =============================================================================

/// Immutable rule data shared by all extractor stages.
#[derive(Debug, Clone, Default)]
pub struct FingerprintTables {
    generator_platforms: Vec<String>,
    meta_name_prefixes: Vec<PrefixRule>,
    meta_property_content: HashSet<String>,
    meta_property_prefixes: Vec<PrefixRule>,
    link_rels: HashSet<String>,
    grep_rules: Vec<GrepRule>,
    header_policy: HeaderPolicy,
    header_names: HashMap<String, String>,
    header_prefixes: Vec<PrefixRule>,
    embed_rules: Vec<EmbedRule>,
    cookie_names: HashMap<String, String>,
    cookie_prefixes: Vec<PrefixRule>,
    cookie_shapes: Vec<ShapeRule>,
}

impl FingerprintTables {
    /// Start from empty tables.
    pub fn builder() -> TablesBuilder {
        TablesBuilder::default()
    }

    /// Continue building on top of these tables.
    pub fn into_builder(self) -> TablesBuilder {
        TablesBuilder { tables: self }
    }

    /// Lower-case platform substrings looked for in `<meta name="generator">`.
    pub fn generator_platforms(&self) -> &[String] {
        &self.generator_platforms
    }

    pub fn meta_name_prefixes(&self) -> &[PrefixRule] {
        &self.meta_name_prefixes
    }

    /// Whether a (lower-case) meta property is captured with its content.
    #[inline]
    pub fn is_meta_property_of_interest(&self, property: &str) -> bool {
        self.meta_property_content.contains(property)
    }

    pub fn meta_property_prefixes(&self) -> &[PrefixRule] {
        &self.meta_property_prefixes
    }

    /// Whether a (lower-case) link relation is recognized.
    #[inline]
    pub fn is_link_rel_of_interest(&self, rel: &str) -> bool {
        self.link_rels.contains(rel)
    }

    pub fn grep_rules(&self) -> &[GrepRule] {
        &self.grep_rules
    }

    pub fn header_policy(&self) -> &HeaderPolicy {
        &self.header_policy
    }

    /// Vendor label for a header name: exact entry first, then the first
    /// matching prefix.
    pub fn header_vendor(&self, key: &str) -> Option<&str> {
        if let Some(label) = self.header_names.get(key) {
            return Some(label.as_str());
        }
        self.header_prefixes
            .iter()
            .find(|rule| rule.matches(key))
            .map(|rule| rule.label.as_str())
    }

    pub fn embed_rules(&self) -> &[EmbedRule] {
        &self.embed_rules
    }

    /// Label for an exact cookie name.
    #[inline]
    pub fn cookie_label(&self, name: &str) -> Option<&str> {
        self.cookie_names.get(name).map(String::as_str)
    }

    pub fn cookie_prefixes(&self) -> &[PrefixRule] {
        &self.cookie_prefixes
    }

    pub fn cookie_shapes(&self) -> &[ShapeRule] {
        &self.cookie_shapes
    }

    /// Entry counts per table, for reporting.
    pub fn stats(&self) -> TableStats {
        TableStats {
            generator_platforms: self.generator_platforms.len(),
            meta_name_prefixes: self.meta_name_prefixes.len(),
            meta_properties: self.meta_property_content.len(),
            meta_property_prefixes: self.meta_property_prefixes.len(),
            link_rels: self.link_rels.len(),
            grep_rules: self.grep_rules.len(),
            header_allow: match &self.header_policy {
                HeaderPolicy::CaptureAll => None,
                HeaderPolicy::AllowList(keys) => Some(keys.len()),
            },
            header_fingerprints: self.header_names.len() + self.header_prefixes.len(),
            embed_rules: self.embed_rules.len(),
            cookie_names: self.cookie_names.len(),
            cookie_prefixes: self.cookie_prefixes.len(),
            cookie_shapes: self.cookie_shapes.len(),
        }
    }
}

/// Entry counts per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableStats {
    pub generator_platforms: usize,
    pub meta_name_prefixes: usize,
    pub meta_properties: usize,
    pub meta_property_prefixes: usize,
    pub link_rels: usize,
    pub grep_rules: usize,
    /// `None` when every header is captured
    pub header_allow: Option<usize>,
    pub header_fingerprints: usize,
    pub embed_rules: usize,
    pub cookie_names: usize,
    pub cookie_prefixes: usize,
    pub cookie_shapes: usize,
}

// =============================================================================
// Builder
// =============================================================================

/// Assembles [`FingerprintTables`]. Lookup tables keep the first entry for a
/// key; ordered rule lists keep declaration order.
#[derive(Debug, Clone, Default)]
pub struct TablesBuilder {
    tables: FingerprintTables,
}

impl TablesBuilder {
    pub fn generator(mut self, platform: &str) -> Self {
        let platform = platform.to_lowercase();
        if !self.tables.generator_platforms.contains(&platform) {
            self.tables.generator_platforms.push(platform);
        }
        self
    }

    pub fn meta_name_prefix(mut self, prefix: &str, category: &str) -> Self {
        self.tables
            .meta_name_prefixes
            .push(PrefixRule::new(prefix.to_lowercase(), category));
        self
    }

    pub fn meta_property(mut self, property: &str) -> Self {
        self.tables.meta_property_content.insert(property.to_lowercase());
        self
    }

    pub fn meta_property_prefix(mut self, prefix: &str, category: &str) -> Self {
        self.tables
            .meta_property_prefixes
            .push(PrefixRule::new(prefix.to_lowercase(), category));
        self
    }

    pub fn link_rel(mut self, rel: &str) -> Self {
        self.tables.link_rels.insert(rel.to_lowercase());
        self
    }

    pub fn grep_rule(mut self, rule: GrepRule) -> Self {
        self.tables.grep_rules.push(rule);
        self
    }

    pub fn header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.tables.header_policy = policy;
        self
    }

    /// Add a key to the allow-list, switching the policy to allow-list mode.
    pub fn header_allow(mut self, key: &str) -> Self {
        let key = key.trim().to_ascii_lowercase();
        if let HeaderPolicy::AllowList(keys) = &mut self.tables.header_policy {
            keys.insert(key);
        } else {
            self.tables.header_policy = HeaderPolicy::allow_list([key]);
        }
        self
    }

    pub fn header_fingerprint(mut self, name: &str, label: &str) -> Self {
        self.tables
            .header_names
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| label.to_string());
        self
    }

    pub fn header_prefix_fingerprint(mut self, prefix: &str, label: &str) -> Self {
        self.tables
            .header_prefixes
            .push(PrefixRule::new(prefix.to_ascii_lowercase(), label));
        self
    }

    /// Boolean facet for URLs containing `needle`.
    pub fn embed(mut self, needle: &str, label: &str) -> Self {
        let existing = self
            .tables
            .embed_rules
            .iter_mut()
            .find(|r| r.needle == needle && r.label.is_none());
        match existing {
            Some(rule) => rule.label = Some(label.to_string()),
            None => self.tables.embed_rules.push(EmbedRule {
                needle: needle.to_string(),
                label: Some(label.to_string()),
                captures: Vec::new(),
            }),
        }
        self
    }

    /// Capture a query parameter from URLs containing `needle`.
    pub fn embed_query(mut self, needle: &str, capture: QueryCapture) -> Self {
        let existing = self
            .tables
            .embed_rules
            .iter_mut()
            .find(|r| r.needle == needle);
        match existing {
            Some(rule) => rule.captures.push(capture),
            None => self.tables.embed_rules.push(EmbedRule {
                needle: needle.to_string(),
                label: None,
                captures: vec![capture],
            }),
        }
        self
    }

    pub fn cookie(mut self, name: &str, label: &str) -> Self {
        self.tables
            .cookie_names
            .entry(name.to_string())
            .or_insert_with(|| label.to_string());
        self
    }

    pub fn cookie_prefix(mut self, prefix: &str, label: &str) -> Self {
        self.tables.cookie_prefixes.push(PrefixRule::new(prefix, label));
        self
    }

    pub fn cookie_shape(mut self, rule: ShapeRule) -> Self {
        self.tables.cookie_shapes.push(rule);
        self
    }

    /// Whether an exact cookie name already has a label.
    pub fn has_cookie(&self, name: &str) -> bool {
        self.tables.cookie_names.contains_key(name)
    }

    pub fn build(self) -> FingerprintTables {
        self.tables
    }
}
