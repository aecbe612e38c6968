//! Fingerprint list parser
//!
//! One entry per line: `kind | field | field ...`. Lines starting with `#`
//! or `!` are comments. Fields are trimmed. For kinds whose last field is a
//! regex, that field takes the remainder of the line.

use std::fmt;

/// Error type for list parsing. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("line {line}: unknown entry kind '{kind}'")]
    UnknownKind { line: usize, kind: String },
    #[error("line {line}: '{kind}' expects {expected} field(s), found {found}")]
    FieldCount {
        line: usize,
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: '{kind}' has an empty {field}")]
    EmptyField {
        line: usize,
        kind: &'static str,
        field: &'static str,
    },
    #[error("line {line}: invalid length '{value}'")]
    InvalidLength { line: usize, value: String },
}

/// A single fingerprint table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableEntry {
    Cookie { name: String, label: String },
    CookiePrefix { prefix: String, label: String },
    CookieShape {
        label: String,
        prefix: String,
        len: usize,
        pattern: String,
    },
    Generator { platform: String },
    MetaNamePrefix { prefix: String, category: String },
    MetaProperty { property: String },
    MetaPropertyPrefix { prefix: String, category: String },
    LinkRel { rel: String },
    Grep { label: String, pattern: String },
    GrepCapture { label: String, pattern: String },
    Embed { needle: String, label: String },
    EmbedQuery {
        needle: String,
        key: String,
        value_prefix: String,
        label: String,
    },
    Header { name: String, label: String },
    HeaderPrefix { prefix: String, label: String },
    HeaderAllow { name: String },
}

impl TableEntry {
    /// Keyword used for this entry in list files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cookie { .. } => "cookie",
            Self::CookiePrefix { .. } => "cookie-prefix",
            Self::CookieShape { .. } => "cookie-shape",
            Self::Generator { .. } => "generator",
            Self::MetaNamePrefix { .. } => "meta-name-prefix",
            Self::MetaProperty { .. } => "meta-property",
            Self::MetaPropertyPrefix { .. } => "meta-property-prefix",
            Self::LinkRel { .. } => "link-rel",
            Self::Grep { .. } => "grep",
            Self::GrepCapture { .. } => "grep-capture",
            Self::Embed { .. } => "embed",
            Self::EmbedQuery { .. } => "embed-query",
            Self::Header { .. } => "header",
            Self::HeaderPrefix { .. } => "header-prefix",
            Self::HeaderAllow { .. } => "header-allow",
        }
    }
}

impl fmt::Display for TableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        match self {
            Self::Cookie { name, label } => write!(f, " | {} | {}", name, label),
            Self::CookiePrefix { prefix, label } => write!(f, " | {} | {}", prefix, label),
            Self::CookieShape {
                label,
                prefix,
                len,
                pattern,
            } => write!(f, " | {} | {} | {} | {}", label, prefix, len, pattern),
            Self::Generator { platform } => write!(f, " | {}", platform),
            Self::MetaNamePrefix { prefix, category } => write!(f, " | {} | {}", prefix, category),
            Self::MetaProperty { property } => write!(f, " | {}", property),
            Self::MetaPropertyPrefix { prefix, category } => write!(f, " | {} | {}", prefix, category),
            Self::LinkRel { rel } => write!(f, " | {}", rel),
            Self::Grep { label, pattern } => write!(f, " | {} | {}", label, pattern),
            Self::GrepCapture { label, pattern } => write!(f, " | {} | {}", label, pattern),
            Self::Embed { needle, label } => write!(f, " | {} | {}", needle, label),
            Self::EmbedQuery {
                needle,
                key,
                value_prefix,
                label,
            } => write!(f, " | {} | {} | {} | {}", needle, key, value_prefix, label),
            Self::Header { name, label } => write!(f, " | {} | {}", name, label),
            Self::HeaderPrefix { prefix, label } => write!(f, " | {} | {}", prefix, label),
            Self::HeaderAllow { name } => write!(f, " | {}", name),
        }
    }
}

/// Parse a whole list. Stops at the first malformed line.
pub fn parse_fingerprint_list(text: &str) -> Result<Vec<TableEntry>, ListError> {
    let mut entries = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        entries.push(parse_line(line, idx + 1)?);
    }

    Ok(entries)
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('!')
}

fn parse_line(line: &str, line_no: usize) -> Result<TableEntry, ListError> {
    let (kind, rest) = match line.find('|') {
        Some(pos) => (line[..pos].trim(), Some(&line[pos + 1..])),
        None => (line, None),
    };
    let kind = kind.to_ascii_lowercase();

    let mut fields = Fields {
        line: line_no,
        rest,
        kind: "",
    };

    let entry = match kind.as_str() {
        "cookie" => {
            let [name, label] = fields.exact::<2>("cookie")?;
            TableEntry::Cookie {
                name: fields.required(name, "cookie name")?,
                label: fields.required(label, "label")?,
            }
        }
        "cookie-prefix" => {
            let [prefix, label] = fields.exact::<2>("cookie-prefix")?;
            TableEntry::CookiePrefix {
                prefix: fields.required(prefix, "prefix")?,
                label: fields.required(label, "label")?,
            }
        }
        "cookie-shape" => {
            let [label, prefix, len, pattern] = fields.greedy::<4>("cookie-shape")?;
            TableEntry::CookieShape {
                label: fields.required(label, "label")?,
                prefix: prefix.to_string(),
                len: len.parse().map_err(|_| ListError::InvalidLength {
                    line: line_no,
                    value: len.to_string(),
                })?,
                pattern: fields.required(pattern, "pattern")?,
            }
        }
        "generator" => {
            let [platform] = fields.exact::<1>("generator")?;
            TableEntry::Generator {
                platform: fields.required(platform, "platform")?,
            }
        }
        "meta-name-prefix" => {
            let [prefix, category] = fields.exact::<2>("meta-name-prefix")?;
            TableEntry::MetaNamePrefix {
                prefix: fields.required(prefix, "prefix")?,
                category: fields.required(category, "category")?,
            }
        }
        "meta-property" => {
            let [property] = fields.exact::<1>("meta-property")?;
            TableEntry::MetaProperty {
                property: fields.required(property, "property")?,
            }
        }
        "meta-property-prefix" => {
            let [prefix, category] = fields.exact::<2>("meta-property-prefix")?;
            TableEntry::MetaPropertyPrefix {
                prefix: fields.required(prefix, "prefix")?,
                category: fields.required(category, "category")?,
            }
        }
        "link-rel" => {
            let [rel] = fields.exact::<1>("link-rel")?;
            TableEntry::LinkRel {
                rel: fields.required(rel, "relation")?,
            }
        }
        "grep" => {
            let [label, pattern] = fields.greedy::<2>("grep")?;
            TableEntry::Grep {
                label: fields.required(label, "label")?,
                pattern: fields.required(pattern, "pattern")?,
            }
        }
        "grep-capture" => {
            let [label, pattern] = fields.greedy::<2>("grep-capture")?;
            TableEntry::GrepCapture {
                label: fields.required(label, "label")?,
                pattern: fields.required(pattern, "pattern")?,
            }
        }
        "embed" => {
            let [needle, label] = fields.exact::<2>("embed")?;
            TableEntry::Embed {
                needle: fields.required(needle, "url substring")?,
                label: fields.required(label, "label")?,
            }
        }
        "embed-query" => {
            let [needle, key, value_prefix, label] = fields.exact::<4>("embed-query")?;
            TableEntry::EmbedQuery {
                needle: fields.required(needle, "url substring")?,
                key: fields.required(key, "query key")?,
                value_prefix: value_prefix.to_string(),
                label: fields.required(label, "label")?,
            }
        }
        "header" => {
            let [name, label] = fields.exact::<2>("header")?;
            TableEntry::Header {
                name: fields.required(name, "header name")?.to_ascii_lowercase(),
                label: fields.required(label, "label")?,
            }
        }
        "header-prefix" => {
            let [prefix, label] = fields.exact::<2>("header-prefix")?;
            TableEntry::HeaderPrefix {
                prefix: fields.required(prefix, "prefix")?.to_ascii_lowercase(),
                label: fields.required(label, "label")?,
            }
        }
        "header-allow" => {
            let [name] = fields.exact::<1>("header-allow")?;
            TableEntry::HeaderAllow {
                name: fields.required(name, "header name")?.to_ascii_lowercase(),
            }
        }
        _ => {
            return Err(ListError::UnknownKind {
                line: line_no,
                kind,
            })
        }
    };

    Ok(entry)
}

/// Field splitter for the part of a line after the kind.
struct Fields<'a> {
    line: usize,
    rest: Option<&'a str>,
    kind: &'static str,
}

impl<'a> Fields<'a> {
    /// Exactly `N` fields.
    fn exact<const N: usize>(&mut self, kind: &'static str) -> Result<[&'a str; N], ListError> {
        self.kind = kind;
        let parts: Vec<&str> = match self.rest {
            Some(rest) => rest.split('|').map(str::trim).collect(),
            None => Vec::new(),
        };
        self.collect(parts)
    }

    /// `N` fields, the last taking the remainder of the line.
    fn greedy<const N: usize>(&mut self, kind: &'static str) -> Result<[&'a str; N], ListError> {
        self.kind = kind;
        let parts: Vec<&str> = match self.rest {
            Some(rest) => rest.splitn(N, '|').map(str::trim).collect(),
            None => Vec::new(),
        };
        self.collect(parts)
    }

    fn collect<const N: usize>(&self, parts: Vec<&'a str>) -> Result<[&'a str; N], ListError> {
        let found = parts.len();
        parts.try_into().map_err(|_| ListError::FieldCount {
            line: self.line,
            kind: self.kind,
            expected: N,
            found,
        })
    }

    fn required(&self, value: &str, field: &'static str) -> Result<String, ListError> {
        if value.is_empty() {
            return Err(ListError::EmptyField {
                line: self.line,
                kind: self.kind,
                field,
            });
        }
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_entries() {
        let text = "\
# vendor headers
! alternate comment style

header | CF-RAY | cloudflare
header-prefix | X-Drupal- | drupal
cookie | PHPSESSID | php
embed-query | googletagmanager.com | id | GTM- | google tag manager id
";
        let entries = parse_fingerprint_list(text).unwrap();
        assert_eq!(
            entries,
            vec![
                TableEntry::Header {
                    name: "cf-ray".to_string(),
                    label: "cloudflare".to_string(),
                },
                TableEntry::HeaderPrefix {
                    prefix: "x-drupal-".to_string(),
                    label: "drupal".to_string(),
                },
                TableEntry::Cookie {
                    name: "PHPSESSID".to_string(),
                    label: "php".to_string(),
                },
                TableEntry::EmbedQuery {
                    needle: "googletagmanager.com".to_string(),
                    key: "id".to_string(),
                    value_prefix: "GTM-".to_string(),
                    label: "google tag manager id".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_regex_field_keeps_pipes() {
        let entries = parse_fingerprint_list("grep-capture | hubspot id | js\\.hs-scripts\\.com/([0-9]+)|hs-([0-9]+)").unwrap();
        assert_eq!(
            entries,
            vec![TableEntry::GrepCapture {
                label: "hubspot id".to_string(),
                pattern: "js\\.hs-scripts\\.com/([0-9]+)|hs-([0-9]+)".to_string(),
            }]
        );
    }

    #[test]
    fn test_cookie_shape_allows_empty_prefix() {
        let entries = parse_fingerprint_list("cookie-shape | cookie-mystery-1 |  | 32 | [0-9a-f]{32}").unwrap();
        assert_eq!(
            entries,
            vec![TableEntry::CookieShape {
                label: "cookie-mystery-1".to_string(),
                prefix: String::new(),
                len: 32,
                pattern: "[0-9a-f]{32}".to_string(),
            }]
        );
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_fingerprint_list("cookie | a | b\n\nbogus | x").unwrap_err();
        assert_eq!(
            err,
            ListError::UnknownKind {
                line: 3,
                kind: "bogus".to_string()
            }
        );

        let err = parse_fingerprint_list("cookie | a | b | c").unwrap_err();
        assert!(matches!(err, ListError::FieldCount { line: 1, expected: 2, found: 3, .. }));

        let err = parse_fingerprint_list("header-allow").unwrap_err();
        assert!(matches!(err, ListError::FieldCount { found: 0, .. }));

        let err = parse_fingerprint_list("cookie |  | php").unwrap_err();
        assert!(matches!(err, ListError::EmptyField { field: "cookie name", .. }));

        let err = parse_fingerprint_list("cookie-shape | x | TS | ten | [0-9]").unwrap_err();
        assert_eq!(
            err,
            ListError::InvalidLength {
                line: 1,
                value: "ten".to_string()
            }
        );
    }

    #[test]
    fn test_display_round_trips_kind() {
        let entry = TableEntry::Embed {
            needle: "cdn.ampproject.org".to_string(),
            label: "google amp".to_string(),
        };
        assert_eq!(entry.to_string(), "embed | cdn.ampproject.org | google amp");
        assert_eq!(parse_fingerprint_list(&entry.to_string()).unwrap(), vec![entry]);
    }
}
