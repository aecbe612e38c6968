//! Structured `<head>` inspection
//!
//! [`HeadDocument`] is a typed, read-only view of a parsed head fragment.
//! It is produced in a single pass over the DOM so extractors never probe
//! attributes dynamically. [`head_facets`] turns it into facets.

use scraper::{ElementRef, Html};

use crate::tables::FingerprintTables;
use crate::types::Facet;

/// Label of the diagnostic facet emitted when the head cannot be parsed.
pub const PARSE_EXCEPTION_LABEL: &str = "ParseException";

/// Placeholder for a missing `<meta content>`.
pub const NO_CONTENT: &str = "nocontent";
/// Placeholder for a missing `<link href>`.
pub const NO_HREF: &str = "nohref";
/// Placeholder for a missing `<link type>`.
pub const NO_TYPE: &str = "notype";

/// Error type for head parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("head is {len} bytes, limit is {limit}")]
    TooLarge { len: usize, limit: usize },
}

// =============================================================================
// Head Document
// =============================================================================

/// A `<meta>` element carrying `name` and/or `property`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaElement {
    pub name: Option<String>,
    pub property: Option<String>,
    pub content: Option<String>,
}

/// A `<link>` element carrying `rel`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkElement {
    /// Whitespace-separated `rel` values, in attribute order
    pub rel: Vec<String>,
    pub href: Option<String>,
    pub link_type: Option<String>,
}

/// Typed view of a parsed head fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadDocument {
    /// `lang` on the root element
    pub lang: Option<String>,
    /// `xml:lang` on the root element
    pub xml_lang: Option<String>,
    /// `href` of the first `<base>` element
    pub base_href: Option<String>,
    /// Meta elements with `name` or `property`, in document order
    pub metas: Vec<MetaElement>,
    /// Link elements with `rel`, in document order
    pub links: Vec<LinkElement>,
    /// Number of elements carrying an `integrity` attribute
    pub integrity_count: usize,
}

impl HeadDocument {
    /// Decode and parse raw head bytes.
    ///
    /// Fails only when the bytes exceed `max_bytes`. Invalid UTF-8 sequences
    /// decode to U+FFFD and markup errors are recovered by the HTML parser.
    pub fn parse(bytes: &[u8], max_bytes: usize) -> Result<Self, ParseFailure> {
        if bytes.len() > max_bytes {
            return Err(ParseFailure::TooLarge {
                len: bytes.len(),
                limit: max_bytes,
            });
        }
        Ok(Self::parse_str(&String::from_utf8_lossy(bytes)))
    }

    /// Parse head markup that is already text.
    pub fn parse_str(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self::from_html(&document)
    }

    fn from_html(document: &Html) -> Self {
        let root = document.root_element();
        let mut head = Self {
            lang: root.value().attr("lang").map(str::to_string),
            xml_lang: root.value().attr("xml:lang").map(str::to_string),
            ..Self::default()
        };

        let mut seen_base = false;
        for node in root.descendants() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            let v = el.value();

            if v.attr("integrity").is_some() {
                head.integrity_count += 1;
            }

            match v.name() {
                "base" if !seen_base => {
                    seen_base = true;
                    head.base_href = v.attr("href").map(str::to_string);
                }
                "meta" => {
                    let name = v.attr("name");
                    let property = v.attr("property");
                    if name.is_some() || property.is_some() {
                        head.metas.push(MetaElement {
                            name: name.map(str::to_string),
                            property: property.map(str::to_string),
                            content: v.attr("content").map(str::to_string),
                        });
                    }
                }
                "link" => {
                    if let Some(rel) = v.attr("rel") {
                        head.links.push(LinkElement {
                            rel: rel.split_ascii_whitespace().map(str::to_string).collect(),
                            href: v.attr("href").map(str::to_string),
                            link_type: v.attr("type").map(str::to_string),
                        });
                    }
                }
                _ => {}
            }
        }

        head
    }
}

// =============================================================================
// Head Facets
// =============================================================================

/// The diagnostic facet for a failed parse.
pub fn parse_exception(failure: &ParseFailure) -> Facet {
    Facet::text(PARSE_EXCEPTION_LABEL, failure.to_string())
}

/// Extract facets from a parsed head.
pub fn head_facets(doc: &HeadDocument, tables: &FingerprintTables) -> Vec<Facet> {
    let mut facets = Vec::new();

    if let Some(lang) = non_empty(&doc.lang) {
        facets.push(Facet::text("html lang", lang));
    }
    if let Some(lang) = non_empty(&doc.xml_lang) {
        facets.push(Facet::text("html xml:lang", lang));
    }

    if let Some(href) = non_empty(&doc.base_href) {
        facets.push(Facet::text("base", href));
    }

    for meta in &doc.metas {
        if let Some(name) = &meta.name {
            meta_name_facets(name, meta.content.as_deref(), tables, &mut facets);
        }
    }

    for meta in &doc.metas {
        if let Some(property) = &meta.property {
            meta_property_facets(property, meta.content.as_deref(), tables, &mut facets);
        }
    }

    for link in &doc.links {
        for rel in &link.rel {
            let rel = rel.to_lowercase();
            if tables.is_link_rel_of_interest(&rel) {
                facets.push(Facet::pair(
                    rel,
                    link.href.as_deref().unwrap_or(NO_HREF),
                    link.link_type.as_deref().unwrap_or(NO_TYPE),
                ));
            }
        }
    }

    if doc.integrity_count > 0 {
        facets.push(Facet::count("script integrity", doc.integrity_count as u64));
    }

    facets
}

fn meta_name_facets(name: &str, content: Option<&str>, tables: &FingerprintTables, facets: &mut Vec<Facet>) {
    let name = name.to_lowercase();
    facets.push(Facet::text(format!("meta-{}", name), content.unwrap_or(NO_CONTENT)));

    if name == "generator" {
        let generator = content.unwrap_or("").to_lowercase();
        for platform in tables.generator_platforms() {
            if generator.contains(platform.as_str()) {
                facets.push(Facet::flag(platform.as_str()));
            }
        }
    }

    for rule in tables.meta_name_prefixes() {
        if rule.matches(&name) {
            facets.push(Facet::flag(rule.label.as_str()));
        }
    }
}

fn meta_property_facets(property: &str, content: Option<&str>, tables: &FingerprintTables, facets: &mut Vec<Facet>) {
    let property = property.to_lowercase();

    if tables.is_meta_property_of_interest(&property) {
        facets.push(Facet::text(property.as_str(), content.unwrap_or(NO_CONTENT)));
    }

    for rule in tables.meta_property_prefixes() {
        if rule.matches(&property) {
            facets.push(Facet::flag(rule.label.as_str()));
        }
    }
}

#[inline]
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
