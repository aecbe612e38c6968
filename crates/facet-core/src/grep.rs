//! Raw-text scan of the head bytes
//!
//! Catches tokens that live inside inline script bodies, where structured
//! parsing never looks. Works on bytes, so it runs even when the head is
//! not valid UTF-8. The `regex` engine is linear-time on any input.

use crate::tables::{FingerprintTables, GrepMatcher, GrepRule};
use crate::types::Facet;

/// Run every grep rule over the raw head, in table order.
///
/// Capture rules report every match, including verbatim repeats.
pub fn grep_facets(head: &[u8], tables: &FingerprintTables) -> Vec<Facet> {
    let mut facets = Vec::new();
    for rule in tables.grep_rules() {
        apply_rule(rule, head, &mut facets);
    }
    facets
}

fn apply_rule(rule: &GrepRule, head: &[u8], facets: &mut Vec<Facet>) {
    match &rule.matcher {
        GrepMatcher::Presence(re) => {
            if re.is_match(head) {
                facets.push(Facet::flag(rule.label.as_str()));
            }
        }
        GrepMatcher::Capture(re) => {
            for caps in re.captures_iter(head) {
                let token = caps.get(1).or_else(|| caps.get(0));
                if let Some(m) = token {
                    let value = String::from_utf8_lossy(m.as_bytes());
                    facets.push(Facet::text(rule.label.as_str(), value));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grep(head: &[u8]) -> Vec<Facet> {
        grep_facets(head, &FingerprintTables::builtin())
    }

    #[test]
    fn test_schema_org_either_scheme() {
        assert_eq!(grep(br#"{"@context": "https://schema.org"}"#), vec![Facet::flag("schema.org")]);
        assert_eq!(
            grep(br#"{"@context": "http://schema.org", "x": "https://schema.org"}"#),
            vec![Facet::flag("schema.org")]
        );
        assert!(grep(b"schema.org").is_empty());
    }

    #[test]
    fn test_analytics_id() {
        let facets = grep(br#"ga('create', 'UA-1234567-1', 'auto');"#);
        assert_eq!(facets, vec![Facet::text("google analytics", "UA-1234567-1")]);
    }

    #[test]
    fn test_analytics_id_requires_quotes_and_shape() {
        assert!(grep(b"UA-1234567-1").is_empty());
        assert!(grep(br#""UA-123456-1""#).is_empty());
        assert!(grep(br#""UA-1234567-1234""#).is_empty());
    }

    #[test]
    fn test_publisher_id_delimiters() {
        let facets = grep(br#"data-ad-client="ca-pub-1234567890123456" x='pub-123456789012345'"#);
        assert_eq!(
            facets,
            vec![
                Facet::text("google publisher id", "pub-1234567890123456"),
                Facet::text("google publisher id", "pub-123456789012345"),
            ]
        );
    }

    #[test]
    fn test_repeated_matches_all_reported() {
        let facets = grep(br#"'UA-1234567-1' "UA-1234567-1""#);
        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0], facets[1]);
    }

    #[test]
    fn test_runs_on_invalid_utf8() {
        let facets = grep(b"\xff\xfe 'UA-7654321-12' \xc0");
        assert_eq!(facets, vec![Facet::text("google analytics", "UA-7654321-12")]);
    }

    #[test]
    fn test_rule_order_is_table_order() {
        let facets = grep(br#"'UA-1234567-1' "pub-1234567890123456" https://schema.org"#);
        let labels: Vec<_> = facets.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["schema.org", "google publisher id", "google analytics"]);
    }
}
