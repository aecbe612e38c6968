//! Embedded-resource facets
//!
//! Case-sensitive substring matching against the configured vendor tokens.
//! Every matching rule fires; a URL may yield several facets.

use crate::tables::{EmbedRule, FingerprintTables};
use crate::types::Facet;
use crate::url::EmbeddedResource;

/// Facets for each embed, in embed order then rule order.
pub fn embed_facets(embeds: &[EmbeddedResource], tables: &FingerprintTables) -> Vec<Facet> {
    let mut facets = Vec::new();
    for embed in embeds {
        for rule in tables.embed_rules() {
            if embed.url.contains(rule.needle.as_str()) {
                apply_rule(rule, embed, &mut facets);
            }
        }
    }
    facets
}

fn apply_rule(rule: &EmbedRule, embed: &EmbeddedResource, facets: &mut Vec<Facet>) {
    if let Some(label) = &rule.label {
        facets.push(Facet::flag(label.as_str()));
    }

    for capture in &rule.captures {
        for (key, value) in embed.query_pairs() {
            if key == capture.key && value.starts_with(capture.value_prefix.as_str()) {
                facets.push(Facet::text(capture.label.as_str(), value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embeds(urls: &[&str]) -> Vec<Facet> {
        let embeds: Vec<EmbeddedResource> = urls.iter().map(|u| EmbeddedResource::new(*u)).collect();
        embed_facets(&embeds, &FingerprintTables::builtin())
    }

    #[test]
    fn test_tag_manager_with_container_id() {
        assert_eq!(
            embeds(&["https://www.googletagmanager.com/gtm.js?id=GTM-ABCD12"]),
            vec![
                Facet::flag("google tag manager"),
                Facet::text("google tag manager id", "GTM-ABCD12"),
            ]
        );
    }

    #[test]
    fn test_tag_manager_non_container_id_ignored() {
        assert_eq!(
            embeds(&["https://www.googletagmanager.com/gtag/js?id=G-XYZ&l=dataLayer"]),
            vec![Facet::flag("google tag manager")]
        );
    }

    #[test]
    fn test_multiple_matches_per_url() {
        let facets = embeds(&["https://pagead2.googlesyndication.com/x?src=cdn.ampproject.org"]);
        assert_eq!(facets, vec![Facet::flag("google amp"), Facet::flag("google adsense")]);
    }

    #[test]
    fn test_case_sensitive_tokens() {
        assert!(embeds(&["https://CDN.AMPPROJECT.ORG/v0.js"]).is_empty());
    }

    #[test]
    fn test_embed_order_preserved() {
        let facets = embeds(&[
            "https://www.google-analytics.com/analytics.js",
            "https://www.google.com/adsense/domains/caf.js",
            "https://example.com/app.js",
        ]);
        assert_eq!(
            facets,
            vec![
                Facet::flag("google analytics link"),
                Facet::flag("google adsense for domains"),
            ]
        );
    }
}
