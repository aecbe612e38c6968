//! Built-in fingerprint data
//!
//! The default rule set. Everything here is plain data fed through
//! [`TablesBuilder`]; extractors never reference these constants directly.

use crate::tables::{FingerprintTables, GrepRule, QueryCapture, ShapeRule, TablesBuilder};

// =============================================================================
// Head Tables
// =============================================================================

/// Platform substrings looked for in `<meta name="generator">`.
const GENERATOR_PLATFORMS: &[&str] = &["wordpress", "movable type", "drupal"];

/// `<meta name>` prefix → category.
const META_NAME_PREFIXES: &[(&str, &str)] = &[("twitter:", "twitter card")];

/// `<meta property>` values captured with their content.
const META_PROPERTY_CONTENT: &[&str] = &[
    "twitter:site",
    "twitter:site:id",
    "twitter:creator",
    "twitter:creator:id",
    "fb:app_id",
    "fb:admins",
];

/// `<meta property>` prefix → dialect category.
const META_PROPERTY_PREFIXES: &[(&str, &str)] = &[
    ("al:", "applinks"),
    ("og:", "opengraph"),
    ("article:", "opengraph"),
    ("op:", "fb instant"),
    ("bt:", "boomtrain"),
];

const LINK_RELS: &[&str] = &["canonical", "alternate", "amphtml", "opengraph", "origin"];

// =============================================================================
// Grep Tables
// =============================================================================

const SCHEMA_ORG_NEEDLES: &[&str] = &["http://schema.org", "https://schema.org"];

/// Label → pattern; capture group 1 is the reported token.
const GREP_CAPTURES: &[(&str, &str)] = &[
    ("google publisher id", r#"['"\-](pub-[0-9]{15,18})['"]"#),
    ("google analytics", r#"['"](UA-[0-9]{7,9}-[0-9]{1,3})['"]"#),
];

// =============================================================================
// Embed Tables
// =============================================================================

const EMBED_RULES: &[(&str, &str)] = &[
    ("cdn.ampproject.org", "google amp"),
    ("www.google-analytics.com", "google analytics link"),
    ("googlesyndication.com", "google adsense"),
    ("google.com/adsense/domains", "google adsense for domains"),
    ("googletagmanager.com", "google tag manager"),
];

/// URL substring, query key, required value prefix, label.
const EMBED_QUERY_CAPTURES: &[(&str, &str, &str, &str)] = &[(
    "googletagmanager.com",
    "id",
    "GTM-",
    "google tag manager id",
)];

// =============================================================================
// Cookie Tables
// =============================================================================

const COOKIE_NAMES: &[(&str, &str)] = &[
    ("PHPSESSID", "php"),
    ("JSESSIONID", "java servlet"),
    ("ASP.NET_SessionId", "asp.net"),
    ("ASPXAUTH", "asp.net"),
    ("CFID", "coldfusion"),
    ("CFTOKEN", "coldfusion"),
    ("laravel_session", "laravel"),
    ("ci_session", "codeigniter"),
    ("_rails_session", "ruby on rails"),
    ("connect.sid", "express"),
    ("django_language", "django"),
    ("csrftoken", "django"),
    ("__cfduid", "cloudflare"),
    ("__cf_bm", "cloudflare bot management"),
    ("cf_clearance", "cloudflare"),
    ("AWSALB", "amazon elb"),
    ("AWSALBCORS", "amazon elb"),
    ("AWSELB", "amazon elb"),
    ("ak_bmsc", "akamai bot manager"),
    ("bm_sz", "akamai bot manager"),
    ("_abck", "akamai bot manager"),
    ("__ddg1", "ddos-guard"),
    ("SERVERID", "haproxy"),
    ("ARRAffinity", "azure app service"),
    ("ROUTEID", "apache mod_proxy_balancer"),
    ("_shopify_y", "shopify"),
    ("_shopify_s", "shopify"),
    ("frontend", "magento"),
    ("PrestaShop", "prestashop"),
    ("exp_last_visit", "expressionengine"),
];

/// Ordered; the first matching prefix wins.
const COOKIE_PREFIXES: &[(&str, &str)] = &[
    ("ASPSESSIONID", "asp classic"),
    ("BIGipServer", "F5 BIG-IP"),
    ("incap_ses_", "incapsula"),
    ("visid_incap_", "incapsula"),
    ("nlbi_", "incapsula"),
    ("sucuri_cloudproxy_uuid_", "sucuri"),
    ("NSC_", "citrix netscaler"),
    ("X-Mapping-", "riverbed stingray"),
    ("wordpress_logged_in_", "wordpress"),
    ("wordpress_sec_", "wordpress"),
    ("wp-settings-", "wordpress"),
    ("SSESS", "drupal"),
    ("PrestaShop-", "prestashop"),
];

/// Label, literal prefix, total length, pattern over the rest.
/// Evaluated in order; at most one fires per cookie.
const COOKIE_SHAPES: &[(&str, &str, usize, &str)] = &[
    ("cookie-mystery-1", "", 32, "[0-9a-f]{32}"),
    ("cookie-mystery-2", "SESS", 36, "[0-9a-f]{32}"),
    ("cookie-mystery-3", "SN", 15, "[0-9a-f]{13}"),
    ("BIG-IP Application Security Manager (F5)", "TS", 10, "[0-9a-f]{8}"),
    ("cookie-wordpress_", "wordpress_", 42, "[0-9a-f]{32}"),
];

// =============================================================================
// Assembly
// =============================================================================

impl FingerprintTables {
    /// The built-in rule set.
    ///
    /// Header vendor fingerprints are left empty, so the header stage emits
    /// exactly one facet per captured header unless extended.
    pub fn builtin() -> Self {
        builtin_builder().build()
    }
}

/// Builder preloaded with the built-in rule set.
pub fn builtin_builder() -> TablesBuilder {
    let mut builder = FingerprintTables::builder();

    for platform in GENERATOR_PLATFORMS {
        builder = builder.generator(platform);
    }
    for (prefix, category) in META_NAME_PREFIXES {
        builder = builder.meta_name_prefix(prefix, category);
    }
    for property in META_PROPERTY_CONTENT {
        builder = builder.meta_property(property);
    }
    for (prefix, category) in META_PROPERTY_PREFIXES {
        builder = builder.meta_property_prefix(prefix, category);
    }
    for rel in LINK_RELS {
        builder = builder.link_rel(rel);
    }

    match GrepRule::literal("schema.org", SCHEMA_ORG_NEEDLES) {
        Ok(rule) => builder = builder.grep_rule(rule),
        Err(e) => log::error!("Skipping built-in grep rule: {}", e),
    }
    for (label, pattern) in GREP_CAPTURES {
        match GrepRule::capture(label, pattern) {
            Ok(rule) => builder = builder.grep_rule(rule),
            Err(e) => log::error!("Skipping built-in grep rule: {}", e),
        }
    }

    for (needle, label) in EMBED_RULES {
        builder = builder.embed(needle, label);
    }
    for (needle, key, value_prefix, label) in EMBED_QUERY_CAPTURES {
        builder = builder.embed_query(
            needle,
            QueryCapture {
                key: key.to_string(),
                value_prefix: value_prefix.to_string(),
                label: label.to_string(),
            },
        );
    }

    for (name, label) in COOKIE_NAMES {
        builder = builder.cookie(name, label);
    }
    for (prefix, label) in COOKIE_PREFIXES {
        builder = builder.cookie_prefix(prefix, label);
    }
    for (label, prefix, len, pattern) in COOKIE_SHAPES {
        match ShapeRule::new(label, prefix, *len, pattern) {
            Ok(rule) => builder = builder.cookie_shape(rule),
            Err(e) => log::error!("Skipping built-in cookie shape: {}", e),
        }
    }

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_all_compile() {
        let stats = FingerprintTables::builtin().stats();
        assert_eq!(stats.grep_rules, 1 + GREP_CAPTURES.len());
        assert_eq!(stats.cookie_shapes, COOKIE_SHAPES.len());
        assert_eq!(stats.embed_rules, EMBED_RULES.len());
        assert_eq!(stats.header_fingerprints, 0);
        assert_eq!(stats.header_allow, None);
    }

    #[test]
    fn test_builtin_prefixes_do_not_shadow_shapes() {
        let tables = FingerprintTables::builtin();
        let name = "wordpress_abcdef0123456789abcdef0123456789";
        assert!(tables.cookie_prefixes().iter().all(|p| !p.matches(name)));
        assert_eq!(tables.cookie_label(name), None);
    }
}
