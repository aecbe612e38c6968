//! Cookie-name fingerprinting
//!
//! Each `set-cookie` value is classified by its cookie name: exact table
//! entry first, then the first matching prefix, then the first matching
//! shape rule. At most one facet per cookie.

use crate::tables::FingerprintTables;
use crate::types::{Facet, ResponseHeader};

/// Cookie name: everything before the first `=`.
#[inline]
pub fn cookie_name(set_cookie: &str) -> &str {
    match set_cookie.find('=') {
        Some(pos) => &set_cookie[..pos],
        None => set_cookie,
    }
}

/// Classify a single cookie name.
///
/// Table hits yield boolean facets; shape-rule hits carry the cookie name.
pub fn classify_cookie(name: &str, tables: &FingerprintTables) -> Option<Facet> {
    if let Some(label) = tables.cookie_label(name) {
        return Some(Facet::flag(label));
    }

    if let Some(rule) = tables.cookie_prefixes().iter().find(|r| r.matches(name)) {
        return Some(Facet::flag(rule.label.as_str()));
    }

    tables
        .cookie_shapes()
        .iter()
        .find(|shape| shape.matches(name))
        .map(|shape| Facet::text(shape.label.as_str(), name))
}

/// Facets for every `set-cookie` header, in header order.
pub fn cookie_facets(headers: &[ResponseHeader], tables: &FingerprintTables) -> Vec<Facet> {
    headers
        .iter()
        .filter(|h| h.is_set_cookie())
        .filter_map(|h| classify_cookie(cookie_name(&h.value), tables))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> Option<Facet> {
        classify_cookie(name, &FingerprintTables::builtin())
    }

    #[test]
    fn test_cookie_name() {
        assert_eq!(cookie_name("PHPSESSID=abc; path=/"), "PHPSESSID");
        assert_eq!(cookie_name("a=b=c"), "a");
        assert_eq!(cookie_name("novalue"), "novalue");
        assert_eq!(cookie_name("=anon"), "");
    }

    #[test]
    fn test_exact_name() {
        assert_eq!(classify("PHPSESSID"), Some(Facet::flag("php")));
        assert_eq!(classify("phpsessid"), None);
    }

    #[test]
    fn test_prefix_first_match() {
        assert_eq!(classify("BIGipServerpool_web"), Some(Facet::flag("F5 BIG-IP")));
        assert_eq!(classify("incap_ses_123_456"), Some(Facet::flag("incapsula")));
    }

    #[test]
    fn test_exact_stops_before_prefix_and_shape() {
        let tables = FingerprintTables::builder()
            .cookie("0123456789abcdef0123456789abcdef", "known")
            .cookie_prefix("0123", "prefixed")
            .build();
        assert_eq!(
            classify_cookie("0123456789abcdef0123456789abcdef", &tables),
            Some(Facet::flag("known"))
        );
    }

    #[test]
    fn test_shape_rules() {
        let hex32 = "0123456789abcdef0123456789abcdef";
        assert_eq!(classify(hex32), Some(Facet::text("cookie-mystery-1", hex32)));

        let sess = format!("SESS{}", hex32);
        assert_eq!(classify(&sess), Some(Facet::text("cookie-mystery-2", sess.as_str())));

        assert_eq!(
            classify("SN0123456789abc"),
            Some(Facet::text("cookie-mystery-3", "SN0123456789abc"))
        );
        assert_eq!(
            classify("TS01a2b3c4"),
            Some(Facet::text("BIG-IP Application Security Manager (F5)", "TS01a2b3c4"))
        );
    }

    #[test]
    fn test_wordpress_shape_not_generic() {
        let name = "wordpress_abcdef0123456789abcdef0123456789";
        assert_eq!(classify(name), Some(Facet::text("cookie-wordpress_", name)));
    }

    #[test]
    fn test_shape_mismatches() {
        assert_eq!(classify("0123456789ABCDEF0123456789ABCDEF"), None);
        assert_eq!(classify("TS01a2b3c4d"), None);
        assert_eq!(classify("TSzzzzzzzz"), None);
        assert_eq!(classify("session"), None);
    }

    #[test]
    fn test_only_set_cookie_headers() {
        let headers = vec![
            ResponseHeader::new("Cookie", "PHPSESSID=1"),
            ResponseHeader::new("Set-Cookie", "PHPSESSID=abc; HttpOnly"),
            ResponseHeader::new("Set-Cookie", "unknown=1"),
            ResponseHeader::new("Set-Cookie", "TS0123abcd=xyz"),
        ];
        assert_eq!(
            cookie_facets(&headers, &FingerprintTables::builtin()),
            vec![
                Facet::flag("php"),
                Facet::text("BIG-IP Application Security Manager (F5)", "TS0123abcd"),
            ]
        );
    }
}
