//! Response header facets

use crate::tables::FingerprintTables;
use crate::types::{Facet, ResponseHeader};

/// One `header-<key>` facet per captured header, in header order.
///
/// Capture is governed by the table's [`HeaderPolicy`](crate::tables::HeaderPolicy).
/// A header whose name has a vendor fingerprint additionally yields a boolean
/// vendor facet right after its own facet, whether or not it was captured.
pub fn header_facets(headers: &[ResponseHeader], tables: &FingerprintTables) -> Vec<Facet> {
    let policy = tables.header_policy();
    let mut facets = Vec::with_capacity(headers.len());

    for header in headers {
        if policy.captures(&header.key) {
            facets.push(Facet::text(format!("header-{}", header.key), header.value.as_str()));
        }
        if let Some(vendor) = tables.header_vendor(&header.key) {
            facets.push(Facet::flag(vendor));
        }
    }

    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::HeaderPolicy;

    fn headers() -> Vec<ResponseHeader> {
        vec![
            ResponseHeader::new("Server", "nginx"),
            ResponseHeader::new("Set-Cookie", "a=1"),
            ResponseHeader::new("X-Powered-By", "PHP/8.1"),
            ResponseHeader::new("set-cookie", "b=2"),
        ]
    }

    #[test]
    fn test_capture_all_preserves_order_and_repeats() {
        let facets = header_facets(&headers(), &FingerprintTables::builtin());
        assert_eq!(
            facets,
            vec![
                Facet::text("header-server", "nginx"),
                Facet::text("header-set-cookie", "a=1"),
                Facet::text("header-x-powered-by", "PHP/8.1"),
                Facet::text("header-set-cookie", "b=2"),
            ]
        );
    }

    #[test]
    fn test_allow_list_filters() {
        let tables = FingerprintTables::builtin()
            .into_builder()
            .header_policy(HeaderPolicy::legacy_allow_list())
            .build();
        let facets = header_facets(&headers(), &tables);
        let labels: Vec<_> = facets.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["header-server", "header-set-cookie", "header-set-cookie"]);
    }

    #[test]
    fn test_vendor_fingerprint_follows_header() {
        let tables = FingerprintTables::builder()
            .header_fingerprint("cf-ray", "cloudflare")
            .header_prefix_fingerprint("x-drupal-", "drupal")
            .header_allow("server")
            .build();
        let headers = vec![
            ResponseHeader::new("CF-RAY", "7d1-IAD"),
            ResponseHeader::new("Server", "cloudflare"),
            ResponseHeader::new("X-Drupal-Cache", "HIT"),
        ];
        assert_eq!(
            header_facets(&headers, &tables),
            vec![
                Facet::flag("cloudflare"),
                Facet::text("header-server", "cloudflare"),
                Facet::flag("drupal"),
            ]
        );
    }

    #[test]
    fn test_empty_headers() {
        assert!(header_facets(&[], &FingerprintTables::builtin()).is_empty());
    }
}
