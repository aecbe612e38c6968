//! Boolean-facet deduplication

use std::collections::HashSet;

use crate::types::Facet;

/// Drop every boolean facet whose label was already emitted as a boolean.
///
/// Single left-to-right pass. Value-carrying facets are never collapsed, and
/// the relative order of everything kept is unchanged.
pub fn facet_dedup(mut facets: Vec<Facet>) -> Vec<Facet> {
    let mut seen: HashSet<String> = HashSet::new();
    facets.retain(|facet| {
        if !facet.value.is_flag() {
            return true;
        }
        if seen.contains(&facet.label) {
            false
        } else {
            seen.insert(facet.label.clone());
            true
        }
    });
    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_flags_collapse_to_first() {
        let facets = vec![
            Facet::flag("twitter card"),
            Facet::text("meta-twitter:card", "summary"),
            Facet::flag("twitter card"),
            Facet::text("meta-twitter:site", "@example"),
            Facet::flag("opengraph"),
        ];
        assert_eq!(
            facet_dedup(facets),
            vec![
                Facet::flag("twitter card"),
                Facet::text("meta-twitter:card", "summary"),
                Facet::text("meta-twitter:site", "@example"),
                Facet::flag("opengraph"),
            ]
        );
    }

    #[test]
    fn test_values_never_collapse() {
        let facets = vec![
            Facet::text("google analytics", "UA-1234567-1"),
            Facet::text("google analytics", "UA-1234567-1"),
            Facet::count("script integrity", 2),
            Facet::count("script integrity", 2),
        ];
        assert_eq!(facet_dedup(facets.clone()), facets);
    }

    #[test]
    fn test_value_facet_does_not_mark_label_seen() {
        let facets = vec![
            Facet::text("wordpress", "x"),
            Facet::flag("wordpress"),
            Facet::flag("wordpress"),
        ];
        assert_eq!(
            facet_dedup(facets),
            vec![Facet::text("wordpress", "x"), Facet::flag("wordpress")]
        );
    }

    #[test]
    fn test_empty() {
        assert!(facet_dedup(Vec::new()).is_empty());
    }

    fn arb_facet() -> impl Strategy<Value = Facet> {
        let label = prop::sample::select(vec!["a", "b", "c", "d"]);
        prop_oneof![
            label.clone().prop_map(|l| Facet::flag(l)),
            (label.clone(), "[a-z]{0,3}").prop_map(|(l, v)| Facet::text(l, v)),
            (label, 0u64..4).prop_map(|(l, n)| Facet::count(l, n)),
        ]
    }

    proptest! {
        #[test]
        fn prop_flag_labels_unique(facets in prop::collection::vec(arb_facet(), 0..40)) {
            let out = facet_dedup(facets);
            let mut labels = HashSet::new();
            for facet in out.iter().filter(|f| f.value.is_flag()) {
                prop_assert!(labels.insert(facet.label.clone()));
            }
        }

        #[test]
        fn prop_non_flags_preserved_in_order(facets in prop::collection::vec(arb_facet(), 0..40)) {
            let expected: Vec<Facet> = facets.iter().filter(|f| !f.value.is_flag()).cloned().collect();
            let out = facet_dedup(facets);
            let kept: Vec<Facet> = out.into_iter().filter(|f| !f.value.is_flag()).collect();
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn prop_idempotent(facets in prop::collection::vec(arb_facet(), 0..40)) {
            let once = facet_dedup(facets);
            prop_assert_eq!(facet_dedup(once.clone()), once);
        }

        #[test]
        fn prop_output_is_subsequence(facets in prop::collection::vec(arb_facet(), 0..40)) {
            let out = facet_dedup(facets.clone());
            let mut rest = facets.iter();
            for facet in &out {
                prop_assert!(rest.any(|f| f == facet));
            }
        }
    }
}
