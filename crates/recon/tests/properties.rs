// Property-based tests for normalization, merge and missing-set algebra.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeSet;

use proptest::prelude::*;
use tcgsync_recon::model::RawCard;
use tcgsync_recon::normalize::{derive_series, normalize_set};
use tcgsync_recon::reference::ReferenceEntry;
use tcgsync_recon::{
    build_sync_mapping, canonicalize, merge, missing, Card, Catalog, CanonicalizeOptions,
    MissingSet, OverridePolicy,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Set codes in the shapes upstream actually sends, plus noise.
fn arb_set_code() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[A-Za-z][0-9]{1,2}[a-zA-Z]?",
        2 => r"(PROMO|promo|Promo|P|p)-[A-Za-z]",
        1 => r" ?(promo-)?[a-zA-Z0-9 -]{0,8} ?",
    ]
}

fn arb_id() -> impl Strategy<Value = String> {
    (r"[AB][1-3]", 1u32..40).prop_map(|(set, n)| format!("{set}-{n:03}"))
}

fn arb_missing() -> impl Strategy<Value = MissingSet> {
    prop::collection::btree_set(arb_id(), 0..12)
}

fn arb_cards() -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec((arb_id(), r"[a-z]{1,6}"), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(id, name)| Card {
                id,
                name,
                ..Card::default()
            })
            .collect()
    })
}

fn catalog_of(cards: Vec<Card>) -> Catalog {
    cards.into_iter().map(|c| (c.id.clone(), c)).collect()
}

fn raw(set: &str, number: &str) -> RawCard {
    RawCard {
        set: Some(set.to_string()),
        number: Some(number.to_string()),
        ..RawCard::default()
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn set_normalization_is_idempotent(code in arb_set_code()) {
        let once = normalize_set(&code);
        prop_assert_eq!(normalize_set(&once), once.clone());
        prop_assert!(!once.starts_with("PROMO-"));
        prop_assert_eq!(once.to_uppercase(), once);
    }

    #[test]
    fn ids_ignore_case_promo_spelling_and_padding(letter in "[A-Z]", n in 0u32..1000) {
        let opts = CanonicalizeOptions::default();
        let spellings = [
            (format!("PROMO-{letter}"), n.to_string()),
            (format!("promo-{}", letter.to_lowercase()), format!("{n:03}")),
            (format!(" P-{letter} "), format!(" {n} ")),
        ];
        let ids: BTreeSet<String> = spellings
            .iter()
            .map(|(set, number)| canonicalize(&raw(set, number), &opts).id)
            .collect();
        prop_assert_eq!(ids.len(), 1);
        prop_assert_eq!(ids.into_iter().next().unwrap(), format!("P-{letter}-{n:03}"));
    }

    #[test]
    fn series_is_first_char_of_last_segment(code in arb_set_code()) {
        let set = normalize_set(&code);
        let tail = set.rsplit('-').next().unwrap_or("");
        let expected: String = tail.chars().take(1).collect();
        prop_assert_eq!(derive_series(&set), expected);
    }

    #[test]
    fn reconcile_is_commutative_and_idempotent(a in arb_missing(), b in arb_missing()) {
        let ab = missing::reconcile(&a, &b);
        prop_assert_eq!(&ab, &missing::reconcile(&b, &a));
        prop_assert_eq!(&missing::reconcile(&ab, &b), &ab);
        prop_assert!(a.is_subset(&ab) && b.is_subset(&ab));
    }

    #[test]
    fn resolve_removes_only_matched(set in arb_missing(), matched in arb_missing()) {
        let remaining = missing::resolve(&set, &matched);
        for id in &set {
            prop_assert_eq!(remaining.contains(id), !matched.contains(id));
        }
        prop_assert!(remaining.is_subset(&set));
    }

    #[test]
    fn merge_override_semantics(existing in arb_cards(), incoming in arb_cards()) {
        let existing = catalog_of(existing);
        let incoming_last = catalog_of(incoming.clone());
        let mut incoming_first = Catalog::new();
        for card in &incoming {
            incoming_first.entry(card.id.clone()).or_insert_with(|| card.clone());
        }

        let overridden = merge(&existing, incoming.clone(), OverridePolicy::Override).catalog;
        let kept = merge(&existing, incoming, OverridePolicy::KeepExisting).catalog;

        for (id, card) in &existing {
            // Never deletes
            prop_assert!(overridden.contains_key(id));
            prop_assert_eq!(&kept[id], card);
        }
        for (id, card) in &incoming_last {
            prop_assert_eq!(&overridden[id], card);
        }
        // Without override, a repeated new ID keeps its first sighting
        for (id, card) in &incoming_first {
            if !existing.contains_key(id) {
                prop_assert_eq!(&kept[id], card);
            }
        }
        let expected_keys: BTreeSet<&String> = existing.keys().chain(incoming_last.keys()).collect();
        prop_assert_eq!(overridden.keys().collect::<BTreeSet<_>>(), expected_keys.clone());
        prop_assert_eq!(kept.keys().collect::<BTreeSet<_>>(), expected_keys);
    }

    #[test]
    fn a4b_never_displaces_other_expansions(
        numbers in prop::collection::vec((prop::bool::ANY, 1u32..50), 1..6),
    ) {
        let entries: Vec<ReferenceEntry> = numbers
            .iter()
            .map(|(a4b, n)| ReferenceEntry {
                key: "K".into(),
                location: format!("/cards/{}/{}", if *a4b { "A4B" } else { "A1" }, n),
                expansion: None,
            })
            .collect();
        let (mapping, _) = build_sync_mapping(&entries);
        let value = &mapping["K"];

        let first_plain = numbers.iter().find(|(a4b, _)| !a4b);
        let expected = match first_plain {
            Some((_, n)) => format!("A1-{n:03}"),
            None => format!("A4B-{:03}", numbers[0].1),
        };
        prop_assert_eq!(value, &expected);
    }
}
