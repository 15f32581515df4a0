use meshmemo_tags::TagCooccurrenceMatrix;
use proptest::prelude::*;

const TAGS: [&str; 6] = ["red", "blue", "formal", "casual", "silk", "denim"];

fn arb_update() -> impl Strategy<Value = (usize, usize, f64)> {
    (0..TAGS.len(), 0..TAGS.len(), 0.01f64..5.0)
}

fn build(updates: &[(usize, usize, f64)]) -> TagCooccurrenceMatrix {
    let m = TagCooccurrenceMatrix::new(0.8, 0.2);
    for &(a, b, w) in updates {
        m.update(TAGS[a], TAGS[b], w).unwrap();
    }
    m
}

proptest! {
    #[test]
    fn cooccurrence_is_symmetric(updates in prop::collection::vec(arb_update(), 0..60)) {
        let m = build(&updates);
        for a in TAGS {
            for b in TAGS {
                prop_assert_eq!(m.cooccurrence(a, b), m.cooccurrence(b, a));
            }
        }
    }

    #[test]
    fn pmi_zero_without_evidence(updates in prop::collection::vec(arb_update(), 0..40)) {
        let m = build(&updates);
        for a in TAGS {
            for b in TAGS {
                if m.frequency(a) == 0.0 || m.frequency(b) == 0.0 || m.cooccurrence(a, b) == 0.0 {
                    prop_assert_eq!(m.compute_pmi(a, b), 0.0);
                }
                prop_assert!(m.compute_pmi(a, b).is_finite());
            }
        }
    }

    #[test]
    fn self_pairs_never_stored(updates in prop::collection::vec(arb_update(), 0..40)) {
        let m = build(&updates);
        for a in TAGS {
            prop_assert_eq!(m.cooccurrence(a, a), 0.0);
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_associations(updates in prop::collection::vec(arb_update(), 0..60)) {
        let m = build(&updates);
        let json = m.to_json().unwrap();
        let restored = TagCooccurrenceMatrix::from_json(&json).unwrap();
        prop_assert_eq!(restored.to_json().unwrap(), json);
        for tag in TAGS {
            prop_assert_eq!(m.get_associations(tag, 10), restored.get_associations(tag, 10));
        }
    }

    #[test]
    fn expand_query_contains_input_without_duplicates(
        updates in prop::collection::vec(arb_update(), 0..40),
        idx in 0..TAGS.len(),
    ) {
        let m = build(&updates);
        let input = vec![TAGS[idx].to_string()];
        let expanded = m.expand_query(&input, 0.5);
        prop_assert!(expanded.contains(&input[0]));
        let unique: std::collections::HashSet<_> = expanded.iter().collect();
        prop_assert_eq!(unique.len(), expanded.len());
    }

    #[test]
    fn tag_boost_factor_in_range(
        updates in prop::collection::vec(arb_update(), 0..40),
        q in 0..TAGS.len(),
        c in prop::collection::vec(0..TAGS.len(), 0..4),
        score in 0.0f64..1.0,
    ) {
        let m = build(&updates);
        let query = vec![TAGS[q].to_string()];
        let content: Vec<String> = c.iter().map(|&i| TAGS[i].to_string()).collect();
        let r = m.compute_tag_boost(&query, &content, score, &Default::default());
        prop_assert!(r.boost_factor >= 1.0 && r.boost_factor < 1.5);
        prop_assert!(r.boosted_score <= 1.0);
        prop_assert!(r.boosted_score >= score - 1e-12);
    }
}
