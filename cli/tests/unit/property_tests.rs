//! Property-based tests for label generation, identity validation and the
//! image name matcher.
//!
//! Uses `proptest` to verify invariants across many random inputs.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use ec2_runner_cli::domain::image::pick_newest;
use ec2_runner_cli::domain::{Image, NamePattern, UnitId, generate_label};

proptest! {
    /// Labels of distinct units never collide: the unit prefix separates them.
    #[test]
    fn prop_batch_labels_are_pairwise_distinct(
        ids in prop::collection::hash_set("[A-Za-z0-9_]{1,12}", 1..20)
    ) {
        let labels: HashSet<String> = ids
            .iter()
            .map(|id| generate_label(&UnitId::parse(id).expect("valid")))
            .collect();
        prop_assert_eq!(labels.len(), ids.len());
    }

    /// A batch label is `<unit>-<8 hex chars>`.
    #[test]
    fn prop_batch_label_format(id in "[A-Za-z0-9_-]{1,32}") {
        let label = generate_label(&UnitId::parse(&id).expect("valid"));
        let token = label.strip_prefix(&format!("{id}-")).expect("unit prefix");
        prop_assert_eq!(token.len(), 8);
        prop_assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    /// Identities longer than 32 characters are rejected.
    #[test]
    fn prop_long_identities_rejected(id in "[a-z]{33,64}") {
        prop_assert!(UnitId::parse(&id).is_err());
    }

    /// Identities with characters outside the label alphabet are rejected.
    #[test]
    fn prop_identities_with_bad_chars_rejected(
        prefix in "[a-z]{0,5}",
        bad in "[ ./:@{}]",
    ) {
        let id = format!("{prefix}{bad}");
        prop_assert!(UnitId::parse(&id).is_err());
    }

    /// A pattern without wildcards matches exactly itself.
    #[test]
    fn prop_literal_pattern_matches_itself(name in "[A-Za-z0-9.()+\\[\\]-]{1,30}") {
        let pattern = NamePattern::new(&name).expect("pattern");
        prop_assert!(pattern.matches(&name));
        let longer = format!("{name}x");
        prop_assert!(!pattern.matches(&longer));
    }

    /// Selection is independent of candidate order.
    #[test]
    fn prop_pick_newest_ignores_order(
        secs in prop::collection::vec(0i64..1_000_000, 1..12),
    ) {
        let images: Vec<Image> = secs
            .iter()
            .enumerate()
            .map(|(i, s)| Image {
                id: format!("ami-{i}"),
                name: "runner".into(),
                created_at: Utc.timestamp_opt(*s, 0).single(),
                deprecated_at: None,
            })
            .collect();
        let mut reversed = images.clone();
        reversed.reverse();
        let now: DateTime<Utc> = Utc.timestamp_opt(2_000_000, 0).single().expect("now");
        prop_assert_eq!(
            pick_newest(&images, None, now),
            pick_newest(&reversed, None, now)
        );
    }
}

#[test]
fn single_unit_label_has_no_prefix() {
    let label = generate_label(&UnitId::single());
    assert_eq!(label.len(), 8);
    assert!(label.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn labels_are_not_reused() {
    let unit = UnitId::parse("a").expect("valid");
    let labels: HashSet<_> = (0..100).map(|_| generate_label(&unit)).collect();
    assert_eq!(labels.len(), 100, "duplicate labels generated");
}
