//! Tests for variant ordering and per-card grouping.

use super::*;

fn variant(name: &str, code: &str, set_id: &str, release: &str) -> VariantRecord {
    VariantRecord {
        name: name.to_string(),
        variant_number: code.to_string(),
        set_id: set_id.to_string(),
        release_date: release.to_string(),
        ..VariantRecord::default()
    }
}

fn codes(card: &CardRecord) -> Vec<&str> {
    card.variants.iter().map(String::as_str).collect()
}

// ── code components ──────────────────────────────────────────────────

#[test]
fn components_split_number_and_suffix() {
    assert_eq!(parse_variant_components("OGN-010a"), (10, "a".to_string()));
    assert_eq!(parse_variant_components("OGN-010"), (10, String::new()));
    assert_eq!(parse_variant_components("OGN-308s"), (308, "s".to_string()));
}

#[test]
fn malformed_codes_stay_sortable() {
    assert_eq!(parse_variant_components("UNKNOWN"), (0, "unknown".to_string()));
    assert_eq!(parse_variant_components("OGN-abc"), (0, "abc".to_string()));
}

// ── ordering ─────────────────────────────────────────────────────────

#[test]
fn variants_sort_by_release_then_number_then_suffix() {
    let mut variants = vec![
        variant("Ashe", "OGN-010a", "OGN", "2025-01-01"),
        variant("Ashe", "OGN-002", "OGN", "2025-01-01"),
        variant("Ashe", "OGN-010", "OGN", "2024-01-01"),
    ];

    sort_variants(&mut variants);

    let order: Vec<&str> = variants.iter().map(|v| v.variant_number.as_str()).collect();
    assert_eq!(order, vec!["OGN-010", "OGN-002", "OGN-010a"]);
}

#[test]
fn unknown_set_sentinel_sorts_last() {
    let mut variants = vec![
        variant("Ashe", "ZZZ-001", "ZZZ", "9999-12-31"),
        variant("Ashe", "SFD-001", "SFD", "2026-02-13"),
        variant("Ashe", "OGN-001", "OGN", "2025-10-31"),
    ];

    sort_variants(&mut variants);

    let order: Vec<&str> = variants.iter().map(|v| v.variant_number.as_str()).collect();
    assert_eq!(order, vec!["OGN-001", "SFD-001", "ZZZ-001"]);
}

#[test]
fn missing_set_id_falls_back_to_code_prefix() {
    let mut variants = vec![
        variant("Ashe", "OGS-001", "", "2025-10-31"),
        variant("Ashe", "OGN-002", "", "2025-10-31"),
    ];

    sort_variants(&mut variants);

    assert_eq!(variants[0].variant_number, "OGN-002");
}

// ── grouping ─────────────────────────────────────────────────────────

#[test]
fn same_name_collapses_to_one_card() {
    let mut first = variant("Ashe", "OGN-001", "OGN", "2025-10-31");
    first.image = "/img/OGN/OGN-001.png".to_string();
    let mut alt = variant("Ashe", "OGN-001a", "OGN", "2025-10-31");
    alt.image = "/img/OGN/OGN-001a.png".to_string();

    let cards = assemble_cards(vec![alt, first], PrimaryRule::SortOrder);

    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    assert_eq!(card.name, "Ashe");
    assert_eq!(codes(card), vec!["OGN-001", "OGN-001a"]);
    assert_eq!(
        card.variant_images,
        vec!["/img/OGN/OGN-001.png", "/img/OGN/OGN-001a.png"]
    );
}

#[test]
fn repeated_codes_are_deduplicated_first_seen() {
    let variants = vec![
        variant("Ashe", "OGN-001", "OGN", "2025-10-31"),
        variant("Ashe", "OGN-001", "OGN", "2025-10-31"),
        variant("Ashe", "OGN-001a", "OGN", "2025-10-31"),
    ];

    let cards = assemble_cards(variants, PrimaryRule::SortOrder);

    assert_eq!(codes(&cards[0]), vec!["OGN-001", "OGN-001a"]);
    assert_eq!(cards[0].variants.len(), cards[0].variant_images.len());
}

#[test]
fn missing_image_keeps_an_empty_aligned_slot() {
    let mut with_image = variant("Ashe", "OGN-001", "OGN", "2025-10-31");
    with_image.image = "/img/OGN/OGN-001.png".to_string();
    let without_image = variant("Ashe", "OGN-001a", "OGN", "2025-10-31");

    let cards = assemble_cards(vec![with_image, without_image], PrimaryRule::SortOrder);

    assert_eq!(cards[0].variant_images, vec!["/img/OGN/OGN-001.png", ""]);
}

#[test]
fn identity_comes_from_first_and_metadata_from_last() {
    let mut original = variant("Ashe", "OGN-001", "OGN", "2025-10-31");
    original.description = "Original text.".to_string();
    original.card_type = "Unit".to_string();
    original.energy = 2;
    let mut reprint = variant("Ashe", "SFD-010", "SFD", "2026-02-13");
    reprint.description = "Refreshed text.".to_string();
    reprint.card_type = "Champion Unit".to_string();
    reprint.energy = 3;
    reprint.tags = vec!["Freljord".to_string()];

    let cards = assemble_cards(vec![reprint, original], PrimaryRule::SortOrder);

    let card = &cards[0];
    // Earliest printing anchors the collector identity...
    assert_eq!(card.variant_number, "OGN-001");
    assert_eq!(card.release_date, "2025-10-31");
    // ...while the latest reprint's metadata wins.
    assert_eq!(card.description, "Refreshed text.");
    assert_eq!(card.card_type, "Champion Unit");
    assert_eq!(card.energy, 3);
    assert_eq!(card.tags, vec!["Freljord"]);
}

#[test]
fn output_is_sorted_by_name() {
    let variants = vec![
        variant("Braum", "OGN-002", "OGN", "2025-10-31"),
        variant("Ashe", "OGN-001", "OGN", "2025-10-31"),
    ];

    let cards = assemble_cards(variants, PrimaryRule::SortOrder);

    let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ashe", "Braum"]);
}

#[test]
fn grouping_is_deterministic() {
    let build = || {
        let variants = vec![
            variant("Braum", "OGN-002", "OGN", "2025-10-31"),
            variant("Ashe", "OGN-001a", "OGN", "2025-10-31"),
            variant("Ashe", "OGN-001", "OGN", "2025-10-31"),
            variant("Ashe", "ZZZ-001", "ZZZ", "9999-12-31"),
        ];
        let cards = assemble_cards(variants, PrimaryRule::SortOrder);
        serde_json::to_string(&cards).unwrap()
    };

    assert_eq!(build(), build());
}

// ── primary promotion ────────────────────────────────────────────────

#[test]
fn plain_code_first_promotes_the_primary_printing() {
    let mut promo = variant("Ashe", "OGN-001a", "OGN", "2024-06-01");
    promo.image = "promo.png".to_string();
    let mut plain = variant("Ashe", "OGN-001", "OGN", "2025-10-31");
    plain.image = "plain.png".to_string();

    // Sorting alone puts the earlier-released promo first.
    let sorted = assemble_cards(vec![promo.clone(), plain.clone()], PrimaryRule::SortOrder);
    assert_eq!(codes(&sorted[0]), vec!["OGN-001a", "OGN-001"]);
    assert_eq!(sorted[0].variant_number, "OGN-001a");

    // The plain-code rule moves the suffixless printing to the front.
    let promoted = assemble_cards(vec![promo, plain], PrimaryRule::PlainCodeFirst);
    assert_eq!(codes(&promoted[0]), vec!["OGN-001", "OGN-001a"]);
    assert_eq!(promoted[0].variant_number, "OGN-001");
    assert_eq!(promoted[0].variant_images, vec!["plain.png", "promo.png"]);
}

#[test]
fn plain_code_first_picks_earliest_release_then_smallest_number() {
    let variants = vec![
        variant("Ashe", "SFD-001", "SFD", "2026-02-13"),
        variant("Ashe", "OGN-010", "OGN", "2025-10-31"),
        variant("Ashe", "OGN-002", "OGN", "2025-10-31"),
    ];

    let cards = assemble_cards(variants, PrimaryRule::PlainCodeFirst);

    assert_eq!(cards[0].variant_number, "OGN-002");
    assert_eq!(codes(&cards[0]), vec!["OGN-002", "OGN-010", "SFD-001"]);
}

#[test]
fn suffixed_codes_never_qualify_as_primary() {
    let variants = vec![
        variant("Ashe", "OGN-001a", "OGN", "2025-10-31"),
        variant("Ashe", "OGN-001s", "OGN", "2025-10-31"),
    ];

    let cards = assemble_cards(variants, PrimaryRule::PlainCodeFirst);

    // No plain printing exists, so the sort-order rule applies.
    assert_eq!(cards[0].variant_number, "OGN-001a");
    assert_eq!(codes(&cards[0]), vec!["OGN-001a", "OGN-001s"]);
}
