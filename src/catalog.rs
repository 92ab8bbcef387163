//! Variant ordering and per-card grouping.
//!
//! Variants are sorted by a deterministic multi-part key and grouped by card
//! name, collapsing every printing of a card into a single catalog record.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

lazy_static! {
    /// Strict `SET-NNN` code with no suffix, e.g. `OGN-001`.
    static ref PLAIN_CODE: Regex = Regex::new(r"^[A-Z]{3}-\d{3}$").unwrap();
}

/// One normalized card variant, intermediate form between the raw payload and
/// the grouped catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantRecord {
    pub name: String,
    pub description: String,
    pub variant_number: String,
    pub set_id: String,
    /// Published image reference, or empty when unavailable.
    pub image: String,
    pub card_type: String,
    pub super_type: Option<String>,
    pub energy: u32,
    pub power: u32,
    pub might: u32,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
    pub release_date: String,
}

/// Final catalog entry, one per unique card name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub name: String,
    pub description: String,
    pub variant_number: String,
    pub variants: Vec<String>,
    pub variant_images: Vec<String>,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(rename = "super")]
    pub super_type: Option<String>,
    pub energy: u32,
    pub power: u32,
    pub might: u32,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
    pub release_date: String,
}

/// How the leading entry of a card's variant list is chosen.
///
/// The two rules came from two historical catalog builds and are intentionally
/// both kept; they are not equivalent for every input (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryRule {
    /// The first variant in sort order (earliest release) leads. Pipeline
    /// default.
    SortOrder,
    /// The lowest plain `SET-NNN` printing is moved to the front even when
    /// sorting placed it elsewhere; suffixed codes never qualify. Falls back
    /// to [`PrimaryRule::SortOrder`] when no code matches the pattern.
    PlainCodeFirst,
}

/// Extracts the numeric piece and lowercased suffix of a variant code for
/// deterministic ordering. Codes without a dash sort with numeric 0 and the
/// whole lowercased code as suffix.
pub fn parse_variant_components(variant_number: &str) -> (u64, String) {
    let Some((_, rest)) = variant_number.split_once('-') else {
        return (0, variant_number.to_lowercase());
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        (0, rest.to_lowercase())
    } else {
        let number = digits.parse().unwrap_or(0);
        (number, rest[digits.len()..].to_lowercase())
    }
}

/// Sorting key that orders variants by release, set, numeric piece and suffix,
/// with the full code as the final tie-break.
fn sort_key(variant: &VariantRecord) -> (String, String, u64, String, String) {
    let set_id = if variant.set_id.is_empty() {
        variant
            .variant_number
            .split('-')
            .next()
            .unwrap_or(&variant.variant_number)
            .to_string()
    } else {
        variant.set_id.clone()
    };
    let (number, suffix) = parse_variant_components(&variant.variant_number);
    (
        variant.release_date.clone(),
        set_id,
        number,
        suffix,
        variant.variant_number.clone(),
    )
}

/// Sorts variants in place by the deterministic ordering key.
pub fn sort_variants(variants: &mut [VariantRecord]) {
    variants.sort_by_key(sort_key);
}

/// Groups variants by name so only a single record exists per card.
///
/// Output is sorted by card name. Within a group the earliest sorted variant
/// anchors the identifying code and release date, while descriptive fields are
/// taken from the last sorted variant so the most recent reprint's metadata
/// wins.
pub fn assemble_cards(variants: Vec<VariantRecord>, rule: PrimaryRule) -> Vec<CardRecord> {
    let mut grouped: BTreeMap<String, Vec<VariantRecord>> = BTreeMap::new();
    for variant in variants {
        grouped.entry(variant.name.clone()).or_default().push(variant);
    }

    grouped
        .into_values()
        .map(|group| card_from_group(group, rule))
        .collect()
}

fn card_from_group(mut group: Vec<VariantRecord>, rule: PrimaryRule) -> CardRecord {
    sort_variants(&mut group);

    let mut variants = Vec::new();
    let mut variant_images = Vec::new();
    let mut seen = HashSet::new();
    for variant in &group {
        if seen.insert(variant.variant_number.clone()) {
            variants.push(variant.variant_number.clone());
            variant_images.push(variant.image.clone());
        }
    }

    let first = &group[0];
    let last = &group[group.len() - 1];

    let mut variant_number = first.variant_number.clone();
    if rule == PrimaryRule::PlainCodeFirst {
        if let Some(primary) = plain_primary_code(&group) {
            variant_number = primary.clone();
            if let Some(pos) = variants.iter().position(|code| *code == primary) {
                if pos > 0 {
                    let code = variants.remove(pos);
                    let image = variant_images.remove(pos);
                    variants.insert(0, code);
                    variant_images.insert(0, image);
                }
            }
        }
    }

    CardRecord {
        name: first.name.clone(),
        description: last.description.clone(),
        variant_number,
        variants,
        variant_images,
        card_type: last.card_type.clone(),
        super_type: last.super_type.clone(),
        energy: last.energy,
        power: last.power,
        might: last.might,
        colors: last.colors.clone(),
        tags: last.tags.clone(),
        release_date: first.release_date.clone(),
    }
}

/// The designated primary printing of a group: among codes matching the strict
/// `SET-NNN` pattern, the one with the earliest release date, tie-broken by
/// the smallest number. Suffixed codes never qualify.
fn plain_primary_code(group: &[VariantRecord]) -> Option<String> {
    let mut best: Option<(&VariantRecord, (&str, u64))> = None;
    for variant in group {
        if !PLAIN_CODE.is_match(&variant.variant_number) {
            continue;
        }
        let (number, _) = parse_variant_components(&variant.variant_number);
        let key = (variant.release_date.as_str(), number);
        // Strict comparison keeps the first of equally-ranked candidates.
        if best.as_ref().map_or(true, |(_, best_key)| key < *best_key) {
            best = Some((variant, key));
        }
    }
    best.map(|(variant, _)| variant.variant_number.clone())
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
