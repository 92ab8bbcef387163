//! Compares the freshly built catalog against the previously published one.
//!
//! A missing or unreadable previous snapshot is never fatal: the diff falls
//! back to first-run semantics where every card counts as added.

use std::collections::{HashMap, HashSet};

use crate::catalog::CardRecord;

const RULE_WIDTH: usize = 60;

/// Classification of every card against the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: usize,
    pub total_variants_added: usize,
    pub total_variants_removed: usize,
    pub is_first_run: bool,
}

impl ChangeReport {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty() || !self.removed.is_empty()
    }
}

/// Diffs the new catalog against the previous snapshot, keyed by card name.
pub fn diff_catalogs(previous: Option<&[CardRecord]>, new: &[CardRecord]) -> ChangeReport {
    let Some(old) = previous else {
        // First run - every card is "added".
        return ChangeReport {
            added: new.iter().map(|card| card.name.clone()).collect(),
            total_variants_added: new.iter().map(|card| card.variants.len()).sum(),
            is_first_run: true,
            ..ChangeReport::default()
        };
    };

    let old_by_name: HashMap<&str, &CardRecord> =
        old.iter().map(|card| (card.name.as_str(), card)).collect();
    let new_names: HashSet<&str> = new.iter().map(|card| card.name.as_str()).collect();

    let mut report = ChangeReport::default();

    for card in new {
        match old_by_name.get(card.name.as_str()) {
            None => {
                report.total_variants_added += card.variants.len();
                report.added.push(card.name.clone());
            }
            Some(old_card) => {
                if records_differ(old_card, card) {
                    let old_count = old_card.variants.len();
                    let new_count = card.variants.len();
                    if new_count > old_count {
                        report.total_variants_added += new_count - old_count;
                    } else {
                        report.total_variants_removed += old_count - new_count;
                    }
                    report.updated.push(card.name.clone());
                } else {
                    report.unchanged += 1;
                }
            }
        }
    }

    for card in old {
        if !new_names.contains(card.name.as_str()) {
            report.total_variants_removed += card.variants.len();
            report.removed.push(card.name.clone());
        }
    }

    report
}

fn set_of(list: &[String]) -> HashSet<&str> {
    list.iter().map(String::as_str).collect()
}

/// Field-by-field comparison over the stable identity set. List-valued fields
/// compare as sets so reordering alone never counts as an update; published
/// image references are deliberately excluded.
fn records_differ(old: &CardRecord, new: &CardRecord) -> bool {
    old.name != new.name
        || old.description != new.description
        || old.variant_number != new.variant_number
        || set_of(&old.variants) != set_of(&new.variants)
        || old.card_type != new.card_type
        || old.super_type != new.super_type
        || old.energy != new.energy
        || old.power != new.power
        || old.might != new.might
        || set_of(&old.colors) != set_of(&new.colors)
        || set_of(&old.tags) != set_of(&new.tags)
        || old.release_date != new.release_date
}

/// Logs one line per added/updated/removed card, preceded by a separator rule
/// when there is anything to report.
pub fn log_changes(report: &ChangeReport) {
    if report.has_changes() {
        log::info!("{}", "=".repeat(RULE_WIDTH));
    }
    for name in &report.added {
        log::info!("Added {name}");
    }
    for name in &report.updated {
        log::info!("Updated {name}");
    }
    for name in &report.removed {
        log::info!("Deleted {name}");
    }
}

/// Formats the fixed-width multi-line summary block.
pub fn format_change_summary(report: &ChangeReport, new_count: usize) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    [
        heavy.clone(),
        "Card Changes Summary".to_string(),
        heavy.clone(),
        format!("New:        {:>6}", report.added.len()),
        format!("Updated:    {:>6}", report.updated.len()),
        format!("Deleted:    {:>6}", report.removed.len()),
        format!("Unchanged:  {:>6}", report.unchanged),
        light,
        format!("Total:      {:>6}", new_count),
        heavy,
    ]
    .join("\n")
}
