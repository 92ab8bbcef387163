//! Normalizes raw card-gallery payload items into variant records.
//!
//! The embedded page payload is untrusted: keys move, types drift, and whole
//! blocks go missing between site deployments. Every field of [`RawCard`] is
//! decoded leniently (a shape mismatch becomes `None`, never an error) and the
//! extraction functions below default instead of failing, so one malformed
//! variant can never abort a run.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Node};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;

use crate::catalog::VariantRecord;

/// Sentinel release date for unrecognized sets, sorts after every real date.
pub const DEFAULT_RELEASE_DATE: &str = "9999-12-31";

const RELEASE_DATES_BY_SET: [(&str, &str); 3] = [
    ("SFD", "2026-02-13"),
    ("OGN", "2025-10-31"),
    ("OGS", "2025-10-31"),
];

/// Rune keywords recognized by the `:rb_rune_<name>:` description token.
const RUNE_TYPES: [&str; 7] = ["order", "chaos", "fury", "mind", "calm", "body", "rainbow"];

/// Literal description tokens with fixed replacements.
const DESCRIPTION_REPLACEMENTS: [(&str, &str); 2] =
    [(":rb_exhaust:", "[Exhaust]"), (":rb_might:", "[Might]")];

lazy_static! {
    static ref ENERGY_TOKEN: Regex = Regex::new(r":rb_energy_(\d+):").unwrap();
    static ref RUNE_TOKEN: Regex = Regex::new(r":rb_rune_([a-zA-Z]+):").unwrap();
}

/// Deserializes any shape, mapping mismatches to `None` instead of an error.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// One raw card-variant item from the gallery payload, decoded permissively.
///
/// Polymorphic leaves (`id`, the legacy super-type blocks, label lists) stay as
/// [`Value`] and are walked defensively by the extraction functions.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCard {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub public_code: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub collector_number: Option<u32>,
    /// Generic identifier, string or integer depending on payload revision.
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub set: Option<SetBlock>,
    #[serde(deserialize_with = "lenient")]
    pub card_image: Option<ImageBlock>,
    #[serde(deserialize_with = "lenient")]
    pub text: Option<TextBlock>,
    #[serde(deserialize_with = "lenient")]
    pub card_type: Option<TypeBlock>,
    #[serde(deserialize_with = "lenient")]
    pub domain: Option<LabelListBlock>,
    #[serde(deserialize_with = "lenient")]
    pub tags: Option<TagsBlock>,
    /// Older payloads carried the tag block under `traits`.
    #[serde(deserialize_with = "lenient")]
    pub traits: Option<TagsBlock>,
    #[serde(deserialize_with = "lenient")]
    pub energy: Option<StatBlock>,
    #[serde(deserialize_with = "lenient")]
    pub power: Option<StatBlock>,
    #[serde(deserialize_with = "lenient")]
    pub might: Option<StatBlock>,
    /// Legacy root-level super-type blocks, kept for older payload revisions.
    #[serde(rename = "super")]
    pub super_block: Option<Value>,
    pub super_type: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetBlock {
    #[serde(deserialize_with = "lenient")]
    pub value: Option<SetValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetValue {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageBlock {
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(deserialize_with = "lenient")]
    pub rich_text: Option<RichTextBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RichTextBlock {
    #[serde(deserialize_with = "lenient")]
    pub body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeBlock {
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: Option<Vec<Value>>,
    #[serde(deserialize_with = "lenient")]
    pub super_type: Option<Vec<Value>>,
    #[serde(deserialize_with = "lenient")]
    pub super_types: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LabelListBlock {
    #[serde(deserialize_with = "lenient")]
    pub values: Option<Vec<Value>>,
}

/// Tag container; both shapes observed in the wild are read and merged:
/// `{"tags": ["Ahri", "Ionia"]}` and `{"values": [{"label": "Piltover"}]}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagsBlock {
    #[serde(deserialize_with = "lenient")]
    pub tags: Option<Vec<Value>>,
    #[serde(deserialize_with = "lenient")]
    pub values: Option<Vec<Value>>,
}

/// Numeric stats are nested two levels deep: `field.value.id`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    #[serde(deserialize_with = "lenient")]
    pub value: Option<StatValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatValue {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<u32>,
}

impl RawCard {
    /// Decodes one payload item. Returns `None` for non-mapping items, which
    /// the pipeline skips the same way the gallery page itself would.
    pub fn from_value(item: &Value) -> Option<Self> {
        if !item.is_object() {
            return None;
        }
        serde_json::from_value(item.clone()).ok()
    }

    /// Set id from `set.value.id`, when present and a string.
    pub fn set_id(&self) -> Option<&str> {
        self.set.as_ref()?.value.as_ref()?.id.as_deref()
    }

    /// Source URL of the variant image, when present.
    pub fn image_url(&self) -> Option<&str> {
        self.card_image.as_ref()?.url.as_deref()
    }
}

/// Builds the full intermediate record for one raw variant. The published
/// image reference starts empty; the pipeline fills it in after publishing.
pub fn variant_from_raw(raw: &RawCard) -> VariantRecord {
    VariantRecord {
        name: raw.name.clone().unwrap_or_default(),
        description: extract_description(raw),
        variant_number: build_variant_number(raw),
        set_id: raw.set_id().unwrap_or_default().to_string(),
        image: String::new(),
        card_type: extract_card_type(raw),
        super_type: extract_super_type(raw),
        energy: stat(&raw.energy),
        power: stat(&raw.power),
        might: stat(&raw.might),
        colors: extract_colors(raw),
        tags: extract_tags(raw),
        release_date: release_date_for_set(raw.set_id()),
    }
}

/// Ensures `*` suffixes are treated as `s` so variant codes stay consistent.
/// Idempotent: codes without a trailing `*` pass through unchanged.
pub fn normalize_variant_number(value: &str) -> String {
    match value.strip_suffix('*') {
        Some(stem) => format!("{stem}s"),
        None => value.to_string(),
    }
}

/// Builds the canonical variant code for a raw item.
///
/// Prefers `publicCode` (e.g. `OGN-066a/298` becomes `OGN-066a`), then
/// `set.value.id` plus the zero-padded collector number, then the generic `id`
/// field coerced to a string. Falls back to `UNKNOWN` so every record stays
/// sortable and groupable.
pub fn build_variant_number(raw: &RawCard) -> String {
    if let Some(public_code) = raw.public_code.as_deref() {
        if let Some((code, _)) = public_code.split_once('/') {
            return normalize_variant_number(code);
        }
    }

    if let (Some(set_id), Some(collector)) = (raw.set_id(), raw.collector_number) {
        return normalize_variant_number(&format!("{set_id}-{collector:03}"));
    }

    match &raw.id {
        Some(Value::String(id)) => normalize_variant_number(id),
        Some(Value::Number(id)) if id.is_i64() || id.is_u64() => {
            normalize_variant_number(&id.to_string())
        }
        _ => "UNKNOWN".to_string(),
    }
}

/// Release date for a set code; unknown sets get the far-future sentinel so
/// they sort after every dated set instead of before.
pub fn release_date_for_set(set_id: Option<&str>) -> String {
    let Some(set_id) = set_id else {
        return DEFAULT_RELEASE_DATE.to_string();
    };
    RELEASE_DATES_BY_SET
        .iter()
        .find(|(code, _)| *code == set_id)
        .map(|(_, date)| (*date).to_string())
        .unwrap_or_else(|| DEFAULT_RELEASE_DATE.to_string())
}

fn stat(block: &Option<StatBlock>) -> u32 {
    block
        .as_ref()
        .and_then(|b| b.value.as_ref())
        .and_then(|v| v.id)
        .unwrap_or(0)
}

fn first_label(list: Option<&Vec<Value>>) -> Option<String> {
    list?.first()?.get("label")?.as_str().map(str::to_string)
}

/// Card type: first label of `cardType.type`, or empty.
pub fn extract_card_type(raw: &RawCard) -> String {
    first_label(raw.card_type.as_ref().and_then(|t| t.kind.as_ref())).unwrap_or_default()
}

/// Super type: first label of `cardType.superType` (alias `superTypes`), with
/// a fallback to the legacy root-level `super` / `superType` blocks.
pub fn extract_super_type(raw: &RawCard) -> Option<String> {
    if let Some(type_block) = &raw.card_type {
        let list = type_block
            .super_type
            .as_ref()
            .filter(|l| !l.is_empty())
            .or(type_block.super_types.as_ref());
        if let Some(label) = first_label(list) {
            return Some(label);
        }
    }

    for block in [&raw.super_block, &raw.super_type] {
        if let Some(value) = block {
            let label = value
                .get("value")
                .and_then(|v| v.get("label"))
                .and_then(Value::as_str)
                .or_else(|| value.get("label").and_then(Value::as_str));
            if let Some(label) = label {
                return Some(label.to_string());
            }
        }
    }

    None
}

/// Colors from `domain.values` labels, insertion order, duplicates kept.
pub fn extract_colors(raw: &RawCard) -> Vec<String> {
    let Some(values) = raw.domain.as_ref().and_then(|d| d.values.as_ref()) else {
        return Vec::new();
    };
    values
        .iter()
        .filter_map(|v| v.get("label").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Tags merged from both observed shapes, deduplicated in first-seen order.
pub fn extract_tags(raw: &RawCard) -> Vec<String> {
    let Some(block) = raw.tags.as_ref().or(raw.traits.as_ref()) else {
        return Vec::new();
    };

    let mut tags: Vec<String> = Vec::new();

    // Shape 1: "tags": ["Ahri", "Ionia"] or a list of {"label": ...} objects
    if let Some(raw_tags) = &block.tags {
        for entry in raw_tags {
            match entry {
                Value::String(tag) => tags.push(tag.clone()),
                Value::Object(_) => {
                    if let Some(label) = entry.get("label").and_then(Value::as_str) {
                        tags.push(label.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    // Shape 2: "values": [{"label": "Piltover"}, ...]
    if let Some(values) = &block.values {
        for entry in values {
            if let Some(label) = entry.get("label").and_then(Value::as_str) {
                tags.push(label.to_string());
            }
        }
    }

    let mut seen = HashSet::new();
    tags.retain(|tag| seen.insert(tag.clone()));
    tags
}

/// Rules text from `text.richText.body`, converted to plain text.
pub fn extract_description(raw: &RawCard) -> String {
    let body = raw
        .text
        .as_ref()
        .and_then(|t| t.rich_text.as_ref())
        .and_then(|r| r.body.as_deref());
    match body {
        Some(body) => html_to_text(body),
        None => String::new(),
    }
}

/// Converts a rich-text HTML fragment to plain text, keeping `<br>` line
/// breaks as newlines, then translates symbol tokens.
pub fn html_to_text(fragment: &str) -> String {
    if fragment.is_empty() {
        return String::new();
    }

    let parsed = Html::parse_fragment(fragment);
    let mut text = String::new();
    for node in parsed.root_element().descendants() {
        match node.value() {
            Node::Text(chunk) => text.push_str(&chunk.text),
            Node::Element(element) if element.name() == "br" => text.push('\n'),
            _ => {}
        }
    }

    translate_description_tokens(&text)
}

/// Translates symbol placeholders to readable bracketed tokens.
///
/// `:rb_energy_<N>:` becomes `[<N>]`, `:rb_rune_<name>:` becomes the
/// capitalized rune in brackets for recognized rune keywords only, and the
/// fixed replacement table handles the remaining literal tokens.
pub fn translate_description_tokens(text: &str) -> String {
    let text = ENERGY_TOKEN.replace_all(text, |caps: &regex::Captures<'_>| {
        match caps[1].parse::<u64>() {
            Ok(n) => format!("[{n}]"),
            Err(_) => caps[0].to_string(),
        }
    });

    let text = RUNE_TOKEN.replace_all(&text, |caps: &regex::Captures<'_>| {
        let rune = caps[1].to_lowercase();
        if RUNE_TYPES.contains(&rune.as_str()) {
            format!("[{}]", capitalize(&rune))
        } else {
            caps[0].to_string()
        }
    });

    let mut text = text.into_owned();
    for (token, replacement) in DESCRIPTION_REPLACEMENTS {
        text = text.replace(token, replacement);
    }
    text
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
