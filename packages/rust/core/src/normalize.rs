//! Coercion of loosely-shaped model output into the fixed result schema.
//!
//! Models return required items as bare strings, partial objects, or the
//! full shape; text sections sometimes come back as arrays. Everything is
//! coerced here so downstream code only sees [`RequiredItem`] and plain text.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use bidiq_shared::{
    AnalysisResult, BidIqError, DEFAULT_FORMAT, DEFAULT_PAGE, DEFAULT_REQUIREMENTS, ItemType,
    RequiredItem, Result,
};

/// Keys accepted as the item name, in priority order.
const NAME_KEYS: &[&str] = &["item", "name", "title"];

/// Coerce every element into a full [`RequiredItem`], applying defaults.
///
/// Strings become `information` items. Objects are back-filled field by
/// field. Elements without usable item text are dropped, as are exact
/// duplicates of an earlier item.
pub fn normalize_required_items(values: &[Value]) -> Vec<RequiredItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(values.len());

    for value in values {
        match normalize_item(value) {
            Some(item) if seen.insert(item.item.clone()) => items.push(item),
            Some(item) => debug!(item = %item.item, "dropping duplicate required item"),
            None => debug!(%value, "dropping required item without a name"),
        }
    }

    items
}

fn normalize_item(value: &Value) -> Option<RequiredItem> {
    match value {
        Value::String(s) => {
            let name = s.trim();
            (!name.is_empty()).then(|| RequiredItem::new(name, ItemType::Information))
        }
        Value::Object(map) => {
            let name = NAME_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .map(value_to_text)
                .find(|name| !name.is_empty())?;

            let text_or = |key: &str, default: &str| {
                map.get(key)
                    .map(value_to_text)
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| default.to_owned())
            };

            Some(RequiredItem {
                item: name,
                page: text_or("page", DEFAULT_PAGE),
                requirements: text_or("requirements", DEFAULT_REQUIREMENTS),
                item_type: map
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(ItemType::parse_label)
                    .unwrap_or_default(),
                is_required: map.get("isRequired").and_then(value_to_bool).unwrap_or(true),
                format: text_or("format", DEFAULT_FORMAT),
            })
        }
        _ => None,
    }
}

fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "required" => Some(true),
            "false" | "no" | "optional" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Model response parsing
// ---------------------------------------------------------------------------

/// Sections of the primary analysis response, before coercion.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAnalysis {
    project_overview: Value,
    key_requirements: Value,
    timeline: Value,
    budget_information: Value,
    evaluation_criteria: Value,
    required_items: Value,
}

/// Parse the primary analysis response.
///
/// Returns the text sections with `required_items` left empty, plus the raw
/// required-item values for [`normalize_required_items`].
pub(crate) fn parse_analysis(raw: &str) -> Result<(AnalysisResult, Vec<Value>)> {
    let value: Value = serde_json::from_str(strip_code_fences(raw))
        .map_err(|e| BidIqError::parse(format!("analysis response is not JSON: {e}")))?;
    if !value.is_object() {
        return Err(BidIqError::parse("analysis response is not a JSON object"));
    }
    let parsed: RawAnalysis = serde_json::from_value(value)
        .map_err(|e| BidIqError::parse(format!("unexpected analysis shape: {e}")))?;

    let result = AnalysisResult {
        project_overview: value_to_text(&parsed.project_overview),
        key_requirements: value_to_list(&parsed.key_requirements),
        timeline: value_to_text(&parsed.timeline),
        budget_information: value_to_text(&parsed.budget_information),
        evaluation_criteria: value_to_list(&parsed.evaluation_criteria),
        required_items: Vec::new(),
        note: None,
    };

    Ok((result, into_elements(parsed.required_items)))
}

/// Parse the backstop response: a JSON array, or an object wrapping one
/// under `requiredItems`.
pub(crate) fn parse_item_array(raw: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(strip_code_fences(raw))
        .map_err(|e| BidIqError::parse(format!("required-items response is not JSON: {e}")))?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("requiredItems") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(BidIqError::parse("required-items response has no item array")),
        },
        _ => Err(BidIqError::parse("required-items response is not an array")),
    }
}

/// Remove a surrounding Markdown code fence, if any.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line (```json).
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn into_elements(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Flatten any JSON value into display text.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_owned(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|text| !text.is_empty())
            .collect(),
        other => {
            let text = value_to_text(other);
            if text.is_empty() { Vec::new() } else { vec![text] }
        }
    }
}
