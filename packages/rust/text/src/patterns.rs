//! Heuristic RFP extraction with fixed regular expressions.
//!
//! Used when no model output is available. Matches are approximate by
//! nature: unusual formatting produces false positives and misses.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use bidiq_shared::{AnalysisResult, ItemType, RequiredItem};

/// Number of leading lines used as the project overview.
const OVERVIEW_LINES: usize = 10;

const REQUIREMENT_KEYWORDS: &[&str] = &["required", "must", "shall", "should", "need"];
const TIMELINE_KEYWORDS: &[&str] = &["deadline", "due date", "timeline", "schedule", "duration"];
const BUDGET_KEYWORDS: &[&str] = &["budget", "cost", "price", "funding", "$", "dollar"];
const EVALUATION_KEYWORDS: &[&str] = &["evaluation", "criteria", "scoring", "assessment"];

/// Item patterns in match order. Capture group 1 is the item text.
static ITEM_PATTERNS: LazyLock<Vec<(Regex, ItemType)>> = LazyLock::new(|| {
    vec![
        // "Submit the Bid Form", "Attach a Non-Collusion Affidavit"
        (
            Regex::new(
                r"(?i)\b(?:submit|complete|sign|attach|execute)\s+(?:(?:a|an|the|your)\s+)?([^\n.;:]+?\b(?:forms?|affidavits?|certificates?|certifications?))\b",
            )
            .expect("valid regex"),
            ItemType::Form,
        ),
        // "Exhibit A", "Form W-9", "Attachment 3"
        (
            Regex::new(r"(?i)\b((?:form|exhibit|attachment|appendix)\s+(?:[a-z]|\d+[a-z]?)(?:-\d+)?)\b")
                .expect("valid regex"),
            ItemType::Form,
        ),
        // "must include a detailed equipment list"
        (
            Regex::new(r"(?i)\b(?:must|shall)\s+(?:include|provide|contain|submit)\s+([^\n.;]+)")
                .expect("valid regex"),
            ItemType::Information,
        ),
        // "proof of insurance", "copies of licenses"
        (
            Regex::new(r"(?i)\b(?:copy|copies|proof|evidence)\s+of\s+(?:(?:a|an|the|your)\s+)?([^\n.;,]+)")
                .expect("valid regex"),
            ItemType::Information,
        ),
    ]
});

/// Build an [`AnalysisResult`] from `text` using keyword and pattern matching only.
///
/// `key_requirements` is always empty and `note` is `None`; callers on a
/// degraded path set the note themselves.
pub fn basic_analysis(text: &str) -> AnalysisResult {
    let result = AnalysisResult {
        project_overview: project_overview(text),
        key_requirements: Vec::new(),
        timeline: lines_containing(text, TIMELINE_KEYWORDS).join(" "),
        budget_information: lines_containing(text, BUDGET_KEYWORDS).join(" "),
        evaluation_criteria: lines_containing(text, EVALUATION_KEYWORDS)
            .into_iter()
            .map(str::to_owned)
            .collect(),
        required_items: extract_required_items(text),
        note: None,
    };

    debug!(
        items = result.required_items.len(),
        criteria = result.evaluation_criteria.len(),
        "basic analysis complete"
    );
    result
}

/// Collect required items with the item patterns, falling back to
/// requirement-keyword lines when no pattern matches.
pub fn extract_required_items(text: &str) -> Vec<RequiredItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for (regex, item_type) in ITEM_PATTERNS.iter() {
        for caps in regex.captures_iter(text) {
            if let Some(name) = caps.get(1).map(|m| clean_capture(m.as_str())) {
                push_unique(&mut items, &mut seen, name, *item_type);
            }
        }
    }

    if items.is_empty() {
        for line in lines_containing(text, REQUIREMENT_KEYWORDS) {
            push_unique(&mut items, &mut seen, line.to_owned(), ItemType::Information);
        }
    }

    items
}

fn push_unique(
    items: &mut Vec<RequiredItem>,
    seen: &mut HashSet<String>,
    name: String,
    item_type: ItemType,
) {
    if name.is_empty() || !seen.insert(name.clone()) {
        return;
    }
    items.push(RequiredItem::new(name, item_type));
}

/// Collapse whitespace and strip trailing clause punctuation.
fn clean_capture(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches([',', ':', '-', ')', '('])
        .trim()
        .to_owned()
}

fn project_overview(text: &str) -> String {
    text.lines()
        .take(OVERVIEW_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed, non-empty lines containing any keyword (case-insensitive).
fn lines_containing<'a>(text: &'a str, keywords: &[&str]) -> Vec<&'a str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        })
        .collect()
}
