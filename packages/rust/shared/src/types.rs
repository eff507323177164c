//! Core domain types for RFP analysis.
//!
//! Field names serialize in camelCase so the JSON shape matches what the
//! bid tooling downstream expects.

use serde::{Deserialize, Serialize};

/// Default `page` for items whose location is unknown.
pub const DEFAULT_PAGE: &str = "Not specified";

/// Default `requirements` for items without explicit requirements.
pub const DEFAULT_REQUIREMENTS: &str = "No specific requirements mentioned";

/// Default `format` for items without an explicit format.
pub const DEFAULT_FORMAT: &str = "As specified in the RFP document";

// ---------------------------------------------------------------------------
// RequiredItem
// ---------------------------------------------------------------------------

/// What kind of thing a bid must supply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Form,
    Document,
    #[default]
    Information,
}

impl ItemType {
    /// Lowercase label used in JSON and prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Document => "document",
            Self::Information => "information",
        }
    }

    /// Lenient parse of a model-provided type label.
    ///
    /// Returns `None` for labels that are not one of the three known types.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "form" | "forms" => Some(Self::Form),
            "document" | "documents" => Some(Self::Document),
            "information" | "info" => Some(Self::Information),
            _ => None,
        }
    }
}

/// One form, document, or piece of information the proposal must include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredItem {
    /// Item name as found in the document.
    pub item: String,
    /// Page reference, or [`DEFAULT_PAGE`].
    pub page: String,
    /// Free-text requirements, or [`DEFAULT_REQUIREMENTS`].
    pub requirements: String,
    /// Item category.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Whether the item is mandatory.
    pub is_required: bool,
    /// Expected submission format, or [`DEFAULT_FORMAT`].
    pub format: String,
}

impl RequiredItem {
    /// Build an item with every optional field set to its default.
    pub fn new(item: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            item: item.into(),
            page: DEFAULT_PAGE.into(),
            requirements: DEFAULT_REQUIREMENTS.into(),
            item_type,
            is_required: true,
            format: DEFAULT_FORMAT.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// Structured summary of one RFP document. Built fresh per analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub project_overview: String,
    pub key_requirements: Vec<String>,
    pub timeline: String,
    pub budget_information: String,
    pub evaluation_criteria: Vec<String>,
    pub required_items: Vec<RequiredItem>,
    /// Set when the result came from a degraded analysis path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// ClarificationQuestion
// ---------------------------------------------------------------------------

/// Grouping for clarification questions. Declaration order is sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Required Forms")]
    RequiredForms,
    #[serde(rename = "Required Documents")]
    RequiredDocuments,
    #[serde(rename = "Required Information")]
    RequiredInformation,
    #[serde(rename = "Required Items")]
    RequiredItems,
    #[serde(rename = "General")]
    General,
}

impl Section {
    /// Human-readable section title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::RequiredForms => "Required Forms",
            Self::RequiredDocuments => "Required Documents",
            Self::RequiredInformation => "Required Information",
            Self::RequiredItems => "Required Items",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// A question to put to the contractor about one required item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationQuestion {
    pub question: String,
    pub section: Section,
    pub importance: String,
    pub format: String,
}
