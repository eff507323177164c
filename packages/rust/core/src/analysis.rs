//! RFP analysis orchestrator.
//!
//! Sends the document to a [`Summarizer`] for a structured JSON analysis,
//! backstops missing required items with pattern extraction and a second
//! targeted request, and degrades to pure pattern extraction when the
//! model's quota is exhausted.

use std::borrow::Cow;

use tracing::{debug, info, instrument, warn};

use bidiq_llm::{RetryPolicy, Summarizer, retry};
use bidiq_shared::{AnalysisResult, AppConfig, BidIqError, RequiredItem, Result};
use bidiq_text::{DEFAULT_MAX_CHUNK_SIZE, basic_analysis, chunk_text, extract_required_items};

use crate::normalize::{normalize_required_items, parse_analysis, parse_item_array};

/// Attached to results produced by the rate-limit fallback.
pub const RATE_LIMIT_NOTE: &str = "This is a basic analysis produced by pattern matching \
    because the AI service is unavailable due to API quota limitations. \
    Review the RFP document directly to confirm all requirements.";

/// Default input budget for a single model request, in characters.
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 100_000;

const SYSTEM_PROMPT: &str = "You are an assistant that analyzes Requests for Proposal (RFPs) \
    for equipment-rental and installation contractors. Answer with JSON only, no prose.";

const ANALYSIS_INSTRUCTIONS: &str = r#"Analyze the RFP document below and return a JSON object with exactly these keys:
- "projectOverview": string, a short description of the project
- "keyRequirements": array of strings
- "timeline": string, deadlines and schedule
- "budgetInformation": string, budget, pricing and funding details
- "evaluationCriteria": array of strings
- "requiredItems": array of objects, one per form, document or piece of information the proposal must include, each with
  "item" (string), "page" (string), "requirements" (string), "type" ("form", "document" or "information"), "isRequired" (boolean), "format" (string)
Use an empty string or empty array when the document says nothing about a section."#;

const REQUIRED_ITEMS_INSTRUCTIONS: &str = r#"List every form, document, certificate, or piece of information a bidder must submit with a proposal for the RFP below.
Return only a JSON array. Each element is an object with "item", "page", "requirements", "type" ("form", "document" or "information"), "isRequired" and "format"."#;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tuning for [`Analyzer`].
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Backoff applied to every summarizer call.
    pub retry: RetryPolicy,
    /// Documents longer than this are cut to their leading chunks.
    pub max_document_chars: usize,
    /// Chunk size used when cutting an over-long document.
    pub chunk_size: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
            chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

impl From<&AppConfig> for AnalysisOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            retry: RetryPolicy::from(&config.analysis),
            max_document_chars: config.analysis.max_document_chars,
            chunk_size: config.analysis.max_chunk_size,
        }
    }
}

// ---------------------------------------------------------------------------
// Progress trait
// ---------------------------------------------------------------------------

/// Progress callback for analysis phases.
pub trait AnalysisProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl AnalysisProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Turns RFP text into an [`AnalysisResult`].
///
/// Holds no per-document state; one analyzer can serve concurrent calls.
pub struct Analyzer<S> {
    summarizer: S,
    options: AnalysisOptions,
}

impl<S: Summarizer> Analyzer<S> {
    pub fn new(summarizer: S, options: AnalysisOptions) -> Self {
        Self {
            summarizer,
            options,
        }
    }

    pub fn summarizer(&self) -> &S {
        &self.summarizer
    }

    /// Analyze `text`. See [`Analyzer::analyze_with_progress`].
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        self.analyze_with_progress(text, &SilentProgress).await
    }

    /// Analyze `text`, reporting phases to `progress`.
    ///
    /// A rate-limit error from any model call (after retries) yields the
    /// pattern-extraction result with [`RATE_LIMIT_NOTE`]. Any other
    /// failure is returned as [`BidIqError::Analysis`].
    #[instrument(skip_all, fields(backend = self.summarizer.name(), doc_chars = text.len()))]
    pub async fn analyze_with_progress(
        &self,
        text: &str,
        progress: &dyn AnalysisProgress,
    ) -> Result<AnalysisResult> {
        match self.run(text, progress).await {
            Ok(result) => {
                info!(
                    required_items = result.required_items.len(),
                    criteria = result.evaluation_criteria.len(),
                    "analysis complete"
                );
                Ok(result)
            }
            Err(e) if e.is_rate_limited() => {
                warn!(error = %e, "model quota exhausted, falling back to pattern matching");
                progress.phase("Falling back to pattern matching");
                let mut result = basic_analysis(text);
                result.note = Some(RATE_LIMIT_NOTE.into());
                Ok(result)
            }
            Err(e) => Err(BidIqError::Analysis(format!(
                "Failed to analyze RFP document: {e}"
            ))),
        }
    }

    async fn run(&self, text: &str, progress: &dyn AnalysisProgress) -> Result<AnalysisResult> {
        let document = self.bounded_document(text);

        progress.phase("Requesting model analysis");
        let raw = self.complete(ANALYSIS_INSTRUCTIONS, &document).await?;

        let (mut result, raw_items) = match parse_analysis(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "model analysis was not usable JSON, continuing with empty result");
                (AnalysisResult::default(), Vec::new())
            }
        };

        let mut items = normalize_required_items(&raw_items);
        if items.is_empty() {
            progress.phase("Extracting required items");
            items = extract_required_items(text);
            debug!(found = items.len(), "pattern backstop for required items");
        }
        if items.is_empty() {
            progress.phase("Requesting required items");
            items = self.request_required_items(&document).await?;
        }

        result.required_items = items;
        Ok(result)
    }

    /// Second, narrower request used when nothing else found required items.
    async fn request_required_items(&self, document: &str) -> Result<Vec<RequiredItem>> {
        let raw = self.complete(REQUIRED_ITEMS_INSTRUCTIONS, document).await?;
        match parse_item_array(&raw) {
            Ok(values) => Ok(normalize_required_items(&values)),
            Err(e) => {
                warn!(error = %e, "required-items response discarded");
                Ok(Vec::new())
            }
        }
    }

    async fn complete(&self, instructions: &str, document: &str) -> Result<String> {
        let prompt = format!("{instructions}\n\nRFP document:\n{document}");
        retry(
            || self.summarizer.summarize(SYSTEM_PROMPT, &prompt),
            self.options.retry,
        )
        .await
    }

    /// The document as sent to the model: whole when within budget,
    /// otherwise its leading chunks.
    fn bounded_document<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let limit = self.options.max_document_chars.max(1);
        let total_chars = text.chars().count();
        if total_chars <= limit {
            return Cow::Borrowed(text);
        }

        let chunks = chunk_text(text, self.options.chunk_size.min(limit));
        let total_chunks = chunks.len();
        let mut used = 0;
        let kept: Vec<String> = chunks
            .into_iter()
            .take_while(|chunk| {
                let separator = if used == 0 { 0 } else { 2 };
                let cost = separator + chunk.chars().count();
                if used + cost > limit {
                    return false;
                }
                used += cost;
                true
            })
            .collect();

        warn!(
            total_chars,
            limit,
            kept = kept.len(),
            dropped = total_chunks - kept.len(),
            "document exceeds model input budget, sending leading chunks only"
        );

        if kept.is_empty() {
            // First chunk is a single word longer than the whole budget.
            return Cow::Owned(text.chars().take(limit).collect());
        }
        Cow::Owned(kept.join("\n\n"))
    }
}
