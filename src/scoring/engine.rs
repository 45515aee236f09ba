// Trust scoring engine.
//
// A single pass over the content: pick the branch for the declared content
// type, apply its deductions, then clamp and label. The function is pure.
// It reads only the input and the rule table, and allocates only the result,
// so callers can run it from any number of threads without coordination.
//
// Matching is plain case-insensitive substring containment. That means a
// host like `bbc.com.evil.net` counts as trusted. Host-aware matching would
// change scores for existing content, so it is deliberately not done here.

use serde::{Deserialize, Serialize};

use super::rules::RuleSet;
use super::verdict::Verdict;

/// Every evaluation starts from full trust.
pub const BASE_SCORE: i32 = 100;

/// Deduction for URLs served over plain HTTP.
pub const INSECURE_HTTP_PENALTY: i32 = 40;

/// Deduction for HTTPS (or scheme-less) URLs outside the trusted list.
pub const UNVERIFIED_PENALTY: i32 = 10;

/// Risk added per matched keyword, before the 100 cap.
pub const RISK_PER_FLAG: u32 = 25;

/// Text shorter than this many characters gets the short-text penalty.
pub const MIN_TEXT_CHARS: usize = 20;

/// Deduction for text too short to analyze properly.
pub const SHORT_TEXT_PENALTY: i32 = 10;

/// Language sub-score assigned to too-short text.
pub const SHORT_TEXT_LANGUAGE: u8 = 30;

const TRUSTED_EXPLANATION: &str = "This URL belongs to a verified trusted organization.";
const INSECURE_EXPLANATION: &str =
    "This site uses an insecure connection (HTTP). Data is not encrypted.";
const UNVERIFIED_EXPLANATION: &str =
    "This domain is not in our trusted whitelist. Proceed with caution.";
const NO_KEYWORDS_EXPLANATION: &str = "No specific threat keywords were detected.";
const SHORT_TEXT_SUFFIX: &str = " Text is too short for deep analysis.";
const PASSTHROUGH_EXPLANATION: &str = "Analysis complete.";

/// What kind of content is being scored.
///
/// Anything other than `url`, `text` or `job` is kept as `Other` and scored
/// as a neutral passthrough instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Url,
    Text,
    Job,
    Other(String),
}

impl ContentType {
    /// Map a wire value to a content type. Matching is exact: `"URL"` is
    /// not `url`.
    pub fn parse(value: &str) -> Self {
        match value {
            "url" => ContentType::Url,
            "text" => ContentType::Text,
            "job" => ContentType::Job,
            other => ContentType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Url => "url",
            ContentType::Text => "text",
            ContentType::Job => "job",
            ContentType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single piece of content to score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreInput {
    pub content_type: ContentType,
    pub content: String,
}

impl ScoreInput {
    pub fn new(content_type: ContentType, content: impl Into<String>) -> Self {
        Self {
            content_type,
            content: content.into(),
        }
    }
}

/// The three independent sub-scores, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub language: u8,
    pub source: u8,
    pub risk: u8,
}

impl Default for Breakdown {
    fn default() -> Self {
        Self {
            language: 100,
            source: 50,
            risk: 0,
        }
    }
}

/// Provenance class of the scored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    Trusted,
    #[serde(rename = "Insecure (HTTP)")]
    InsecureHttp,
    Unverified,
    Unknown,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Trusted => "Trusted",
            SourceType::InsecureHttp => "Insecure (HTTP)",
            SourceType::Unverified => "Unverified",
            SourceType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full, explainable assessment returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub verdict: Verdict,
    /// Final trust score, 0 (no trust) to 100 (full trust)
    pub score: u8,
    pub breakdown: Breakdown,
    /// Matched keywords in rule-table order
    pub flags: Vec<String>,
    pub source_type: SourceType,
    pub explanation: String,
}

/// Score a piece of content against a rule table.
///
/// Never fails. Unrecognized content types come back as a neutral result
/// with `SourceType::Unknown` and the full base score.
pub fn evaluate(input: &ScoreInput, rules: &RuleSet) -> ScoreResult {
    let mut base_score = BASE_SCORE;
    let mut breakdown = Breakdown::default();
    let mut flags = Vec::new();
    let mut source_type = SourceType::Unknown;
    let explanation;

    match input.content_type {
        ContentType::Url => {
            let lowered = input.content.to_lowercase();
            // Trusted wins even when the URL is plain HTTP.
            if rules
                .trusted_domains()
                .iter()
                .any(|d| lowered.contains(d.as_str()))
            {
                breakdown.source = 100;
                source_type = SourceType::Trusted;
                explanation = TRUSTED_EXPLANATION.to_string();
            } else if lowered.contains("http://") {
                breakdown.source = 0;
                base_score -= INSECURE_HTTP_PENALTY;
                source_type = SourceType::InsecureHttp;
                explanation = INSECURE_EXPLANATION.to_string();
            } else {
                breakdown.source = 40;
                base_score -= UNVERIFIED_PENALTY;
                source_type = SourceType::Unverified;
                explanation = UNVERIFIED_EXPLANATION.to_string();
            }
        }
        ContentType::Text | ContentType::Job => {
            flags = match_keywords(&input.content, rules);

            let risk = (flags.len() as u32)
                .saturating_mul(RISK_PER_FLAG)
                .min(100);
            breakdown.risk = risk as u8;
            base_score -= risk as i32;

            let mut text = if flags.is_empty() {
                NO_KEYWORDS_EXPLANATION.to_string()
            } else {
                format!(
                    "Detected {} high-risk patterns ({}) often associated with scams.",
                    flags.len(),
                    flags.join(", ")
                )
            };

            if input.content.chars().count() < MIN_TEXT_CHARS {
                breakdown.language = SHORT_TEXT_LANGUAGE;
                base_score -= SHORT_TEXT_PENALTY;
                text.push_str(SHORT_TEXT_SUFFIX);
            }
            explanation = text;
        }
        ContentType::Other(_) => {
            explanation = PASSTHROUGH_EXPLANATION.to_string();
        }
    }

    let score = base_score.clamp(0, 100) as u8;

    ScoreResult {
        verdict: Verdict::from_score(score),
        score,
        breakdown,
        flags,
        source_type,
        explanation,
    }
}

/// Every keyword present in the content, once each, in rule-table order.
fn match_keywords(content: &str, rules: &RuleSet) -> Vec<String> {
    let lowered = content.to_lowercase();
    rules
        .suspicious_keywords()
        .iter()
        .filter(|k| lowered.contains(k.as_str()))
        .cloned()
        .collect()
}
