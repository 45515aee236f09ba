// Scoring — the rule table and the pure engine that applies it.

pub mod engine;
pub mod rules;
pub mod verdict;
pub mod wire;

pub use engine::{evaluate, Breakdown, ContentType, ScoreInput, ScoreResult, SourceType};
pub use rules::{RuleSet, SharedRules};
pub use verdict::Verdict;
