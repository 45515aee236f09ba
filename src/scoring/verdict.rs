// Verdict — the coarse three-level label derived from the final trust score.
//
// Thresholds are inclusive on the lower bound of each band:
//   0..=49  High Risk
//   50..=74 Suspicious
//   75..=100 Safe

use serde::{Deserialize, Serialize};

/// Lowest score that is still considered Suspicious rather than High Risk.
pub const SUSPICIOUS_FLOOR: u8 = 50;

/// Lowest score that is considered Safe.
pub const SAFE_FLOOR: u8 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Suspicious,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl Verdict {
    /// Determine the verdict from a clamped score (0-100).
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= SAFE_FLOOR => Verdict::Safe,
            s if s >= SUSPICIOUS_FLOOR => Verdict::Suspicious,
            _ => Verdict::HighRisk,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "Safe",
            Verdict::Suspicious => "Suspicious",
            Verdict::HighRisk => "High Risk",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
