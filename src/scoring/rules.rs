// Rule table — the trusted domain fragments and suspicious keywords the
// engine matches against.
//
// A RuleSet is immutable once built. Entries are normalized to lowercase at
// construction so the engine only has to lowercase the content. Order is
// preserved because flags are reported in rule-table order.
//
// Hot reload never edits a RuleSet in place: SharedRules swaps the whole
// Arc, so an evaluation that already grabbed the old table finishes on it.

use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Keywords that commonly show up in scam messages and fake job offers.
pub const DEFAULT_SUSPICIOUS_KEYWORDS: &[&str] = &[
    "easy money",
    "no experience",
    "urgent",
    "click here",
    "whatsapp",
    "lottery",
    "investment",
    "profit",
    "bank account",
    "password",
    "verify",
    "suspended",
];

/// Host fragments of organizations treated as trusted sources.
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "bbc.com",
    "reuters.com",
    "nytimes.com",
    "techcrunch.com",
    "linkedin.com",
    "google.com",
    "microsoft.com",
    "gov.in",
];

/// The immutable rule table.
///
/// Construct with [`RuleSet::new`] (or `Default` for the built-in table) so
/// entries are guaranteed lowercase, non-blank and unique. Surrounding
/// whitespace is kept, so `" profit"` only matches after a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    trusted_domains: Vec<String>,
    suspicious_keywords: Vec<String>,
}

/// On-disk shape of a rule file.
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    trusted_domains: Vec<String>,
    #[serde(default)]
    suspicious_keywords: Vec<String>,
}

impl RuleSet {
    pub fn new<D, K>(trusted_domains: D, suspicious_keywords: K) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        Self {
            trusted_domains: normalize(trusted_domains),
            suspicious_keywords: normalize(suspicious_keywords),
        }
    }

    /// A rule set with no domains and no keywords.
    pub fn empty() -> Self {
        Self {
            trusted_domains: Vec::new(),
            suspicious_keywords: Vec::new(),
        }
    }

    /// Parse a rule table from its JSON form:
    /// `{"trusted_domains": [...], "suspicious_keywords": [...]}`.
    /// Missing keys mean an empty list.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: RuleFile = serde_json::from_str(json).context("Invalid rule file JSON")?;
        Ok(Self::new(file.trusted_domains, file.suspicious_keywords))
    }

    /// Load a rule table from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn trusted_domains(&self) -> &[String] {
        &self.trusted_domains
    }

    pub fn suspicious_keywords(&self) -> &[String] {
        &self.suspicious_keywords
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_DOMAINS, DEFAULT_SUSPICIOUS_KEYWORDS)
    }
}

/// Lowercase, drop blanks and later duplicates. First-seen order wins.
fn normalize<I>(entries: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.as_ref().to_lowercase();
        if !entry.trim().is_empty() && !out.contains(&entry) {
            out.push(entry);
        }
    }
    out
}

/// Process-wide handle to the active rule table.
///
/// Readers take a cheap `Arc` clone and evaluate without holding the lock.
/// Writers replace the whole table.
#[derive(Debug)]
pub struct SharedRules {
    current: RwLock<Arc<RuleSet>>,
}

impl SharedRules {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    /// Snapshot of the active rule table.
    pub fn current(&self) -> Arc<RuleSet> {
        // A poisoned lock still holds a complete Arc; the swap is a single
        // assignment so there is no half-written state to worry about.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in a new rule table, returning the previous one.
    pub fn replace(&self, rules: RuleSet) -> Arc<RuleSet> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(rules))
    }
}

impl Default for SharedRules {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}
