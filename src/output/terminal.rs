// Colored terminal output for scores, history and the rule table.
//
// main.rs delegates all human-readable printing here; `--json` output
// bypasses this module entirely.

use colored::Colorize;

use crate::db::models::HistoryEntry;
use crate::scoring::{RuleSet, ScoreInput, ScoreResult, SourceType, Verdict};

/// Display a single evaluation.
pub fn display_score(input: &ScoreInput, result: &ScoreResult) {
    println!(
        "\n{}",
        format!("=== {} check ===", input.content_type).bold()
    );
    println!("  Content: {}", super::truncate_chars(&input.content, 80).dimmed());
    println!();
    println!(
        "  Verdict: {}  ({}/100)",
        colorize_verdict(result.verdict),
        result.score
    );
    println!("  Source:  {}", colorize_source(result.source_type));
    println!(
        "  Breakdown: language {}  source {}  risk {}",
        result.breakdown.language, result.breakdown.source, result.breakdown.risk
    );

    if !result.flags.is_empty() {
        let flags: Vec<String> = result.flags.iter().map(|f| f.red().to_string()).collect();
        println!("  Flags:   {}", flags.join(", "));
    }

    println!("\n  {}", result.explanation);
}

/// Display a user's scan history, newest first.
pub fn display_history(email: &str, entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No scans recorded for {email}.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Recent scans for {email} ({}) ===", entries.len()).bold()
    );
    println!();
    println!(
        "  {:<16}  {:<5}  {:>5}  {:<10}  {}",
        "Date".dimmed(),
        "Type".dimmed(),
        "Score".dimmed(),
        "Verdict".dimmed(),
        "Content".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for entry in entries {
        println!(
            "  {:<16}  {:<5}  {:>5}  {:<10}  {}",
            entry.date,
            entry.content_type,
            entry.score,
            colorize_verdict_str(&entry.verdict),
            super::truncate_chars(&entry.snippet, 40),
        );
    }
    println!();
}

/// Display the active rule table.
pub fn display_rules(rules: &RuleSet, origin: &str) {
    println!("\n{}", format!("=== Rule table ({origin}) ===").bold());

    println!(
        "\n  Trusted domains ({}):",
        rules.trusted_domains().len()
    );
    for domain in rules.trusted_domains() {
        println!("    {}", domain.green());
    }

    println!(
        "\n  Suspicious keywords ({}):",
        rules.suspicious_keywords().len()
    );
    for keyword in rules.suspicious_keywords() {
        println!("    {}", keyword.yellow());
    }
    println!();
}

fn colorize_verdict(verdict: Verdict) -> colored::ColoredString {
    colorize_verdict_str(verdict.as_str())
}

/// Colorize a stored verdict string.
fn colorize_verdict_str(verdict: &str) -> colored::ColoredString {
    match verdict {
        "High Risk" => verdict.red().bold(),
        "Suspicious" => verdict.yellow(),
        "Safe" => verdict.green(),
        _ => verdict.dimmed(),
    }
}

fn colorize_source(source: SourceType) -> colored::ColoredString {
    let label = source.as_str();
    match source {
        SourceType::Trusted => label.green(),
        SourceType::InsecureHttp => label.red(),
        SourceType::Unverified => label.yellow(),
        SourceType::Unknown => label.dimmed(),
    }
}
