// Unit tests for rule table loading and swapping.

use std::sync::Arc;

use vericheck::scoring::{evaluate, ContentType, RuleSet, ScoreInput, SharedRules, SourceType};

fn temp_rule_file(name: &str, json: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "vericheck-{name}-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn rule_file_is_normalized() {
    let path = temp_rule_file(
        "normalize",
        r#"{
            "trusted_domains": ["Example.COM", "example.com", "", "   "],
            "suspicious_keywords": ["Crypto", "GIVEAWAY", "crypto"]
        }"#,
    );
    let rules = RuleSet::from_json_file(&path).unwrap();
    assert_eq!(rules.trusted_domains(), ["example.com"]);
    assert_eq!(rules.suspicious_keywords(), ["crypto", "giveaway"]);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn rule_file_missing_is_an_error() {
    let err = RuleSet::from_json_file(std::path::Path::new("/no/such/rules.json")).unwrap_err();
    assert!(format!("{err:#}").contains("/no/such/rules.json"));
}

#[test]
fn rule_file_bad_json_is_an_error() {
    let path = temp_rule_file("bad", "{ trusted_domains: nope");
    assert!(RuleSet::from_json_file(&path).is_err());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn swapped_table_applies_to_new_evaluations_only() {
    let shared = SharedRules::default();
    let input = ScoreInput::new(ContentType::Url, "https://www.bbc.com/news");

    let snapshot = shared.current();
    shared.replace(RuleSet::empty());

    // Evaluation already holding the old table is unaffected
    assert_eq!(evaluate(&input, &snapshot).source_type, SourceType::Trusted);
    // New evaluations see the new table
    assert_eq!(
        evaluate(&input, &shared.current()).source_type,
        SourceType::Unverified
    );
}

#[test]
fn readers_always_see_a_whole_table() {
    let shared = Arc::new(SharedRules::default());
    let full = RuleSet::default();
    let empty = RuleSet::empty();

    std::thread::scope(|s| {
        let writer = {
            let shared = Arc::clone(&shared);
            let (full, empty) = (full.clone(), empty.clone());
            s.spawn(move || {
                for i in 0..200 {
                    shared.replace(if i % 2 == 0 { empty.clone() } else { full.clone() });
                }
            })
        };

        for _ in 0..4 {
            let shared = Arc::clone(&shared);
            let (full, empty) = (full.clone(), empty.clone());
            s.spawn(move || {
                for _ in 0..200 {
                    let current = shared.current();
                    assert!(*current == full || *current == empty);
                }
            });
        }

        writer.join().unwrap();
    });
}
