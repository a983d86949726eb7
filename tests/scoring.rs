// tests/scoring.rs
use filings_screener::analyze::{default_rules, score_text, CategoryRule, RuleSet};

fn beat_rules() -> RuleSet {
    RuleSet::new(vec![CategoryRule::new("beat_expectations", ["beat", "exceed"])]).unwrap()
}

#[test]
fn eps_beat_scores_two_independent_matches() {
    let s = score_text(
        "Company X reports EPS beat, exceeded estimates",
        &beat_rules(),
        2.0,
    );
    assert_eq!(s.score, 4.0);
    assert_eq!(
        s.categories.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["beat_expectations"]
    );
    assert_eq!(s.hits["beat_expectations"], 2);
}

#[test]
fn matching_is_case_insensitive() {
    let s = score_text("EXCEEDED, BEAT", &beat_rules(), 2.0);
    assert_eq!(s.score, 4.0);
}

#[test]
fn repeated_occurrences_all_count() {
    let s = score_text("beat beat beat", &beat_rules(), 2.0);
    assert_eq!(s.score, 6.0);
}

#[test]
fn category_order_does_not_change_result() {
    let text = "Acquired stake; large order win; Warren Buffett invested; EPS beat and exceeded";
    let forward = default_rules();
    let mut reversed = default_rules();
    reversed.reverse();
    let mut rotated = default_rules();
    rotated.rotate_left(2);

    let a = score_text(text, &RuleSet::new(forward).unwrap(), 2.0);
    let b = score_text(text, &RuleSet::new(reversed).unwrap(), 2.0);
    let c = score_text(text, &RuleSet::new(rotated).unwrap(), 2.0);
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert!(a.score > 0.0);
}

#[test]
fn rescoring_is_deterministic() {
    let rules = RuleSet::new(default_rules()).unwrap();
    let text = "Promoter stake increased stake; oversold after 52 week low";
    let first = score_text(text, &rules, 2.0);
    for _ in 0..10 {
        assert_eq!(score_text(text, &rules, 2.0), first);
    }
}

#[test]
fn zero_iff_no_keyword_present() {
    let rules = RuleSet::new(default_rules()).unwrap();
    let samples = [
        "Board meeting intimation",
        "Outcome of AGM",
        "Large order received",
        "Billionaire investor buys in",
        "",
    ];
    for text in samples {
        let s = score_text(text, &rules, 2.0);
        assert!(s.score >= 0.0);
        let lower = text.to_lowercase();
        let any_kw = rules
            .rules()
            .iter()
            .flat_map(|r| r.keywords.iter())
            .any(|kw| lower.contains(kw.as_str()));
        assert_eq!(s.score == 0.0, !any_kw, "text: {text:?}");
        assert_eq!(s.categories.is_empty(), !any_kw);
    }
}

#[test]
fn weight_scales_score() {
    let s = score_text("beat", &beat_rules(), 5.0);
    assert_eq!(s.score, 5.0);
}
