// tests/rank.rs
use filings_screener::analyze::KeywordScore;
use filings_screener::ingest::types::{Exchange, Filing};
use filings_screener::rank::{rank, ScoreResult};

fn scored(symbol: &str, score: f64) -> ScoreResult {
    ScoreResult::new(
        Filing {
            symbol: symbol.to_string(),
            headline: format!("{symbol} headline"),
            text: String::new(),
            date: None,
            source: Exchange::Bse,
        },
        KeywordScore {
            score,
            ..Default::default()
        },
    )
}

#[test]
fn threshold_two_keeps_only_the_four() {
    let picks = rank(vec![scored("HI", 4.0), scored("LO", 1.0)], 2.0, None);
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].symbol, "HI");
    assert_eq!(picks[0].score, 4.0);
    assert_eq!(picks[0].headline, "HI headline");
}

#[test]
fn output_is_non_increasing_and_stable() {
    let scores = [3.0, 7.0, 3.0, 9.0, 7.0, 5.0, 3.0, 0.0, 9.0];
    let input: Vec<_> = scores
        .iter()
        .enumerate()
        .map(|(i, s)| scored(&format!("S{i}"), *s))
        .collect();

    let picks = rank(input.clone(), 1.0, None);
    assert_eq!(picks.len(), 8);
    for w in picks.windows(2) {
        assert!(w[0].score >= w[1].score);
        if w[0].score == w[1].score {
            let a: usize = w[0].symbol[1..].parse().unwrap();
            let b: usize = w[1].symbol[1..].parse().unwrap();
            assert!(a < b, "tie order broken: {} before {}", w[0].symbol, w[1].symbol);
        }
    }

    // pure: same input, same output
    assert_eq!(rank(input, 1.0, None), picks);
}

#[test]
fn cap_applies_after_sorting() {
    let picks = rank(
        vec![scored("A", 3.0), scored("B", 8.0), scored("C", 6.0), scored("D", 8.0)],
        2.0,
        Some(3),
    );
    let syms: Vec<_> = picks.iter().map(|p| p.symbol.as_str()).collect();
    assert_eq!(syms, vec!["B", "D", "C"]);
}
