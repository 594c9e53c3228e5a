use std::fs;
use std::path::PathBuf;

use h2h_signals::form::FormSummary;
use h2h_signals::h2h_rule::{RuleConfig, RuleInput, evaluate_h2h_venue_rule};
use h2h_signals::market::MarketQuote;

#[derive(Debug, serde::Deserialize)]
struct RuleCase {
    home_team: String,
    away_team: String,
    #[serde(default)]
    home_form: Option<FormSummary>,
    #[serde(default)]
    away_form: Option<FormSummary>,
    #[serde(default)]
    market: Option<MarketQuote>,
    #[serde(default)]
    min_n: Option<i64>,
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/rule_case.json"));

    let raw = fs::read_to_string(&path)?;
    let case: RuleCase = serde_json::from_str(&raw)?;

    // Replays one rule evaluation offline, for tuning the thresholds by hand.
    let cfg = case.min_n.map(RuleConfig::new).unwrap_or_else(RuleConfig::from_env);
    let out = evaluate_h2h_venue_rule(
        &RuleInput {
            home_team: &case.home_team,
            away_team: &case.away_team,
            home_form: case.home_form.as_ref(),
            away_form: case.away_form.as_ref(),
            market: case.market.as_ref(),
        },
        cfg,
    );

    println!("Triggered: {}", out.triggered());
    if let Some(signal) = out.signal() {
        println!("Pick: {}", signal.pick.as_str());
        println!("Confidence: {:.2}", signal.confidence);
        println!("Risk: {}", signal.risk.label());
        println!("Reason: {}", signal.reason);
        println!("Suggestion: {}", signal.suggestion_text);
    }

    Ok(())
}
