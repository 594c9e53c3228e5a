use std::env;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::advanced_fetch::{AdvancedSource, GroupFetch, fetch_groups};
use crate::fixture::{FixtureRow, VenueRole, to_row};
use crate::form::{DEFAULT_FORM_WINDOW, FormSummary, H2hTally, compact_h2h, compute_form, h2h_at_venue};
use crate::h2h_rule::{RuleConfig, RuleInput, RuleOutput, evaluate_h2h_venue_rule};
use crate::market::MarketQuote;
use crate::scorers::{DEFAULT_SCORER_WINDOW, RosterSnapshot, ScorerRow, aggregate_scorers, with_statuses};
use crate::series::{SERIES_SLOTS, SeriesBundle, build_bundle};
use crate::suggestions::{Suggestion, merge_predictions, parse_predictions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub stats_window: usize,
    pub scorer_window: usize,
    pub rule: RuleConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stats_window: DEFAULT_FORM_WINDOW,
            scorer_window: DEFAULT_SCORER_WINDOW,
            rule: RuleConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_env() -> Self {
        Self {
            stats_window: env_usize("STATS_WINDOW", DEFAULT_FORM_WINDOW).clamp(1, SERIES_SLOTS),
            scorer_window: env_usize("SCORER_WINDOW", DEFAULT_SCORER_WINDOW).clamp(1, 20),
            rule: RuleConfig::from_env(),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// The parts of a prematch analysis document this crate reads.
#[derive(Debug, Clone, Default)]
pub struct MatchDocument {
    pub id: Option<u64>,
    pub home_team: String,
    pub away_team: String,
    pub is_live: bool,
    pub last5_home: Vec<Value>,
    pub last5_away: Vec<Value>,
    pub head_to_head: Vec<Value>,
    pub predictions: Vec<Suggestion>,
    pub market: Option<MarketQuote>,
    pub roster_home: Option<RosterSnapshot>,
    pub roster_away: Option<RosterSnapshot>,
}

impl MatchDocument {
    pub fn from_json(raw: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(raw.trim()).context("invalid match json")?;
        Self::from_value(&root)
    }

    pub fn from_value(doc: &Value) -> Result<Self> {
        let team = |key: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .with_context(|| format!("match document has no {key}"))
        };
        let list = |key: &str| {
            doc.get("stats")
                .and_then(|s| s.get(key))
                .and_then(Value::as_array)
                .or_else(|| doc.get(key).and_then(Value::as_array))
                .cloned()
                .unwrap_or_default()
        };
        let composition = doc.get("features_used").and_then(|f| f.get("composition"));
        let roster = |side: &str| {
            composition
                .and_then(|c| c.get(side))
                .and_then(RosterSnapshot::from_value)
        };

        Ok(Self {
            id: doc.get("id").and_then(Value::as_u64),
            home_team: team("home_team")?,
            away_team: team("away_team")?,
            is_live: doc.get("is_live").and_then(Value::as_bool).unwrap_or(false),
            last5_home: list("last5Home"),
            last5_away: list("last5Away"),
            head_to_head: list("headToHead"),
            predictions: parse_predictions(doc),
            market: MarketQuote::from_match_value(doc),
            roster_home: roster("home"),
            roster_away: roster("away"),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchAnalysis {
    pub home_team: String,
    pub away_team: String,
    pub recent_home: Vec<FixtureRow>,
    pub recent_away: Vec<FixtureRow>,
    pub h2h_rows: Vec<FixtureRow>,
    pub home_form_at_home: Option<FormSummary>,
    pub away_form_away: Option<FormSummary>,
    pub h2h_home_at_home: Option<FormSummary>,
    pub h2h_away_at_away: Option<FormSummary>,
    pub h2h_tally: Option<H2hTally>,
    pub series_home: SeriesBundle,
    pub series_away: SeriesBundle,
    pub series_h2h_home: SeriesBundle,
    pub series_h2h_away: SeriesBundle,
    pub scorers_home: Vec<ScorerRow>,
    pub scorers_away: Vec<ScorerRow>,
    pub market: Option<MarketQuote>,
    pub rule: RuleOutput,
    pub suggestions: Vec<Suggestion>,
    pub errors: Vec<String>,
}

/// Runs every aggregate for one match. Advanced payloads are only fetched for
/// prematch documents and only when a source is given; otherwise series and
/// scorer tables come back empty.
pub fn analyze_match(
    doc: &MatchDocument,
    source: Option<&dyn AdvancedSource>,
    cfg: &AnalysisConfig,
) -> MatchAnalysis {
    let home = doc.home_team.as_str();
    let away = doc.away_team.as_str();

    let home_form_at_home = compute_form(&doc.last5_home, home, VenueRole::Home, cfg.stats_window);
    let away_form_away = compute_form(&doc.last5_away, away, VenueRole::Away, cfg.stats_window);

    let h2h_home = h2h_at_venue(&doc.head_to_head, home, VenueRole::Home);
    let h2h_away = h2h_at_venue(&doc.head_to_head, away, VenueRole::Away);
    let h2h_home_at_home =
        compute_form(h2h_home.iter().copied(), home, VenueRole::Home, cfg.stats_window);
    let h2h_away_at_away =
        compute_form(h2h_away.iter().copied(), away, VenueRole::Away, cfg.stats_window);

    let groups: Vec<Vec<&Value>> = vec![
        doc.last5_home.iter().take(cfg.stats_window).collect(),
        doc.last5_away.iter().take(cfg.stats_window).collect(),
        h2h_home.iter().copied().take(cfg.stats_window).collect(),
        h2h_away.iter().copied().take(cfg.stats_window).collect(),
        doc.last5_home.iter().take(cfg.scorer_window).collect(),
        doc.last5_away.iter().take(cfg.scorer_window).collect(),
    ];
    let fetched = match source {
        Some(source) if !doc.is_live => fetch_groups(source, &groups),
        _ => groups
            .iter()
            .map(|g| GroupFetch {
                payloads: vec![None; g.len()],
                errors: Vec::new(),
            })
            .collect(),
    };
    let errors: Vec<String> = fetched.iter().flat_map(|g| g.errors.iter().cloned()).collect();
    let [adv_home, adv_away, adv_h2h_home, adv_h2h_away, adv_scorers_home, adv_scorers_away] =
        <[GroupFetch; 6]>::try_from(fetched).unwrap_or_else(|_| std::array::from_fn(|_| GroupFetch::default()));

    let rule = evaluate_h2h_venue_rule(
        &RuleInput {
            home_team: home,
            away_team: away,
            home_form: h2h_home_at_home.as_ref(),
            away_form: h2h_away_at_away.as_ref(),
            market: doc.market.as_ref(),
        },
        cfg.rule,
    );
    let suggestions = merge_predictions(&rule, doc.predictions.clone());

    let scorers_home = with_statuses(
        aggregate_scorers(&adv_scorers_home.payloads, home, cfg.scorer_window),
        doc.roster_home.as_ref(),
    );
    let scorers_away = with_statuses(
        aggregate_scorers(&adv_scorers_away.payloads, away, cfg.scorer_window),
        doc.roster_away.as_ref(),
    );

    tracing::info!(
        home,
        away,
        rule_triggered = rule.triggered(),
        suggestions = suggestions.len(),
        fetch_errors = errors.len(),
        "match analysed"
    );

    MatchAnalysis {
        home_team: doc.home_team.clone(),
        away_team: doc.away_team.clone(),
        recent_home: doc.last5_home.iter().take(cfg.stats_window).map(to_row).collect(),
        recent_away: doc.last5_away.iter().take(cfg.stats_window).map(to_row).collect(),
        h2h_rows: doc.head_to_head.iter().map(to_row).collect(),
        home_form_at_home,
        away_form_away,
        h2h_home_at_home,
        h2h_away_at_away,
        h2h_tally: compact_h2h(&doc.head_to_head),
        series_home: build_bundle(&adv_home.payloads, home),
        series_away: build_bundle(&adv_away.payloads, away),
        series_h2h_home: build_bundle(&adv_h2h_home.payloads, home),
        series_h2h_away: build_bundle(&adv_h2h_away.payloads, away),
        scorers_home,
        scorers_away,
        market: doc.market,
        rule,
        suggestions,
        errors,
    }
}
