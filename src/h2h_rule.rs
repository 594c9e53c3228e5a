//! Head-to-head venue rule: a team that has won every recent meeting at the
//! venue it is about to play in is suggested as the 1X2 pick.

use std::env;

use serde::{Deserialize, Serialize};

use crate::fixture::VenueRole;
use crate::form::FormSummary;
use crate::market::{MarketQuote, MarketSide};

pub const DEFAULT_MIN_N: u32 = 3;

const CONFIDENCE_FLOOR: f64 = 0.60;
const CONFIDENCE_CEIL: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleConfig {
    pub min_n: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_n: DEFAULT_MIN_N,
        }
    }
}

impl RuleConfig {
    /// Non-positive thresholds fall back to the default.
    pub fn new(min_n: i64) -> Self {
        let min_n = u32::try_from(min_n)
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MIN_N);
        Self { min_n }
    }

    pub fn from_env() -> Self {
        let min_n = env::var("H2H_MIN_N")
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(i64::from(DEFAULT_MIN_N));
        Self::new(min_n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Standard,
    High,
}

impl RiskLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.80 {
            RiskLevel::Low
        } else if confidence >= 0.70 {
            RiskLevel::Standard
        } else {
            RiskLevel::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Standard => "Standard",
            RiskLevel::High => "High",
        }
    }
}

/// Everything the rule says once it fires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSignal {
    pub pick: VenueRole,
    pub confidence: f64,
    pub reason: String,
    pub suggestion_text: String,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutput {
    triggered: bool,
    #[serde(flatten)]
    signal: Option<RuleSignal>,
}

impl RuleOutput {
    pub fn not_triggered() -> Self {
        Self {
            triggered: false,
            signal: None,
        }
    }

    fn fired(signal: RuleSignal) -> Self {
        Self {
            triggered: true,
            signal: Some(signal),
        }
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    pub fn signal(&self) -> Option<&RuleSignal> {
        self.signal.as_ref()
    }

    pub fn pick(&self) -> Option<VenueRole> {
        self.signal.as_ref().map(|s| s.pick)
    }

    pub fn confidence(&self) -> Option<f64> {
        self.signal.as_ref().map(|s| s.confidence)
    }

    pub fn risk(&self) -> Option<RiskLevel> {
        self.signal.as_ref().map(|s| s.risk)
    }

    pub fn reason(&self) -> Option<&str> {
        self.signal.as_ref().map(|s| s.reason.as_str())
    }

    pub fn suggestion_text(&self) -> Option<&str> {
        self.signal.as_ref().map(|s| s.suggestion_text.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub home_team: &'a str,
    pub away_team: &'a str,
    /// Home side's form in meetings it hosted.
    pub home_form: Option<&'a FormSummary>,
    /// Away side's form in meetings it played away.
    pub away_form: Option<&'a FormSummary>,
    pub market: Option<&'a MarketQuote>,
}

pub fn evaluate_h2h_venue_rule<'a>(input: &RuleInput<'a>, cfg: RuleConfig) -> RuleOutput {
    let min_n = if cfg.min_n == 0 { DEFAULT_MIN_N } else { cfg.min_n };
    let perfect = |form: Option<&'a FormSummary>| form.filter(|f| is_perfect(f, min_n));
    let implied = |side: MarketSide| input.market.and_then(|m| m.implied(side));

    let (pick, form) = match (perfect(input.home_form), perfect(input.away_form)) {
        (None, None) => return RuleOutput::not_triggered(),
        (Some(h), None) => (VenueRole::Home, h),
        (None, Some(a)) => (VenueRole::Away, a),
        (Some(h), Some(a)) => {
            let (score_h, score_a) = (streak_score(h), streak_score(a));
            if score_a > score_h {
                (VenueRole::Away, a)
            } else if score_a == score_h
                && implied(MarketSide::Away).unwrap_or(0.0) > implied(MarketSide::Home).unwrap_or(0.0)
            {
                (VenueRole::Away, a)
            } else {
                // Full tie defaults to the home side.
                (VenueRole::Home, h)
            }
        }
    };

    let imp_pick = implied(pick.into());
    let imp_opp = implied(pick.opposite().into());
    let imp_draw = implied(MarketSide::Draw);
    let market_supports = imp_pick.is_some_and(|p| {
        imp_opp.is_none_or(|o| p > o) && p > imp_draw.unwrap_or(0.0)
    });

    let base = CONFIDENCE_FLOOR + clamp(0.05 * (f64::from(form.n) - 3.0), 0.0, 0.15);
    let market_boost = imp_pick.map_or(0.0, |p| clamp((p - 0.40) * 0.25, 0.0, 0.10));
    let margin_boost = clamp(form.goal_margin() * 0.02, 0.0, 0.05);
    let confidence = clamp(base + market_boost + margin_boost, CONFIDENCE_FLOOR, CONFIDENCE_CEIL);

    let team = match pick {
        VenueRole::Home => input.home_team,
        VenueRole::Away => input.away_team,
    };
    let signal = RuleSignal {
        pick,
        confidence,
        reason: reason_text(team, pick, form, market_supports),
        suggestion_text: suggestion_text(team, pick, form, market_supports, confidence),
        risk: RiskLevel::from_confidence(confidence),
    };
    tracing::debug!(team, pick = pick.as_str(), confidence, "h2h venue rule fired");
    RuleOutput::fired(signal)
}

/// Won every counted meeting, with at least `min_n` of them.
fn is_perfect(form: &FormSummary, min_n: u32) -> bool {
    form.n >= min_n && form.draw == 0 && form.loss == 0 && form.win == form.n
}

fn streak_score(form: &FormSummary) -> f64 {
    f64::from(form.n) + form.goal_margin() * 0.5
}

fn venue_phrase(pick: VenueRole) -> &'static str {
    match pick {
        VenueRole::Home => "at home",
        VenueRole::Away => "away",
    }
}

fn reason_text(team: &str, pick: VenueRole, form: &FormSummary, market_supports: bool) -> String {
    format!(
        "{team} won {}/{} H2H {} ({:.2} GF / {:.2} GA){}",
        form.win,
        form.n,
        venue_phrase(pick),
        form.gf_avg,
        form.ga_avg,
        if market_supports { " + market agrees." } else { "." }
    )
}

fn suggestion_text(
    team: &str,
    pick: VenueRole,
    form: &FormSummary,
    market_supports: bool,
    confidence: f64,
) -> String {
    format!(
        "H2H/Venue rule: {team} won {}/{} head-to-head meetings {} {} -> pick {} ({}%).",
        form.win,
        form.n,
        venue_phrase(pick),
        if market_supports {
            "and the 1X2 market favours them"
        } else {
            "(market neutral)"
        },
        match pick {
            VenueRole::Home => "1",
            VenueRole::Away => "2",
        },
        (confidence * 100.0).round() as u32
    )
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::OneXTwo;

    fn form(n: u32, win: u32, draw: u32, gf: f64, ga: f64) -> FormSummary {
        FormSummary {
            n,
            win,
            draw,
            loss: n - win - draw,
            gf_avg: gf,
            ga_avg: ga,
            seq: String::new(),
        }
    }

    fn input<'a>(
        home: Option<&'a FormSummary>,
        away: Option<&'a FormSummary>,
        market: Option<&'a MarketQuote>,
    ) -> RuleInput<'a> {
        RuleInput {
            home_team: "Lyon",
            away_team: "Nice",
            home_form: home,
            away_form: away,
            market,
        }
    }

    #[test]
    fn perfect_needs_min_n_and_only_wins() {
        assert!(is_perfect(&form(3, 3, 0, 1.0, 0.0), 3));
        assert!(!is_perfect(&form(2, 2, 0, 1.0, 0.0), 3));
        assert!(!is_perfect(&form(4, 3, 1, 1.0, 0.0), 3));
        assert!(!is_perfect(&form(4, 3, 0, 1.0, 0.0), 3));
    }

    #[test]
    fn forms_borrowed_from_input_pick_the_streak() {
        let forms = vec![form(3, 3, 0, 2.0, 1.0), form(5, 5, 0, 1.5, 0.5)];
        let out = evaluate_h2h_venue_rule(&input(forms.first(), forms.last(), None), RuleConfig::new(3));
        assert_eq!(out.pick(), Some(VenueRole::Away));
    }

    #[test]
    fn single_perfect_home_streak() {
        let home = form(4, 4, 0, 2.0, 0.5);
        let away = form(2, 1, 1, 1.0, 1.0);
        let out = evaluate_h2h_venue_rule(&input(Some(&home), Some(&away), None), RuleConfig::default());
        assert!(out.triggered());
        assert_eq!(out.pick(), Some(VenueRole::Home));
        let c = out.confidence().expect("confidence");
        assert!((c - 0.68).abs() < 1e-9);
        assert_eq!(out.risk(), Some(RiskLevel::High));
        assert_eq!(
            out.suggestion_text(),
            Some("H2H/Venue rule: Lyon won 4/4 head-to-head meetings at home (market neutral) -> pick 1 (68%).")
        );
        assert_eq!(out.reason(), Some("Lyon won 4/4 H2H at home (2.00 GF / 0.50 GA)."));
    }

    #[test]
    fn both_perfect_higher_score_wins() {
        let home = form(3, 3, 0, 2.0, 1.0);
        let away = form(3, 3, 0, 3.0, 1.0);
        let out = evaluate_h2h_venue_rule(&input(Some(&home), Some(&away), None), RuleConfig::default());
        assert_eq!(out.pick(), Some(VenueRole::Away));
    }

    #[test]
    fn exact_tie_goes_to_market_then_home() {
        let home = form(3, 3, 0, 2.0, 1.0);
        let away = form(3, 3, 0, 2.0, 1.0);
        let market = MarketQuote {
            odds: OneXTwo {
                home: Some(3.0),
                draw: None,
                away: Some(2.0),
            },
            ..MarketQuote::default()
        };
        let out = evaluate_h2h_venue_rule(
            &input(Some(&home), Some(&away), Some(&market)),
            RuleConfig::default(),
        );
        assert_eq!(out.pick(), Some(VenueRole::Away));

        let out = evaluate_h2h_venue_rule(&input(Some(&home), Some(&away), None), RuleConfig::default());
        assert_eq!(out.pick(), Some(VenueRole::Home));
    }

    #[test]
    fn draws_on_both_sides_do_not_fire() {
        let home = form(4, 3, 1, 2.0, 0.5);
        let away = form(5, 4, 1, 2.0, 0.5);
        let out = evaluate_h2h_venue_rule(&input(Some(&home), Some(&away), None), RuleConfig::default());
        assert!(!out.triggered());
        assert!(out.signal().is_none());
        assert_eq!(serde_json::to_string(&out).expect("json"), r#"{"triggered":false}"#);
    }

    #[test]
    fn short_streak_below_min_n_is_ignored() {
        let home = form(2, 2, 0, 3.0, 0.0);
        let out = evaluate_h2h_venue_rule(&input(Some(&home), None, None), RuleConfig::default());
        assert!(!out.triggered());
        let out = evaluate_h2h_venue_rule(&input(Some(&home), None, None), RuleConfig::new(2));
        assert!(out.triggered());
    }

    #[test]
    fn market_boost_and_cap() {
        let home = form(9, 9, 0, 4.0, 0.0);
        let market = MarketQuote {
            implied_probs: OneXTwo {
                home: Some(0.85),
                draw: Some(0.10),
                away: Some(0.05),
            },
            ..MarketQuote::default()
        };
        let out = evaluate_h2h_venue_rule(&input(Some(&home), None, Some(&market)), RuleConfig::default());
        let c = out.confidence().expect("confidence");
        assert!((c - 0.90).abs() < 1e-9);
        assert_eq!(out.risk(), Some(RiskLevel::Low));
        assert!(out.reason().is_some_and(|r| r.ends_with("+ market agrees.")));
    }

    #[test]
    fn market_against_pick_is_neutral_text() {
        let away = form(3, 3, 0, 1.0, 0.0);
        let market = MarketQuote {
            implied_probs: OneXTwo {
                home: Some(0.50),
                draw: Some(0.25),
                away: Some(0.25),
            },
            ..MarketQuote::default()
        };
        let out = evaluate_h2h_venue_rule(&input(None, Some(&away), Some(&market)), RuleConfig::default());
        assert_eq!(out.pick(), Some(VenueRole::Away));
        assert!(out.suggestion_text().is_some_and(|t| t.contains("(market neutral)")));
        let c = out.confidence().expect("confidence");
        assert!((c - 0.62).abs() < 1e-9);
    }

    #[test]
    fn non_positive_min_n_falls_back() {
        assert_eq!(RuleConfig::new(0).min_n, DEFAULT_MIN_N);
        assert_eq!(RuleConfig::new(-4).min_n, DEFAULT_MIN_N);
        assert_eq!(RuleConfig::new(5).min_n, 5);
    }
}
