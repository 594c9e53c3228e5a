use std::fmt::{self, Write as _};

use crate::analysis::MatchAnalysis;
use crate::form::FormSummary;
use crate::metrics::MetricKey;
use crate::scorers::{ScorerRow, ScorerStatus};
use crate::series::SeriesBundle;

pub fn render_text(a: &MatchAnalysis) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, a);
    out
}

fn write_report(out: &mut String, a: &MatchAnalysis) -> fmt::Result {
    writeln!(out, "{} vs {}", a.home_team, a.away_team)?;
    writeln!(out)?;

    writeln!(out, "Form")?;
    form_line(out, &format!("{} at home", a.home_team), a.home_form_at_home.as_ref())?;
    form_line(out, &format!("{} away", a.away_team), a.away_form_away.as_ref())?;
    form_line(out, &format!("H2H {} at home", a.home_team), a.h2h_home_at_home.as_ref())?;
    form_line(out, &format!("H2H {} away", a.away_team), a.h2h_away_at_away.as_ref())?;
    if let Some(t) = a.h2h_tally {
        writeln!(
            out,
            "  H2H overall (home side view): {}W {}D {}L",
            t.home_win, t.draw, t.away_win
        )?;
    }
    writeln!(out)?;

    for (title, bundle) in [
        ("Last matches", &a.series_home),
        ("Last matches", &a.series_away),
        ("H2H", &a.series_h2h_home),
        ("H2H", &a.series_h2h_away),
    ] {
        series_block(out, title, bundle)?;
    }

    scorer_block(out, &a.home_team, &a.scorers_home)?;
    scorer_block(out, &a.away_team, &a.scorers_away)?;

    if let Some((h, d, w)) = a.market.and_then(|m| m.no_vig()) {
        writeln!(
            out,
            "Market (no-vig): 1 {:.1}%  X {:.1}%  2 {:.1}%",
            h * 100.0,
            d * 100.0,
            w * 100.0
        )?;
        writeln!(out)?;
    }

    writeln!(out, "Suggestions")?;
    if a.suggestions.is_empty() {
        writeln!(out, "  none")?;
    }
    for s in &a.suggestions {
        writeln!(out, "  [{}] {}", s.risk, s.text)?;
    }
    if let Some(reason) = a.rule.reason() {
        writeln!(out, "  rule: {reason}")?;
    }

    if !a.errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "Fetch errors")?;
        for e in &a.errors {
            writeln!(out, "  {e}")?;
        }
    }
    Ok(())
}

fn form_line(out: &mut String, label: &str, form: Option<&FormSummary>) -> fmt::Result {
    match form {
        Some(f) => writeln!(
            out,
            "  {label:<32} {}  {}W {}D {}L  GF {:.2}  GA {:.2}  (n={})",
            f.seq, f.win, f.draw, f.loss, f.gf_avg, f.ga_avg, f.n
        ),
        None => writeln!(out, "  {label:<32} no data"),
    }
}

fn series_block(out: &mut String, title: &str, bundle: &SeriesBundle) -> fmt::Result {
    writeln!(out, "{title}: {} ({} fixtures)", bundle.team, bundle.fixtures)?;
    for metric in MetricKey::ALL {
        let Some(s) = bundle.get(metric) else { continue };
        let cells = s
            .values
            .iter()
            .map(|v| v.map_or_else(|| "-".to_string(), |v| format!("{v}")))
            .collect::<Vec<_>>()
            .join(" ");
        let avg = s.avg.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        writeln!(out, "  {:<18} {cells:<20} avg {avg} (n={})", metric.label(), s.n)?;
    }
    writeln!(out)
}

fn scorer_block(out: &mut String, team: &str, rows: &[ScorerRow]) -> fmt::Result {
    writeln!(out, "Scorers: {team}")?;
    if rows.is_empty() {
        writeln!(out, "  no goals in window")?;
    }
    for r in rows {
        writeln!(
            out,
            "  {:<24} {:>2}  {:>5.1}%  {}",
            r.player,
            r.goals,
            r.pct,
            status_label(r.status)
        )?;
    }
    writeln!(out)
}

fn status_label(status: ScorerStatus) -> &'static str {
    match status {
        ScorerStatus::StartingXI => "XI",
        ScorerStatus::Bench => "Bench",
        ScorerStatus::Absent => "Absent",
        ScorerStatus::Unknown => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisConfig, MatchDocument, analyze_match};
    use serde_json::json;

    #[test]
    fn report_lists_blocks_in_order() {
        let doc = MatchDocument {
            home_team: "Lens".to_string(),
            away_team: "Metz".to_string(),
            last5_home: vec![json!({"homeTeam": "Lens", "awayTeam": "Nice", "score": "1-0"})],
            ..MatchDocument::default()
        };
        let text = render_text(&analyze_match(&doc, None, &AnalysisConfig::default()));
        let form = text.find("Form").expect("form block");
        let scorers = text.find("Scorers: Lens").expect("scorer block");
        let suggestions = text.find("Suggestions").expect("suggestion block");
        assert!(form < scorers && scorers < suggestions);
        assert!(text.contains("Metz away"));
        assert!(text.contains("no data"));
        assert!(text.contains("  none"));
        assert!(!text.contains("Fetch errors"));
    }
}
