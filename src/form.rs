use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fixture::{VenueRole, resolve_goals, resolve_venue, team_goals};

pub const DEFAULT_FORM_WINDOW: usize = 5;
const H2H_TALLY_WINDOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    pub n: u32,
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
    pub gf_avg: f64,
    pub ga_avg: f64,
    /// One of W/D/L per counted fixture, in input order.
    #[serde(default)]
    pub seq: String,
}

impl FormSummary {
    pub fn goal_margin(&self) -> f64 {
        self.gf_avg - self.ga_avg
    }
}

/// Form of `team` over the first `window` fixtures it played at `venue`.
///
/// Fixtures are taken in the order given. A fixture inside the window whose
/// goals cannot be read still uses up its slot but is not counted, so `n`
/// can be smaller than `window`. Returns `None` when nothing was counted.
pub fn compute_form<'a, I>(
    fixtures: I,
    team: &str,
    venue: VenueRole,
    window: usize,
) -> Option<FormSummary>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut n = 0u32;
    let (mut win, mut draw, mut loss) = (0u32, 0u32, 0u32);
    let (mut gf_sum, mut ga_sum) = (0u64, 0u64);
    let mut seq = String::new();

    let kept = fixtures
        .into_iter()
        .filter(|f| resolve_venue(f, team) == Some(venue))
        .take(window);
    for fixture in kept {
        let Some((_, gf, ga)) = team_goals(fixture, team) else {
            continue;
        };
        n += 1;
        gf_sum += u64::from(gf);
        ga_sum += u64::from(ga);
        match gf.cmp(&ga) {
            std::cmp::Ordering::Greater => {
                win += 1;
                seq.push('W');
            }
            std::cmp::Ordering::Equal => {
                draw += 1;
                seq.push('D');
            }
            std::cmp::Ordering::Less => {
                loss += 1;
                seq.push('L');
            }
        }
    }

    if n == 0 {
        return None;
    }
    Some(FormSummary {
        n,
        win,
        draw,
        loss,
        gf_avg: round2(gf_sum as f64 / f64::from(n)),
        ga_avg: round2(ga_sum as f64 / f64::from(n)),
        seq,
    })
}

/// Head-to-head fixtures in which `team` held `venue`, order preserved.
pub fn h2h_at_venue<'a>(fixtures: &'a [Value], team: &str, venue: VenueRole) -> Vec<&'a Value> {
    fixtures
        .iter()
        .filter(|f| resolve_venue(f, team) == Some(venue))
        .collect()
}

/// Result counts seen from each fixture's own home side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct H2hTally {
    pub home_win: u32,
    pub draw: u32,
    pub away_win: u32,
}

pub fn compact_h2h(fixtures: &[Value]) -> Option<H2hTally> {
    if fixtures.is_empty() {
        return None;
    }
    let mut tally = H2hTally {
        home_win: 0,
        draw: 0,
        away_win: 0,
    };
    for goals in fixtures.iter().take(H2H_TALLY_WINDOW).filter_map(resolve_goals) {
        match goals.home.cmp(&goals.away) {
            std::cmp::Ordering::Greater => tally.home_win += 1,
            std::cmp::Ordering::Equal => tally.draw += 1,
            std::cmp::Ordering::Less => tally.away_win += 1,
        }
    }
    Some(tally)
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(home: &str, away: &str, score: &str) -> Value {
        json!({"date": "2024-01-01", "homeTeam": home, "awayTeam": away, "score": score})
    }

    #[test]
    fn counts_only_the_requested_venue() {
        let list = vec![
            flat("Lyon", "Nice", "2-0"),
            flat("Nice", "Lyon", "1-1"),
            flat("Lyon", "Brest", "0-1"),
            flat("Lyon", "Lens", "3-3"),
        ];
        let form = compute_form(&list, "Lyon", VenueRole::Home, 5).expect("form");
        assert_eq!(form.n, 3);
        assert_eq!((form.win, form.draw, form.loss), (1, 1, 1));
        assert_eq!(form.seq, "WLD");
        assert_eq!(form.gf_avg, 1.67);
        assert_eq!(form.ga_avg, 1.33);
    }

    #[test]
    fn window_applies_before_unreadable_scores_are_skipped() {
        let list = vec![
            flat("Lyon", "Nice", "?"),
            flat("Lyon", "Nice", "1-0"),
            flat("Lyon", "Nice", "2-0"),
        ];
        let form = compute_form(&list, "Lyon", VenueRole::Home, 2).expect("form");
        assert_eq!(form.n, 1);
        assert_eq!(form.seq, "W");
    }

    #[test]
    fn status_text_in_score_falls_back_to_goals() {
        let list = vec![json!({"homeTeam": "Lens", "awayTeam": "Metz", "score": "FT", "goals": {"home": 2, "away": 0}})];
        let form = compute_form(&list, "Lens", VenueRole::Home, 5).expect("form");
        assert_eq!((form.n, form.win), (1, 1));
        assert_eq!(form.seq, "W");
    }

    #[test]
    fn away_perspective_swaps_goals() {
        let list = vec![json!({
            "teams": {"home": {"name": "Nice"}, "away": {"name": "Lyon"}},
            "goals": {"home": 0, "away": 2}
        })];
        let form = compute_form(&list, "Lyon", VenueRole::Away, 5).expect("form");
        assert_eq!((form.win, form.gf_avg, form.ga_avg), (1, 2.0, 0.0));
    }

    #[test]
    fn no_counted_fixture_is_absent() {
        let list = vec![flat("Nice", "Lyon", "1-0")];
        assert!(compute_form(&list, "Lyon", VenueRole::Home, 5).is_none());
        assert!(compute_form(Vec::<Value>::new().iter(), "Lyon", VenueRole::Home, 5).is_none());
    }

    #[test]
    fn compact_h2h_uses_fixture_perspective() {
        let list = vec![
            flat("Lyon", "Nice", "2-0"),
            flat("Nice", "Lyon", "2-0"),
            flat("Nice", "Lyon", "1-1"),
            flat("Nice", "Lyon", "n/a"),
        ];
        let tally = compact_h2h(&list).expect("tally");
        assert_eq!(
            tally,
            H2hTally {
                home_win: 2,
                draw: 1,
                away_win: 0
            }
        );
        assert!(compact_h2h(&[]).is_none());
    }
}
