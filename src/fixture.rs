use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueRole {
    Home,
    Away,
}

impl VenueRole {
    pub fn opposite(self) -> Self {
        match self {
            VenueRole::Home => VenueRole::Away,
            VenueRole::Away => VenueRole::Home,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VenueRole::Home => "home",
            VenueRole::Away => "away",
        }
    }
}

/// The two fixture layouts the upstream API is known to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureShape {
    /// `{date, homeTeam, awayTeam, score}` as produced by the analysis endpoint.
    Flat,
    /// API-Football style: `teams.home.name`, `fixture.id`, `score.fulltime`.
    Raw,
}

pub fn detect_shape(fixture: &Value) -> Option<FixtureShape> {
    if !fixture.is_object() {
        return None;
    }
    if fixture.get("homeTeam").is_some_and(is_present) || fixture.get("awayTeam").is_some_and(is_present) {
        return Some(FixtureShape::Flat);
    }
    if ["teams", "team", "fixture"]
        .iter()
        .any(|k| fixture.get(*k).is_some_and(Value::is_object))
    {
        return Some(FixtureShape::Raw);
    }
    None
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamNames {
    pub home: Option<String>,
    pub away: Option<String>,
}

pub fn resolve_teams(fixture: &Value) -> TeamNames {
    match detect_shape(fixture) {
        Some(FixtureShape::Flat) => TeamNames {
            home: fixture.get("homeTeam").and_then(text),
            away: fixture.get("awayTeam").and_then(text),
        },
        Some(FixtureShape::Raw) => TeamNames {
            home: nested_team_name(fixture, "home"),
            away: nested_team_name(fixture, "away"),
        },
        None => TeamNames::default(),
    }
}

/// Venue `team` held in `fixture`, or `None` when either name is missing or
/// the team did not play in it.
pub fn resolve_venue(fixture: &Value, team: &str) -> Option<VenueRole> {
    let TeamNames { home, away } = resolve_teams(fixture);
    let (home, away) = (home?, away?);
    let team = team.trim();
    if home == team {
        Some(VenueRole::Home)
    } else if away == team {
        Some(VenueRole::Away)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureGoals {
    pub home: u32,
    pub away: u32,
}

impl FixtureGoals {
    pub fn for_venue(self, venue: VenueRole) -> (u32, u32) {
        match venue {
            VenueRole::Home => (self.home, self.away),
            VenueRole::Away => (self.away, self.home),
        }
    }
}

/// Final goals from the first score layout that parses: "H-A" string,
/// `score.fulltime`, `score.halftime`, `goals`, then a bare `score` object.
pub fn resolve_goals(fixture: &Value) -> Option<FixtureGoals> {
    let score = fixture.get("score");
    score
        .and_then(Value::as_str)
        .and_then(parse_score_string)
        .or_else(|| score.and_then(|s| s.get("fulltime")).and_then(goals_pair))
        .or_else(|| score.and_then(|s| s.get("halftime")).and_then(goals_pair))
        .or_else(|| fixture.get("goals").and_then(goals_pair))
        .or_else(|| score.and_then(goals_pair))
}

fn parse_score_string(raw: &str) -> Option<FixtureGoals> {
    let (h, a) = raw.trim().split_once('-')?;
    let (h, a) = (h.trim(), a.trim());
    if h.is_empty() || a.is_empty() || !h.bytes().chain(a.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(FixtureGoals {
        home: h.parse().ok()?,
        away: a.parse().ok()?,
    })
}

fn goals_pair(value: &Value) -> Option<FixtureGoals> {
    let home = ["home", "Home", "h", "H"]
        .iter()
        .find_map(|k| value.get(*k).and_then(goal_count))?;
    let away = ["away", "Away", "a", "A"]
        .iter()
        .find_map(|k| value.get(*k).and_then(goal_count))?;
    Some(FixtureGoals { home, away })
}

fn goal_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).ok();
            }
            let f = n.as_f64()?;
            (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then_some(f as u32)
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Goals for and against `team`, plus the venue it held.
pub fn team_goals(fixture: &Value, team: &str) -> Option<(VenueRole, u32, u32)> {
    let venue = resolve_venue(fixture, team)?;
    let (gf, ga) = resolve_goals(fixture)?.for_venue(venue);
    Some((venue, gf, ga))
}

pub fn fixture_id_of(fixture: &Value) -> Option<u64> {
    let candidates = [
        fixture.get("fixture").and_then(|f| f.get("id")),
        fixture.get("fixtureId"),
        fixture.get("id"),
        fixture.get("match_id"),
        fixture.get("fixture_id"),
        fixture.get("game_id"),
    ];
    candidates.into_iter().flatten().find_map(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

pub fn fmt_score(score: Option<&Value>) -> String {
    let Some(score) = score else {
        return "-".to_string();
    };
    if let Some(s) = score.as_str() {
        return s.to_string();
    }
    for period in ["fulltime", "halftime"] {
        let Some(p) = score.get(period) else { continue };
        let h = p.get("home").and_then(goal_count);
        let a = p.get("away").and_then(goal_count);
        if h.is_some() || a.is_some() {
            return format!("{}-{}", h.unwrap_or(0), a.unwrap_or(0));
        }
    }
    "-".to_string()
}

/// Display row for fixture tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRow {
    pub fixture_id: Option<u64>,
    pub date: String,
    pub home: String,
    pub away: String,
    pub score: String,
}

pub fn to_row(fixture: &Value) -> FixtureRow {
    let TeamNames { home, away } = resolve_teams(fixture);
    let date = match detect_shape(fixture) {
        Some(FixtureShape::Flat) => fixture.get("date").and_then(text).unwrap_or_default(),
        _ => fixture
            .get("fixture")
            .and_then(|f| f.get("date"))
            .and_then(text)
            .map(|d| normalize_kickoff(&d))
            .unwrap_or_default(),
    };
    FixtureRow {
        fixture_id: fixture_id_of(fixture),
        date,
        home: home.unwrap_or_else(|| "Team A".to_string()),
        away: away.unwrap_or_else(|| "Team B".to_string()),
        score: fmt_score(fixture.get("score")),
    }
}

fn normalize_kickoff(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.replacen('T', " ", 1).chars().take(16).collect()
}

fn nested_team_name(fixture: &Value, side: &str) -> Option<String> {
    ["teams", "team"].iter().find_map(|root| {
        fixture
            .get(*root)
            .and_then(|t| t.get(side))
            .and_then(|t| t.get("name"))
            .and_then(text)
    })
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_present(value: &Value) -> bool {
    text(value).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_shape_wins_over_nested() {
        let f = json!({
            "date": "2024-08-17",
            "homeTeam": "Lyon",
            "awayTeam": "Nice",
            "teams": {"home": {"name": "Other"}, "away": {"name": "Else"}},
            "score": "2-1"
        });
        assert_eq!(detect_shape(&f), Some(FixtureShape::Flat));
        assert_eq!(resolve_venue(&f, "Nice"), Some(VenueRole::Away));
        assert_eq!(resolve_venue(&f, "Other"), None);
    }

    #[test]
    fn raw_shape_falls_back_to_secondary_alias() {
        let f = json!({
            "fixture": {"id": 77, "date": "2024-03-02T20:00:00+00:00"},
            "team": {"home": {"name": "Lens"}, "away": {"name": "Metz"}},
            "score": {"fulltime": {"home": 0, "away": 3}}
        });
        assert_eq!(resolve_venue(&f, "Lens"), Some(VenueRole::Home));
        assert_eq!(team_goals(&f, "Metz"), Some((VenueRole::Away, 3, 0)));
        let row = to_row(&f);
        assert_eq!(row.fixture_id, Some(77));
        assert_eq!(row.date, "2024-03-02 20:00");
        assert_eq!(row.score, "0-3");
    }

    #[test]
    fn unresolved_names_give_no_venue() {
        let f = json!({"teams": {"home": {"name": "Lens"}}});
        assert_eq!(resolve_venue(&f, "Lens"), None);
        assert_eq!(resolve_venue(&json!(null), "Lens"), None);
    }

    #[test]
    fn goals_priority_prefers_score_string() {
        let f = json!({"homeTeam": "A", "awayTeam": "B", "score": " 3 - 2 ", "goals": {"home": 0, "away": 0}});
        assert_eq!(resolve_goals(&f), Some(FixtureGoals { home: 3, away: 2 }));
    }

    #[test]
    fn goals_fall_through_null_fulltime() {
        let f = json!({
            "score": {"fulltime": {"home": null, "away": null}, "halftime": {"home": null, "away": null}},
            "goals": {"home": "1", "away": 1}
        });
        assert_eq!(resolve_goals(&f), Some(FixtureGoals { home: 1, away: 1 }));
    }

    #[test]
    fn malformed_score_string_is_absent() {
        let f = json!({"homeTeam": "A", "awayTeam": "B", "score": "postponed"});
        assert_eq!(resolve_goals(&f), None);
        let f = json!({"homeTeam": "A", "awayTeam": "B", "score": "-1-2"});
        assert_eq!(resolve_goals(&f), None);
    }

    #[test]
    fn unreadable_score_string_falls_through_to_goals() {
        let f = json!({"homeTeam": "Lens", "awayTeam": "Metz", "score": "FT", "goals": {"home": 2, "away": 0}});
        assert_eq!(resolve_goals(&f), Some(FixtureGoals { home: 2, away: 0 }));
        assert_eq!(team_goals(&f, "Lens"), Some((VenueRole::Home, 2, 0)));
    }

    #[test]
    fn fixture_id_accepts_numeric_strings() {
        assert_eq!(fixture_id_of(&json!({"match_id": "1234"})), Some(1234));
        assert_eq!(fixture_id_of(&json!({"name": "x"})), None);
    }

    #[test]
    fn fmt_score_defaults_missing_side_to_zero() {
        assert_eq!(fmt_score(Some(&json!({"halftime": {"home": 1}}))), "1-0");
        assert_eq!(fmt_score(Some(&json!({}))), "-");
        assert_eq!(fmt_score(None), "-");
    }
}
