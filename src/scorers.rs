use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_SCORER_WINDOW: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScorerStatus {
    #[serde(rename = "XI")]
    StartingXI,
    Bench,
    Absent,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerRow {
    pub player: String,
    pub goals: u32,
    /// Share of the team's goals in the window, 0..100.
    pub pct: f64,
    pub status: ScorerStatus,
}

/// Current squad availability for one team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub xi: Vec<String>,
    pub bench: Vec<String>,
    pub out: Vec<String>,
}

impl RosterSnapshot {
    /// Reads `xi`/`startXI`, `bench`/`substitutes` and `out`; entries are
    /// `{name}` or `{player: {name}}`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            xi: player_names(value, &["xi", "startXI"]),
            bench: player_names(value, &["bench", "substitutes"]),
            out: player_names(value, &["out"]),
        })
    }

    pub fn status_of(&self, player: &str) -> ScorerStatus {
        let listed = |names: &[String]| names.iter().any(|n| n == player);
        if listed(&self.xi) {
            ScorerStatus::StartingXI
        } else if listed(&self.bench) {
            ScorerStatus::Bench
        } else if listed(&self.out) {
            ScorerStatus::Absent
        } else {
            ScorerStatus::Unknown
        }
    }
}

fn player_names(value: &Value, keys: &[&str]) -> Vec<String> {
    let Some(list) = keys
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_array))
    else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|p| {
            p.get("player")
                .and_then(|inner| inner.get("name"))
                .or_else(|| p.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect()
}

/// Goals per player for `team` across the first `window` advanced payloads.
///
/// Own goals are dropped from both the player tally and the team total.
/// Missing payloads are skipped. Rows come back sorted by goals (ties keep
/// first-scored order) with `status` set to `Unknown`.
pub fn aggregate_scorers(payloads: &[Option<Value>], team: &str, window: usize) -> Vec<ScorerRow> {
    let mut order: Vec<(String, u32)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut total = 0u32;

    for adv in payloads.iter().take(window).flatten() {
        for event in goal_events(adv) {
            if !event_team(event).is_some_and(|t| same_team(t, team)) {
                continue;
            }
            if is_own_goal(event) {
                continue;
            }
            let Some(player) = event_player(event) else {
                continue;
            };
            match index.get(player).copied() {
                Some(i) => order[i].1 += 1,
                None => {
                    index.insert(player.to_string(), order.len());
                    order.push((player.to_string(), 1));
                }
            }
            total += 1;
        }
    }

    if total == 0 {
        return Vec::new();
    }
    let mut rows: Vec<ScorerRow> = order
        .into_iter()
        .map(|(player, goals)| ScorerRow {
            player,
            goals,
            pct: f64::from(goals) * 100.0 / f64::from(total),
            status: ScorerStatus::Unknown,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.goals
            .cmp(&a.goals)
            .then_with(|| b.pct.total_cmp(&a.pct))
    });
    rows
}

pub fn with_statuses(rows: Vec<ScorerRow>, roster: Option<&RosterSnapshot>) -> Vec<ScorerRow> {
    rows.into_iter()
        .map(|row| ScorerRow {
            status: roster.map_or(ScorerStatus::Unknown, |r| r.status_of(&row.player)),
            ..row
        })
        .collect()
}

fn goal_events(adv: &Value) -> &[Value] {
    adv.get("events")
        .and_then(|e| e.get("goals"))
        .and_then(Value::as_array)
        .or_else(|| adv.get("goals").and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn event_team(event: &Value) -> Option<&str> {
    let team = event.get("team")?;
    team.as_str()
        .or_else(|| team.get("name").and_then(Value::as_str))
}

fn event_player(event: &Value) -> Option<&str> {
    let player = event.get("player")?;
    player
        .as_str()
        .or_else(|| player.get("name").and_then(Value::as_str))
        .filter(|p| !p.is_empty())
}

fn is_own_goal(event: &Value) -> bool {
    event
        .get("detail")
        .and_then(Value::as_str)
        .is_some_and(|d| d.to_lowercase().contains("own goal"))
}

fn same_team(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
