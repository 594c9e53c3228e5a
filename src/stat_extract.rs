use serde_json::Value;

use crate::fixture::VenueRole;
use crate::metrics::{MetricKey, canonicalize};

/// Layouts a fixture can carry its own match stats in, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineShape {
    /// `statistics: [{type, home, away}]`
    StatisticsRows,
    /// `table: [{key, val_home, val_away}]`
    TableRows,
    /// `corners_home`, `sot_away`, ...
    FlatFields,
}

const INLINE_ORDER: [InlineShape; 3] = [
    InlineShape::StatisticsRows,
    InlineShape::TableRows,
    InlineShape::FlatFields,
];

impl InlineShape {
    fn read(self, fixture: &Value, metric: MetricKey, venue: VenueRole) -> Option<f64> {
        match self {
            InlineShape::StatisticsRows => {
                let value_keys: &[&str] = match venue {
                    VenueRole::Home => &["home", "value_home", "h"],
                    VenueRole::Away => &["away", "value_away", "a"],
                };
                scan_rows(
                    fixture.get("statistics"),
                    metric,
                    &["type", "key", "name"],
                    value_keys,
                )
            }
            InlineShape::TableRows => {
                let value_keys: &[&str] = match venue {
                    VenueRole::Home => &["val_home", "home", "h", "val"],
                    VenueRole::Away => &["val_away", "away", "a", "val"],
                };
                scan_rows(fixture.get("table"), metric, &["key", "type", "name"], value_keys)
            }
            InlineShape::FlatFields => {
                let field = format!("{}_{}", metric.field_prefix(), venue.as_str());
                fixture.get(&field).and_then(parse_number)
            }
        }
    }
}

/// Layouts of one team's row inside an advanced payload, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeamRowShape {
    /// `table: [{key, val}]`
    Table,
    /// `statistics: [{type, value}]`
    Statistics,
}

const TEAM_ROW_ORDER: [TeamRowShape; 2] = [TeamRowShape::Table, TeamRowShape::Statistics];

impl TeamRowShape {
    fn read(self, row: &Value, metric: MetricKey) -> Option<f64> {
        match self {
            TeamRowShape::Table => scan_rows(
                row.get("table"),
                metric,
                &["key", "type", "name"],
                &["val", "value", "v"],
            ),
            TeamRowShape::Statistics => scan_rows(
                row.get("statistics"),
                metric,
                &["type", "key", "name"],
                &["value", "val", "v"],
            ),
        }
    }
}

/// Value of `metric` for the side `venue` from stats embedded in the fixture itself.
pub fn read_inline_stat(fixture: &Value, metric: MetricKey, venue: VenueRole) -> Option<f64> {
    if !fixture.is_object() {
        return None;
    }
    INLINE_ORDER
        .iter()
        .find_map(|shape| shape.read(fixture, metric, venue))
}

/// Value of `metric` for `team` from an advanced payload
/// (`statistics` or `stats`: one row per team).
pub fn read_advanced_stat(advanced: &Value, team: &str, metric: MetricKey) -> Option<f64> {
    let rows = advanced
        .get("statistics")
        .filter(|v| !v.is_null())
        .or_else(|| advanced.get("stats"))?
        .as_array()?;
    let wanted = canonicalize(team);
    let row = rows
        .iter()
        .find(|row| row_team_name(row).is_some_and(|name| canonicalize(name) == wanted))?;
    TEAM_ROW_ORDER
        .iter()
        .find_map(|shape| shape.read(row, metric))
}

fn row_team_name(row: &Value) -> Option<&str> {
    let team = row.get("team")?;
    team.get("name")
        .and_then(Value::as_str)
        .or_else(|| team.as_str())
}

fn scan_rows(
    rows: Option<&Value>,
    metric: MetricKey,
    label_keys: &[&str],
    value_keys: &[&str],
) -> Option<f64> {
    let rows = rows?.as_array()?;
    rows.iter()
        .filter(|row| {
            first_present(row, label_keys)
                .and_then(Value::as_str)
                .is_some_and(|label| metric.matches_label(label))
        })
        .find_map(|row| first_present(row, value_keys).and_then(parse_number))
}

fn first_present<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| !v.is_null())
}

/// Numeric cell: plain numbers, or strings like " 12 " and "58%".
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_suffix('%').unwrap_or(s).trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}
