use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::h2h_rule::RuleOutput;

const DEFAULT_PREDICTION_RISK: &str = "standard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub risk: String,
}

/// Rule suggestion first when it fired, then the model predictions untouched.
pub fn merge_predictions(rule: &RuleOutput, model: Vec<Suggestion>) -> Vec<Suggestion> {
    let Some(signal) = rule.signal() else {
        return model;
    };
    let mut merged = Vec::with_capacity(model.len() + 1);
    merged.push(Suggestion {
        text: signal.suggestion_text.clone(),
        risk: signal.risk.label().to_string(),
    });
    merged.extend(model);
    merged
}

/// Model predictions from a match document's `predictions` array.
pub fn parse_predictions(doc: &Value) -> Vec<Suggestion> {
    let Some(list) = doc.get("predictions").and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .map(|p| Suggestion {
            text: p.get("text").map(value_text).unwrap_or_default(),
            risk: p
                .get("risk")
                .map(value_text)
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_PREDICTION_RISK.to_string()),
        })
        .collect()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::VenueRole;
    use crate::form::FormSummary;
    use crate::h2h_rule::{RuleConfig, RuleInput, evaluate_h2h_venue_rule};
    use serde_json::json;

    fn model() -> Vec<Suggestion> {
        vec![
            Suggestion {
                text: "Over 2.5".to_string(),
                risk: "standard".to_string(),
            },
            Suggestion {
                text: "BTTS".to_string(),
                risk: "high".to_string(),
            },
        ]
    }

    #[test]
    fn quiet_rule_keeps_model_list() {
        let merged = merge_predictions(&RuleOutput::not_triggered(), model());
        assert_eq!(merged, model());
    }

    #[test]
    fn fired_rule_goes_first() {
        let form = FormSummary {
            n: 5,
            win: 5,
            draw: 0,
            loss: 0,
            gf_avg: 2.4,
            ga_avg: 0.4,
            seq: "WWWWW".to_string(),
        };
        let rule = evaluate_h2h_venue_rule(
            &RuleInput {
                home_team: "Lens",
                away_team: "Metz",
                home_form: None,
                away_form: Some(&form),
                market: None,
            },
            RuleConfig::default(),
        );
        assert_eq!(rule.pick(), Some(VenueRole::Away));
        let merged = merge_predictions(&rule, model());
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].risk, "Standard");
        assert!(merged[0].text.contains("Metz"));
        assert_eq!(&merged[1..], model().as_slice());
    }

    #[test]
    fn parse_predictions_defaults_risk() {
        let doc = json!({"predictions": [{"text": "1X"}, {"text": "Under 3.5", "risk": "faible"}]});
        let parsed = parse_predictions(&doc);
        assert_eq!(parsed[0].risk, "standard");
        assert_eq!(parsed[1].risk, "faible");
        assert!(parse_predictions(&json!({})).is_empty());
    }
}
