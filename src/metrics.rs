use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    ShotsOnTarget,
    ShotsOffTarget,
    TotalShots,
    Attacks,
    DangerousAttacks,
    Fouls,
    Offsides,
    Corners,
    YellowCards,
    RedCards,
}

impl MetricKey {
    pub const ALL: [MetricKey; 10] = [
        MetricKey::ShotsOnTarget,
        MetricKey::ShotsOffTarget,
        MetricKey::TotalShots,
        MetricKey::Attacks,
        MetricKey::DangerousAttacks,
        MetricKey::Fouls,
        MetricKey::Offsides,
        MetricKey::Corners,
        MetricKey::YellowCards,
        MetricKey::RedCards,
    ];

    /// Accepted labels, already in canonical form.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            MetricKey::ShotsOnTarget => &[
                "shots on goal",
                "shots on target",
                "sog",
                "sot",
                "shots on targ.",
                "shots on targ",
                "shots on-target",
                "on target",
                "shots_on_target",
            ],
            MetricKey::ShotsOffTarget => &[
                "shots off goal",
                "shots off target",
                "soff",
                "off target",
                "shots_off_target",
            ],
            MetricKey::TotalShots => &["total shots", "shots total", "shots", "shot attempts"],
            MetricKey::Attacks => &["attacks"],
            MetricKey::DangerousAttacks => &[
                "dangerous attacks",
                "dangerous",
                "dangerous-atks",
                "dangerous_attacks",
            ],
            MetricKey::Fouls => &["fouls"],
            MetricKey::Offsides => &["offsides", "offside"],
            MetricKey::Corners => &["corner kicks", "corners", "corner"],
            MetricKey::YellowCards => &["yellow cards", "yellow", "yellow_cards"],
            MetricKey::RedCards => &["red cards", "red", "red_cards"],
        }
    }

    /// Prefix of the flat `<prefix>_home` / `<prefix>_away` fields.
    pub fn field_prefix(self) -> &'static str {
        match self {
            MetricKey::ShotsOnTarget => "sot",
            MetricKey::ShotsOffTarget => "soff",
            MetricKey::TotalShots => "shots",
            MetricKey::Attacks => "attacks",
            MetricKey::DangerousAttacks => "dangerous",
            MetricKey::Fouls => "fouls",
            MetricKey::Offsides => "offsides",
            MetricKey::Corners => "corners",
            MetricKey::YellowCards => "yellow",
            MetricKey::RedCards => "red",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKey::ShotsOnTarget => "Shots on target",
            MetricKey::ShotsOffTarget => "Shots off target",
            MetricKey::TotalShots => "Total shots",
            MetricKey::Attacks => "Attacks",
            MetricKey::DangerousAttacks => "Dangerous attacks",
            MetricKey::Fouls => "Fouls",
            MetricKey::Offsides => "Offsides",
            MetricKey::Corners => "Corners",
            MetricKey::YellowCards => "Yellow cards",
            MetricKey::RedCards => "Red cards",
        }
    }

    pub fn matches_label(self, raw: &str) -> bool {
        self.matches_canonical(&canonicalize(raw))
    }

    fn matches_canonical(self, canonical: &str) -> bool {
        self.aliases().iter().any(|alias| *alias == canonical)
    }

    pub fn from_label(raw: &str) -> Option<MetricKey> {
        let canonical = canonicalize(raw);
        MetricKey::ALL
            .into_iter()
            .find(|metric| metric.matches_canonical(&canonical))
    }
}

/// Lowercase, collapse whitespace runs, trim, and fold en/em dashes to '-'.
pub fn canonicalize(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['\u{2013}', '\u{2014}'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_folds_case_space_and_dashes() {
        assert_eq!(canonicalize("  Shots   On\tGoal "), "shots on goal");
        assert_eq!(canonicalize("Dangerous\u{2013}Atks"), "dangerous-atks");
        assert_eq!(canonicalize("Shots on\u{2014}target"), "shots on-target");
    }

    #[test]
    fn alias_tables_are_canonical_and_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for metric in MetricKey::ALL {
            for alias in metric.aliases() {
                assert_eq!(canonicalize(alias), *alias);
                assert!(seen.insert(*alias), "{alias} claimed twice");
            }
        }
    }

    #[test]
    fn lookup_is_exact_after_canonicalization() {
        assert_eq!(MetricKey::from_label("Corner Kicks"), Some(MetricKey::Corners));
        assert_eq!(MetricKey::from_label("SoT"), Some(MetricKey::ShotsOnTarget));
        assert_eq!(MetricKey::from_label("Ball Possession"), None);
        assert!(!MetricKey::Corners.matches_label("corner kicks taken"));
    }
}
