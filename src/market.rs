use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fixture::VenueRole;
use crate::stat_extract::parse_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSide {
    Home,
    Draw,
    Away,
}

impl From<VenueRole> for MarketSide {
    fn from(venue: VenueRole) -> Self {
        match venue {
            VenueRole::Home => MarketSide::Home,
            VenueRole::Away => MarketSide::Away,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OneXTwo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away: Option<f64>,
}

impl OneXTwo {
    pub fn get(&self, side: MarketSide) -> Option<f64> {
        match side {
            MarketSide::Home => self.home,
            MarketSide::Draw => self.draw,
            MarketSide::Away => self.away,
        }
    }

    fn from_value(value: Option<&Value>, keys: [&[&str]; 3]) -> Self {
        let read = |keys: &[&str]| {
            let v = value?;
            keys.iter().find_map(|k| v.get(*k).and_then(parse_number))
        };
        Self {
            home: read(keys[0]),
            draw: read(keys[1]),
            away: read(keys[2]),
        }
    }

    fn is_empty(&self) -> bool {
        self.home.is_none() && self.draw.is_none() && self.away.is_none()
    }
}

/// 1X2 decimal odds and/or implied probabilities (0..1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    #[serde(default)]
    pub odds: OneXTwo,
    #[serde(default)]
    pub implied_probs: OneXTwo,
}

impl MarketQuote {
    /// Implied probability for `side`: the quoted one, else `1/odds`.
    pub fn implied(&self, side: MarketSide) -> Option<f64> {
        self.implied_probs
            .get(side)
            .or_else(|| self.odds.get(side).filter(|o| *o > 0.0).map(|o| 1.0 / o))
    }

    /// Overround-free probabilities (home, draw, away); needs all three odds above 1.0.
    pub fn no_vig(&self) -> Option<(f64, f64, f64)> {
        let (home, draw, away) = (self.odds.home?, self.odds.draw?, self.odds.away?);
        if home <= 1.0 || draw <= 1.0 || away <= 1.0 {
            return None;
        }
        let (ih, id, ia) = (1.0 / home, 1.0 / draw, 1.0 / away);
        let sum = ih + id + ia;
        Some((ih / sum, id / sum, ia / sum))
    }

    /// Market block of a match document: `market_used`, then
    /// `features_used.market`, then bare `odds_1x2_1X2` keyed "1"/"X"/"2".
    pub fn from_match_value(doc: &Value) -> Option<Self> {
        let block = doc
            .get("market_used")
            .filter(|v| v.is_object())
            .or_else(|| {
                doc.get("features_used")
                    .and_then(|f| f.get("market"))
                    .filter(|v| v.is_object())
            });
        let mut quote = Self {
            odds: OneXTwo::from_value(
                block.and_then(|b| b.get("odds")),
                [&["home"], &["draw"], &["away"]],
            ),
            implied_probs: OneXTwo::from_value(
                block.and_then(|b| b.get("implied_probs")),
                [&["home"], &["draw"], &["away"]],
            ),
        };
        if quote.odds.is_empty() {
            quote.odds = OneXTwo::from_value(doc.get("odds_1x2_1X2"), [&["1"], &["X", "x"], &["2"]]);
        }
        (!quote.is_empty()).then_some(quote)
    }

    pub fn is_empty(&self) -> bool {
        self.odds.is_empty() && self.implied_probs.is_empty()
    }
}
