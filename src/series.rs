use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::round2;
use crate::metrics::MetricKey;
use crate::stat_extract::read_advanced_stat;

pub const SERIES_SLOTS: usize = 5;

/// Per-match values M1..M5 for one metric, right-padded with `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub values: [Option<f64>; SERIES_SLOTS],
    pub avg: Option<f64>,
    pub n: u32,
}

impl MetricSeries {
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut values = [None; SERIES_SLOTS];
        for (slot, sample) in values.iter_mut().zip(samples) {
            *slot = sample;
        }
        let known: Vec<f64> = values.iter().flatten().copied().collect();
        let n = known.len() as u32;
        let avg = (n > 0).then(|| round2(known.iter().sum::<f64>() / f64::from(n)));
        Self { values, avg, n }
    }

    pub fn empty() -> Self {
        Self::from_samples(std::iter::empty())
    }
}

/// One `metric` sample per advanced payload, in order. A missing payload is a
/// missing sample.
pub fn build_series(payloads: &[Option<Value>], team: &str, metric: MetricKey) -> MetricSeries {
    MetricSeries::from_samples(payloads.iter().map(|adv| {
        adv.as_ref()
            .and_then(|adv| read_advanced_stat(adv, team, metric))
    }))
}

/// All ten metric series for one (team, window) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBundle {
    pub team: String,
    pub fixtures: usize,
    pub series: BTreeMap<MetricKey, MetricSeries>,
}

impl SeriesBundle {
    pub fn get(&self, metric: MetricKey) -> Option<&MetricSeries> {
        self.series.get(&metric)
    }
}

pub fn build_bundle(payloads: &[Option<Value>], team: &str) -> SeriesBundle {
    let window = &payloads[..payloads.len().min(SERIES_SLOTS)];
    let series = MetricKey::ALL
        .into_iter()
        .map(|metric| (metric, build_series(window, team, metric)))
        .collect();
    SeriesBundle {
        team: team.to_string(),
        fixtures: window.len(),
        series,
    }
}
