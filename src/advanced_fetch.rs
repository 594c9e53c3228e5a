use std::collections::{BTreeSet, HashMap};
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::fixture::fixture_id_of;
use crate::http_client::http_client;

/// Anything that can hand back the advanced payload (goal events, per-team
/// stat rows) of one fixture.
pub trait AdvancedSource: Send + Sync {
    fn fetch_advanced(&self, fixture_id: u64) -> Result<Value>;
}

/// `GET {base_url}/{fixture_id}/advanced/`
pub struct HttpAdvancedSource {
    base_url: String,
}

impl HttpAdvancedSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Option<Self> {
        env::var("ADVANCED_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self::new(&v))
    }
}

impl AdvancedSource for HttpAdvancedSource {
    fn fetch_advanced(&self, fixture_id: u64) -> Result<Value> {
        let client = http_client()?;
        let url = format!("{}/{fixture_id}/advanced/", self.base_url);
        let resp = client
            .get(&url)
            .header(USER_AGENT, "Mozilla/5.0")
            .send()
            .context("advanced request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("http {status} for fixture {fixture_id}"));
        }
        parse_advanced_json(&body)
    }
}

/// Payloads already on disk or in memory, keyed by fixture id.
#[derive(Debug, Clone, Default)]
pub struct StaticAdvancedSource {
    payloads: HashMap<u64, Value>,
}

impl StaticAdvancedSource {
    pub fn new(payloads: HashMap<u64, Value>) -> Self {
        Self { payloads }
    }

    /// JSON object whose keys are fixture ids.
    pub fn from_json(raw: &str) -> Result<Self> {
        let root = parse_advanced_json(raw)?;
        let mut payloads = HashMap::new();
        if let Some(map) = root.as_object() {
            for (key, payload) in map {
                let Ok(id) = key.trim().parse::<u64>() else {
                    continue;
                };
                payloads.insert(id, payload.clone());
            }
        }
        Ok(Self { payloads })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read advanced payloads {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

impl AdvancedSource for StaticAdvancedSource {
    fn fetch_advanced(&self, fixture_id: u64) -> Result<Value> {
        self.payloads
            .get(&fixture_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no advanced payload for fixture {fixture_id}"))
    }
}

pub fn parse_advanced_json(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).context("invalid advanced json")
}

/// Advanced payloads for one fixture list, one slot per fixture that has an id.
#[derive(Debug, Clone, Default)]
pub struct GroupFetch {
    pub payloads: Vec<Option<Value>>,
    pub errors: Vec<String>,
}

/// Fetches every group's payloads. Ids shared between groups are fetched
/// once; all distinct ids are requested in parallel. A failed or missing id
/// becomes `None` in every slot that refers to it. Fixtures without an id get
/// no slot, so later payloads move up.
pub fn fetch_groups(source: &dyn AdvancedSource, groups: &[Vec<&Value>]) -> Vec<GroupFetch> {
    let ids: Vec<u64> = groups
        .iter()
        .flatten()
        .filter_map(|f| fixture_id_of(f))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    tracing::debug!(groups = groups.len(), fixtures = ids.len(), "fetching advanced payloads");

    let fetched: HashMap<u64, Result<Value, String>> = with_fetch_pool(|| {
        ids.par_iter()
            .map(|id| {
                let res = source
                    .fetch_advanced(*id)
                    .map_err(|err| format!("fixture {id} advanced fetch failed: {err:#}"));
                (*id, res)
            })
            .collect()
    });

    let mut reported: BTreeSet<u64> = BTreeSet::new();
    groups
        .iter()
        .map(|group| {
            let mut out = GroupFetch::default();
            for fixture in group {
                let Some(id) = fixture_id_of(fixture) else {
                    continue;
                };
                match fetched.get(&id) {
                    Some(Ok(payload)) if !payload.is_null() => out.payloads.push(Some(payload.clone())),
                    Some(Err(err)) => {
                        if reported.insert(id) {
                            tracing::warn!("{err}");
                            out.errors.push(err.clone());
                        }
                        out.payloads.push(None);
                    }
                    _ => out.payloads.push(None),
                }
            }
            out
        })
        .collect()
}

fn with_fetch_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let threads = fetch_parallelism();
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

pub fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(2, 32)
}
