use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "/apps/campaign-api";
pub const DEFAULT_REFRESH_SECONDS: u64 = 30;

// Opaque product identifier. Hosts hand these out as strings or numbers,
// both are kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Number(number) => Self(number.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub product_id: ProductId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Vote {
    pub fn new(product_id: ProductId) -> Self {
        // Stored as epoch millis, so keep nothing finer.
        Self {
            product_id,
            timestamp: Utc::now().trunc_subsecs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    pub product_id: ProductId,
    pub vote_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteLimit {
    Unlimited,
    AtMost(u32),
}

impl VoteLimit {
    // Hosts configure the limit as an integer where `-1` means unlimited.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(Self::Unlimited),
            n if n >= 0 => Some(Self::AtMost(u32::try_from(n).unwrap_or(u32::MAX))),
            _ => None,
        }
    }

    // Whether another vote fits after `cast` votes.
    pub fn allows(&self, cast: usize) -> bool {
        match self {
            Self::Unlimited => true,
            Self::AtMost(n) => cast < *n as usize,
        }
    }

    pub fn cap(&self) -> Option<usize> {
        match self {
            Self::Unlimited => None,
            Self::AtMost(n) => Some(*n as usize),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlags {
    pub real_time_updates: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            real_time_updates: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfiguration {
    pub voting_enabled: bool,
    pub max_votes_per_user: VoteLimit,
    pub api_base_endpoint: String,
    pub customer_id: Option<String>,
    pub show_results: bool,
    pub dev_mode: bool,
    pub features: FeatureFlags,
    pub refresh_interval: Duration,
}

impl Default for EngineConfiguration {
    fn default() -> Self {
        Self {
            voting_enabled: true,
            max_votes_per_user: VoteLimit::AtMost(1),
            api_base_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            customer_id: None,
            show_results: true,
            dev_mode: false,
            features: FeatureFlags::default(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECONDS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineState {
    pub loading: bool,
    pub last_error: Option<String>,
    pub votes: Vec<Vote>,
    pub results: Vec<VoteResult>,
}

impl EngineState {
    pub fn seeded(votes: Vec<Vote>) -> Self {
        Self {
            votes,
            ..Self::default()
        }
    }

    pub fn vote_count_for(&self, product_id: &ProductId) -> Option<u64> {
        self.results
            .iter()
            .find(|result| &result.product_id == product_id)
            .map(|result| result.vote_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
}
