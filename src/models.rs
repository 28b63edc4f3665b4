use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Upstream collection addressed by the proxy `endpoint` parameter.
///
/// The selector set is closed: names outside this list are rejected at
/// the proxy boundary instead of being forwarded upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DailySleep,
    DailyReadiness,
    DailyActivity,
    Heartrate,
    PersonalInfo,
}

impl Endpoint {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "daily_sleep" => Some(Self::DailySleep),
            "daily_readiness" => Some(Self::DailyReadiness),
            "daily_activity" => Some(Self::DailyActivity),
            "heartrate" => Some(Self::Heartrate),
            "personal_info" => Some(Self::PersonalInfo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailySleep => "daily_sleep",
            Self::DailyReadiness => "daily_readiness",
            Self::DailyActivity => "daily_activity",
            Self::Heartrate => "heartrate",
            Self::PersonalInfo => "personal_info",
        }
    }
}

/// Envelope every upstream collection response uses: `{ "data": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

/// One category record for one day. Only the fields the dashboard
/// logic reads are typed; everything else passes through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DailyRecord {
    pub day: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Aggregated view of a single day: the first record per category,
/// `None` where upstream reported nothing, plus the best-effort
/// heart-rate samples (empty when the account lacks the collection).
#[derive(Debug, Clone, Serialize)]
pub struct DayBundle {
    pub date: String,
    pub sleep: Option<DailyRecord>,
    pub readiness: Option<DailyRecord>,
    pub activity: Option<DailyRecord>,
    pub hrv: Vec<Value>,
}

/// Merged per-day entry of the trend window.
#[derive(Debug, Clone, Serialize, Default)]
pub struct TrendDay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep: Option<DailyRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<DailyRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<DailyRecord>,
}

/// Day-keyed mapping over a date window. A day reported by at least
/// one category always has an entry; the BTreeMap keeps day keys in
/// calendar order.
#[derive(Debug, Clone, Serialize, Default)]
pub struct TrendBundle {
    pub days: BTreeMap<String, TrendDay>,
}

/// Plottable series aligned with the sorted day labels; gaps stay
/// `None` so the chart renders a break instead of a fake zero.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub sleep: Vec<Option<f64>>,
    pub readiness: Vec<Option<f64>>,
    pub activity: Vec<Option<f64>>,
}

/// On-disk schema of the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CredentialFile {
    pub oura_api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenStatus {
    pub has_token: bool,
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub start_date: String,
    pub end_date: String,
    pub days: BTreeMap<String, TrendDay>,
    pub series: TrendSeries,
}
