use crate::aggregate;
use crate::models::{Collection, DailyRecord, DayBundle, Endpoint, TrendBundle};
use crate::proxy::TOKEN_HEADER;
use crate::storage::{CredentialStore, StorageError};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::warn;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a dashboard fetch failed. One variant per taxonomy entry so the
/// presentation layer can render a specific message.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no API token available")]
    MissingToken,
    #[error("invalid API token")]
    InvalidToken,
    #[error("API rate limit exceeded")]
    RateLimited,
    #[error("unable to reach proxy: {0}")]
    Unreachable(String),
    #[error("request timed out")]
    Timeout,
    #[error("request cancelled")]
    Cancelled,
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("upstream request failed: HTTP {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("credential store error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// Data categories the dashboard fetches through the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Sleep,
    Readiness,
    Activity,
    HeartRate,
    PersonalInfo,
}

impl Category {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Sleep => Endpoint::DailySleep,
            Self::Readiness => Endpoint::DailyReadiness,
            Self::Activity => Endpoint::DailyActivity,
            Self::HeartRate => Endpoint::Heartrate,
            Self::PersonalInfo => Endpoint::PersonalInfo,
        }
    }
}

/// What a category failure does to the call that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Propagate the failure to the caller unchanged.
    FailFast,
    /// Swallow the failure and resolve to an empty result.
    BestEffort,
}

/// Per-category failure policy. Heart rate defaults to best-effort:
/// the collection does not exist for every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicies {
    pub sleep: FetchPolicy,
    pub readiness: FetchPolicy,
    pub activity: FetchPolicy,
    pub heart_rate: FetchPolicy,
    pub personal_info: FetchPolicy,
}

impl Default for FetchPolicies {
    fn default() -> Self {
        Self {
            sleep: FetchPolicy::FailFast,
            readiness: FetchPolicy::FailFast,
            activity: FetchPolicy::FailFast,
            heart_rate: FetchPolicy::BestEffort,
            personal_info: FetchPolicy::FailFast,
        }
    }
}

impl FetchPolicies {
    pub fn for_category(&self, category: Category) -> FetchPolicy {
        match category {
            Category::Sleep => self.sleep,
            Category::Readiness => self.readiness,
            Category::Activity => self.activity,
            Category::HeartRate => self.heart_rate,
            Category::PersonalInfo => self.personal_info,
        }
    }
}

/// One-shot cancellation signal for in-flight bundle fetches. Tokens
/// are cheap to clone; firing the handle wakes every listener.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the handle fires; never resolves if the handle
    /// was dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Connection settings for the dashboard client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub proxy_base: String,
    pub call_timeout: Duration,
}

impl ClientConfig {
    pub fn new(proxy_base: impl Into<String>) -> Self {
        Self {
            proxy_base: proxy_base.into(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Client for the same-origin forwarding proxy. Owns no global state;
/// construct one and hand it to whatever controller needs it.
#[derive(Clone)]
pub struct OuraClient {
    config: ClientConfig,
    http: reqwest::Client,
    store: CredentialStore,
    policies: FetchPolicies,
}

impl OuraClient {
    pub fn new(config: ClientConfig, store: CredentialStore) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(crate::proxy::USER_AGENT)
            .build()
            .map_err(ClientError::from_transport)?;
        Ok(Self {
            config,
            http,
            store,
            policies: FetchPolicies::default(),
        })
    }

    pub fn with_policies(mut self, policies: FetchPolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Credential for the next request; fails before any network call
    /// when nothing is stored.
    async fn stored_token(&self) -> Result<String, ClientError> {
        self.store.token().await.ok_or(ClientError::MissingToken)
    }

    async fn request(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<Value, ClientError> {
        let token = self.stored_token().await?;
        let mut query: Vec<(&str, String)> = vec![("endpoint", endpoint.as_str().to_string())];
        query.extend(params.iter().cloned());

        let response = self
            .http
            .get(format!("{}/api/oura", self.config.proxy_base))
            .query(&query)
            .header(TOKEN_HEADER, token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::InvalidToken);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }
        response.json().await.map_err(ClientError::from_transport)
    }

    fn apply_policy<T>(
        &self,
        category: Category,
        result: Result<T, ClientError>,
        empty: impl FnOnce() -> T,
    ) -> Result<T, ClientError> {
        match (result, self.policies.for_category(category)) {
            (Ok(value), _) => Ok(value),
            (Err(err), FetchPolicy::BestEffort) => {
                warn!(?category, "best-effort fetch failed: {err}");
                Ok(empty())
            }
            (Err(err), FetchPolicy::FailFast) => Err(err),
        }
    }

    async fn ranged(
        &self,
        category: Category,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, ClientError> {
        let params = [
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
        ];
        let result = async {
            let value = self.request(category.endpoint(), &params).await?;
            let collection: Collection<DailyRecord> = serde_json::from_value(value)
                .map_err(|err| ClientError::Malformed(err.to_string()))?;
            Ok(collection.data)
        }
        .await;
        self.apply_policy(category, result, Vec::new)
    }

    pub async fn daily_sleep(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, ClientError> {
        self.ranged(Category::Sleep, start, end).await
    }

    pub async fn daily_readiness(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, ClientError> {
        self.ranged(Category::Readiness, start, end).await
    }

    pub async fn daily_activity(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, ClientError> {
        self.ranged(Category::Activity, start, end).await
    }

    /// Used as the connection test after token entry.
    pub async fn personal_info(&self) -> Result<Value, ClientError> {
        let result = self.request(Endpoint::PersonalInfo, &[]).await;
        self.apply_policy(Category::PersonalInfo, result, || Value::Null)
    }

    /// Heart-rate samples for the window, using the datetime-range
    /// convention of that collection. The default policy absorbs
    /// failures into an empty series.
    pub async fn hrv_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Value>, ClientError> {
        let params = [
            ("start_datetime", format!("{start}T00:00:00")),
            ("end_datetime", format!("{end}T23:59:59")),
        ];
        let result = async {
            let value = self.request(Endpoint::Heartrate, &params).await?;
            let collection: Collection<Value> = serde_json::from_value(value)
                .map_err(|err| ClientError::Malformed(err.to_string()))?;
            Ok(collection.data)
        }
        .await;
        self.apply_policy(Category::HeartRate, result, Vec::new)
    }

    async fn timed<T>(
        &self,
        fut: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        match timeout(self.config.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout),
        }
    }

    /// Sleep, readiness, and activity for one day fetched concurrently,
    /// plus the best-effort heart-rate samples. Absent categories
    /// resolve to `None` rather than failing the bundle; the first
    /// fail-fast error aborts the whole bundle.
    pub async fn day_bundle(
        &self,
        date: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<DayBundle, ClientError> {
        let mut cancel = cancel.clone();
        let fetch = async {
            tokio::try_join!(
                self.timed(self.daily_sleep(date, date)),
                self.timed(self.daily_readiness(date, date)),
                self.timed(self.daily_activity(date, date)),
                self.timed(self.hrv_series(date, date)),
            )
        };
        let (sleep, readiness, activity, hrv) = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            result = fetch => result?,
        };

        Ok(DayBundle {
            date: date.to_string(),
            sleep: sleep.into_iter().next(),
            readiness: readiness.into_iter().next(),
            activity: activity.into_iter().next(),
            hrv,
        })
    }

    /// Trend bundle for the inclusive window of `days` days ending
    /// today.
    pub async fn trend_bundle(
        &self,
        days: u32,
        cancel: &CancelToken,
    ) -> Result<TrendBundle, ClientError> {
        self.trend_bundle_at(Local::now().date_naive(), days, cancel)
            .await
    }

    /// Window-pinned variant, used directly by tests.
    pub async fn trend_bundle_at(
        &self,
        today: NaiveDate,
        days: u32,
        cancel: &CancelToken,
    ) -> Result<TrendBundle, ClientError> {
        let (start, end) = aggregate::trend_window(today, days);
        let mut cancel = cancel.clone();
        let fetch = async {
            tokio::try_join!(
                self.timed(self.daily_sleep(start, end)),
                self.timed(self.daily_readiness(start, end)),
                self.timed(self.daily_activity(start, end)),
            )
        };
        let (sleep, readiness, activity) = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            result = fetch => result?,
        };
        Ok(aggregate::build_trend_bundle(sleep, readiness, activity))
    }
}
