//! The storage engine: daily feeling counters on top of a [`CounterStore`].
//!
//! Writes always land on the engine's own "today"; reads take any date.
//! Nothing is cached, every call is one round trip bounded by the configured
//! timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::clock::{Clock, SystemClock};
use crate::db::models::{PollResult, date_key, parse_date};
use crate::error::{BackendError, PollError};
use crate::feeling::Feeling;
use crate::store::CounterStore;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct StorageEngine {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl StorageEngine {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Count one `feeling` for today.
    pub async fn record_feeling(&self, feeling: Feeling) -> Result<(), PollError> {
        let key = date_key(self.clock.today());
        let field = Feeling::field_name_for(feeling.level())?;

        self.call("record_feeling", &key, self.store.increment(&key, field))
            .await?;

        debug!(key = %key, field, "feeling recorded");
        Ok(())
    }

    /// Validate a raw level and count it. Nothing reaches the store when the
    /// level is out of range.
    pub async fn record_feeling_value(&self, value: i64) -> Result<(), PollError> {
        let feeling = Feeling::validate(value)?;
        self.record_feeling(feeling).await
    }

    /// Counters for `date`, all zero when nothing was recorded that day.
    pub async fn get_poll_result(&self, date: NaiveDate) -> Result<PollResult, PollError> {
        let key = date_key(date);

        let record = self
            .call("get_poll_result", &key, self.store.fetch(&key))
            .await?;

        match record {
            None => Ok(PollResult::empty(date)),
            Some(attributes) => PollResult::from_attributes(date, &attributes).inspect_err(|e| {
                error!(operation = "get_poll_result", key = %key, error = %e, "malformed record");
            }),
        }
    }

    /// Same as [`Self::get_poll_result`] for a `YYYY-MM-DD` string.
    pub async fn get_poll_result_for(&self, date: &str) -> Result<PollResult, PollError> {
        let date = parse_date(date)?;
        self.get_poll_result(date).await
    }

    pub async fn ping(&self) -> Result<(), PollError> {
        self.call("ping", "-", self.store.ping()).await
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        key: &str,
        request: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, PollError> {
        let outcome = match timeout(self.store_timeout, request).await {
            Ok(outcome) => outcome,
            Err(_) => Err(BackendError::Unreachable(format!(
                "no response within {:?}",
                self.store_timeout
            ))),
        };

        outcome.map_err(|cause| {
            error!(operation, key, cause = %cause, "storage call failed");
            match cause {
                BackendError::Decode(detail) => PollError::DataCorruption {
                    key: key.to_string(),
                    detail,
                },
                other => PollError::StorageUnavailable {
                    operation,
                    key: key.to_string(),
                    cause: other.to_string(),
                },
            }
        })
    }
}
