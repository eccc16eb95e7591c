use std::sync::Arc;

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use storage::ProgressStore;

/// Wraps a `ProgressStore` so that nothing it does can fail the caller.
///
/// Read failures and undecodable values read as absent; write failures are
/// logged and reported as `false`.
#[derive(Clone)]
pub(crate) struct BestEffortStore {
    inner: Arc<dyn ProgressStore>,
}

impl BestEffortStore {
    pub(crate) fn new(inner: Arc<dyn ProgressStore>) -> Self {
        Self { inner }
    }

    pub(crate) async fn read_raw(&self, key: &str) -> Option<String> {
        match self.inner.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!("progress read failed for `{key}`, using default: {err}");
                None
            }
        }
    }

    pub(crate) async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("ignoring unreadable value under `{key}`: {err}");
                None
            }
        }
    }

    /// A flag counts as set when any non-empty value is stored.
    pub(crate) async fn flag(&self, key: &str) -> bool {
        self.read_raw(key)
            .await
            .is_some_and(|value| !value.is_empty())
    }

    pub(crate) async fn write_raw(&self, key: &str, value: &str) -> bool {
        match self.inner.set(key, value).await {
            Ok(()) => true,
            Err(err) => {
                warn!("progress write failed for `{key}`, continuing without it: {err}");
                false
            }
        }
    }

    pub(crate) async fn write_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("could not encode value for `{key}`: {err}");
                return false;
            }
        };
        self.write_raw(key, &raw).await
    }
}
