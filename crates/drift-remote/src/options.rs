use drift_core::{CommonOptions, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Options for [`crate::RemoteLayout`]. Snapshotted at `run()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteLayoutOptions {
    #[serde(flatten)]
    pub common: CommonOptions,
    /// Layout service endpoint. Required.
    pub url: Option<String>,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    /// Deadline in milliseconds, measured from when the request is issued.
    pub timeout: Option<u64>,
    /// Layout algorithm requested from the service.
    pub layout: String,
    /// Passed through to the service untouched.
    pub options: Value,
    /// Wrapper key under which the service may nest its positions.
    pub response_positions_key: String,
    /// Tween duration in milliseconds when `animate` is set.
    pub animation_duration: u64,
}

impl Default for RemoteLayoutOptions {
    fn default() -> Self {
        Self {
            common: CommonOptions::default(),
            url: None,
            method: "POST".to_string(),
            headers: BTreeMap::new(),
            timeout: None,
            layout: "layered".to_string(),
            options: Value::Object(Default::default()),
            response_positions_key: "positions".to_string(),
            animation_duration: 500,
        }
    }
}

impl RemoteLayoutOptions {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout.as_millis() as u64);
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_duration)
    }

    /// Checks the options and returns the parsed endpoint.
    pub fn validate(&self) -> Result<url::Url> {
        self.common.validate()?;
        let raw = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::config("remote layout requires a `url`"))?;
        let url = url::Url::parse(raw)
            .map_err(|e| Error::config(format!("invalid layout service url `{raw}`: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "layout service url must be http or https, got `{}`",
                url.scheme()
            )));
        }
        if self.method.trim().is_empty() {
            return Err(Error::config("`method` must not be empty"));
        }
        if self.timeout == Some(0) {
            return Err(Error::config("`timeout` must be positive when set"));
        }
        if self.layout.is_empty() {
            return Err(Error::config("`layout` must name a layout algorithm"));
        }
        Ok(url)
    }
}
