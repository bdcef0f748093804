use super::lazy::Lazy;
use super::{lenient_datetime, Reload};
use crate::arr::VersionedClient;
use arrlink_common::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// Status payload. Keys not modelled here end up in `extra`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatusFields {
    pub version: Option<String>,
    pub app_name: Option<String>,
    pub instance_name: Option<String>,
    pub branch: Option<String>,
    pub authentication: Option<String>,
    pub url_base: Option<String>,
    pub runtime_version: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub is_docker: Option<bool>,
    pub is_linux: Option<bool>,
    pub is_windows: Option<bool>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub build_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone)]
pub struct SystemStatus {
    api: VersionedClient,
    state: Lazy<SystemStatusFields>,
}

impl SystemStatus {
    pub(crate) fn full(api: VersionedClient, payload: Value) -> Result<Self> {
        Ok(Self {
            api,
            state: Lazy::full(payload)?,
        })
    }

    pub fn version(&self) -> &str {
        self.state.fields().version.as_deref().unwrap_or_default()
    }

    pub fn app_name(&self) -> Option<&str> {
        self.state.fields().app_name.as_deref()
    }
}

#[async_trait]
impl Reload for SystemStatus {
    type Fields = SystemStatusFields;

    fn state(&self) -> &Lazy<SystemStatusFields> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Lazy<SystemStatusFields> {
        &mut self.state
    }

    async fn fetch(&self) -> Result<Value> {
        self.api.get("system/status", &[]).await
    }
}

lazy_entity!(SystemStatus, SystemStatusFields);

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.app_name().unwrap_or("server"), self.version())
    }
}

impl fmt::Debug for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemStatus")
            .field("app_name", &self.app_name())
            .field("version", &self.version())
            .finish()
    }
}
