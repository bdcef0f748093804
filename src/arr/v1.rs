//! Music and book servers. Only the shared resources (tags, profiles, root
//! folders) are exposed for these; they always speak the v1 dialect.

use super::client::VersionedClient;
use super::ArrClient;
use crate::config::ArrType;
use crate::model::MetadataProfile;
use arrlink_common::Result;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct LidarrClient {
    api: VersionedClient,
}

impl LidarrClient {
    pub fn new(api: VersionedClient) -> Self {
        Self { api }
    }

    pub async fn connect(url: &str, api_key: &str) -> Result<Self> {
        Ok(Self::new(VersionedClient::connect(url, api_key, true).await?))
    }

    pub fn api(&self) -> &VersionedClient {
        &self.api
    }

    pub async fn metadata_profiles(&self) -> Result<Vec<MetadataProfile>> {
        self.api.metadata_profiles().await
    }
}

#[async_trait]
impl ArrClient for LidarrClient {
    fn api(&self) -> &VersionedClient {
        &self.api
    }

    fn kind(&self) -> ArrType {
        ArrType::Lidarr
    }
}

#[derive(Debug, Clone)]
pub struct ReadarrClient {
    api: VersionedClient,
}

impl ReadarrClient {
    pub fn new(api: VersionedClient) -> Self {
        Self { api }
    }

    pub async fn connect(url: &str, api_key: &str) -> Result<Self> {
        Ok(Self::new(VersionedClient::connect(url, api_key, true).await?))
    }

    pub fn api(&self) -> &VersionedClient {
        &self.api
    }

    pub async fn metadata_profiles(&self) -> Result<Vec<MetadataProfile>> {
        self.api.metadata_profiles().await
    }
}

#[async_trait]
impl ArrClient for ReadarrClient {
    fn api(&self) -> &VersionedClient {
        &self.api
    }

    fn kind(&self) -> ArrType {
        ArrType::Readarr
    }
}
