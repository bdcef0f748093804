//! Clients for *arr servers.
//!
//! [`VersionedClient`] is the request layer: it negotiates the API dialect
//! once and builds every path from it. The catalog clients ([`RadarrClient`],
//! [`SonarrClient`]) add entity lookups, validation and batch operations on
//! top; the v1 clients only expose the shared resources.

pub mod batch;
pub mod client;
pub mod options;
pub mod radarr;
pub mod resolve;
pub mod sonarr;
pub mod transport;

mod resources;
mod v1;

pub use batch::{AddItem, BatchOutcome, BatchReconciler, Catalog, ExclusionList};
pub use client::VersionedClient;
pub use options::{ApplyTags, EditOptions};
pub use radarr::{AddMovie, EditMovie, MovieKey, RadarrClient};
pub use resolve::{ProfileKind, Selector, TagRef};
pub use sonarr::{AddSeries, EditSeries, SeriesKey, SonarrClient};
pub use transport::{ReqwestTransport, Transport};
pub use v1::{LidarrClient, ReadarrClient};

use crate::config::{ArrConfig, ArrType};
use crate::model::{QualityProfile, RemotePathMapping, RootFolder, SystemStatus, Tag};
use arrlink_common::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Common trait for *arr API clients
#[async_trait::async_trait]
pub trait ArrClient: Send + Sync {
    fn api(&self) -> &VersionedClient;

    fn kind(&self) -> ArrType;

    /// Test the connection to the *arr instance. A rejected key or a
    /// missing status endpoint is `false`; transport failures are errors.
    async fn test_connection(&self) -> Result<bool> {
        match self.api().system_status().await {
            Ok(_) => Ok(true),
            Err(Error::Unauthorized(_)) | Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn system_status(&self) -> Result<SystemStatus> {
        self.api().system_status().await
    }

    async fn all_tags(&self, detail: bool) -> Result<Vec<Tag>> {
        self.api().tags(detail).await
    }

    async fn get_tag(&self, id: i64, detail: bool) -> Result<Tag> {
        self.api().tag(id, detail).await
    }

    async fn create_tag(&self, label: &str) -> Result<Tag> {
        self.api().create_tag(label).await
    }

    async fn edit_tag(&self, id: i64, label: &str) -> Result<Tag> {
        self.api().update_tag(id, label).await
    }

    async fn delete_tag(&self, id: i64) -> Result<()> {
        self.api().delete_tag(id).await
    }

    async fn quality_profiles(&self) -> Result<Vec<QualityProfile>> {
        self.api().quality_profiles().await
    }

    async fn root_folders(&self) -> Result<Vec<RootFolder>> {
        self.api().root_folders().await
    }

    async fn add_root_folder(&self, path: &str) -> Result<RootFolder> {
        self.api().create_root_folder(path).await
    }

    async fn remote_path_mappings(&self) -> Result<Vec<RemotePathMapping>> {
        self.api().remote_path_mappings().await
    }
}

/// Negotiate the request layer for a configured instance.
pub async fn connect_api(config: &ArrConfig) -> Result<VersionedClient> {
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(Duration::from_secs(
        config.timeout_secs,
    )));
    let api = VersionedClient::with_transport(
        transport,
        &config.url,
        &config.api_key,
        config.arr_type.uses_v1(),
    )
    .await?;
    tracing::debug!(
        name = %config.name,
        dialect = %api.dialect(),
        version = %api.version(),
        "connected instance"
    );
    Ok(api)
}

/// Connect the client matching a configured instance.
pub async fn connect(config: &ArrConfig) -> Result<Box<dyn ArrClient>> {
    let api = connect_api(config).await?;
    let client: Box<dyn ArrClient> = match config.arr_type {
        ArrType::Radarr => {
            let mut radarr = RadarrClient::new(api);
            if config.respect_exclusions {
                radarr.respect_list_exclusions_when_adding().await?;
            }
            Box::new(radarr)
        }
        ArrType::Sonarr => {
            let mut sonarr = SonarrClient::new(api);
            if config.respect_exclusions {
                sonarr.respect_list_exclusions_when_adding().await?;
            }
            Box::new(sonarr)
        }
        ArrType::Lidarr => Box::new(LidarrClient::new(api)),
        ArrType::Readarr => Box::new(ReadarrClient::new(api)),
    };
    Ok(client)
}
