use crate::arr::VersionedClient;
use arrlink_common::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnmappedFolder {
    pub name: Option<String>,
    pub path: Option<String>,
}

/// Root folder payload. Defaults and unmapped folders depend on the dialect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootFolderFields {
    pub id: Option<i64>,
    pub path: Option<String>,
    pub name: Option<String>,
    pub accessible: Option<bool>,
    pub free_space: Option<i64>,
    pub total_space: Option<i64>,
    pub default_metadata_profile_id: Option<i64>,
    pub default_quality_profile_id: Option<i64>,
    pub default_monitor_option: Option<String>,
    pub default_tags: Option<Vec<i64>>,
    pub is_calibre_library: Option<bool>,
    pub unmapped_folders: Option<Vec<UnmappedFolder>>,
}

#[derive(Clone)]
pub struct RootFolder {
    api: VersionedClient,
    fields: RootFolderFields,
}

impl RootFolder {
    pub(crate) fn from_payload(api: VersionedClient, payload: Value) -> Result<Self> {
        let fields = serde_json::from_value(payload)
            .map_err(|e| Error::connection(format!("unexpected root folder payload: {}", e)))?;
        Ok(Self { api, fields })
    }

    pub fn id(&self) -> Option<i64> {
        self.fields.id
    }

    pub fn path(&self) -> Option<&str> {
        self.fields.path.as_deref()
    }

    pub fn free_space(&self) -> Option<i64> {
        self.fields.free_space
    }

    pub fn unmapped_folders(&self) -> &[UnmappedFolder] {
        self.fields.unmapped_folders.as_deref().unwrap_or_default()
    }

    pub fn fields(&self) -> &RootFolderFields {
        &self.fields
    }

    /// Remove the root folder from the server.
    pub async fn delete(self) -> Result<()> {
        let id = self
            .id()
            .ok_or_else(|| Error::invalid_argument("root folder has no id"))?;
        self.api.delete_root_folder(id).await
    }

    fn display_name(&self) -> String {
        self.fields
            .name
            .as_deref()
            .or(self.path())
            .unwrap_or_default()
            .to_string()
    }
}

entity_identity!(RootFolder);

impl fmt::Debug for RootFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootFolder")
            .field("id", &self.id())
            .field("path", &self.path())
            .finish()
    }
}

/// Mapping between a download client's path and the local one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePathMapping {
    id: Option<i64>,
    host: Option<String>,
    remote_path: Option<String>,
    local_path: Option<String>,
}

impl RemotePathMapping {
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn remote_path(&self) -> Option<&str> {
        self.remote_path.as_deref()
    }

    pub fn local_path(&self) -> Option<&str> {
        self.local_path.as_deref()
    }

    fn display_name(&self) -> String {
        self.remote_path().unwrap_or_default().to_string()
    }
}

entity_identity!(RemotePathMapping);
