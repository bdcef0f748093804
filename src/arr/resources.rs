//! Shared resources every *arr server exposes.
//!
//! Nothing here is cached: each call goes to the server. Lists produce stubs,
//! single-item fetches produce materialized entities.

use super::client::{into_items, VersionedClient};
use crate::model::{
    LanguageProfile, MetadataProfile, QualityProfile, RemotePathMapping, RootFolder,
    SystemStatus, Tag,
};
use arrlink_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

impl VersionedClient {
    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// All tags. `detail` adds association lists on dialects that support it.
    pub async fn tags(&self, detail: bool) -> Result<Vec<Tag>> {
        let detail = detail && self.dialect().supports_tag_detail();
        let path = if detail { "tag/detail" } else { "tag" };
        into_items(self.get(path, &[]).await?)?
            .into_iter()
            .map(|item| Tag::stub(self.clone(), item, detail))
            .collect()
    }

    pub async fn tag(&self, id: i64, detail: bool) -> Result<Tag> {
        let detail = detail && self.dialect().supports_tag_detail();
        let path = if detail {
            format!("tag/detail/{}", id)
        } else {
            format!("tag/{}", id)
        };
        Tag::full(self.clone(), self.get(&path, &[]).await?, detail)
    }

    pub async fn create_tag(&self, label: &str) -> Result<Tag> {
        let payload = self
            .post("tag", &json!({ "label": label.to_lowercase() }))
            .await?;
        tracing::debug!(label = %label, "created tag");
        Tag::full(self.clone(), payload, false)
    }

    pub async fn update_tag(&self, id: i64, label: &str) -> Result<Tag> {
        Tag::full(self.clone(), self.put_tag(id, label).await?, false)
    }

    pub(crate) async fn put_tag(&self, id: i64, label: &str) -> Result<Value> {
        self.put(
            &format!("tag/{}", id),
            &json!({ "id": id, "label": label.to_lowercase() }),
            &[],
        )
        .await
    }

    pub async fn delete_tag(&self, id: i64) -> Result<()> {
        self.delete(&format!("tag/{}", id), None, &[]).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    pub async fn quality_profiles(&self) -> Result<Vec<QualityProfile>> {
        let resource = self.dialect().quality_profile_resource();
        into_items(self.get(resource, &[]).await?)?
            .into_iter()
            .map(|item| QualityProfile::stub(self.clone(), item))
            .collect()
    }

    pub async fn quality_profile(&self, id: i64) -> Result<QualityProfile> {
        let resource = self.dialect().quality_profile_resource();
        let payload = self.get(&format!("{}/{}", resource, id), &[]).await?;
        QualityProfile::full(self.clone(), payload)
    }

    pub async fn language_profiles(&self) -> Result<Vec<LanguageProfile>> {
        into_items(self.get("languageProfile", &[]).await?)?
            .into_iter()
            .map(|item| LanguageProfile::stub(self.clone(), item))
            .collect()
    }

    pub async fn language_profile(&self, id: i64) -> Result<LanguageProfile> {
        let payload = self.get(&format!("languageProfile/{}", id), &[]).await?;
        LanguageProfile::full(self.clone(), payload)
    }

    pub async fn metadata_profiles(&self) -> Result<Vec<MetadataProfile>> {
        self.list_of("metadataProfile", "metadata profile").await
    }

    // ------------------------------------------------------------------
    // Root folders and mappings
    // ------------------------------------------------------------------

    pub async fn root_folders(&self) -> Result<Vec<RootFolder>> {
        into_items(self.get("rootFolder", &[]).await?)?
            .into_iter()
            .map(|item| RootFolder::from_payload(self.clone(), item))
            .collect()
    }

    pub async fn create_root_folder(&self, path: &str) -> Result<RootFolder> {
        let payload = self.post("rootFolder", &json!({ "path": path })).await?;
        tracing::info!(path = %path, "added root folder");
        RootFolder::from_payload(self.clone(), payload)
    }

    pub async fn delete_root_folder(&self, id: i64) -> Result<()> {
        self.delete(&format!("rootFolder/{}", id), None, &[]).await?;
        Ok(())
    }

    pub async fn remote_path_mappings(&self) -> Result<Vec<RemotePathMapping>> {
        self.list_of("remotePathMapping", "remote path mapping").await
    }

    pub async fn system_status(&self) -> Result<SystemStatus> {
        let payload = self.get("system/status", &[]).await?;
        SystemStatus::full(self.clone(), payload)
    }

    async fn list_of<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<Vec<T>> {
        into_items(self.get(path, &[]).await?)?
            .into_iter()
            .map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| Error::connection(format!("unexpected {} payload: {}", what, e)))
            })
            .collect()
    }
}
