use super::lazy::Lazy;
use super::Reload;
use crate::arr::VersionedClient;
use arrlink_common::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

/// Tag payload. The association lists are only filled by detail loads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFields {
    pub id: Option<i64>,
    pub label: Option<String>,
    pub delay_profile_ids: Option<Vec<i64>>,
    pub notification_ids: Option<Vec<i64>>,
    pub restriction_ids: Option<Vec<i64>>,
    pub import_list_ids: Option<Vec<i64>>,
    pub movie_ids: Option<Vec<i64>>,
    pub series_ids: Option<Vec<i64>>,
    pub artist_ids: Option<Vec<i64>>,
    pub author_ids: Option<Vec<i64>>,
}

#[derive(Clone)]
pub struct Tag {
    api: VersionedClient,
    state: Lazy<TagFields>,
    detail: bool,
}

impl Tag {
    pub(crate) fn stub(api: VersionedClient, payload: Value, detail: bool) -> Result<Self> {
        Ok(Self {
            api,
            state: Lazy::stub(payload)?,
            detail,
        })
    }

    pub(crate) fn full(api: VersionedClient, payload: Value, detail: bool) -> Result<Self> {
        Ok(Self {
            api,
            state: Lazy::full(payload)?,
            detail,
        })
    }

    /// Stub known only by id, as referenced from another entity.
    pub(crate) fn from_id(api: VersionedClient, id: i64) -> Result<Self> {
        Self::stub(api, json!({ "id": id }), false)
    }

    pub fn id(&self) -> Option<i64> {
        self.state.fields().id
    }

    pub fn label(&self) -> Option<&str> {
        self.state.fields().label.as_deref()
    }

    /// Whether the association lists were requested.
    pub fn is_detailed(&self) -> bool {
        self.detail
    }

    /// Rename the tag. The label is stored lowercased.
    pub async fn edit(&mut self, label: &str) -> Result<()> {
        let id = self.require_id()?;
        let payload = self.api.put_tag(id, label).await?;
        self.state.replace(payload)
    }

    /// Delete the tag on the server and forget its id.
    pub async fn delete(&mut self) -> Result<()> {
        let id = self.require_id()?;
        self.api.delete_tag(id).await?;
        self.state.detach()
    }

    fn require_id(&self) -> Result<i64> {
        self.id()
            .ok_or_else(|| Error::invalid_argument("tag has no id; it does not exist on the server"))
    }

    fn display_name(&self) -> String {
        self.label().unwrap_or_default().to_string()
    }
}

#[async_trait]
impl Reload for Tag {
    type Fields = TagFields;

    fn state(&self) -> &Lazy<TagFields> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Lazy<TagFields> {
        &mut self.state
    }

    async fn fetch(&self) -> Result<Value> {
        let id = self.require_id()?;
        let path = if self.detail && self.api.dialect().supports_tag_detail() {
            format!("tag/detail/{}", id)
        } else {
            format!("tag/{}", id)
        };
        self.api.get(&path, &[]).await
    }
}

lazy_entity!(Tag, TagFields);
entity_identity!(Tag);

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("id", &self.id())
            .field("label", &self.label())
            .field("materialized", &self.state.is_materialized())
            .finish()
    }
}
