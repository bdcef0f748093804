use super::lazy::Lazy;
use super::Reload;
use crate::arr::VersionedClient;
use arrlink_common::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub upgrade_allowed: Option<bool>,
    pub cutoff: Option<Value>,
    pub items: Option<Vec<Value>>,
    pub languages: Option<Vec<Value>>,
    pub language: Option<Value>,
}

/// Quality profile (`profile` on legacy servers).
#[derive(Clone)]
pub struct QualityProfile {
    api: VersionedClient,
    state: Lazy<ProfileFields>,
}

/// Language profile. Only V3 and legacy servers have them.
#[derive(Clone)]
pub struct LanguageProfile {
    api: VersionedClient,
    state: Lazy<ProfileFields>,
}

macro_rules! profile_entity {
    ($entity:ident, $label:literal, $resource:ident) => {
        impl $entity {
            pub(crate) fn stub(api: VersionedClient, payload: Value) -> Result<Self> {
                Ok(Self {
                    api,
                    state: Lazy::stub(payload)?,
                })
            }

            pub(crate) fn full(api: VersionedClient, payload: Value) -> Result<Self> {
                Ok(Self {
                    api,
                    state: Lazy::full(payload)?,
                })
            }

            pub(crate) fn from_id(api: VersionedClient, id: i64) -> Result<Self> {
                Self::stub(api, json!({ "id": id }))
            }

            pub fn id(&self) -> Option<i64> {
                self.state.fields().id
            }

            pub fn name(&self) -> Option<&str> {
                self.state.fields().name.as_deref()
            }

            fn display_name(&self) -> String {
                self.name().unwrap_or_default().to_string()
            }
        }

        #[async_trait]
        impl Reload for $entity {
            type Fields = ProfileFields;

            fn state(&self) -> &Lazy<ProfileFields> {
                &self.state
            }

            fn state_mut(&mut self) -> &mut Lazy<ProfileFields> {
                &mut self.state
            }

            async fn fetch(&self) -> Result<Value> {
                let id = self
                    .id()
                    .ok_or_else(|| Error::invalid_argument(concat!($label, " has no id")))?;
                let resource: &str = $resource(&self.api);
                self.api.get(&format!("{}/{}", resource, id), &[]).await
            }
        }

        lazy_entity!($entity, ProfileFields);
        entity_identity!($entity);

        impl fmt::Debug for $entity {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($entity))
                    .field("id", &self.id())
                    .field("name", &self.name())
                    .finish()
            }
        }
    };
}

fn quality_resource(api: &VersionedClient) -> &'static str {
    api.dialect().quality_profile_resource()
}

fn language_resource(_: &VersionedClient) -> &'static str {
    "languageProfile"
}

profile_entity!(QualityProfile, "quality profile", quality_resource);
profile_entity!(LanguageProfile, "language profile", language_resource);

/// Metadata profile of music and book servers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataProfile {
    id: Option<i64>,
    name: Option<String>,
    min_popularity: Option<f64>,
    skip_missing_date: Option<bool>,
    skip_missing_isbn: Option<bool>,
}

impl MetadataProfile {
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn min_popularity(&self) -> Option<f64> {
        self.min_popularity
    }

    pub fn skip_missing_date(&self) -> Option<bool> {
        self.skip_missing_date
    }

    pub fn skip_missing_isbn(&self) -> Option<bool> {
        self.skip_missing_isbn
    }

    fn display_name(&self) -> String {
        self.name().unwrap_or_default().to_string()
    }
}

entity_identity!(MetadataProfile);
