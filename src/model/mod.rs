//! Local representations of remote entities.
//!
//! Entities built from list payloads are stubs. Reading an absent field
//! through `get` loads the full payload once; afterwards the entity is
//! materialized and absent fields simply read as `None`. Fields are only
//! ever exposed by shared reference, so the only way to change an entity is
//! through its `add`, `edit`, `delete` and `reload` operations.

use arrlink_common::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

macro_rules! lazy_entity {
    ($entity:ty, $fields:ty) => {
        impl $entity {
            /// Typed view of the fields loaded so far.
            pub fn fields(&self) -> &$fields {
                self.state.fields()
            }

            /// Raw payload as last received from the server.
            pub fn raw(&self) -> &serde_json::Map<String, serde_json::Value> {
                self.state.raw()
            }

            pub fn is_materialized(&self) -> bool {
                self.state.is_materialized()
            }

            /// Fetch the full payload from the server.
            pub async fn reload(&mut self) -> arrlink_common::Result<()> {
                $crate::model::reload(self).await
            }

            /// Read a field, loading the full payload first when this is a
            /// stub and the value is absent.
            pub async fn get<R, F>(&mut self, read: F) -> arrlink_common::Result<Option<R>>
            where
                R: Send,
                F: Fn(&$fields) -> Option<R> + Send,
            {
                $crate::model::read_field(self, read).await
            }
        }
    };
}

macro_rules! entity_identity {
    ($entity:ty) => {
        impl PartialEq for $entity {
            fn eq(&self, other: &Self) -> bool {
                match (self.id(), other.id()) {
                    (Some(a), Some(b)) => a == b,
                    (None, None) => self.display_name() == other.display_name(),
                    _ => false,
                }
            }
        }

        impl PartialEq<i64> for $entity {
            fn eq(&self, other: &i64) -> bool {
                match self.id() {
                    Some(id) => id == *other,
                    None => self.display_name() == other.to_string(),
                }
            }
        }

        impl PartialEq<str> for $entity {
            fn eq(&self, other: &str) -> bool {
                self.display_name() == other
            }
        }

        impl PartialEq<&str> for $entity {
            fn eq(&self, other: &&str) -> bool {
                self.display_name() == *other
            }
        }

        impl std::fmt::Display for $entity {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.id() {
                    Some(id) => write!(f, "[{}:{}]", id, self.display_name()),
                    None => write!(f, "[{}]", self.display_name()),
                }
            }
        }
    };
}

mod exclusion;
mod folder;
pub(crate) mod lazy;
mod movie;
mod profile;
mod series;
mod status;
mod tag;

pub use exclusion::Exclusion;
pub use folder::{RemotePathMapping, RootFolder, RootFolderFields, UnmappedFolder};
pub use movie::{Movie, MovieCollection, MovieFields};
pub use profile::{LanguageProfile, MetadataProfile, ProfileFields, QualityProfile};
pub use series::{Season, SeasonStatistics, Series, SeriesFields, SeriesStatistics};
pub use status::{SystemStatus, SystemStatusFields};
pub use tag::{Tag, TagFields};

use lazy::Lazy;

/// An entity whose full payload can be fetched again.
#[async_trait]
pub(crate) trait Reload: Send + Sync {
    type Fields: DeserializeOwned + Send + Sync;

    fn state(&self) -> &Lazy<Self::Fields>;

    fn state_mut(&mut self) -> &mut Lazy<Self::Fields>;

    /// Full single-item payload for this entity.
    async fn fetch(&self) -> Result<Value>;
}

pub(crate) async fn reload<E: Reload>(entity: &mut E) -> Result<()> {
    let payload = entity.fetch().await?;
    entity.state_mut().replace(payload)
}

/// The entity is flagged materialized before fetching so a failed load is
/// not repeated by later reads.
pub(crate) async fn read_field<E, R, F>(entity: &mut E, read: F) -> Result<Option<R>>
where
    E: Reload,
    F: Fn(&E::Fields) -> Option<R>,
{
    if let Some(value) = read(entity.state().fields()) {
        return Ok(Some(value));
    }
    if entity.state().is_materialized() {
        return Ok(None);
    }
    entity.state_mut().mark_materialized();
    reload(entity).await?;
    Ok(read(entity.state().fields()))
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DDTHH:MM:SS` (optional fraction and
/// `Z`). Anything else reads as absent.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    let trimmed = value.trim().trim_end_matches('Z');
    let seconds = trimmed.split('.').next()?;
    NaiveDateTime::parse_from_str(seconds, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub(crate) fn lenient_datetime<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_timestamp))
}

/// Query flags of a single-item delete. Only enabled flags are sent.
pub(crate) fn delete_flags(
    add_exclusion: bool,
    delete_files: bool,
) -> Vec<(&'static str, String)> {
    let mut flags = Vec::new();
    if add_exclusion {
        flags.push(("addImportExclusion", "true".to_string()));
    }
    if delete_files {
        flags.push(("deleteFiles", "true".to_string()));
    }
    flags
}

/// Integer ids out of a JSON list, skipping anything that is not one.
pub(crate) fn id_list(value: Option<&Value>) -> Vec<i64> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2021-06-04T18:30:00Z").unwrap();
        assert_eq!(rfc.year(), 2021);

        let fraction = parse_timestamp("2019-11-01T00:00:00.1234567Z").unwrap();
        assert_eq!(fraction.month(), 11);

        let bare = parse_timestamp("2010-07-16T00:00:00").unwrap();
        assert_eq!(bare.day(), 16);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("soon").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_lenient_datetime_field() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_datetime")]
            when: Option<DateTime<Utc>>,
        }

        let row: Row = serde_json::from_value(json!({"when": "not a date"})).unwrap();
        assert!(row.when.is_none());
        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert!(row.when.is_none());
        let row: Row = serde_json::from_value(json!({"when": null})).unwrap();
        assert!(row.when.is_none());
    }

    #[test]
    fn test_id_list() {
        assert_eq!(id_list(Some(&json!([1, "x", 3]))), vec![1, 3]);
        assert!(id_list(None).is_empty());
    }
}
