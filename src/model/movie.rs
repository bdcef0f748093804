use super::lazy::Lazy;
use super::{delete_flags, lenient_datetime, Reload};
use crate::arr::radarr::{AddMovie, EditMovie, MovieAddOptions, RadarrClient};
use crate::arr::EditOptions;
use crate::model::{QualityProfile, Tag};
use arrlink_common::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieCollection {
    pub name: Option<String>,
    pub tmdb_id: Option<i64>,
}

/// Movie payload as served by movie endpoints and lookups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieFields {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub sort_title: Option<String>,
    pub clean_title: Option<String>,
    pub title_slug: Option<String>,
    pub tmdb_id: Option<i64>,
    pub imdb_id: Option<String>,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub status: Option<String>,
    pub studio: Option<String>,
    pub website: Option<String>,
    pub certification: Option<String>,
    pub you_tube_trailer_id: Option<String>,
    pub runtime: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub ratings: Option<Value>,
    pub collection: Option<MovieCollection>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub in_cinemas: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub physical_release: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub digital_release: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub added: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub folder_name: Option<String>,
    pub root_folder_path: Option<String>,
    pub monitored: Option<bool>,
    pub minimum_availability: Option<String>,
    pub is_available: Option<bool>,
    pub has_file: Option<bool>,
    pub downloaded: Option<bool>,
    pub size_on_disk: Option<i64>,
    pub quality_profile_id: Option<i64>,
    pub profile_id: Option<i64>,
    pub tags: Option<Vec<i64>>,
}

/// A movie on (or destined for) a Radarr server.
#[derive(Clone)]
pub struct Movie {
    radarr: RadarrClient,
    state: Lazy<MovieFields>,
}

impl Movie {
    pub(crate) fn stub(radarr: RadarrClient, payload: Value) -> Result<Self> {
        Ok(Self {
            radarr,
            state: Lazy::stub(payload)?,
        })
    }

    pub(crate) fn full(radarr: RadarrClient, payload: Value) -> Result<Self> {
        Ok(Self {
            radarr,
            state: Lazy::full(payload)?,
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.state.fields().id
    }

    pub fn tmdb_id(&self) -> Option<i64> {
        self.state.fields().tmdb_id
    }

    pub fn imdb_id(&self) -> Option<&str> {
        self.state.fields().imdb_id.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.state.fields().title.as_deref()
    }

    /// Tags as stubs; their labels load on first access.
    pub fn tags(&self) -> Result<Vec<Tag>> {
        self.state
            .fields()
            .tags
            .iter()
            .flatten()
            .map(|id| Tag::from_id(self.radarr.api().clone(), *id))
            .collect()
    }

    pub fn quality_profile(&self) -> Result<Option<QualityProfile>> {
        let fields = self.state.fields();
        fields
            .quality_profile_id
            .or(fields.profile_id)
            .map(|id| QualityProfile::from_id(self.radarr.api().clone(), id))
            .transpose()
    }

    /// Add the movie to Radarr.
    ///
    /// Fails with `Exists` if it already has an id and with `Excluded` if
    /// the client respects exclusions and the movie is on the list.
    pub async fn add(&mut self, request: &AddMovie) -> Result<()> {
        let options = self.radarr.validate_add(request).await?;
        if !self.is_materialized() {
            self.reload().await?;
        }
        self.ensure_addable()?;
        let payload = self.creation_payload(&options, None)?;
        let response = self.radarr.api().post("movie", &payload).await?;
        self.settle(response).await?;
        tracing::info!(movie = %self, "added movie");
        Ok(())
    }

    pub async fn edit(&mut self, request: &EditMovie) -> Result<()> {
        self.require_id()?;
        let options = self.radarr.validate_edit(request).await?;
        self.apply_edit(&options).await
    }

    pub(crate) async fn apply_edit(&mut self, options: &EditOptions) -> Result<()> {
        let id = self.require_id()?;
        if !self.is_materialized() {
            self.reload().await?;
        }
        let mut payload = self.state.raw().clone();
        options.apply_to(&mut payload);

        let query = if options.moves_files() {
            vec![("moveFiles", "true".to_string())]
        } else {
            Vec::new()
        };
        let response = self
            .radarr
            .api()
            .put(&format!("movie/{}", id), &Value::Object(payload), &query)
            .await?;
        self.settle(response).await
    }

    /// Delete the movie. Afterwards it no longer carries an id.
    pub async fn delete(&mut self, add_exclusion: bool, delete_files: bool) -> Result<()> {
        let id = self.require_id()?;
        self.radarr
            .api()
            .delete(
                &format!("movie/{}", id),
                None,
                &delete_flags(add_exclusion, delete_files),
            )
            .await?;
        tracing::info!(movie = %self, "deleted movie");
        self.state.detach()
    }

    pub(crate) fn detach(&mut self) -> Result<()> {
        self.state.detach()
    }

    pub(crate) fn ensure_addable(&self) -> Result<()> {
        if self.id().is_some() {
            return Err(Error::exists(format!("{} is already in Radarr", self)));
        }
        if let (Some(list), Some(tmdb_id)) = (self.radarr.exclusion_list(), self.tmdb_id()) {
            if list.contains(tmdb_id) {
                return Err(Error::excluded(format!(
                    "{} (TMDb {}) is on the exclusion list",
                    self, tmdb_id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn creation_payload(
        &self,
        options: &MovieAddOptions,
        path: Option<&str>,
    ) -> Result<Value> {
        if self.id().is_some() {
            return Err(Error::exists(format!("{} is already in Radarr", self)));
        }
        let mut data = self.state.raw().clone();
        if let Some(path) = path {
            if !path.starts_with(&options.root_folder) {
                return Err(Error::invalid(
                    "Individual Path",
                    path,
                    [options.root_folder.clone()],
                ));
            }
            data.insert("path".into(), json!(path));
        }
        data.insert("rootFolderPath".into(), json!(options.root_folder));
        data.insert("monitored".into(), json!(options.monitored));
        data.insert(
            self.radarr.api().dialect().quality_profile_field().into(),
            json!(options.quality_profile_id),
        );
        data.insert(
            "minimumAvailability".into(),
            json!(options.minimum_availability),
        );
        data.insert(
            "addOptions".into(),
            json!({ "searchForMovie": options.search }),
        );
        if !options.tags.is_empty() {
            data.insert("tags".into(), json!(options.tags));
        }
        Ok(Value::Object(data))
    }

    /// Adopt a mutation response; no content means the server did not echo
    /// the movie back, so fetch it.
    async fn settle(&mut self, response: Value) -> Result<()> {
        if response.is_null() {
            self.reload().await
        } else {
            self.state.replace(response)
        }
    }

    /// Items without a server id do not exist on the server yet.
    fn require_id(&self) -> Result<i64> {
        self.id().ok_or_else(|| {
            Error::not_found(format!("{} is not in Radarr; add it first", self))
        })
    }

    fn display_name(&self) -> String {
        self.title().unwrap_or_default().to_string()
    }
}

#[async_trait]
impl Reload for Movie {
    type Fields = MovieFields;

    fn state(&self) -> &Lazy<MovieFields> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Lazy<MovieFields> {
        &mut self.state
    }

    async fn fetch(&self) -> Result<Value> {
        let fields = self.state.fields();
        if let Some(id) = fields.id {
            return self.radarr.api().get(&format!("movie/{}", id), &[]).await;
        }
        if let Some(tmdb_id) = fields.tmdb_id {
            return self.radarr.lookup(&format!("tmdb:{}", tmdb_id)).await;
        }
        if let Some(imdb_id) = &fields.imdb_id {
            return self.radarr.lookup(&format!("imdb:{}", imdb_id)).await;
        }
        Err(Error::invalid_argument(
            "movie has no id, TMDb id or IMDb id to load from",
        ))
    }
}

lazy_entity!(Movie, MovieFields);
entity_identity!(Movie);

impl fmt::Debug for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Movie")
            .field("id", &self.id())
            .field("title", &self.title())
            .field("tmdb_id", &self.tmdb_id())
            .field("materialized", &self.state.is_materialized())
            .finish()
    }
}
