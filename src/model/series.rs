use super::lazy::Lazy;
use super::{delete_flags, lenient_datetime, Reload};
use crate::arr::sonarr::{AddSeries, EditSeries, SeriesAddOptions, SonarrClient};
use crate::arr::EditOptions;
use crate::model::{LanguageProfile, QualityProfile, Tag};
use arrlink_common::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatistics {
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub next_airing: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub previous_airing: Option<DateTime<Utc>>,
    pub episode_file_count: Option<i64>,
    pub episode_count: Option<i64>,
    pub total_episode_count: Option<i64>,
    pub size_on_disk: Option<i64>,
    pub percent_of_episodes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub season_number: i64,
    pub monitored: Option<bool>,
    pub statistics: Option<SeasonStatistics>,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Season {}]", self.season_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatistics {
    pub season_count: Option<i64>,
    pub episode_file_count: Option<i64>,
    pub episode_count: Option<i64>,
    pub total_episode_count: Option<i64>,
    pub size_on_disk: Option<i64>,
    pub percent_of_episodes: Option<f64>,
}

/// Series payload. Legacy servers put the counters at the top level instead
/// of under `statistics`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesFields {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub sort_title: Option<String>,
    pub clean_title: Option<String>,
    pub title_slug: Option<String>,
    pub tvdb_id: Option<i64>,
    pub tv_rage_id: Option<i64>,
    pub tv_maze_id: Option<i64>,
    pub imdb_id: Option<String>,
    pub status: Option<String>,
    pub overview: Option<String>,
    pub network: Option<String>,
    pub air_time: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<i64>,
    pub certification: Option<String>,
    pub genres: Option<Vec<String>>,
    pub ratings: Option<Value>,
    pub ended: Option<bool>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub first_aired: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub next_airing: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub previous_airing: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub added: Option<DateTime<Utc>>,
    pub series_type: Option<String>,
    pub path: Option<String>,
    pub root_folder_path: Option<String>,
    pub monitored: Option<bool>,
    pub season_folder: Option<bool>,
    pub use_scene_numbering: Option<bool>,
    pub quality_profile_id: Option<i64>,
    pub profile_id: Option<i64>,
    pub language_profile_id: Option<i64>,
    pub tags: Option<Vec<i64>>,
    pub seasons: Option<Vec<Season>>,
    pub statistics: Option<SeriesStatistics>,
    pub season_count: Option<i64>,
    pub episode_count: Option<i64>,
    pub episode_file_count: Option<i64>,
    pub total_episode_count: Option<i64>,
    pub size_on_disk: Option<i64>,
}

/// A series on (or destined for) a Sonarr server.
#[derive(Clone)]
pub struct Series {
    sonarr: SonarrClient,
    state: Lazy<SeriesFields>,
}

impl Series {
    pub(crate) fn stub(sonarr: SonarrClient, payload: Value) -> Result<Self> {
        Ok(Self {
            sonarr,
            state: Lazy::stub(payload)?,
        })
    }

    pub(crate) fn full(sonarr: SonarrClient, payload: Value) -> Result<Self> {
        Ok(Self {
            sonarr,
            state: Lazy::full(payload)?,
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.state.fields().id
    }

    pub fn tvdb_id(&self) -> Option<i64> {
        self.state.fields().tvdb_id
    }

    pub fn title(&self) -> Option<&str> {
        self.state.fields().title.as_deref()
    }

    pub fn seasons(&self) -> &[Season] {
        self.state.fields().seasons.as_deref().unwrap_or_default()
    }

    pub fn tags(&self) -> Result<Vec<Tag>> {
        self.state
            .fields()
            .tags
            .iter()
            .flatten()
            .map(|id| Tag::from_id(self.sonarr.api().clone(), *id))
            .collect()
    }

    pub fn quality_profile(&self) -> Result<Option<QualityProfile>> {
        let fields = self.state.fields();
        fields
            .quality_profile_id
            .or(fields.profile_id)
            .map(|id| QualityProfile::from_id(self.sonarr.api().clone(), id))
            .transpose()
    }

    pub fn language_profile(&self) -> Result<Option<LanguageProfile>> {
        self.state
            .fields()
            .language_profile_id
            .map(|id| LanguageProfile::from_id(self.sonarr.api().clone(), id))
            .transpose()
    }

    /// Add the series to Sonarr.
    pub async fn add(&mut self, request: &AddSeries) -> Result<()> {
        let options = self.sonarr.validate_add(request).await?;
        if !self.is_materialized() {
            self.reload().await?;
        }
        self.ensure_addable()?;
        let payload = self.creation_payload(&options, None)?;
        let response = self.sonarr.api().post("series", &payload).await?;
        self.settle(response).await?;
        tracing::info!(series = %self, "added series");
        Ok(())
    }

    pub async fn edit(&mut self, request: &EditSeries) -> Result<()> {
        self.require_id()?;
        let options = self.sonarr.validate_edit(request).await?;
        self.apply_edit(&options).await
    }

    /// A monitor option goes through `seasonPass` first; the series payload
    /// is re-read afterwards so the edit starts from the new season state.
    pub(crate) async fn apply_edit(&mut self, options: &EditOptions) -> Result<()> {
        let id = self.require_id()?;
        if let Some(monitor) = options.monitor() {
            self.sonarr.update_season_pass(&[id], monitor).await?;
            self.reload().await?;
        } else if !self.is_materialized() {
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
            .sonarr
            .api()
            .put(&format!("series/{}", id), &Value::Object(payload), &query)
            .await?;
        self.settle(response).await
    }

    /// Delete the series. Afterwards it no longer carries an id.
    pub async fn delete(&mut self, add_exclusion: bool, delete_files: bool) -> Result<()> {
        let id = self.require_id()?;
        self.sonarr
            .api()
            .delete(
                &format!("series/{}", id),
                None,
                &delete_flags(add_exclusion, delete_files),
            )
            .await?;
        tracing::info!(series = %self, "deleted series");
        self.state.detach()
    }

    pub(crate) fn detach(&mut self) -> Result<()> {
        self.state.detach()
    }

    pub(crate) fn ensure_addable(&self) -> Result<()> {
        if self.id().is_some() {
            return Err(Error::exists(format!("{} is already in Sonarr", self)));
        }
        if let (Some(list), Some(tvdb_id)) = (self.sonarr.exclusion_list(), self.tvdb_id()) {
            if list.contains(tvdb_id) {
                return Err(Error::excluded(format!(
                    "{} (TVDb {}) is on the exclusion list",
                    self, tvdb_id
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn creation_payload(
        &self,
        options: &SeriesAddOptions,
        path: Option<&str>,
    ) -> Result<Value> {
        if self.id().is_some() {
            return Err(Error::exists(format!("{} is already in Sonarr", self)));
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
        data.insert("monitored".into(), json!(options.monitor != "none"));
        data.insert(
            self.sonarr.api().dialect().quality_profile_field().into(),
            json!(options.quality_profile_id),
        );
        if let Some(language_profile_id) = options.language_profile_id {
            data.insert("languageProfileId".into(), json!(language_profile_id));
        }
        data.insert("seriesType".into(), json!(options.series_type));
        data.insert("seasonFolder".into(), json!(options.season_folder));
        data.insert(
            "addOptions".into(),
            json!({
                "searchForMissingEpisodes": options.search,
                "searchForCutoffUnmetEpisodes": options.unmet_search,
                "monitor": options.monitor,
            }),
        );
        if !options.tags.is_empty() {
            data.insert("tags".into(), json!(options.tags));
        }
        Ok(Value::Object(data))
    }

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
            Error::not_found(format!("{} is not in Sonarr; add it first", self))
        })
    }

    fn display_name(&self) -> String {
        self.title().unwrap_or_default().to_string()
    }
}

#[async_trait]
impl Reload for Series {
    type Fields = SeriesFields;

    fn state(&self) -> &Lazy<SeriesFields> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Lazy<SeriesFields> {
        &mut self.state
    }

    async fn fetch(&self) -> Result<Value> {
        let fields = self.state.fields();
        if let Some(id) = fields.id {
            return self.sonarr.api().get(&format!("series/{}", id), &[]).await;
        }
        if let Some(tvdb_id) = fields.tvdb_id {
            return self.sonarr.lookup(&format!("tvdb:{}", tvdb_id)).await;
        }
        Err(Error::invalid_argument(
            "series has no id or TVDb id to load from",
        ))
    }
}

lazy_entity!(Series, SeriesFields);
entity_identity!(Series);

impl fmt::Debug for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Series")
            .field("id", &self.id())
            .field("title", &self.title())
            .field("tvdb_id", &self.tvdb_id())
            .field("materialized", &self.state.is_materialized())
            .finish()
    }
}
