use super::batch::{
    check_per_request, AddItem, BatchOutcome, BatchReconciler, Catalog, ExclusionList,
};
use super::client::{into_items, VersionedClient};
use super::options::{ApplyTags, EditOptions};
use super::resolve::{resolve_enum, ProfileKind, Selector, TagRef};
use super::ArrClient;
use crate::config::ArrType;
use crate::model::{Exclusion, LanguageProfile, Series};
use arrlink_common::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub const MONITOR_OPTIONS: [&str; 8] = [
    "all",
    "future",
    "missing",
    "existing",
    "pilot",
    "firstSeason",
    "latestSeason",
    "none",
];

pub const SERIES_TYPE_OPTIONS: [&str; 3] = ["standard", "daily", "anime"];

/// Ways of naming a series. Bare integers are TVDb ids.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesKey {
    /// Sonarr's own id.
    Id(i64),
    Tvdb(i64),
    Series(Series),
}

impl From<i64> for SeriesKey {
    fn from(tvdb_id: i64) -> Self {
        Self::Tvdb(tvdb_id)
    }
}

impl From<Series> for SeriesKey {
    fn from(series: Series) -> Self {
        Self::Series(series)
    }
}

impl From<&Series> for SeriesKey {
    fn from(series: &Series) -> Self {
        Self::Series(series.clone())
    }
}

/// Parameters for adding series, before validation.
#[derive(Debug, Clone)]
pub struct AddSeries {
    pub root_folder: Selector,
    pub quality_profile: Selector,
    /// Only sent to servers that still have language profiles.
    pub language_profile: Option<Selector>,
    pub monitor: String,
    pub season_folder: bool,
    pub search: bool,
    pub unmet_search: bool,
    pub series_type: String,
    pub tags: Vec<TagRef>,
}

impl AddSeries {
    pub fn new(root_folder: impl Into<Selector>, quality_profile: impl Into<Selector>) -> Self {
        Self {
            root_folder: root_folder.into(),
            quality_profile: quality_profile.into(),
            language_profile: None,
            monitor: "all".to_string(),
            season_folder: true,
            search: true,
            unmet_search: false,
            series_type: "standard".to_string(),
            tags: Vec::new(),
        }
    }

    pub fn language_profile(mut self, profile: impl Into<Selector>) -> Self {
        self.language_profile = Some(profile.into());
        self
    }

    pub fn monitor(mut self, monitor: &str) -> Self {
        self.monitor = monitor.to_string();
        self
    }

    pub fn season_folder(mut self, season_folder: bool) -> Self {
        self.season_folder = season_folder;
        self
    }

    pub fn search(mut self, search: bool) -> Self {
        self.search = search;
        self
    }

    pub fn unmet_search(mut self, unmet_search: bool) -> Self {
        self.unmet_search = unmet_search;
        self
    }

    pub fn series_type(mut self, series_type: &str) -> Self {
        self.series_type = series_type.to_string();
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TagRef>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Parameters for editing series, before validation.
///
/// `monitor` is applied through the season pass before the edit itself.
#[derive(Debug, Clone, Default)]
pub struct EditSeries {
    pub root_folder: Option<Selector>,
    pub path: Option<String>,
    pub move_files: bool,
    pub quality_profile: Option<Selector>,
    pub language_profile: Option<Selector>,
    pub monitor: Option<String>,
    pub monitored: Option<bool>,
    pub season_folder: Option<bool>,
    pub series_type: Option<String>,
    pub tags: Option<Vec<TagRef>>,
    pub apply_tags: Option<String>,
}

impl EditSeries {
    fn is_empty(&self) -> bool {
        self.root_folder.is_none()
            && self.path.is_none()
            && self.quality_profile.is_none()
            && self.language_profile.is_none()
            && self.monitor.is_none()
            && self.monitored.is_none()
            && self.season_folder.is_none()
            && self.series_type.is_none()
            && self.tags.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct SeriesAddOptions {
    pub(crate) root_folder: String,
    pub(crate) quality_profile_id: i64,
    pub(crate) language_profile_id: Option<i64>,
    pub(crate) monitor: String,
    pub(crate) season_folder: bool,
    pub(crate) search: bool,
    pub(crate) unmet_search: bool,
    pub(crate) series_type: String,
    pub(crate) tags: Vec<i64>,
}

impl SeriesAddOptions {
    pub fn root_folder(&self) -> &str {
        &self.root_folder
    }

    pub fn quality_profile_id(&self) -> i64 {
        self.quality_profile_id
    }

    pub fn language_profile_id(&self) -> Option<i64> {
        self.language_profile_id
    }

    pub fn monitor(&self) -> &str {
        &self.monitor
    }

    pub fn tags(&self) -> &[i64] {
        &self.tags
    }
}

/// Client for TV servers.
#[derive(Debug, Clone)]
pub struct SonarrClient {
    api: VersionedClient,
    exclusions: Option<Arc<ExclusionList>>,
}

impl SonarrClient {
    pub fn new(api: VersionedClient) -> Self {
        Self {
            api,
            exclusions: None,
        }
    }

    pub async fn connect(url: &str, api_key: &str) -> Result<Self> {
        Ok(Self::new(VersionedClient::connect(url, api_key, false).await?))
    }

    pub fn api(&self) -> &VersionedClient {
        &self.api
    }

    pub async fn language_profiles(&self) -> Result<Vec<LanguageProfile>> {
        self.api.language_profiles().await
    }

    // ------------------------------------------------------------------
    // Exclusions
    // ------------------------------------------------------------------

    pub async fn exclusions(&self) -> Result<Vec<Exclusion>> {
        into_items(self.api.get("importlistexclusion", &[]).await?)?
            .into_iter()
            .map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| Error::connection(format!("unexpected exclusion payload: {}", e)))
            })
            .collect()
    }

    pub async fn add_exclusion(&self, title: &str, tvdb_id: i64) -> Result<Exclusion> {
        let payload = self
            .api
            .post(
                "importlistexclusion",
                &json!({ "title": title, "tvdbId": tvdb_id }),
            )
            .await?;
        serde_json::from_value(payload)
            .map_err(|e| Error::connection(format!("unexpected exclusion payload: {}", e)))
    }

    /// Load the import list exclusions once; later adds skip anything on
    /// them. Returns the number of excluded series.
    pub async fn respect_list_exclusions_when_adding(&mut self) -> Result<usize> {
        let list: ExclusionList = self
            .exclusions()
            .await?
            .iter()
            .filter_map(Exclusion::external_id)
            .collect();
        let count = list.len();
        tracing::debug!(count, "loaded series exclusions");
        self.exclusions = Some(Arc::new(list));
        Ok(count)
    }

    pub fn exclusion_list(&self) -> Option<&ExclusionList> {
        self.exclusions.as_deref()
    }

    // ------------------------------------------------------------------
    // Series
    // ------------------------------------------------------------------

    pub async fn get_series(&self, key: impl Into<SeriesKey>) -> Result<Series> {
        match key.into() {
            SeriesKey::Id(id) => {
                let payload = self.api.get(&format!("series/{}", id), &[]).await?;
                Series::full(self.clone(), payload)
            }
            SeriesKey::Tvdb(tvdb_id) => {
                Series::full(self.clone(), self.lookup(&format!("tvdb:{}", tvdb_id)).await?)
            }
            SeriesKey::Series(mut series) => {
                if !series.is_materialized() {
                    series.reload().await?;
                }
                Ok(series)
            }
        }
    }

    pub fn stub_series(&self, key: impl Into<SeriesKey>) -> Result<Series> {
        let identity = match key.into() {
            SeriesKey::Id(id) => json!({ "id": id }),
            SeriesKey::Tvdb(tvdb_id) => json!({ "tvdbId": tvdb_id }),
            SeriesKey::Series(series) => return Ok(series),
        };
        Series::stub(self.clone(), identity)
    }

    pub async fn all_series(&self) -> Result<Vec<Series>> {
        into_items(self.api.get("series", &[]).await?)?
            .into_iter()
            .map(|item| Series::stub(self.clone(), item))
            .collect()
    }

    pub async fn search_series(&self, term: &str) -> Result<Vec<Series>> {
        into_items(
            self.api
                .get("series/lookup", &[("term", term.to_string())])
                .await?,
        )?
        .into_iter()
        .map(|item| Series::stub(self.clone(), item))
        .collect()
    }

    pub async fn add_series(
        &self,
        key: impl Into<SeriesKey>,
        request: &AddSeries,
    ) -> Result<Series> {
        let mut series = self.get_series(key).await?;
        series.add(request).await?;
        Ok(series)
    }

    pub async fn edit_series(
        &self,
        key: impl Into<SeriesKey>,
        request: &EditSeries,
    ) -> Result<Series> {
        let mut series = self.get_series(key).await?;
        series.edit(request).await?;
        Ok(series)
    }

    pub async fn delete_series(
        &self,
        key: impl Into<SeriesKey>,
        add_exclusion: bool,
        delete_files: bool,
    ) -> Result<Series> {
        let mut series = self.get_series(key).await?;
        series.delete(add_exclusion, delete_files).await?;
        Ok(series)
    }

    // ------------------------------------------------------------------
    // Batches
    // ------------------------------------------------------------------

    pub async fn add_multiple_series<I>(
        &self,
        items: I,
        request: &AddSeries,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<Series, SeriesKey>>
    where
        I: IntoIterator,
        I::Item: Into<AddItem<SeriesKey>>,
    {
        check_per_request(per_request)?;
        let items = items.into_iter().map(Into::into).collect();
        let options = self.validate_add(request).await?;
        BatchReconciler::new(self, self.exclusion_list())
            .add(items, &options, per_request)
            .await
    }

    pub async fn edit_multiple_series<I>(
        &self,
        keys: I,
        request: &EditSeries,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<Series, SeriesKey>>
    where
        I: IntoIterator,
        I::Item: Into<SeriesKey>,
    {
        check_per_request(per_request)?;
        let keys = keys.into_iter().map(Into::into).collect();
        let options = self.validate_edit(request).await?;
        BatchReconciler::new(self, None)
            .edit(keys, &options, per_request)
            .await
    }

    pub async fn delete_multiple_series<I>(
        &self,
        keys: I,
        add_exclusion: bool,
        delete_files: bool,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<Series, SeriesKey>>
    where
        I: IntoIterator,
        I::Item: Into<SeriesKey>,
    {
        check_per_request(per_request)?;
        let keys = keys.into_iter().map(Into::into).collect();
        BatchReconciler::new(self, None)
            .delete(keys, delete_files, add_exclusion, per_request)
            .await
    }

    /// Set how every season of the given series is monitored.
    pub async fn update_season_pass(&self, ids: &[i64], monitor: &str) -> Result<()> {
        let monitor = resolve_enum("Monitor", monitor, &MONITOR_OPTIONS)?;
        let series: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "id": id, "monitored": monitor != "none" }))
            .collect();
        self.api
            .post(
                "seasonPass",
                &json!({
                    "monitoringOptions": { "monitor": monitor },
                    "series": series,
                }),
            )
            .await?;
        tracing::debug!(count = ids.len(), monitor = %monitor, "updated season pass");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Language profiles are dropped with a warning on servers without them.
    async fn language_profile_id(&self, selector: Option<&Selector>) -> Result<Option<i64>> {
        let Some(selector) = selector else {
            return Ok(None);
        };
        if !self.api.dialect().has_language_profiles() {
            tracing::warn!(
                profile = %selector,
                dialect = %self.api.dialect(),
                "server has no language profiles, ignoring"
            );
            return Ok(None);
        }
        let id = self
            .api
            .resolve_profile(ProfileKind::Language, selector)
            .await?;
        Ok(Some(id))
    }

    pub(crate) async fn validate_add(&self, request: &AddSeries) -> Result<SeriesAddOptions> {
        let monitor = resolve_enum("Monitor", &request.monitor, &MONITOR_OPTIONS)?;
        let series_type = resolve_enum("Series Type", &request.series_type, &SERIES_TYPE_OPTIONS)?;
        let root_folder = self.api.resolve_root_folder(&request.root_folder).await?;
        let quality_profile_id = self
            .api
            .resolve_profile(ProfileKind::Quality, &request.quality_profile)
            .await?;
        let language_profile_id = self
            .language_profile_id(request.language_profile.as_ref())
            .await?;
        let tags = self.api.resolve_tags(&request.tags, true).await?;

        Ok(SeriesAddOptions {
            root_folder,
            quality_profile_id,
            language_profile_id,
            monitor,
            season_folder: request.season_folder,
            search: request.search,
            unmet_search: request.unmet_search,
            series_type,
            tags,
        })
    }

    pub(crate) async fn validate_edit(&self, request: &EditSeries) -> Result<EditOptions> {
        if request.is_empty() {
            return Err(Error::invalid_argument(
                "series edit requires at least one field to change",
            ));
        }
        let mode = ApplyTags::parse(request.apply_tags.as_deref().unwrap_or("add"))?;
        let monitor = request
            .monitor
            .as_deref()
            .map(|value| resolve_enum("Monitor", value, &MONITOR_OPTIONS))
            .transpose()?;
        let series_type = request
            .series_type
            .as_deref()
            .map(|value| resolve_enum("Series Type", value, &SERIES_TYPE_OPTIONS))
            .transpose()?;

        let mut options = EditOptions::default();
        if let Some(selector) = &request.root_folder {
            options.set("rootFolderPath", self.api.resolve_root_folder(selector).await?);
        }
        if let Some(path) = &request.path {
            options.set("path", path.as_str());
        }
        if let Some(selector) = &request.quality_profile {
            let id = self
                .api
                .resolve_profile(ProfileKind::Quality, selector)
                .await?;
            options.set(self.api.dialect().quality_profile_field(), id);
        }
        if let Some(id) = self
            .language_profile_id(request.language_profile.as_ref())
            .await?
        {
            options.set("languageProfileId", id);
        }
        if let Some(monitored) = request.monitored {
            options.set("monitored", monitored);
        }
        if let Some(season_folder) = request.season_folder {
            options.set("seasonFolder", season_folder);
        }
        if let Some(value) = series_type {
            options.set("seriesType", value);
        }
        if let Some(tags) = &request.tags {
            let ids = self.api.resolve_tags(tags, mode.creates_missing()).await?;
            options.set_tags(mode, ids);
        }
        if let Some(value) = monitor {
            options.set_monitor(value);
        }
        options.set_move_files(request.move_files);
        Ok(options)
    }

    /// First lookup result for a `tvdb:` term.
    pub(crate) async fn lookup(&self, term: &str) -> Result<Value> {
        into_items(
            self.api
                .get("series/lookup", &[("term", term.to_string())])
                .await?,
        )?
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(format!("no series found for '{}'", term)))
    }
}

#[async_trait]
impl ArrClient for SonarrClient {
    fn api(&self) -> &VersionedClient {
        &self.api
    }

    fn kind(&self) -> ArrType {
        ArrType::Sonarr
    }
}

#[async_trait]
impl Catalog for SonarrClient {
    type Item = Series;
    type Key = SeriesKey;
    type AddOptions = SeriesAddOptions;

    fn api(&self) -> &VersionedClient {
        &self.api
    }

    fn resource(&self) -> &'static str {
        "series"
    }

    fn ids_field(&self) -> &'static str {
        "seriesIds"
    }

    fn item_id(&self, item: &Series) -> Option<i64> {
        item.id()
    }

    fn external_id(&self, item: &Series) -> Option<i64> {
        item.tvdb_id()
    }

    fn key_external_id(&self, key: &SeriesKey) -> Option<i64> {
        match key {
            SeriesKey::Tvdb(tvdb_id) => Some(*tvdb_id),
            SeriesKey::Series(series) => series.tvdb_id(),
            SeriesKey::Id(_) => None,
        }
    }

    async fn resolve(&self, key: &SeriesKey) -> Result<Series> {
        self.get_series(key.clone()).await
    }

    fn creation_payload(
        &self,
        item: &Series,
        options: &SeriesAddOptions,
        path: Option<&str>,
    ) -> Result<Value> {
        item.creation_payload(options, path)
    }

    fn materialize(&self, payload: Value) -> Result<Series> {
        Series::full(self.clone(), payload)
    }

    async fn catalog_items(&self) -> Result<Vec<Series>> {
        self.all_series().await
    }

    fn match_key(&self, live: &[Series], key: &SeriesKey) -> Option<Series> {
        let found = match key {
            SeriesKey::Id(id) => live.iter().find(|s| s.id() == Some(*id)),
            SeriesKey::Tvdb(tvdb_id) => live.iter().find(|s| s.tvdb_id() == Some(*tvdb_id)),
            SeriesKey::Series(series) => series
                .tvdb_id()
                .and_then(|tvdb_id| live.iter().find(|s| s.tvdb_id() == Some(tvdb_id)))
                .or_else(|| {
                    series
                        .id()
                        .and_then(|id| live.iter().find(|s| s.id() == Some(id)))
                }),
        };
        found.cloned()
    }

    fn detach(&self, item: &mut Series) -> Result<()> {
        item.detach()
    }

    async fn update_monitoring(&self, ids: &[i64], monitor: &str) -> Result<()> {
        self.update_season_pass(ids, monitor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_series_defaults() {
        let request = AddSeries::new(1, "Any");
        assert_eq!(request.root_folder, Selector::Id(1));
        assert_eq!(request.monitor, "all");
        assert_eq!(request.series_type, "standard");
        assert!(request.season_folder);
        assert!(request.search);
        assert!(!request.unmet_search);
        assert!(request.language_profile.is_none());
    }

    #[test]
    fn test_add_series_builder() {
        let request = AddSeries::new("/tv", "HD-1080p")
            .language_profile("English")
            .monitor("future")
            .series_type("anime")
            .tags([TagRef::Id(3)]);
        assert_eq!(
            request.language_profile,
            Some(Selector::Name("English".into()))
        );
        assert_eq!(request.monitor, "future");
        assert_eq!(request.series_type, "anime");
        assert_eq!(request.tags, vec![TagRef::Id(3)]);
    }

    #[test]
    fn test_empty_edit() {
        assert!(EditSeries::default().is_empty());
        let edit = EditSeries {
            monitor: Some("none".into()),
            ..Default::default()
        };
        assert!(!edit.is_empty());
    }

    #[test]
    fn test_series_key_from() {
        assert_eq!(SeriesKey::from(81189), SeriesKey::Tvdb(81189));
    }
}
