use super::batch::{
    check_per_request, AddItem, BatchOutcome, BatchReconciler, Catalog, ExclusionList,
};
use super::client::{into_items, VersionedClient};
use super::options::{ApplyTags, EditOptions};
use super::resolve::{resolve_enum, ProfileKind, Selector, TagRef};
use super::ArrClient;
use crate::config::ArrType;
use crate::model::{Exclusion, Movie};
use arrlink_common::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub const MINIMUM_AVAILABILITY_OPTIONS: [&str; 4] = ["announced", "inCinemas", "released", "preDB"];

/// Ways of naming a movie.
///
/// Bare integers are TMDb ids; strings starting with `tt` are IMDb ids.
#[derive(Debug, Clone, PartialEq)]
pub enum MovieKey {
    /// Radarr's own id.
    Id(i64),
    Tmdb(i64),
    Imdb(String),
    Movie(Movie),
}

impl From<i64> for MovieKey {
    fn from(tmdb_id: i64) -> Self {
        Self::Tmdb(tmdb_id)
    }
}

impl From<&str> for MovieKey {
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(tmdb_id) => Self::Tmdb(tmdb_id),
            Err(_) => Self::Imdb(value.to_string()),
        }
    }
}

impl From<Movie> for MovieKey {
    fn from(movie: Movie) -> Self {
        Self::Movie(movie)
    }
}

impl From<&Movie> for MovieKey {
    fn from(movie: &Movie) -> Self {
        Self::Movie(movie.clone())
    }
}

/// Parameters for adding movies, before validation.
#[derive(Debug, Clone)]
pub struct AddMovie {
    pub root_folder: Selector,
    pub quality_profile: Selector,
    pub monitored: bool,
    pub search: bool,
    pub minimum_availability: String,
    pub tags: Vec<TagRef>,
}

impl AddMovie {
    pub fn new(root_folder: impl Into<Selector>, quality_profile: impl Into<Selector>) -> Self {
        Self {
            root_folder: root_folder.into(),
            quality_profile: quality_profile.into(),
            monitored: true,
            search: true,
            minimum_availability: "announced".to_string(),
            tags: Vec::new(),
        }
    }

    pub fn monitored(mut self, monitored: bool) -> Self {
        self.monitored = monitored;
        self
    }

    pub fn search(mut self, search: bool) -> Self {
        self.search = search;
        self
    }

    pub fn minimum_availability(mut self, value: &str) -> Self {
        self.minimum_availability = value.to_string();
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

/// Parameters for editing movies, before validation. Unset fields are left
/// alone; `apply_tags` defaults to `add`.
#[derive(Debug, Clone, Default)]
pub struct EditMovie {
    pub root_folder: Option<Selector>,
    pub path: Option<String>,
    pub move_files: bool,
    pub quality_profile: Option<Selector>,
    pub monitored: Option<bool>,
    pub minimum_availability: Option<String>,
    pub tags: Option<Vec<TagRef>>,
    pub apply_tags: Option<String>,
}

impl EditMovie {
    fn is_empty(&self) -> bool {
        self.root_folder.is_none()
            && self.path.is_none()
            && self.quality_profile.is_none()
            && self.monitored.is_none()
            && self.minimum_availability.is_none()
            && self.tags.is_none()
    }
}

/// Validated add parameters, holding canonical ids only.
#[derive(Debug, Clone)]
pub struct MovieAddOptions {
    pub(crate) root_folder: String,
    pub(crate) quality_profile_id: i64,
    pub(crate) monitored: bool,
    pub(crate) search: bool,
    pub(crate) minimum_availability: String,
    pub(crate) tags: Vec<i64>,
}

impl MovieAddOptions {
    pub fn root_folder(&self) -> &str {
        &self.root_folder
    }

    pub fn quality_profile_id(&self) -> i64 {
        self.quality_profile_id
    }

    pub fn tags(&self) -> &[i64] {
        &self.tags
    }
}

/// Client for movie servers.
#[derive(Debug, Clone)]
pub struct RadarrClient {
    api: VersionedClient,
    exclusions: Option<Arc<ExclusionList>>,
}

impl RadarrClient {
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

    // ------------------------------------------------------------------
    // Exclusions
    // ------------------------------------------------------------------

    pub async fn exclusions(&self) -> Result<Vec<Exclusion>> {
        into_items(self.api.get("exclusions", &[]).await?)?
            .into_iter()
            .map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| Error::connection(format!("unexpected exclusion payload: {}", e)))
            })
            .collect()
    }

    pub async fn add_exclusion(&self, title: &str, tmdb_id: i64, year: i32) -> Result<Exclusion> {
        let payload = self
            .api
            .post(
                "exclusions",
                &json!({ "movieTitle": title, "tmdbId": tmdb_id, "movieYear": year }),
            )
            .await?;
        serde_json::from_value(payload)
            .map_err(|e| Error::connection(format!("unexpected exclusion payload: {}", e)))
    }

    /// Load the exclusion list once; later adds skip anything on it.
    /// Returns the number of excluded movies.
    pub async fn respect_list_exclusions_when_adding(&mut self) -> Result<usize> {
        let list: ExclusionList = self
            .exclusions()
            .await?
            .iter()
            .filter_map(Exclusion::external_id)
            .collect();
        let count = list.len();
        tracing::debug!(count, "loaded movie exclusions");
        self.exclusions = Some(Arc::new(list));
        Ok(count)
    }

    pub fn exclusion_list(&self) -> Option<&ExclusionList> {
        self.exclusions.as_deref()
    }

    // ------------------------------------------------------------------
    // Movies
    // ------------------------------------------------------------------

    /// Fetch a movie, by id or through a TMDb/IMDb lookup.
    pub async fn get_movie(&self, key: impl Into<MovieKey>) -> Result<Movie> {
        match key.into() {
            MovieKey::Id(id) => {
                let payload = self.api.get(&format!("movie/{}", id), &[]).await?;
                Movie::full(self.clone(), payload)
            }
            MovieKey::Tmdb(tmdb_id) => {
                Movie::full(self.clone(), self.lookup(&format!("tmdb:{}", tmdb_id)).await?)
            }
            MovieKey::Imdb(imdb_id) => {
                Movie::full(self.clone(), self.lookup(&format!("imdb:{}", imdb_id)).await?)
            }
            MovieKey::Movie(mut movie) => {
                if !movie.is_materialized() {
                    movie.reload().await?;
                }
                Ok(movie)
            }
        }
    }

    /// A movie known only by its key. Nothing is fetched until a field is
    /// read through `get`.
    pub fn stub_movie(&self, key: impl Into<MovieKey>) -> Result<Movie> {
        let identity = match key.into() {
            MovieKey::Id(id) => json!({ "id": id }),
            MovieKey::Tmdb(tmdb_id) => json!({ "tmdbId": tmdb_id }),
            MovieKey::Imdb(imdb_id) => json!({ "imdbId": imdb_id }),
            MovieKey::Movie(movie) => return Ok(movie),
        };
        Movie::stub(self.clone(), identity)
    }

    pub async fn all_movies(&self) -> Result<Vec<Movie>> {
        into_items(self.api.get("movie", &[]).await?)?
            .into_iter()
            .map(|item| Movie::stub(self.clone(), item))
            .collect()
    }

    pub async fn search_movies(&self, term: &str) -> Result<Vec<Movie>> {
        into_items(
            self.api
                .get("movie/lookup", &[("term", term.to_string())])
                .await?,
        )?
        .into_iter()
        .map(|item| Movie::stub(self.clone(), item))
        .collect()
    }

    pub async fn add_movie(&self, key: impl Into<MovieKey>, request: &AddMovie) -> Result<Movie> {
        let mut movie = self.get_movie(key).await?;
        movie.add(request).await?;
        Ok(movie)
    }

    pub async fn edit_movie(&self, key: impl Into<MovieKey>, request: &EditMovie) -> Result<Movie> {
        let mut movie = self.get_movie(key).await?;
        movie.edit(request).await?;
        Ok(movie)
    }

    pub async fn delete_movie(
        &self,
        key: impl Into<MovieKey>,
        add_exclusion: bool,
        delete_files: bool,
    ) -> Result<Movie> {
        let mut movie = self.get_movie(key).await?;
        movie.delete(add_exclusion, delete_files).await?;
        Ok(movie)
    }

    // ------------------------------------------------------------------
    // Batches
    // ------------------------------------------------------------------

    pub async fn add_multiple_movies<I>(
        &self,
        items: I,
        request: &AddMovie,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<Movie, MovieKey>>
    where
        I: IntoIterator,
        I::Item: Into<AddItem<MovieKey>>,
    {
        check_per_request(per_request)?;
        let items = items.into_iter().map(Into::into).collect();
        let options = self.validate_add(request).await?;
        BatchReconciler::new(self, self.exclusion_list())
            .add(items, &options, per_request)
            .await
    }

    pub async fn edit_multiple_movies<I>(
        &self,
        keys: I,
        request: &EditMovie,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<Movie, MovieKey>>
    where
        I: IntoIterator,
        I::Item: Into<MovieKey>,
    {
        check_per_request(per_request)?;
        let keys = keys.into_iter().map(Into::into).collect();
        let options = self.validate_edit(request).await?;
        BatchReconciler::new(self, None)
            .edit(keys, &options, per_request)
            .await
    }

    pub async fn delete_multiple_movies<I>(
        &self,
        keys: I,
        add_exclusion: bool,
        delete_files: bool,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<Movie, MovieKey>>
    where
        I: IntoIterator,
        I::Item: Into<MovieKey>,
    {
        check_per_request(per_request)?;
        let keys = keys.into_iter().map(Into::into).collect();
        BatchReconciler::new(self, None)
            .delete(keys, delete_files, add_exclusion, per_request)
            .await
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    pub(crate) async fn validate_add(&self, request: &AddMovie) -> Result<MovieAddOptions> {
        let minimum_availability = resolve_enum(
            "Minimum Availability",
            &request.minimum_availability,
            &MINIMUM_AVAILABILITY_OPTIONS,
        )?;
        let root_folder = self.api.resolve_root_folder(&request.root_folder).await?;
        let quality_profile_id = self
            .api
            .resolve_profile(ProfileKind::Quality, &request.quality_profile)
            .await?;
        let tags = self.api.resolve_tags(&request.tags, true).await?;

        Ok(MovieAddOptions {
            root_folder,
            quality_profile_id,
            monitored: request.monitored,
            search: request.search,
            minimum_availability,
            tags,
        })
    }

    pub(crate) async fn validate_edit(&self, request: &EditMovie) -> Result<EditOptions> {
        if request.is_empty() {
            return Err(Error::invalid_argument(
                "movie edit requires at least one field to change",
            ));
        }
        let mode = ApplyTags::parse(request.apply_tags.as_deref().unwrap_or("add"))?;
        let minimum_availability = request
            .minimum_availability
            .as_deref()
            .map(|value| {
                resolve_enum("Minimum Availability", value, &MINIMUM_AVAILABILITY_OPTIONS)
            })
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
        if let Some(monitored) = request.monitored {
            options.set("monitored", monitored);
        }
        if let Some(value) = minimum_availability {
            options.set("minimumAvailability", value);
        }
        if let Some(tags) = &request.tags {
            let ids = self.api.resolve_tags(tags, mode.creates_missing()).await?;
            options.set_tags(mode, ids);
        }
        options.set_move_files(request.move_files);
        Ok(options)
    }

    /// First lookup result for a `tmdb:`/`imdb:` term.
    pub(crate) async fn lookup(&self, term: &str) -> Result<Value> {
        into_items(
            self.api
                .get("movie/lookup", &[("term", term.to_string())])
                .await?,
        )?
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(format!("no movie found for '{}'", term)))
    }
}

#[async_trait]
impl ArrClient for RadarrClient {
    fn api(&self) -> &VersionedClient {
        &self.api
    }

    fn kind(&self) -> ArrType {
        ArrType::Radarr
    }
}

#[async_trait]
impl Catalog for RadarrClient {
    type Item = Movie;
    type Key = MovieKey;
    type AddOptions = MovieAddOptions;

    fn api(&self) -> &VersionedClient {
        &self.api
    }

    fn resource(&self) -> &'static str {
        "movie"
    }

    fn ids_field(&self) -> &'static str {
        "movieIds"
    }

    fn item_id(&self, item: &Movie) -> Option<i64> {
        item.id()
    }

    fn external_id(&self, item: &Movie) -> Option<i64> {
        item.tmdb_id()
    }

    fn key_external_id(&self, key: &MovieKey) -> Option<i64> {
        match key {
            MovieKey::Tmdb(tmdb_id) => Some(*tmdb_id),
            MovieKey::Movie(movie) => movie.tmdb_id(),
            MovieKey::Id(_) | MovieKey::Imdb(_) => None,
        }
    }

    async fn resolve(&self, key: &MovieKey) -> Result<Movie> {
        self.get_movie(key.clone()).await
    }

    fn creation_payload(
        &self,
        item: &Movie,
        options: &MovieAddOptions,
        path: Option<&str>,
    ) -> Result<Value> {
        item.creation_payload(options, path)
    }

    fn materialize(&self, payload: Value) -> Result<Movie> {
        Movie::full(self.clone(), payload)
    }

    async fn catalog_items(&self) -> Result<Vec<Movie>> {
        self.all_movies().await
    }

    fn match_key(&self, live: &[Movie], key: &MovieKey) -> Option<Movie> {
        let found = match key {
            MovieKey::Id(id) => live.iter().find(|m| m.id() == Some(*id)),
            MovieKey::Tmdb(tmdb_id) => live.iter().find(|m| m.tmdb_id() == Some(*tmdb_id)),
            MovieKey::Imdb(imdb_id) => live
                .iter()
                .find(|m| m.imdb_id() == Some(imdb_id.as_str())),
            MovieKey::Movie(movie) => movie
                .tmdb_id()
                .and_then(|tmdb_id| live.iter().find(|m| m.tmdb_id() == Some(tmdb_id)))
                .or_else(|| {
                    movie
                        .id()
                        .and_then(|id| live.iter().find(|m| m.id() == Some(id)))
                })
                .or_else(|| {
                    movie
                        .imdb_id()
                        .and_then(|imdb_id| live.iter().find(|m| m.imdb_id() == Some(imdb_id)))
                }),
        };
        found.cloned()
    }

    fn detach(&self, item: &mut Movie) -> Result<()> {
        item.detach()
    }
}
