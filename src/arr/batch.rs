//! Bulk add, edit and delete with partitioned outcomes.
//!
//! Every operation classifies its inputs first and then talks to the
//! catalog's bulk endpoints in chunks. Chunks are sent one after another in
//! input order; a failing chunk aborts the ones not yet sent.

use super::client::{into_items, VersionedClient};
use super::options::EditOptions;
use arrlink_common::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;

/// Result of a batch operation. Callers are expected to look at all three.
#[derive(Debug)]
pub struct BatchOutcome<E, K> {
    /// Entities the server added, edited or deleted.
    pub processed: Vec<E>,
    /// Entities that were already present, so nothing was done for them.
    pub existing: Vec<E>,
    /// Identifiers that could not be resolved or are excluded.
    pub invalid: Vec<K>,
}

impl<E, K> BatchOutcome<E, K> {
    fn new() -> Self {
        Self {
            processed: Vec::new(),
            existing: Vec::new(),
            invalid: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (Vec<E>, Vec<E>, Vec<K>) {
        (self.processed, self.existing, self.invalid)
    }
}

/// One entry of a bulk add, with an optional destination path.
#[derive(Debug, Clone, PartialEq)]
pub struct AddItem<K> {
    pub key: K,
    pub path: Option<String>,
}

impl<K> From<K> for AddItem<K> {
    fn from(key: K) -> Self {
        Self { key, path: None }
    }
}

impl<K> From<(K, &str)> for AddItem<K> {
    fn from((key, path): (K, &str)) -> Self {
        Self {
            key,
            path: Some(path.to_string()),
        }
    }
}

impl<K> From<(K, String)> for AddItem<K> {
    fn from((key, path): (K, String)) -> Self {
        Self {
            key,
            path: Some(path),
        }
    }
}

/// External ids on a catalog's "do not re-add" list.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    ids: HashSet<i64>,
}

impl ExclusionList {
    pub fn contains(&self, external_id: i64) -> bool {
        self.ids.contains(&external_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<i64> for ExclusionList {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// What the reconciler needs to know about one catalog (movies, series).
#[async_trait]
pub trait Catalog: Send + Sync {
    type Item: Clone + Send + Sync;
    type Key: Clone + fmt::Debug + Send + Sync;
    type AddOptions: Send + Sync;

    fn api(&self) -> &VersionedClient;

    /// Resource name, e.g. `movie`.
    fn resource(&self) -> &'static str;

    /// Field carrying item ids in editor requests, e.g. `movieIds`.
    fn ids_field(&self) -> &'static str;

    fn item_id(&self, item: &Self::Item) -> Option<i64>;

    /// External id checked against the exclusion list.
    fn external_id(&self, item: &Self::Item) -> Option<i64>;

    /// External id carried by the key itself, if any.
    fn key_external_id(&self, key: &Self::Key) -> Option<i64>;

    /// Materialize the entity a key refers to. `NotFound` and
    /// `InvalidArgument` mean this key alone is unresolvable.
    async fn resolve(&self, key: &Self::Key) -> Result<Self::Item>;

    /// Creation payload, or `Exists` when the item already has a server id.
    fn creation_payload(
        &self,
        item: &Self::Item,
        options: &Self::AddOptions,
        path: Option<&str>,
    ) -> Result<Value>;

    fn materialize(&self, payload: Value) -> Result<Self::Item>;

    /// Every item currently in the catalog.
    async fn catalog_items(&self) -> Result<Vec<Self::Item>>;

    fn match_key(&self, live: &[Self::Item], key: &Self::Key) -> Option<Self::Item>;

    /// Forget the server id of a deleted item.
    fn detach(&self, item: &mut Self::Item) -> Result<()>;

    /// Separate monitoring update issued before a bulk edit.
    async fn update_monitoring(&self, _ids: &[i64], _monitor: &str) -> Result<()> {
        Ok(())
    }
}

/// Reject a zero chunk size before anything touches the server.
pub(crate) fn check_per_request(per_request: Option<usize>) -> Result<()> {
    match per_request {
        Some(0) => Err(Error::invalid_argument("per_request must be at least 1")),
        _ => Ok(()),
    }
}

/// Number of items per request. `None` sends everything at once.
pub(crate) fn chunk_size(per_request: Option<usize>, total: usize) -> Result<usize> {
    match per_request {
        Some(0) => Err(Error::invalid_argument("per_request must be at least 1")),
        Some(size) => Ok(size),
        None => Ok(total.max(1)),
    }
}

pub struct BatchReconciler<'a, C: Catalog> {
    catalog: &'a C,
    exclusions: Option<&'a ExclusionList>,
}

impl<'a, C: Catalog> BatchReconciler<'a, C> {
    pub fn new(catalog: &'a C, exclusions: Option<&'a ExclusionList>) -> Self {
        Self {
            catalog,
            exclusions,
        }
    }

    fn is_excluded(&self, external_id: Option<i64>) -> bool {
        match (self.exclusions, external_id) {
            (Some(list), Some(id)) => list.contains(id),
            _ => false,
        }
    }

    /// Add every resolvable new item through the bulk import endpoint.
    ///
    /// Path overrides outside the chosen root folder fail the whole call
    /// before anything is sent.
    pub async fn add(
        &self,
        items: Vec<AddItem<C::Key>>,
        options: &C::AddOptions,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<C::Item, C::Key>> {
        check_per_request(per_request)?;
        let mut outcome = BatchOutcome::new();
        let mut payloads = Vec::new();

        for AddItem { key, path } in items {
            if self.is_excluded(self.catalog.key_external_id(&key)) {
                tracing::debug!(key = ?key, "skipping excluded item");
                outcome.invalid.push(key);
                continue;
            }

            let item = match self.catalog.resolve(&key).await {
                Ok(item) => item,
                Err(Error::NotFound(reason)) | Err(Error::InvalidArgument(reason)) => {
                    tracing::debug!(key = ?key, reason = %reason, "item cannot be resolved");
                    outcome.invalid.push(key);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.is_excluded(self.catalog.external_id(&item)) {
                tracing::debug!(key = ?key, "skipping excluded item");
                outcome.invalid.push(key);
                continue;
            }

            match self
                .catalog
                .creation_payload(&item, options, path.as_deref())
            {
                Ok(payload) => payloads.push(payload),
                Err(Error::Exists(_)) => outcome.existing.push(item),
                Err(e) => return Err(e),
            }
        }

        if !payloads.is_empty() {
            let size = chunk_size(per_request, payloads.len())?;
            let path = format!("{}/import", self.catalog.resource());
            for chunk in payloads.chunks(size) {
                let response = self
                    .catalog
                    .api()
                    .post(&path, &Value::Array(chunk.to_vec()))
                    .await?;
                for payload in into_items(response)? {
                    outcome.processed.push(self.catalog.materialize(payload)?);
                }
            }
        }

        tracing::info!(
            resource = self.catalog.resource(),
            added = outcome.processed.len(),
            existing = outcome.existing.len(),
            invalid = outcome.invalid.len(),
            "batch add finished"
        );
        Ok(outcome)
    }

    /// Apply one edit to every matched item.
    pub async fn edit(
        &self,
        keys: Vec<C::Key>,
        options: &EditOptions,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<C::Item, C::Key>> {
        check_per_request(per_request)?;
        let (matched, mut outcome) = self.partition(keys).await?;
        if matched.is_empty() {
            return Ok(outcome);
        }

        let ids = self.ids_of(&matched);
        let size = chunk_size(per_request, ids.len())?;

        if let Some(monitor) = options.monitor() {
            for chunk in ids.chunks(size) {
                self.catalog.update_monitoring(chunk, monitor).await?;
            }
        }

        let path = format!("{}/editor", self.catalog.resource());
        for (chunk, items) in ids.chunks(size).zip(matched.chunks(size)) {
            let body = options.bulk_payload(self.catalog.ids_field(), chunk);
            let response = self.catalog.api().put(&path, &body, &[]).await?;
            match response {
                Value::Array(payloads) => {
                    for payload in payloads {
                        outcome.processed.push(self.catalog.materialize(payload)?);
                    }
                }
                _ => outcome.processed.extend(items.iter().cloned()),
            }
        }

        tracing::info!(
            resource = self.catalog.resource(),
            edited = outcome.processed.len(),
            invalid = outcome.invalid.len(),
            "batch edit finished"
        );
        Ok(outcome)
    }

    /// Delete every matched item. Returned entities no longer carry an id.
    pub async fn delete(
        &self,
        keys: Vec<C::Key>,
        delete_files: bool,
        add_exclusion: bool,
        per_request: Option<usize>,
    ) -> Result<BatchOutcome<C::Item, C::Key>> {
        check_per_request(per_request)?;
        let (matched, mut outcome) = self.partition(keys).await?;
        if matched.is_empty() {
            return Ok(outcome);
        }

        let ids = self.ids_of(&matched);
        let size = chunk_size(per_request, ids.len())?;
        let path = format!("{}/editor", self.catalog.resource());
        for (chunk, items) in ids.chunks(size).zip(matched.chunks(size)) {
            let mut body = json!({
                "deleteFiles": delete_files,
                "addImportExclusion": add_exclusion,
            });
            body[self.catalog.ids_field()] = Value::from(chunk.to_vec());
            self.catalog.api().delete(&path, Some(&body), &[]).await?;
            for item in items {
                let mut item = item.clone();
                self.catalog.detach(&mut item)?;
                outcome.processed.push(item);
            }
        }

        tracing::info!(
            resource = self.catalog.resource(),
            deleted = outcome.processed.len(),
            invalid = outcome.invalid.len(),
            "batch delete finished"
        );
        Ok(outcome)
    }

    /// Match keys against the live catalog. Each item is kept once.
    async fn partition(
        &self,
        keys: Vec<C::Key>,
    ) -> Result<(Vec<C::Item>, BatchOutcome<C::Item, C::Key>)> {
        let live = self.catalog.catalog_items().await?;
        let mut outcome = BatchOutcome::new();
        let mut matched = Vec::new();
        let mut seen = HashSet::new();

        for key in keys {
            match self.catalog.match_key(&live, &key) {
                Some(item) => {
                    if let Some(id) = self.catalog.item_id(&item) {
                        if seen.insert(id) {
                            matched.push(item);
                        }
                    }
                }
                None => {
                    tracing::debug!(key = ?key, "no catalog item matches");
                    outcome.invalid.push(key);
                }
            }
        }
        Ok((matched, outcome))
    }

    fn ids_of(&self, items: &[C::Item]) -> Vec<i64> {
        items
            .iter()
            .filter_map(|item| self.catalog.item_id(item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size() {
        assert_eq!(chunk_size(None, 2500).unwrap(), 2500);
        assert_eq!(chunk_size(None, 0).unwrap(), 1);
        assert_eq!(chunk_size(Some(1000), 2500).unwrap(), 1000);
        assert!(matches!(
            chunk_size(Some(0), 10),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_check_per_request() {
        assert!(check_per_request(None).is_ok());
        assert!(check_per_request(Some(1)).is_ok());
        assert!(matches!(
            check_per_request(Some(0)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_chunks_cover_everything() {
        let ids: Vec<i64> = (1..=2500).collect();
        let size = chunk_size(Some(1000), ids.len()).unwrap();
        let chunks: Vec<usize> = ids.chunks(size).map(<[i64]>::len).collect();
        assert_eq!(chunks, vec![1000, 1000, 500]);
    }

    #[test]
    fn test_add_item_from() {
        let plain: AddItem<i64> = 603.into();
        assert_eq!(plain.path, None);
        let with_path: AddItem<i64> = (603, "/movies/The Matrix (1999)").into();
        assert_eq!(with_path.path.as_deref(), Some("/movies/The Matrix (1999)"));
    }

    #[test]
    fn test_exclusion_list() {
        let list: ExclusionList = [603, 604].into_iter().collect();
        assert!(list.contains(603));
        assert!(!list.contains(1));
        assert_eq!(list.len(), 2);
    }
}
