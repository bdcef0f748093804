//! Validated option values shared by single and bulk edits.

use super::resolve::resolve_enum;
use arrlink_common::Result;
use serde_json::{Map, Value};

/// How an edit combines its tags with the ones an item already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyTags {
    Add,
    Remove,
    Replace,
}

impl ApplyTags {
    pub const OPTIONS: [&'static str; 3] = ["add", "remove", "replace"];

    pub fn parse(value: &str) -> Result<Self> {
        match resolve_enum("Apply Tags", value, &Self::OPTIONS)?.as_str() {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            _ => Ok(Self::Replace),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
        }
    }

    /// Whether tags named in the edit may need creating first.
    pub fn creates_missing(self) -> bool {
        !matches!(self, Self::Remove)
    }

    /// Combine the current tag ids with the edit's.
    ///
    /// `Add` keeps the current order and appends new ids.
    pub fn apply(self, current: &[i64], ids: &[i64]) -> Vec<i64> {
        match self {
            Self::Add => {
                let mut merged = current.to_vec();
                for id in ids {
                    if !merged.contains(id) {
                        merged.push(*id);
                    }
                }
                merged
            }
            Self::Remove => current
                .iter()
                .copied()
                .filter(|id| !ids.contains(id))
                .collect(),
            Self::Replace => ids.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagEdit {
    pub(crate) mode: ApplyTags,
    pub(crate) ids: Vec<i64>,
}

/// Frozen edit parameters holding canonical ids only.
///
/// Built by a catalog client from a raw edit request, then used unchanged
/// for every item and chunk of the edit.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    fields: Map<String, Value>,
    tags: Option<TagEdit>,
    move_files: bool,
    monitor: Option<String>,
}

impl EditOptions {
    pub(crate) fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub(crate) fn set_tags(&mut self, mode: ApplyTags, ids: Vec<i64>) {
        self.tags = Some(TagEdit { mode, ids });
    }

    pub(crate) fn set_move_files(&mut self, move_files: bool) {
        self.move_files = move_files;
    }

    pub(crate) fn set_monitor(&mut self, monitor: String) {
        self.monitor = Some(monitor);
    }

    /// Monitoring option that needs a separate update before the edit.
    pub fn monitor(&self) -> Option<&str> {
        self.monitor.as_deref()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn tag_mode(&self) -> Option<ApplyTags> {
        self.tags.as_ref().map(|t| t.mode)
    }

    pub fn tag_ids(&self) -> &[i64] {
        self.tags.as_ref().map(|t| t.ids.as_slice()).unwrap_or_default()
    }

    /// Whether a single-item edit should ask the server to move files.
    pub(crate) fn moves_files(&self) -> bool {
        self.move_files
            && (self.fields.contains_key("path") || self.fields.contains_key("rootFolderPath"))
    }

    /// Apply the edit to a full item payload.
    pub(crate) fn apply_to(&self, payload: &mut Map<String, Value>) {
        for (key, value) in &self.fields {
            payload.insert(key.clone(), value.clone());
        }
        if let Some(tags) = &self.tags {
            let current = crate::model::id_list(payload.get("tags"));
            let next = tags.mode.apply(&current, &tags.ids);
            payload.insert("tags".to_string(), Value::from(next));
        }
    }

    /// Body of a bulk editor request for one chunk of ids.
    pub(crate) fn bulk_payload(&self, ids_field: &str, ids: &[i64]) -> Value {
        let mut body = self.fields.clone();
        body.insert("moveFiles".to_string(), Value::Bool(self.move_files));
        if let Some(tags) = &self.tags {
            body.insert("tags".to_string(), Value::from(tags.ids.clone()));
            body.insert("applyTags".to_string(), Value::from(tags.mode.as_str()));
        }
        body.insert(ids_field.to_string(), Value::from(ids.to_vec()));
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrlink_common::Error;
    use serde_json::json;

    #[test]
    fn test_apply_tag_modes() {
        let current = [3, 1, 2];
        assert_eq!(ApplyTags::Add.apply(&current, &[2, 5, 4]), vec![3, 1, 2, 5, 4]);
        assert_eq!(ApplyTags::Remove.apply(&current, &[1, 9]), vec![3, 2]);
        assert_eq!(ApplyTags::Replace.apply(&current, &[7]), vec![7]);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(ApplyTags::parse("remove").unwrap(), ApplyTags::Remove);
        assert!(matches!(
            ApplyTags::parse("merge"),
            Err(Error::Invalid { .. })
        ));
        assert!(!ApplyTags::Remove.creates_missing());
        assert!(ApplyTags::Replace.creates_missing());
    }

    #[test]
    fn test_apply_to_payload() {
        let mut options = EditOptions::default();
        options.set("monitored", false);
        options.set_tags(ApplyTags::Add, vec![4]);

        let mut payload = json!({"id": 1, "monitored": true, "tags": [1]})
            .as_object()
            .cloned()
            .unwrap();
        options.apply_to(&mut payload);
        assert_eq!(payload["monitored"], json!(false));
        assert_eq!(payload["tags"], json!([1, 4]));
    }

    #[test]
    fn test_bulk_payload() {
        let mut options = EditOptions::default();
        options.set("qualityProfileId", 6);
        options.set_tags(ApplyTags::Remove, vec![2]);
        options.set_move_files(true);

        let body = options.bulk_payload("movieIds", &[10, 11]);
        assert_eq!(
            body,
            json!({
                "qualityProfileId": 6,
                "moveFiles": true,
                "tags": [2],
                "applyTags": "remove",
                "movieIds": [10, 11],
            })
        );
    }

    #[test]
    fn test_moves_files_needs_a_path() {
        let mut options = EditOptions::default();
        options.set_move_files(true);
        options.set("monitored", true);
        assert!(!options.moves_files());
        options.set("path", "/movies/Alien (1979)");
        assert!(options.moves_files());
    }
}
