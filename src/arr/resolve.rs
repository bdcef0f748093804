//! Mapping caller-facing identifiers onto canonical server ids.

use super::client::VersionedClient;
use crate::model::{LanguageProfile, MetadataProfile, QualityProfile, RootFolder, Tag};
use arrlink_common::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A profile or root folder given by id or by name/path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(i64),
    Name(String),
}

impl From<i64> for Selector {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

macro_rules! selector_from_profile {
    ($($entity:ty),*) => {
        $(impl From<&$entity> for Selector {
            fn from(profile: &$entity) -> Self {
                match profile.id() {
                    Some(id) => Self::Id(id),
                    None => Self::Name(profile.name().unwrap_or_default().to_string()),
                }
            }
        })*
    };
}

selector_from_profile!(QualityProfile, LanguageProfile, MetadataProfile);

impl From<&RootFolder> for Selector {
    fn from(folder: &RootFolder) -> Self {
        match folder.id() {
            Some(id) => Self::Id(id),
            None => Self::Name(folder.path().unwrap_or_default().to_string()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A tag given by id or by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRef {
    Id(i64),
    Label(String),
}

impl From<i64> for TagRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for TagRef {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

impl From<String> for TagRef {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        match tag.id() {
            Some(id) => Self::Id(id),
            None => Self::Label(tag.label().unwrap_or_default().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Quality,
    Language,
    Metadata,
}

impl ProfileKind {
    fn title(self) -> &'static str {
        match self {
            Self::Quality => "Quality Profile",
            Self::Language => "Language Profile",
            Self::Metadata => "Metadata Profile",
        }
    }
}

/// Exact-match validation of an enumerated option.
pub fn resolve_enum(title: &str, value: &str, allowed: &[&str]) -> Result<String> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(Error::invalid(title, value, allowed.iter().copied()))
    }
}

impl VersionedClient {
    /// Map tag labels and ids onto server ids.
    ///
    /// With `create_missing`, labels the server does not know yet are
    /// created first. Labels match case-insensitively. Inputs that still do
    /// not resolve are dropped.
    pub async fn resolve_tags(&self, tags: &[TagRef], create_missing: bool) -> Result<Vec<i64>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        if create_missing {
            let known: HashSet<String> = self
                .tags(false)
                .await?
                .iter()
                .filter_map(|t| t.label().map(str::to_lowercase))
                .collect();
            let mut created = HashSet::new();
            for tag in tags {
                if let TagRef::Label(label) = tag {
                    let label = label.to_lowercase();
                    if !known.contains(&label) && created.insert(label.clone()) {
                        self.create_tag(&label).await?;
                    }
                }
            }
        }

        let mut by_label = HashMap::new();
        let mut ids = HashSet::new();
        for tag in self.tags(false).await? {
            if let Some(id) = tag.id() {
                ids.insert(id);
                if let Some(label) = tag.label() {
                    by_label.insert(label.to_lowercase(), id);
                }
            }
        }

        let mut resolved = Vec::with_capacity(tags.len());
        for tag in tags {
            let id = match tag {
                TagRef::Id(id) => ids.contains(id).then_some(*id),
                TagRef::Label(label) => by_label.get(&label.to_lowercase()).copied(),
            };
            match id {
                Some(id) if !resolved.contains(&id) => resolved.push(id),
                Some(_) => {}
                None => tracing::warn!(tag = ?tag, "dropping tag that does not exist on the server"),
            }
        }
        Ok(resolved)
    }

    /// Canonical id of a profile, or `Invalid` listing every profile name.
    pub async fn resolve_profile(&self, kind: ProfileKind, selector: &Selector) -> Result<i64> {
        let options: Vec<(Option<i64>, String)> = match kind {
            ProfileKind::Quality => self
                .quality_profiles()
                .await?
                .iter()
                .map(|p| (p.id(), p.name().unwrap_or_default().to_string()))
                .collect(),
            ProfileKind::Language => self
                .language_profiles()
                .await?
                .iter()
                .map(|p| (p.id(), p.name().unwrap_or_default().to_string()))
                .collect(),
            ProfileKind::Metadata => self
                .metadata_profiles()
                .await?
                .iter()
                .map(|p| (p.id(), p.name().unwrap_or_default().to_string()))
                .collect(),
        };

        let found = options.iter().find_map(|(id, name)| match selector {
            Selector::Id(wanted) => id.filter(|id| id == wanted),
            Selector::Name(wanted) if name == wanted => *id,
            Selector::Name(_) => None,
        });

        found.ok_or_else(|| {
            Error::invalid(
                kind.title(),
                selector.to_string(),
                options.into_iter().map(|(_, name)| name),
            )
        })
    }

    /// Canonical path of a root folder, or `Invalid` listing every path.
    pub async fn resolve_root_folder(&self, selector: &Selector) -> Result<String> {
        let folders = self.root_folders().await?;
        let found = folders.iter().find(|folder| match selector {
            Selector::Id(id) => folder.id() == Some(*id),
            Selector::Name(path) => folder.path() == Some(path.as_str()),
        });

        match found.and_then(RootFolder::path) {
            Some(path) => Ok(path.to_string()),
            None => Err(Error::invalid(
                "Root Folder",
                selector.to_string(),
                folders
                    .iter()
                    .map(|f| f.path().unwrap_or_default().to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_enum() {
        let allowed = ["standard", "daily", "anime"];
        assert_eq!(resolve_enum("Series Type", "daily", &allowed).unwrap(), "daily");

        match resolve_enum("Series Type", "Daily", &allowed).unwrap_err() {
            Error::Invalid { value, options, .. } => {
                assert_eq!(value, "Daily");
                assert_eq!(options, vec!["standard", "daily", "anime"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Selector::from(4), Selector::Id(4));
        assert_eq!(Selector::from("HD-1080p"), Selector::Name("HD-1080p".into()));
        assert_eq!(TagRef::from(2), TagRef::Id(2));
        assert_eq!(TagRef::from("Kids"), TagRef::Label("Kids".into()));
        assert_eq!(Selector::Name("/movies".into()).to_string(), "/movies");
    }
}
