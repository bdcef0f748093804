//! API dialects spoken by *arr servers.
//!
//! A server is classified once, from the version string it reports on its
//! status endpoint. Every URL prefix and dialect-specific field name is a
//! pure function of the resulting [`Dialect`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// API generation of a server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Music and book managers, served under `/api/v1`.
    V1,
    /// Version 2 servers (and v3 builds keeping the v2 layout), under `/api`.
    Legacy,
    /// Version 3 servers, under `/api/v3`.
    V3,
    /// Version 4 and later. Same prefix as V3, without language profiles.
    V4,
}

impl Dialect {
    /// Classify a reported version string.
    ///
    /// `force_v1` wins over the version number. Otherwise the leading
    /// major number decides: up to 2 is legacy, 3 is V3, anything newer V4.
    /// Returns `None` when no major number can be read.
    pub fn classify(version: &str, force_v1: bool) -> Option<Self> {
        if force_v1 {
            return Some(Self::V1);
        }
        let major: String = version
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        match major.parse::<u32>().ok()? {
            0..=2 => Some(Self::Legacy),
            3 => Some(Self::V3),
            _ => Some(Self::V4),
        }
    }

    /// Dialects to probe, newest layout first.
    pub fn probe_order(force_v1: bool) -> &'static [Dialect] {
        if force_v1 {
            &[Self::V1]
        } else {
            &[Self::V3, Self::Legacy]
        }
    }

    /// URL prefix for every endpoint.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::V1 => "/api/v1",
            Self::Legacy => "/api",
            Self::V3 | Self::V4 => "/api/v3",
        }
    }

    /// Resource name of quality profiles.
    pub fn quality_profile_resource(self) -> &'static str {
        match self {
            Self::Legacy => "profile",
            _ => "qualityProfile",
        }
    }

    /// Payload field carrying an item's quality profile id.
    pub fn quality_profile_field(self) -> &'static str {
        match self {
            Self::Legacy => "profileId",
            _ => "qualityProfileId",
        }
    }

    /// Whether `tag/detail` endpoints exist.
    pub fn supports_tag_detail(self) -> bool {
        !matches!(self, Self::Legacy)
    }

    /// Whether the server still has language profiles.
    pub fn has_language_profiles(self) -> bool {
        matches!(self, Self::Legacy | Self::V3)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::Legacy => write!(f, "legacy"),
            Self::V3 => write!(f, "v3"),
            Self::V4 => write!(f, "v4"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_major() {
        assert_eq!(Dialect::classify("0.2.0.1358", false), Some(Dialect::Legacy));
        assert_eq!(Dialect::classify("2.0.0.5344", false), Some(Dialect::Legacy));
        assert_eq!(Dialect::classify("3.2.2.5080", false), Some(Dialect::V3));
        assert_eq!(Dialect::classify("4.0.0.5831", false), Some(Dialect::V4));
        assert_eq!(Dialect::classify("5.3.6.8612", false), Some(Dialect::V4));
    }

    #[test]
    fn test_classify_forced_v1() {
        assert_eq!(Dialect::classify("3.2.2.5080", true), Some(Dialect::V1));
        assert_eq!(Dialect::classify("", true), Some(Dialect::V1));
    }

    #[test]
    fn test_classify_unreadable() {
        assert_eq!(Dialect::classify("", false), None);
        assert_eq!(Dialect::classify("nightly", false), None);
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(Dialect::V1.prefix(), "/api/v1");
        assert_eq!(Dialect::Legacy.prefix(), "/api");
        assert_eq!(Dialect::V3.prefix(), "/api/v3");
        assert_eq!(Dialect::V4.prefix(), "/api/v3");
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Dialect::Legacy.quality_profile_resource(), "profile");
        assert_eq!(Dialect::Legacy.quality_profile_field(), "profileId");
        assert_eq!(Dialect::V3.quality_profile_resource(), "qualityProfile");
        assert_eq!(Dialect::V1.quality_profile_field(), "qualityProfileId");
        assert!(!Dialect::Legacy.supports_tag_detail());
        assert!(Dialect::V4.supports_tag_detail());
        assert!(Dialect::V3.has_language_profiles());
        assert!(!Dialect::V4.has_language_profiles());
        assert!(!Dialect::V1.has_language_profiles());
    }

    #[test]
    fn test_probe_order() {
        assert_eq!(Dialect::probe_order(true), &[Dialect::V1]);
        assert_eq!(Dialect::probe_order(false), &[Dialect::V3, Dialect::Legacy]);
    }
}
