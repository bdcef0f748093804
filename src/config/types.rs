use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub instances: Vec<ArrConfig>,
}

impl Config {
    /// Look up an instance by name. Without a name, the first enabled
    /// instance is returned.
    pub fn find_instance(&self, name: Option<&str>) -> Option<&ArrConfig> {
        match name {
            Some(name) => self.instances.iter().find(|i| i.name == name),
            None => self.instances.iter().find(|i| i.enabled),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArrConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub arr_type: ArrType,

    pub url: String,

    pub api_key: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Load the exclusion list on connect and skip excluded items when
    /// adding (default: false)
    #[serde(default)]
    pub respect_exclusions: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArrType {
    Radarr,
    Sonarr,
    Lidarr,
    Readarr,
}

impl ArrType {
    /// Music and book servers only speak the v1 API.
    pub fn uses_v1(self) -> bool {
        matches!(self, Self::Lidarr | Self::Readarr)
    }
}

impl fmt::Display for ArrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Radarr => "radarr",
            Self::Sonarr => "sonarr",
            Self::Lidarr => "lidarr",
            Self::Readarr => "readarr",
        };
        f.write_str(name)
    }
}
