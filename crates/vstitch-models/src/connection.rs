//! Network path used to reach camera footage.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether footage is pulled over the local network or through the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Lan,
    Wan,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Lan => "lan",
            ConnectionType::Wan => "wan",
        }
    }

    /// Manifest file name at the end of a VOD URI for this path.
    pub fn manifest_name(&self) -> &'static str {
        match self {
            ConnectionType::Lan => "clip.mpd",
            ConnectionType::Wan => "file.mpd",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown connection type: {0}")]
pub struct ParseConnectionTypeError(pub String);

impl FromStr for ConnectionType {
    type Err = ParseConnectionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lan" => Ok(ConnectionType::Lan),
            "wan" => Ok(ConnectionType::Wan),
            other => Err(ParseConnectionTypeError(other.to_string())),
        }
    }
}
