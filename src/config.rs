use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::zone::ZoneConfig;

/// What makes a validly-entered track count.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Center within `offset` of the count line
    #[default]
    Band,
    /// Center changed sides of the count line between two consecutive sightings
    Crossing,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CountingConfig {
    pub zone: ZoneConfig,
    pub trigger: Trigger,
    /// Forget tracks unseen for this many frames. `None` keeps them for the session.
    pub max_idle_frames: Option<u64>,
}

impl CountingConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;

        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(contents)?)
    }
}
