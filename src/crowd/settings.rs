//! Generator Settings
//!
//! The three user-facing knobs of the generator:
//!
//! | Field        | Default    | Meaning                                          |
//! |--------------|------------|--------------------------------------------------|
//! | `name`       | `"agents"` | Name of the single location below the root       |
//! | `attributes` | `""`       | Attribute filter, carried through but not applied |
//! | `mode`       | `0`        | Grouping mode, see [`GroupingMode`]              |
//!
//! ```rust,ignore
//! let settings = Settings::from_json_str(r#"{ "name": "crowd" }"#)?;
//! assert_eq!(settings.mode, 0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CrowdError, Result};
use crate::hash::{ContentHash, KeyHasher};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub name: String,
    pub attributes: String,
    pub mode: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: "agents".to_string(),
            attributes: String::new(),
            mode: 0,
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: i32) -> Self {
        self.mode = mode;
        self
    }

    pub fn grouping_mode(&self) -> Result<GroupingMode> {
        GroupingMode::from_mode(self.mode)
    }
}

impl ContentHash for Settings {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.append(&self.name).append(&self.attributes).append(&self.mode);
    }
}

/// How agents are grouped under the output location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupingMode {
    /// `/agentType/variation/agentId`
    #[default]
    ByTypeAndVariation,
}

impl GroupingMode {
    pub fn from_mode(mode: i32) -> Result<Self> {
        match mode {
            0 => Ok(GroupingMode::ByTypeAndVariation),
            other => Err(CrowdError::UnsupportedMode(other)),
        }
    }

    #[must_use]
    pub fn as_mode(self) -> i32 {
        match self {
            GroupingMode::ByTypeAndVariation => 0,
        }
    }
}
