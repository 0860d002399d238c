//! Result keys and the lookup table that resolves them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A field of a [`DetectionInstance`][aidk_types::DetectionInstance] that can
/// be projected into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKey {
    Bbox,
    Keypoints,
    Positions,
    ObjPose,
    Valid,
    DoubleValue,
    IntValue,
    Name,
}

impl ResultKey {
    pub const ALL: [ResultKey; 8] = [
        ResultKey::Bbox,
        ResultKey::Keypoints,
        ResultKey::Positions,
        ResultKey::ObjPose,
        ResultKey::Valid,
        ResultKey::DoubleValue,
        ResultKey::IntValue,
        ResultKey::Name,
    ];

    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            ResultKey::Bbox => "bbox",
            ResultKey::Keypoints => "keypoints",
            ResultKey::Positions => "positions",
            ResultKey::ObjPose => "obj_pose",
            ResultKey::Valid => "valid",
            ResultKey::DoubleValue => "double_value",
            ResultKey::IntValue => "int_value",
            ResultKey::Name => "name",
        }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable table of accepted key strings.
///
/// Built once at startup (the default table plus any configured aliases) and
/// handed to [`ResultExtractor`][crate::ResultExtractor].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultKeyTable {
    entries: BTreeMap<String, ResultKey>,
}

impl Default for ResultKeyTable {
    fn default() -> Self {
        Self {
            entries: ResultKey::ALL
                .iter()
                .map(|k| (k.as_str().to_string(), *k))
                .collect(),
        }
    }
}

impl ResultKeyTable {
    /// Add `alias` as another spelling of `key`.  An alias never shadows a
    /// canonical key name.
    pub fn with_alias(mut self, alias: impl Into<String>, key: ResultKey) -> Self {
        let alias = alias.into();
        if !ResultKey::ALL.iter().any(|k| k.as_str() == alias) {
            self.entries.insert(alias, key);
        }
        self
    }

    pub fn resolve(&self, key: &str) -> Option<ResultKey> {
        self.entries.get(key).copied()
    }

    /// Canonical key names, in [`ResultKey::ALL`] order.
    pub fn supported_keys(&self) -> Vec<&'static str> {
        ResultKey::ALL.iter().map(|k| k.as_str()).collect()
    }

    /// Every accepted spelling, aliases included, sorted.
    pub fn accepted(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
