//! Direct commands and the lookup table that resolves them.
//!
//! A direct command names one of the service's working states
//! (`POS3D`, `GRASP_POSE`, `CUSTOM`, ...).  The table is built once from
//! [`ClientConfig`][crate::ClientConfig], which may add aliases, and is
//! immutable afterwards.

use std::collections::BTreeMap;

use aidk_types::AiState;

/// Immutable table of accepted command strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectCommandTable {
    entries: BTreeMap<String, AiState>,
}

impl Default for DirectCommandTable {
    /// Every working state except `UNKNOWN`, `ERROR` and `IDLE`.
    fn default() -> Self {
        Self {
            entries: Self::commands()
                .map(|state| (state.name().to_string(), state))
                .collect(),
        }
    }
}

impl DirectCommandTable {
    fn commands() -> impl Iterator<Item = AiState> {
        AiState::all()
            .iter()
            .copied()
            .filter(|s| !matches!(s, AiState::Unknown | AiState::Error | AiState::Idle))
    }

    /// Add `alias` as another spelling of `command`.  An alias never shadows
    /// a canonical command name.
    pub fn with_alias(mut self, alias: impl Into<String>, command: AiState) -> Self {
        let alias = alias.into();
        let is_command = Self::commands().any(|s| s == command);
        let shadows = Self::commands().any(|s| s.name() == alias);
        if is_command && !shadows {
            self.entries.insert(alias, command);
        }
        self
    }

    pub fn resolve(&self, command: &str) -> Option<AiState> {
        self.entries.get(command).copied()
    }

    /// Canonical spelling of `command`, if it or an alias of it is known.
    pub fn canonical(&self, command: &str) -> Option<&'static str> {
        self.resolve(command).map(AiState::name)
    }

    /// Canonical command names, in state code order.
    pub fn all_direct_command(&self) -> Vec<&'static str> {
        Self::commands().map(AiState::name).collect()
    }

    /// Every accepted spelling, aliases included, sorted.
    pub fn accepted(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
