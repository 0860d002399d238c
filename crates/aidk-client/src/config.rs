//! Client configuration – reads/writes `~/.aidk/config.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use aidk_perception::{ResultKey, ResultKeyTable};
use aidk_types::AiState;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::commands::DirectCommandTable;

/// Errors that can arise while loading or saving the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Persisted client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the AI service.
    #[serde(default = "default_ip")]
    pub ip: String,

    /// Timeout of a single detect call (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: f32,

    /// Period of the readiness poller (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub status_poll_interval_ms: u64,

    /// Upper bound for
    /// [`AidkClient::wait_until_ready`][crate::AidkClient::wait_until_ready]
    /// (seconds).
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: f32,

    /// Extra spellings for result keys, alias → canonical key name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub key_aliases: BTreeMap<String, String>,

    /// Extra spellings for direct commands, alias → canonical command name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub command_aliases: BTreeMap<String, String>,
}

fn default_ip() -> String {
    "127.0.0.1".to_string()
}
fn default_request_timeout() -> f32 {
    10.0
}
fn default_poll_interval() -> u64 {
    500
}
fn default_ready_timeout() -> f32 {
    30.0
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            request_timeout_secs: default_request_timeout(),
            status_poll_interval_ms: default_poll_interval(),
            ready_timeout_secs: default_ready_timeout(),
            key_aliases: BTreeMap::new(),
            command_aliases: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Falls back to the default when `request_timeout_secs` is not a valid
    /// duration.
    pub fn request_timeout(&self) -> Duration {
        secs_to_duration(self.request_timeout_secs)
            .unwrap_or_else(|| Duration::from_secs_f32(default_request_timeout()))
    }

    pub fn poll_interval(&self) -> Duration {
        // tokio intervals panic on a zero period.
        Duration::from_millis(self.status_poll_interval_ms.max(1))
    }

    /// Falls back to the default when `ready_timeout_secs` is not a valid
    /// duration.
    pub fn ready_timeout(&self) -> Duration {
        secs_to_duration(self.ready_timeout_secs)
            .unwrap_or_else(|| Duration::from_secs_f32(default_ready_timeout()))
    }

    /// Reset timeouts that are negative, non-finite or too large for a
    /// [`Duration`] to their defaults.
    pub fn sanitize(&mut self) {
        if secs_to_duration(self.request_timeout_secs).is_none() {
            warn!(value = self.request_timeout_secs, "invalid request_timeout_secs, using default");
            self.request_timeout_secs = default_request_timeout();
        }
        if secs_to_duration(self.ready_timeout_secs).is_none() {
            warn!(value = self.ready_timeout_secs, "invalid ready_timeout_secs, using default");
            self.ready_timeout_secs = default_ready_timeout();
        }
    }

    /// Build the result key table: the supported keys plus every alias that
    /// names one of them.  Aliases pointing elsewhere are skipped.
    pub fn key_table(&self) -> ResultKeyTable {
        let defaults = ResultKeyTable::default();
        self.key_aliases
            .iter()
            .fold(defaults.clone(), |table, (alias, target)| {
                match defaults.resolve(target) {
                    Some(key) => table.with_alias(alias.clone(), key),
                    None => {
                        warn!(
                            alias = %alias,
                            target = %target,
                            "ignoring alias for unsupported result key"
                        );
                        table
                    }
                }
            })
    }

    /// Build the direct command table: the service commands plus every
    /// alias that names one of them.  Aliases pointing elsewhere are skipped.
    pub fn command_table(&self) -> DirectCommandTable {
        let defaults = DirectCommandTable::default();
        self.command_aliases
            .iter()
            .fold(defaults.clone(), |table, (alias, target)| {
                match defaults.resolve(target) {
                    Some(state) => table.with_alias(alias.clone(), state),
                    None => {
                        warn!(
                            alias = %alias,
                            target = %target,
                            "ignoring alias for unknown command"
                        );
                        table
                    }
                }
            })
    }

    /// Register `alias` for `key`.
    pub fn with_alias(mut self, alias: impl Into<String>, key: ResultKey) -> Self {
        self.key_aliases.insert(alias.into(), key.as_str().to_string());
        self
    }

    /// Register `alias` for the direct command `state`.
    pub fn with_command_alias(mut self, alias: impl Into<String>, state: AiState) -> Self {
        self.command_aliases.insert(alias.into(), state.name().to_string());
        self
    }
}

/// `secs` as a [`Duration`], or `None` when negative, non-finite or too
/// large.
fn secs_to_duration(secs: f32) -> Option<Duration> {
    Duration::try_from_secs_f32(secs).ok()
}

/// Return the path to `~/.aidk/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".aidk").join("config.toml")
}

/// Load the config from `~/.aidk/config.toml`.  Returns `None` if the file
/// does not exist.
pub fn load() -> Result<Option<ClientConfig>, ConfigError> {
    load_from(&config_path())
}

/// Load the config from `path`, then apply environment overrides.
pub fn load_from(path: &Path) -> Result<Option<ClientConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: ClientConfig = toml::from_str(&raw)?;
    cfg.sanitize();
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `AIDK_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `AIDK_IP` | `ip` |
/// | `AIDK_REQUEST_TIMEOUT` | `request_timeout_secs` |
/// | `AIDK_POLL_INTERVAL_MS` | `status_poll_interval_ms` |
///
/// Values that do not parse, and timeouts that are not a valid duration, are
/// ignored.
pub fn apply_env_overrides(cfg: &mut ClientConfig) {
    apply_overrides(cfg, |name| std::env::var(name).ok());
}

/// [`apply_env_overrides`] with variables read through `lookup`.
pub(crate) fn apply_overrides(cfg: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("AIDK_IP") {
        cfg.ip = v;
    }
    if let Some(v) = lookup("AIDK_REQUEST_TIMEOUT")
        && let Ok(secs) = v.parse::<f32>()
        && secs_to_duration(secs).is_some()
    {
        cfg.request_timeout_secs = secs;
    }
    if let Some(v) = lookup("AIDK_POLL_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.status_poll_interval_ms = ms;
    }
}

/// Save the config to `path`, creating parent directories as needed.
pub fn save_to(cfg: &ClientConfig, path: &Path) -> Result<(), ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let raw = toml::to_string_pretty(cfg)?;
    fs::write(path, raw).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&ClientConfig::default(), &path).expect("save");
        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.status_poll_interval_ms, 500);
        assert!((loaded.request_timeout_secs - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ip = \"10.0.0.7\"\n").unwrap();

        let cfg = load_from(&path).unwrap().unwrap();
        assert_eq!(cfg.ip, "10.0.0.7");
        assert_eq!(cfg.status_poll_interval_ms, 500);
        assert!(cfg.key_aliases.is_empty());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ip = [").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn config_path_points_to_aidk_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".aidk"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn key_table_includes_valid_aliases_only() {
        let mut cfg = ClientConfig::default().with_alias("pose", ResultKey::ObjPose);
        cfg.key_aliases.insert("grasp".to_string(), "grasp_pose".to_string());

        let table = cfg.key_table();
        assert_eq!(table.resolve("pose"), Some(ResultKey::ObjPose));
        assert_eq!(table.resolve("grasp"), None);
    }

    #[test]
    fn aliases_survive_save_and_load() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        let cfg = ClientConfig::default().with_alias("pose", ResultKey::ObjPose);
        save_to(&cfg, &path).unwrap();

        let loaded = load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.key_aliases.get("pose").map(String::as_str), Some("obj_pose"));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn overrides_change_ip_and_timeout() {
        let mut cfg = ClientConfig::default();
        apply_overrides(
            &mut cfg,
            lookup(&[("AIDK_IP", "192.168.2.100"), ("AIDK_REQUEST_TIMEOUT", "2.5")]),
        );
        assert_eq!(cfg.ip, "192.168.2.100");
        assert!((cfg.request_timeout_secs - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn overrides_ignore_invalid_interval() {
        let mut cfg = ClientConfig::default();
        apply_overrides(&mut cfg, lookup(&[("AIDK_POLL_INTERVAL_MS", "fast")]));
        assert_eq!(cfg.status_poll_interval_ms, 500);
    }

    #[test]
    fn overrides_change_interval() {
        let mut cfg = ClientConfig::default();
        apply_overrides(&mut cfg, lookup(&[("AIDK_POLL_INTERVAL_MS", "50")]));
        assert_eq!(cfg.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn infinite_timeout_override_is_ignored() {
        let mut cfg = ClientConfig::default();
        for bad in ["inf", "-inf", "NaN", "1e30", "-3"] {
            apply_overrides(&mut cfg, lookup(&[("AIDK_REQUEST_TIMEOUT", bad)]));
            assert_eq!(cfg.request_timeout(), Duration::from_secs(10), "{bad}");
        }
    }

    #[test]
    fn oversized_timeouts_in_file_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ready_timeout_secs = 1e30\nrequest_timeout_secs = inf\n").unwrap();

        let cfg = load_from(&path).unwrap().unwrap();
        assert_eq!(cfg.ready_timeout(), Duration::from_secs(30));
        assert!((cfg.ready_timeout_secs - 30.0).abs() < f32::EPSILON);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn timeout_accessors_never_panic() {
        let cfg = ClientConfig {
            request_timeout_secs: f32::INFINITY,
            ready_timeout_secs: f32::NAN,
            ..ClientConfig::default()
        };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.ready_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn command_table_includes_valid_aliases_only() {
        let mut cfg = ClientConfig::default().with_command_alias("grasp", AiState::GraspPose);
        cfg.command_aliases.insert("teleport".to_string(), "TELEPORT".to_string());

        let table = cfg.command_table();
        assert_eq!(table.resolve("grasp"), Some(AiState::GraspPose));
        assert_eq!(table.resolve("teleport"), None);
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let cfg = ClientConfig {
            status_poll_interval_ms: 0,
            ..ClientConfig::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_millis(1));
    }
}
