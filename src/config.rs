//! Application-level configuration loading, including the role this process plays.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/relay.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PLAYER_RELAY_CONFIG_PATH";
const ROLE_ENV: &str = "RELAY_ROLE";
const REMOTE_URL_ENV: &str = "RELAY_REMOTE_URL";

const DEFAULT_LOCAL_PORT: u16 = 10001;
const DEFAULT_REMOTE_PORT: u16 = 10002;
const DEFAULT_TRANSFER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MINUTES_PER_PLAYER: u64 = 3;
const DEFAULT_HEALTH_POLL_SECS: u64 = 5;

/// Narrative characters shipped with the game; their telemetry is never charted.
const DEFAULT_SKIP_LABELS: [&str; 8] = [
    "Dr. Paul Farmer",
    "DrSmith",
    "ElonMusk",
    "Huhu",
    "Lin",
    "Rubin Carter",
    "Ya",
    "Zoe",
];

/// Which side of the transfer protocol this process implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Game-facing producer: appends records and pushes batches.
    Local,
    /// Aggregation service: receives batches and renders artifacts.
    Remote,
}

impl Role {
    /// Lowercase role name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Local => "local",
            Role::Remote => "remote",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Role::Local),
            "remote" => Some(Role::Remote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Which half of the relay this process runs.
    pub role: Role,
    /// HTTP listen port.
    pub port: u16,
    /// The single persisted document of this role's store.
    pub data_file: PathBuf,
    /// Artifacts waiting to be sent (local role).
    pub staging_dir: PathBuf,
    /// Artifacts received from the producer (remote role).
    pub files_dir: PathBuf,
    /// Derived charts (remote role).
    pub output_dir: PathBuf,
    /// Optional directory served for unmatched GET paths (game page, assets).
    pub static_dir: Option<PathBuf>,
    /// Base URL of the remote role (local role).
    pub remote_url: Option<String>,
    /// Upper bound on one delivery to the remote role.
    pub transfer_timeout: Duration,
    /// Wait estimate per queued player.
    pub minutes_per_player: u64,
    /// Artifact labels the generation gate never renders.
    pub skip_labels: Vec<String>,
    /// Lowercase extensions picked up from the staging directory.
    pub staged_extensions: Vec<String>,
    /// Description written into freshly created documents.
    pub description: Option<String>,
    /// Delay between remote health probes while healthy.
    pub health_poll_interval: Duration,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded relay configuration");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };

        let mut raw = raw;
        if let Ok(value) = env::var(ROLE_ENV) {
            match Role::parse(&value) {
                Some(role) => raw.role = Some(role),
                None => warn!(var = ROLE_ENV, value = %value, "ignoring unknown role override"),
            }
        }

        let mut config = Self::from_raw(raw);
        config.apply_env();
        config
    }

    /// Defaults for `role` without reading any file or environment.
    pub fn for_role(role: Role) -> Self {
        Self::from_raw(RawConfig {
            role: Some(role),
            ..RawConfig::default()
        })
    }

    /// Identity of this process as recorded in provenance fields.
    pub fn origin(&self) -> String {
        format!("{}:{}", self.role.as_str(), self.port)
    }

    fn from_raw(raw: RawConfig) -> Self {
        let role = raw.role.unwrap_or(Role::Local);
        let default_port = match role {
            Role::Local => DEFAULT_LOCAL_PORT,
            Role::Remote => DEFAULT_REMOTE_PORT,
        };

        Self {
            role,
            port: raw.port.unwrap_or(default_port),
            data_file: raw.data_file.unwrap_or_else(|| "data.json".into()),
            staging_dir: raw.staging_dir.unwrap_or_else(|| "staging".into()),
            files_dir: raw.files_dir.unwrap_or_else(|| "received_files".into()),
            output_dir: raw.output_dir.unwrap_or_else(|| "output_videos".into()),
            static_dir: raw.static_dir,
            remote_url: raw.remote_url,
            transfer_timeout: Duration::from_secs(
                raw.transfer_timeout_secs
                    .unwrap_or(DEFAULT_TRANSFER_TIMEOUT_SECS),
            ),
            minutes_per_player: raw.minutes_per_player.unwrap_or(DEFAULT_MINUTES_PER_PLAYER),
            skip_labels: raw.skip_labels.unwrap_or_else(|| {
                DEFAULT_SKIP_LABELS
                    .iter()
                    .map(|label| label.to_string())
                    .collect()
            }),
            staged_extensions: raw
                .staged_extensions
                .unwrap_or_else(|| vec!["csv".into(), "txt".into()])
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            description: raw.description,
            health_poll_interval: Duration::from_secs(
                raw.health_poll_secs.unwrap_or(DEFAULT_HEALTH_POLL_SECS).max(1),
            ),
        }
    }

    fn apply_env(&mut self) {
        if let Some(port) = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }

        if let Some(url) = env::var(REMOTE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            self.remote_url = Some(url);
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_role(Role::Local)
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    role: Option<Role>,
    port: Option<u16>,
    data_file: Option<PathBuf>,
    staging_dir: Option<PathBuf>,
    files_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
    remote_url: Option<String>,
    transfer_timeout_secs: Option<u64>,
    minutes_per_player: Option<u64>,
    skip_labels: Option<Vec<String>>,
    staged_extensions: Option<Vec<String>>,
    description: Option<String>,
    health_poll_secs: Option<u64>,
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_selects_default_port() {
        assert_eq!(AppConfig::for_role(Role::Local).port, 10001);
        assert_eq!(AppConfig::for_role(Role::Remote).port, 10002);
    }

    #[test]
    fn raw_config_overrides_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"role": "remote", "minutes_per_player": 5, "staged_extensions": [".CSV"],
                "skip_labels": ["Zoe"]}"#,
        )
        .unwrap();
        let config = AppConfig::from_raw(raw);
        assert_eq!(config.role, Role::Remote);
        assert_eq!(config.minutes_per_player, 5);
        assert_eq!(config.staged_extensions, vec!["csv".to_string()]);
        assert_eq!(config.skip_labels, vec!["Zoe".to_string()]);
        assert_eq!(config.transfer_timeout, Duration::from_secs(30));
    }

    #[test]
    fn default_skip_list_holds_story_characters() {
        let config = AppConfig::default();
        assert_eq!(config.skip_labels.len(), 8);
        assert!(config.skip_labels.iter().any(|label| label == "Dr. Paul Farmer"));
    }
}
