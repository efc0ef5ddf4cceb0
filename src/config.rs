//! Runtime configuration, loaded from an optional TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default VPP CLI socket
pub const DEFAULT_SOCKET: &str = "/run/vpp/cli.sock";
/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/vppsh/vppsh.toml";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REPLY_CAPACITY: usize = 8192;
pub const DEFAULT_MAX_ADDRESSES: usize = 8;
/// Private to vppsh; created on first use
pub const DEFAULT_SESSION_DIR: &str = "/run/vppsh";
pub const DEFAULT_EXPORT_PATH: &str = "/etc/vpp/vppsh-startup.conf";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// VPP CLI socket path
    pub socket: PathBuf,
    /// If set, replies are fetched by spawning this program (usually
    /// `vppctl`) instead of talking to the socket directly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vppctl: Option<PathBuf>,
    pub timeout_ms: u64,
    /// Upper bound on the filtered reply size, in bytes
    pub reply_capacity: usize,
    pub max_addresses_per_interface: usize,
    /// Directory holding per-session interface records
    pub session_dir: PathBuf,
    /// Where `write memory` saves the regenerated configuration
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            socket: PathBuf::from(DEFAULT_SOCKET),
            vppctl: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            reply_capacity: DEFAULT_REPLY_CAPACITY,
            max_addresses_per_interface: DEFAULT_MAX_ADDRESSES,
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`. A missing file yields the
    /// defaults; an unreadable or malformed one is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("config: {} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.socket, PathBuf::from("/run/vpp/cli.sock"));
        assert_eq!(config.reply_capacity, 8192);
        assert_eq!(config.max_addresses_per_interface, 8);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.vppctl.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            "socket = \"/tmp/vpp.sock\"\nreply_capacity = 65536\nvppctl = \"/usr/bin/vppctl\"\n",
        )
        .expect("failed to parse");
        assert_eq!(config.socket, PathBuf::from("/tmp/vpp.sock"));
        assert_eq!(config.reply_capacity, 65536);
        assert_eq!(config.vppctl, Some(PathBuf::from("/usr/bin/vppctl")));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.session_dir, PathBuf::from(DEFAULT_SESSION_DIR));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, crate::Error::ConfigError(_)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load("/nonexistent/vppsh.toml").expect("should default");
        assert_eq!(config.export_path, PathBuf::from(DEFAULT_EXPORT_PATH));
    }
}
