// ███████     █████     ███    ███
// ██         ██   ██    ████  ████
// ███████    ███████    ██ ████ ██
//      ██    ██   ██    ██  ██  ██
// ███████ ██ ██   ██ ██ ██      ██ ██
// Copyright 2021-2026 The Open Sam Foundation (OSF)
// Developed by Caleb Mitchell Smith (ktheindifferent, PixelCoda, p0indexter)
// Licensed under GPLv3....see LICENSE file.

//! Install layout, download locations, ports and default credentials.
//!
//! Everything the installer writes or fetches is derived from one
//! [`InstallConfig`]. The binary always runs with [`InstallConfig::default`];
//! tests point the paths at a scratch directory.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::host::Arch;

pub const DEFAULT_INSTALL_ROOT: &str = "/opt/bot";
pub const DEFAULT_WEB_SUBDIR: &str = "web";
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";
pub const DEFAULT_OS_RELEASE: &str = "/etc/os-release";

pub const BINARY_URL_PATTERN: &str = "https://downloads.botrelease.net/bot/latest/bot-linux-{arch}";
pub const DASHBOARD_URL: &str = "https://downloads.botrelease.net/dashboard/latest/dashboard.zip";
pub const UV_INSTALL_SCRIPT_URL: &str = "https://astral.sh/uv/install.sh";

/// A port plus the credential pair guarding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Lowest acceptable interpreter version. Only major and minor are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFloor {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for VersionFloor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub floor: VersionFloor,
    /// Version installed by the pinned-package and vendor-script strategies.
    pub pinned: String,
    pub vendor_script_url: String,
    /// Where the vendor script drops the `uv` binary.
    pub uv_install_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            floor: VersionFloor { major: 3, minor: 8 },
            pinned: "3.11".to_string(),
            vendor_script_url: UV_INSTALL_SCRIPT_URL.to_string(),
            uv_install_dir: PathBuf::from("/usr/local/bin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallConfig {
    pub install_root: PathBuf,
    pub web_subdir: String,
    pub unit_dir: PathBuf,
    pub os_release_path: PathBuf,
    pub binary_name: String,
    /// Download URL of the bot binary; `{arch}` is replaced by [`Arch::tag`].
    pub binary_url_pattern: String,
    pub dashboard_url: String,
    /// Remote-access API exposed by the bot.
    pub remote: Endpoint,
    /// Web dashboard login.
    pub web: Endpoint,
    pub runtime: RuntimeConfig,
    /// Installed into the dashboard venv when it ships no requirements.txt.
    pub fallback_requirements: Vec<String>,
    pub launch_delay_secs: u64,
    pub restart_sec: u64,
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig {
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            web_subdir: DEFAULT_WEB_SUBDIR.to_string(),
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
            os_release_path: PathBuf::from(DEFAULT_OS_RELEASE),
            binary_name: "bot".to_string(),
            binary_url_pattern: BINARY_URL_PATTERN.to_string(),
            dashboard_url: DASHBOARD_URL.to_string(),
            remote: Endpoint {
                port: 8080,
                username: "admin".to_string(),
                password: "admin".to_string(),
            },
            web: Endpoint {
                port: 5000,
                username: "admin".to_string(),
                password: "changeme".to_string(),
            },
            runtime: RuntimeConfig::default(),
            fallback_requirements: vec!["flask".to_string(), "requests".to_string()],
            launch_delay_secs: 5,
            restart_sec: 10,
        }
    }
}

impl InstallConfig {
    /// Same defaults, rooted somewhere else. Units go under `<root>/systemd`.
    #[cfg(test)]
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        InstallConfig {
            unit_dir: root.join("systemd"),
            os_release_path: root.join("os-release"),
            install_root: root.join("bot"),
            ..InstallConfig::default()
        }
    }

    pub fn web_dir(&self) -> PathBuf {
        self.install_root.join(&self.web_subdir)
    }

    pub fn binary_path(&self) -> PathBuf {
        self.install_root.join(&self.binary_name)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.install_root.join("settings.ini")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.install_root.join("install.json")
    }

    pub fn binary_url(&self, arch: Arch) -> String {
        self.binary_url_pattern.replace("{arch}", arch.tag())
    }

    pub fn bot_unit_name(&self) -> String {
        format!("{}.service", self.binary_name)
    }

    pub fn web_unit_name(&self) -> String {
        format!("{}-web.service", self.binary_name)
    }

    /// URL the dashboard polls for the bot's status.
    pub fn bot_api_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.remote.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_url_substitutes_arch_tag() {
        let config = InstallConfig::default();
        assert_eq!(
            config.binary_url(Arch::ArmHf),
            "https://downloads.botrelease.net/bot/latest/bot-linux-armhf"
        );
    }

    #[test]
    fn rooted_config_keeps_everything_under_root() {
        let config = InstallConfig::rooted_at("/tmp/scratch");
        assert_eq!(config.install_root, PathBuf::from("/tmp/scratch/bot"));
        assert_eq!(config.web_dir(), PathBuf::from("/tmp/scratch/bot/web"));
        assert_eq!(config.unit_dir, PathBuf::from("/tmp/scratch/systemd"));
        assert_eq!(config.remote, InstallConfig::default().remote);
    }
}
