// ███████     █████     ███    ███
// ██         ██   ██    ████  ████
// ███████    ███████    ██ ████ ██
//      ██    ██   ██    ██  ██  ██
// ███████ ██ ██   ██ ██ ██      ██ ██
// Copyright 2021-2026 The Open Sam Foundation (OSF)
// Developed by Caleb Mitchell Smith (ktheindifferent, PixelCoda, p0indexter)
// Licensed under GPLv3....see LICENSE file.

//! Host detection: distribution family from `/etc/os-release` and CPU
//! architecture from `uname -m`. Both are resolved once into a
//! [`HostProfile`] that every later step borrows.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::InstallConfig;
use crate::error::{InstallError, Result};
use crate::shell::Shell;

/// CPU architectures the bot is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86_64,
    Arm64,
    /// 32-bit ARMv6 as found on the original Raspberry Pi and Pi Zero.
    ArmRpi,
    /// 32-bit ARMv7 hard-float.
    ArmHf,
    I686,
}

impl Arch {
    /// Maps a `uname -m` machine string to a published build.
    pub fn from_machine(machine: &str) -> Result<Self> {
        match machine.trim() {
            "x86_64" => Ok(Arch::X86_64),
            "aarch64" | "arm64" => Ok(Arch::Arm64),
            "armv6l" => Ok(Arch::ArmRpi),
            "armv7l" => Ok(Arch::ArmHf),
            "i686" => Ok(Arch::I686),
            other => Err(InstallError::UnsupportedArch(other.to_string())),
        }
    }

    /// Suffix used in the binary download URL.
    pub fn tag(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Arm64 => "arm64",
            Arch::ArmRpi => "armv6-rpi",
            Arch::ArmHf => "armhf",
            Arch::I686 => "i686",
        }
    }

    pub fn detect(shell: &impl Shell) -> Result<Self> {
        let output = shell.run("uname", &["-m"])?;
        if !output.success {
            return Err(InstallError::UnsupportedArch(format!(
                "uname -m failed: {}",
                output.stderr.trim()
            )));
        }
        Arch::from_machine(&output.stdout)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Package-manager family of the running distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OsFamily {
    Debian,
    Fedora,
    Arch,
    /// Recognized by nothing above; carries the `ID` for messages.
    Other(String),
}

impl OsFamily {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "debian" | "ubuntu" | "raspbian" | "linuxmint" | "pop" => Some(OsFamily::Debian),
            "fedora" | "rhel" | "centos" | "rocky" | "almalinux" => Some(OsFamily::Fedora),
            "arch" | "manjaro" | "endeavouros" => Some(OsFamily::Arch),
            _ => None,
        }
    }

    pub fn classify(os: &OsRelease) -> Self {
        std::iter::once(&os.id)
            .chain(os.id_like.iter())
            .find_map(|id| OsFamily::from_id(id))
            .unwrap_or_else(|| match os.id.as_str() {
                "" => OsFamily::Other("unknown".to_string()),
                id => OsFamily::Other(id.to_string()),
            })
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Debian => f.write_str("debian"),
            OsFamily::Fedora => f.write_str("fedora"),
            OsFamily::Arch => f.write_str("arch"),
            OsFamily::Other(id) => write!(f, "{id} (unsupported)"),
        }
    }
}

/// The subset of os-release(5) the installer cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OsRelease {
    pub id: String,
    pub id_like: Vec<String>,
    pub version_id: Option<String>,
    pub pretty_name: Option<String>,
}

impl OsRelease {
    pub fn parse(contents: &str) -> Self {
        let mut release = OsRelease::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            match key.trim() {
                "ID" => release.id = value.to_lowercase(),
                "ID_LIKE" => {
                    release.id_like = value.split_whitespace().map(str::to_lowercase).collect()
                }
                "VERSION_ID" => release.version_id = Some(value.to_string()),
                "PRETTY_NAME" => release.pretty_name = Some(value.to_string()),
                _ => {}
            }
        }
        release
    }

    pub fn read(path: &Path) -> std::io::Result<Self> {
        Ok(OsRelease::parse(&fs::read_to_string(path)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostProfile {
    /// `None` when os-release could not be read.
    pub os: Option<OsRelease>,
    pub family: OsFamily,
    pub arch: Arch,
}

impl HostProfile {
    pub fn detect(shell: &impl Shell, config: &InstallConfig) -> Result<Self> {
        let os = detect_distribution(&config.os_release_path);
        let family = os.as_ref().map_or(OsFamily::Debian, OsFamily::classify);
        if let Some(os) = &os {
            log::info!(
                "Distribution: {} ({}), family: {}",
                os.pretty_name.as_deref().unwrap_or(&os.id),
                os.version_id.as_deref().unwrap_or("unknown version"),
                family
            );
        }

        let arch = Arch::detect(shell)?;
        log::info!("Architecture: {}", arch);

        Ok(HostProfile { os, family, arch })
    }
}

fn detect_distribution(path: &Path) -> Option<OsRelease> {
    match OsRelease::read(path) {
        Ok(os) => Some(os),
        Err(e) => {
            log::warn!(
                "Could not read {} ({}); assuming a Debian-based system",
                path.display(),
                e
            );
            None
        }
    }
}
