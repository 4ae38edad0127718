// ███████     █████     ███    ███
// ██         ██   ██    ████  ████
// ███████    ███████    ██ ████ ██
//      ██    ██   ██    ██  ██  ██
// ███████ ██ ██   ██ ██ ██      ██ ██
// Copyright 2021-2026 The Open Sam Foundation (OSF)
// Developed by Caleb Mitchell Smith (ktheindifferent, PixelCoda, p0indexter)
// Licensed under GPLv3....see LICENSE file.

//! Python runtime for the dashboard.
//!
//! An interpreter that already meets the floor is used as is. Otherwise the
//! strategies in [`STRATEGIES`] are tried in order, each followed by a fresh
//! probe, until one yields an interpreter at or above the floor.

use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::config::{RuntimeConfig, VersionFloor};
use crate::error::{InstallError, Result};
use crate::host::OsFamily;
use crate::services::package_managers::linux;
use crate::shell::Shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PythonVersion {
    /// Parses `python --version` output such as `Python 3.11.2`.
    pub fn parse(output: &str) -> Option<Self> {
        static VERSION_RE: OnceLock<Regex> = OnceLock::new();
        let re = VERSION_RE.get_or_init(|| {
            Regex::new(r"Python\s+(\d+)\.(\d+)(?:\.(\d+))?").expect("valid regex")
        });
        let caps = re.captures(output)?;
        Some(PythonVersion {
            major: caps.get(1)?.as_str().parse().ok()?,
            minor: caps.get(2)?.as_str().parse().ok()?,
            patch: caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0),
        })
    }

    pub fn satisfies(&self, floor: &VersionFloor) -> bool {
        (self.major, self.minor) >= (floor.major, floor.minor)
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Where the interpreter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeSource {
    Preinstalled,
    DistributionRepository,
    PinnedPackage,
    VendorScript,
}

impl fmt::Display for RuntimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuntimeSource::Preinstalled => "preinstalled interpreter",
            RuntimeSource::DistributionRepository => "distribution repository",
            RuntimeSource::PinnedPackage => "version-pinned package",
            RuntimeSource::VendorScript => "uv installer script",
        })
    }
}

/// Install strategies, in the order they are attempted.
pub const STRATEGIES: [RuntimeSource; 3] = [
    RuntimeSource::DistributionRepository,
    RuntimeSource::PinnedPackage,
    RuntimeSource::VendorScript,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PythonRuntime {
    /// Command name on `PATH` or an absolute path.
    pub interpreter: PathBuf,
    pub version: PythonVersion,
    pub source: RuntimeSource,
}

/// Makes sure a Python at or above `config.floor` is available.
pub fn ensure_python(
    shell: &impl Shell,
    family: &OsFamily,
    config: &RuntimeConfig,
) -> Result<PythonRuntime> {
    if let Some(runtime) = probe(shell, config, RuntimeSource::Preinstalled) {
        log::info!(
            "Python {} already installed ({}), skipping runtime install",
            runtime.version,
            runtime.interpreter.display()
        );
        return Ok(runtime);
    }

    for source in STRATEGIES {
        log::info!("Installing Python via {}", source);
        match apply(shell, family, config, source) {
            Ok(()) => match probe(shell, config, source) {
                Some(runtime) => {
                    log::info!("Python {} installed via {}", runtime.version, source);
                    return Ok(runtime);
                }
                None => log::warn!("{} did not provide Python {} or newer", source, config.floor),
            },
            Err(e) => log::warn!("{} failed: {:#}", source, e),
        }
    }

    Err(InstallError::RuntimeUnavailable { floor: config.floor })
}

fn apply(
    shell: &impl Shell,
    family: &OsFamily,
    config: &RuntimeConfig,
    source: RuntimeSource,
) -> anyhow::Result<()> {
    match source {
        RuntimeSource::Preinstalled => Ok(()),
        RuntimeSource::DistributionRepository => {
            linux::install_packages(shell, family, repository_packages(family))
        }
        RuntimeSource::PinnedPackage => {
            let packages = pinned_packages(family, &config.pinned);
            if packages.is_empty() {
                anyhow::bail!("no version-pinned Python package for {}", family);
            }
            let packages: Vec<&str> = packages.iter().map(String::as_str).collect();
            linux::install_packages(shell, family, &packages)
        }
        RuntimeSource::VendorScript => install_with_uv(shell, config),
    }
}

fn repository_packages(family: &OsFamily) -> &'static [&'static str] {
    match family {
        OsFamily::Debian => &["python3", "python3-venv", "python3-pip"],
        OsFamily::Fedora => &["python3", "python3-pip"],
        OsFamily::Arch => &["python", "python-pip"],
        OsFamily::Other(_) => &[],
    }
}

fn pinned_packages(family: &OsFamily, pinned: &str) -> Vec<String> {
    match family {
        OsFamily::Debian => vec![format!("python{pinned}"), format!("python{pinned}-venv")],
        OsFamily::Fedora => vec![format!("python{pinned}")],
        // Arch only ships the current release.
        OsFamily::Arch | OsFamily::Other(_) => Vec::new(),
    }
}

fn uv_path(config: &RuntimeConfig) -> String {
    config.uv_install_dir.join("uv").to_string_lossy().to_string()
}

fn install_with_uv(shell: &impl Shell, config: &RuntimeConfig) -> anyhow::Result<()> {
    let fetch = if shell.has("curl") {
        format!("curl -LsSf {}", config.vendor_script_url)
    } else if shell.has("wget") {
        format!("wget -qO- {}", config.vendor_script_url)
    } else {
        anyhow::bail!("neither curl nor wget is available to fetch {}", config.vendor_script_url);
    };
    let script = format!(
        "{} | env UV_INSTALL_DIR={} UV_NO_MODIFY_PATH=1 sh",
        fetch,
        config.uv_install_dir.display()
    );
    let output = shell.sh(&script)?;
    if !output.success {
        anyhow::bail!("uv installer failed: {}", output.stderr.trim());
    }

    shell.run_checked(&uv_path(config), &["python", "install", config.pinned.as_str()])?;
    Ok(())
}

fn candidates(shell: &impl Shell, config: &RuntimeConfig, source: RuntimeSource) -> Vec<PathBuf> {
    if source == RuntimeSource::VendorScript {
        return shell
            .run(&uv_path(config), &["python", "find", config.pinned.as_str()])
            .ok()
            .filter(|out| out.success)
            .map(|out| out.stdout.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .into_iter()
            .collect();
    }
    vec![
        PathBuf::from("python3"),
        PathBuf::from(format!("python{}", config.pinned)),
    ]
}

fn probe(shell: &impl Shell, config: &RuntimeConfig, source: RuntimeSource) -> Option<PythonRuntime> {
    candidates(shell, config, source).into_iter().find_map(|interpreter| {
        let output = shell
            .run(&interpreter.to_string_lossy(), &["--version"])
            .ok()
            .filter(|out| out.success)?;
        // Python 2 printed its version on stderr.
        let version = PythonVersion::parse(&output.stdout)
            .or_else(|| PythonVersion::parse(&output.stderr))?;
        if !version.satisfies(&config.floor) {
            log::debug!(
                "{} is Python {}, below {}",
                interpreter.display(),
                version,
                config.floor
            );
            return None;
        }
        Some(PythonRuntime {
            interpreter,
            version,
            source,
        })
    })
}
