// ███████     █████     ███    ███
// ██         ██   ██    ████  ████
// ███████    ███████    ██ ████ ██
//      ██    ██   ██    ██  ██  ██
// ███████ ██ ██   ██ ██ ██      ██ ██
// Copyright 2021-2026 The Open Sam Foundation (OSF)
// Developed by Caleb Mitchell Smith (ktheindifferent, PixelCoda, p0indexter)
// Licensed under GPLv3....see LICENSE file.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use tempfile::TempDir;

use crate::config::InstallConfig;
use crate::services::download::{is_zip, Fetcher};

const APP_PY: &str = include_str!("../../../scripts/dashboard/app.py");
const LOGIN_HTML: &str = include_str!("../../../scripts/dashboard/templates/login.html");
const STATUS_HTML: &str = include_str!("../../../scripts/dashboard/templates/status.html");

const FALLBACK_FILES: &[(&str, &str)] = &[
    ("app.py", APP_PY),
    ("templates/login.html", LOGIN_HTML),
    ("templates/status.html", STATUS_HTML),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardSource {
    /// The published dashboard archive was downloaded and extracted.
    Archive { url: String },
    /// The minimal built-in dashboard was written instead.
    Synthesized { reason: String },
}

/// Entries of the web directory that survive a dashboard reinstall.
const PRESERVED: &[&str] = &["venv"];

/// Installs the dashboard into the web directory, falling back to the built-in
/// one when the archive cannot be fetched, is not a zip, or fails to extract.
///
/// Either way the previous dashboard files are removed first, so nothing from
/// an older or half-extracted archive sits next to the new one.
pub fn install(fetcher: &impl Fetcher, config: &InstallConfig) -> io::Result<DashboardSource> {
    let web_dir = config.web_dir();
    match stage_archive(fetcher, config) {
        Ok(staged) => {
            clear(&web_dir)?;
            for entry in fs::read_dir(staged.path())? {
                let entry = entry?;
                if !is_preserved(&entry.file_name()) {
                    fs::rename(entry.path(), web_dir.join(entry.file_name()))?;
                }
            }
            log::info!("Dashboard extracted to {}", web_dir.display());
            Ok(DashboardSource::Archive {
                url: config.dashboard_url.clone(),
            })
        }
        Err(e) => {
            let reason = format!("{e:#}");
            log::warn!(
                "Dashboard archive unusable ({}); generating a minimal dashboard instead",
                reason
            );
            clear(&web_dir)?;
            synthesize(&web_dir)?;
            Ok(DashboardSource::Synthesized { reason })
        }
    }
}

/// Fetches and extracts the archive into a staging directory next to the web
/// directory. The staging directory is removed when dropped.
fn stage_archive(fetcher: &impl Fetcher, config: &InstallConfig) -> anyhow::Result<TempDir> {
    log::info!("Downloading dashboard from {}", config.dashboard_url);
    let bytes = fetcher.fetch(&config.dashboard_url)?;
    if !is_zip(&bytes) {
        anyhow::bail!("downloaded {} bytes that are not a zip archive", bytes.len());
    }

    let archive = config.install_root.join("dashboard.zip");
    fs::write(&archive, &bytes)?;
    let staging = tempfile::Builder::new()
        .prefix(".dashboard-")
        .tempdir_in(&config.install_root);
    let extracted = staging.and_then(|dir| crate::extract_zip(&archive, dir.path()).map(|_| dir));
    if let Err(e) = fs::remove_file(&archive) {
        log::debug!("Could not remove {}: {}", archive.display(), e);
    }
    extracted.map_err(|e| anyhow::anyhow!("extracting dashboard archive failed: {}", e))
}

fn is_preserved(name: &OsStr) -> bool {
    PRESERVED.iter().any(|keep| name == OsStr::new(keep))
}

/// Removes everything in `web_dir` except [`PRESERVED`] entries.
fn clear(web_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(web_dir)?;
    for entry in fs::read_dir(web_dir)? {
        let entry = entry?;
        if is_preserved(&entry.file_name()) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Writes the built-in Flask dashboard into `web_dir`.
pub fn synthesize(web_dir: &Path) -> io::Result<()> {
    for (name, contents) in FALLBACK_FILES {
        crate::write_file(&web_dir.join(name), contents.as_bytes(), 0o644)?;
    }
    Ok(())
}
