// ███████     █████     ███    ███
// ██         ██   ██    ████  ████
// ███████    ███████    ██ ████ ██
//      ██    ██   ██    ██  ██  ██
// ███████ ██ ██   ██ ██ ██      ██ ██
// Copyright 2021-2026 The Open Sam Foundation (OSF)
// Developed by Caleb Mitchell Smith (ktheindifferent, PixelCoda, p0indexter)
// Licensed under GPLv3....see LICENSE file.

use std::fs;
use std::io::{self, Result};
use std::path::Path;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub mod config;
pub mod error;
pub mod host;
pub mod installer;
pub mod services;
pub mod shell;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

pub fn print_banner() {
    println!("██████   ██████  ████████ ███████ ████████ ██████   █████  ██████  ");
    println!("██   ██ ██    ██    ██    ██         ██    ██   ██ ██   ██ ██   ██ ");
    println!("██████  ██    ██    ██    ███████    ██    ██████  ███████ ██████  ");
    println!("██   ██ ██    ██    ██         ██    ██    ██   ██ ██   ██ ██      ");
    println!("██████   ██████     ██    ███████    ██    ██   ██ ██   ██ ██      ");
    println!("Bot + dashboard installer");
    println!("VERSION: {}", VERSION.unwrap_or("unknown"));
    println!("Licensed under GPLv3....see LICENSE file.");
    println!("================================================");
}

/// Extracts a ZIP file to the specified directory.
pub fn extract_zip(zip_path: &Path, extract_path: &Path) -> Result<()> {
    let file = fs::File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let outpath = extract_path.join(
            file.enclosed_name().ok_or_else(|| io::Error::other("Invalid path"))?
        );

        if file.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut outfile = fs::File::create(&outpath)?;
            io::copy(&mut file, &mut outfile)?;

            #[cfg(unix)]
            if let Some(mode) = file.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Writes `contents` to `path`, replacing any previous file, and applies `mode`.
pub fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    set_mode(path, mode)
}
