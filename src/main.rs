// ███████     █████     ███    ███
// ██         ██   ██    ████  ████
// ███████    ███████    ██ ████ ██
//      ██    ██   ██    ██  ██  ██
// ███████ ██ ██   ██ ██ ██      ██ ██
// Copyright 2021-2026 The Open Sam Foundation (OSF)
// Developed by Caleb Mitchell Smith (ktheindifferent, PixelCoda, p0indexter)
// Licensed under GPLv3....see LICENSE file.

use libbotstrap::config::InstallConfig;
use libbotstrap::installer::Installer;
use libbotstrap::services::download::HttpFetcher;
use libbotstrap::shell::SystemShell;

/// Installs the bot and its dashboard. Takes no arguments; must run as root.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    libbotstrap::print_banner();

    let config = InstallConfig::default();
    let shell = SystemShell;
    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    match Installer::new(&shell, &fetcher, &config).run(sudo::check()) {
        Ok(report) => report.print_summary(&config),
        Err(e) => {
            log::error!("Installation failed: {}", e);
            std::process::exit(1);
        }
    }
}
