// ███████     █████     ███    ███
// ██         ██   ██    ████  ████
// ███████    ███████    ██ ████ ██
//      ██    ██   ██    ██  ██  ██
// ███████ ██ ██   ██ ██ ██      ██ ██
// Copyright 2021-2026 The Open Sam Foundation (OSF)
// Developed by Caleb Mitchell Smith (ktheindifferent, PixelCoda, p0indexter)
// Licensed under GPLv3....see LICENSE file.

//! The install pipeline.
//!
//! Steps run strictly in order. Fatal failures return [`InstallError`] and
//! leave whatever earlier steps already did in place; degraded steps are
//! recorded in the [`InstallReport`] and the run carries on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use crate::config::InstallConfig;
use crate::error::{InstallError, Result};
use crate::host::HostProfile;
use crate::services::dashboard::{self, DashboardSource};
use crate::services::download::{self, Fetcher};
use crate::services::package_managers::{self, pip};
use crate::services::runtime::{self, PythonRuntime};
use crate::services::{compose, launchers, settings, systemd};
use crate::shell::Shell;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StepOutcome {
    Done,
    /// Finished with reduced functionality; the string says what is missing.
    Degraded(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: &'static str,
    pub outcome: StepOutcome,
}

impl StepRecord {
    fn new(step: &'static str, outcome: StepOutcome) -> Self {
        StepRecord { step, outcome }
    }

    fn done(step: &'static str) -> Self {
        StepRecord::new(step, StepOutcome::Done)
    }
}

/// What a finished run did. Written to `install.json` and printed as the summary.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub version: String,
    pub host: HostProfile,
    pub runtime: PythonRuntime,
    pub dashboard: DashboardSource,
    pub binary: PathBuf,
    pub files: Vec<PathBuf>,
    pub steps: Vec<StepRecord>,
}

impl InstallReport {
    pub fn degraded(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.steps.iter().filter_map(|record| match &record.outcome {
            StepOutcome::Degraded(reason) => Some((record.step, reason.as_str())),
            StepOutcome::Done => None,
        })
    }

    pub fn write_manifest(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(io::Error::other)?;
        crate::write_file(path, &json, 0o644)
    }

    pub fn summary(&self, config: &InstallConfig) -> String {
        let root = config.install_root.display();
        let dashboard = match &self.dashboard {
            DashboardSource::Archive { .. } => "published archive",
            DashboardSource::Synthesized { .. } => "built-in fallback",
        };
        let mut out = String::new();
        out.push_str(&format!("\n{}\n", "Installation complete".green().bold()));
        out.push_str(&format!("  Install root:  {}\n", root));
        out.push_str(&format!("  Bot binary:    {} ({})\n", self.binary.display(), self.host.arch));
        out.push_str(&format!("  Dashboard:     {} ({})\n", config.web_dir().display(), dashboard));
        out.push_str(&format!("  Settings:      {}\n", config.settings_path().display()));
        out.push_str(&format!(
            "  Python:        {} ({})\n",
            self.runtime.version,
            self.runtime.interpreter.display()
        ));
        out.push_str(&format!(
            "  Service units: {}, {}\n",
            config.unit_dir.join(config.bot_unit_name()).display(),
            config.unit_dir.join(config.web_unit_name()).display()
        ));

        let warnings: Vec<_> = self.degraded().collect();
        if !warnings.is_empty() {
            out.push_str(&format!("\n{}\n", "Warnings".yellow().bold()));
            for (step, reason) in warnings {
                out.push_str(&format!("  {step}: {reason}\n"));
            }
        }

        out.push_str(&format!("\n{}\n", "Default credentials (change them!)".yellow().bold()));
        out.push_str(&format!(
            "  Remote API:    {} / {}  (port {})\n",
            config.remote.username, config.remote.password, config.remote.port
        ));
        out.push_str(&format!(
            "  Web dashboard: {} / {}  (port {})\n",
            config.web.username, config.web.password, config.web.port
        ));

        out.push_str(&format!("\n{}\n", "Next steps".cyan().bold()));
        out.push_str(&format!("  Start both now:      {root}/{}\n", launchers::START_ALL));
        out.push_str(&format!(
            "  Run as services:     systemctl daemon-reload && systemctl enable --now {} {}\n",
            config.bot_unit_name(),
            config.web_unit_name()
        ));
        out.push_str(&format!("  Or with containers:  cd {root} && docker compose up -d\n"));
        out.push_str(&format!("  Open the dashboard:  http://<this-host>:{}\n", config.web.port));
        out
    }

    pub fn print_summary(&self, config: &InstallConfig) {
        print!("{}", self.summary(config));
    }
}

/// Root and set-uid-root both have the privileges the install needs.
pub fn ensure_root(running_as: sudo::RunningAs) -> Result<()> {
    match running_as {
        sudo::RunningAs::Root | sudo::RunningAs::Suid => Ok(()),
        sudo::RunningAs::User => Err(InstallError::NotRoot),
    }
}

pub struct Installer<'a, S: Shell, F: Fetcher> {
    shell: &'a S,
    fetcher: &'a F,
    config: &'a InstallConfig,
}

impl<'a, S: Shell, F: Fetcher> Installer<'a, S, F> {
    pub fn new(shell: &'a S, fetcher: &'a F, config: &'a InstallConfig) -> Self {
        Installer {
            shell,
            fetcher,
            config,
        }
    }

    pub fn run(&self, running_as: sudo::RunningAs) -> Result<InstallReport> {
        let config = self.config;
        let mut steps = Vec::new();

        ensure_root(running_as)?;
        steps.push(StepRecord::done("privileges"));

        let host = HostProfile::detect(self.shell, config)?;
        steps.push(if host.os.is_none() {
            StepRecord::new(
                "distribution",
                StepOutcome::Degraded(format!(
                    "{} unreadable, assumed {}",
                    config.os_release_path.display(),
                    host.family
                )),
            )
        } else {
            StepRecord::done("distribution")
        });
        steps.push(StepRecord::done("architecture"));

        steps.push(StepRecord::new(
            "dependencies",
            package_managers::install_dependencies(self.shell, &host.family),
        ));

        let runtime = runtime::ensure_python(self.shell, &host.family, &config.runtime)?;
        steps.push(StepRecord::done("runtime"));

        create_layout(config)?;
        steps.push(StepRecord::done("directories"));

        let binary = download::install_binary(self.fetcher, config, host.arch)?;
        steps.push(StepRecord::done("binary"));

        let dashboard = dashboard::install(self.fetcher, config)?;
        steps.push(StepRecord::new(
            "dashboard",
            match &dashboard {
                DashboardSource::Archive { .. } => StepOutcome::Done,
                DashboardSource::Synthesized { reason } => {
                    StepOutcome::Degraded(format!("built-in dashboard used: {reason}"))
                }
            },
        ));

        steps.push(StepRecord::new(
            "virtualenv",
            pip::setup(
                self.shell,
                &runtime,
                &config.web_dir(),
                &config.fallback_requirements,
            ),
        ));

        let mut files = vec![settings::write(config)?];
        steps.push(StepRecord::done("settings"));

        files.extend(launchers::write(config)?);
        steps.push(StepRecord::done("launchers"));

        files.extend(systemd::write_units(config)?);
        steps.push(StepRecord::done("service_units"));

        files.push(compose::write(config)?);
        steps.push(StepRecord::done("compose"));

        let report = InstallReport {
            version: crate::VERSION.unwrap_or("unknown").to_string(),
            host,
            runtime,
            dashboard,
            binary,
            files,
            steps,
        };
        report.write_manifest(&config.manifest_path())?;
        log::info!("Wrote {}", config.manifest_path().display());
        Ok(report)
    }
}

/// Creates the install root and web directory. Safe to repeat.
fn create_layout(config: &InstallConfig) -> io::Result<()> {
    for dir in [config.install_root.clone(), config.web_dir()] {
        log::info!("Creating directory: {}", dir.display());
        fs::create_dir_all(&dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Arch, OsFamily};
    use crate::services::download::mock::MockFetcher;
    use crate::services::runtime::RuntimeSource;
    use crate::shell::mock::MockShell;
    use crate::shell::CommandOutput;
    use tempfile::TempDir;

    fn host_shell(machine: &'static str) -> MockShell {
        MockShell::with_responder(move |line| match line {
            "uname -m" => Some(CommandOutput::ok(format!("{machine}\n"))),
            "python3 --version" => Some(CommandOutput::ok("Python 3.11.2")),
            l if l.ends_with("--version") => None,
            _ => Some(CommandOutput::ok("")),
        })
    }

    fn scratch(os_release: Option<&str>) -> (TempDir, InstallConfig) {
        let root = TempDir::new().unwrap();
        let config = InstallConfig::rooted_at(root.path());
        if let Some(text) = os_release {
            fs::write(&config.os_release_path, text).unwrap();
        }
        (root, config)
    }

    fn binary_only(config: &InstallConfig, arch: Arch) -> MockFetcher {
        MockFetcher::new().serve(&config.binary_url(arch), b"\x7fELF".to_vec())
    }

    #[test]
    fn fresh_install_writes_every_artifact() {
        let (_root, config) = scratch(Some("ID=debian\nVERSION_ID=\"12\"\n"));
        let shell = host_shell("x86_64");
        let fetcher = binary_only(&config, Arch::X86_64);

        let report = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap();

        assert_eq!(report.host.family, OsFamily::Debian);
        assert_eq!(report.host.arch, Arch::X86_64);
        assert!(config.binary_path().is_file());
        assert!(config.web_dir().join("app.py").is_file());
        assert!(config.settings_path().is_file());
        for script in [launchers::START_BOT, launchers::START_WEB, launchers::START_ALL] {
            assert!(config.install_root.join(script).is_file(), "missing {script}");
        }
        assert!(config.unit_dir.join("bot.service").is_file());
        assert!(config.unit_dir.join("bot-web.service").is_file());
        assert!(config.install_root.join(compose::COMPOSE_FILE).is_file());

        let manifest: serde_json::Value =
            serde_json::from_slice(&fs::read(config.manifest_path()).unwrap()).unwrap();
        assert_eq!(manifest["host"]["arch"], "x86_64");
        assert_eq!(manifest["dashboard"]["kind"], "synthesized");
        assert_eq!(manifest["runtime"]["source"], "preinstalled");

        let degraded: Vec<&str> = report.degraded().map(|(step, _)| step).collect();
        assert_eq!(degraded, vec!["dashboard", "virtualenv"]);
    }

    #[test]
    fn non_root_fails_before_touching_anything() {
        let (_root, config) = scratch(None);
        let shell = host_shell("x86_64");
        let fetcher = binary_only(&config, Arch::X86_64);

        let err = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::User)
            .unwrap_err();

        assert!(matches!(err, InstallError::NotRoot));
        assert!(shell.calls().is_empty());
        assert!(fetcher.requested().is_empty());
        assert!(!config.install_root.exists());
    }

    #[test]
    fn unsupported_arch_aborts_before_installing() {
        let (_root, config) = scratch(Some("ID=ubuntu\n"));
        let shell = host_shell("riscv64");
        let fetcher = MockFetcher::new();

        let err = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap_err();

        assert!(matches!(err, InstallError::UnsupportedArch(ref m) if m == "riscv64"));
        assert_eq!(shell.calls(), vec!["uname -m".to_string()]);
        assert!(fetcher.requested().is_empty());
    }

    #[test]
    fn binary_download_failure_is_fatal() {
        let (_root, config) = scratch(Some("ID=fedora\n"));
        let shell = host_shell("aarch64");
        let fetcher = MockFetcher::new();

        let err = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap_err();

        assert!(matches!(err, InstallError::Download { .. }));
        assert_eq!(fetcher.requested(), vec![config.binary_url(Arch::Arm64)]);
        // Earlier side effects stay.
        assert!(config.web_dir().is_dir());
        assert!(!config.settings_path().exists());
    }

    #[test]
    fn unknown_distribution_only_degrades() {
        let (_root, config) = scratch(Some("ID=alpine\n"));
        let shell = host_shell("armv6l");
        let fetcher = binary_only(&config, Arch::ArmRpi);

        let report = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap();

        assert_eq!(report.host.family, OsFamily::Other("alpine".to_string()));
        assert!(report.degraded().any(|(step, _)| step == "dependencies"));
        assert!(shell.calls_starting_with("apt-get").is_empty());
    }

    #[test]
    fn missing_os_release_is_recorded_as_degraded() {
        let (_root, config) = scratch(None);
        let shell = host_shell("x86_64");
        let fetcher = binary_only(&config, Arch::X86_64);

        let report = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap();

        assert_eq!(report.host.family, OsFamily::Debian);
        assert!(report.degraded().any(|(step, _)| step == "distribution"));
        assert!(!shell.calls_starting_with("apt-get install").is_empty());
    }

    #[test]
    fn rerun_over_existing_install_succeeds() {
        let (_root, config) = scratch(Some("ID=arch\n"));
        let shell = host_shell("i686");
        let fetcher = binary_only(&config, Arch::I686);
        let installer = Installer::new(&shell, &fetcher, &config);

        installer.run(sudo::RunningAs::Root).unwrap();
        fs::create_dir_all(config.web_dir().join("venv")).unwrap();
        fs::write(config.web_dir().join("venv/pyvenv.cfg"), "home = /usr/bin").unwrap();
        fs::write(config.web_dir().join("stale.txt"), "old").unwrap();
        let report = installer.run(sudo::RunningAs::Root).unwrap();

        assert_eq!(report.host.arch, Arch::I686);
        assert!(config.web_dir().join("venv/pyvenv.cfg").is_file());
        assert!(!config.web_dir().join("stale.txt").exists());
    }

    #[test]
    fn half_extracted_archive_does_not_leak_requirements() {
        use std::io::{Cursor, Write};

        let (_root, config) = scratch(Some("ID=debian\n"));
        let shell = host_shell("x86_64");
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in [("requirements.txt", "numpy\n"), ("../escape.txt", "x")] {
            writer
                .start_file(name, zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        let archive = writer.finish().unwrap().into_inner();
        let fetcher = binary_only(&config, Arch::X86_64).serve(&config.dashboard_url, archive);

        let report = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap();

        assert!(matches!(report.dashboard, DashboardSource::Synthesized { .. }));
        assert!(!config.web_dir().join("requirements.txt").exists());
        let pip: Vec<String> = shell
            .calls()
            .into_iter()
            .filter(|call| call.contains("-m pip install") && !call.contains("--upgrade"))
            .collect();
        assert_eq!(pip.len(), 1, "{pip:?}");
        assert!(pip[0].ends_with("-m pip install flask requests"), "{pip:?}");
        assert!(report.degraded().any(|(step, _)| step == "virtualenv"));
    }

    #[test]
    fn preinstalled_python_on_ubuntu_still_gets_venv_package() {
        let (_root, config) = scratch(Some("ID=ubuntu\nID_LIKE=debian\n"));
        let shell = MockShell::with_responder(|line| match line {
            "uname -m" => Some(CommandOutput::ok("x86_64\n")),
            "python3 --version" => Some(CommandOutput::ok("Python 3.10.12")),
            l if l.ends_with("--version") => None,
            _ => Some(CommandOutput::ok("")),
        });
        let fetcher = binary_only(&config, Arch::X86_64);

        let report = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap();

        assert_eq!(report.runtime.source, RuntimeSource::Preinstalled);
        let calls = shell.calls();
        let apt = calls
            .iter()
            .position(|c| c.starts_with("apt-get install") && c.contains("python3-venv"))
            .expect("python3-venv installed");
        let venv = calls
            .iter()
            .position(|c| c.starts_with("python3 -m venv"))
            .expect("venv created");
        assert!(apt < venv, "{calls:?}");
    }

    #[test]
    fn os_release_without_id_is_not_reported_unreadable() {
        let (_root, config) = scratch(Some("ID_LIKE=arch\n"));
        let shell = host_shell("x86_64");
        let fetcher = binary_only(&config, Arch::X86_64);

        let report = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap();

        assert_eq!(report.host.family, OsFamily::Arch);
        assert!(!report.degraded().any(|(step, _)| step == "distribution"));
    }

    #[test]
    fn summary_lists_credentials_and_next_steps() {
        let (_root, config) = scratch(Some("ID=debian\n"));
        let shell = host_shell("x86_64");
        let fetcher = binary_only(&config, Arch::X86_64);

        let report = Installer::new(&shell, &fetcher, &config)
            .run(sudo::RunningAs::Root)
            .unwrap();
        let summary = report.summary(&config);

        assert!(summary.contains("admin / admin  (port 8080)"));
        assert!(summary.contains("admin / changeme  (port 5000)"));
        assert!(summary.contains("systemctl enable --now bot.service bot-web.service"));
        assert!(summary.contains("docker compose up -d"));
    }
}
