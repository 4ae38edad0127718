pub mod linux;
pub mod pip;

use crate::host::OsFamily;
use crate::installer::StepOutcome;
use crate::shell::Shell;

/// Tools the installer itself shells out to, identical across families.
pub const BASE_DEPENDENCIES: &[&str] = &["curl", "wget", "unzip", "ca-certificates", "tar"];

/// Debian and Ubuntu split `venv` and `pip` out of `python3`, so a preinstalled
/// interpreter cannot build the dashboard environment without them.
const DEBIAN_DEPENDENCIES: &[&str] = &[
    "curl",
    "wget",
    "unzip",
    "ca-certificates",
    "tar",
    "python3-venv",
    "python3-pip",
];

/// Package set for `family`, `None` when the family has no known package manager.
pub fn dependency_packages(family: &OsFamily) -> Option<&'static [&'static str]> {
    match family {
        OsFamily::Debian => Some(DEBIAN_DEPENDENCIES),
        OsFamily::Fedora | OsFamily::Arch => Some(BASE_DEPENDENCIES),
        OsFamily::Other(_) => None,
    }
}

/// Installs the base dependencies. Never fatal: an unknown family or a failing
/// package manager leaves the user to install prerequisites themselves.
pub fn install_dependencies(shell: &impl Shell, family: &OsFamily) -> StepOutcome {
    let Some(packages) = dependency_packages(family) else {
        let reason = format!(
            "unsupported distribution {}; install {} manually",
            family,
            BASE_DEPENDENCIES.join(", ")
        );
        log::warn!("Skipping dependency installation: {}", reason);
        return StepOutcome::Degraded(reason);
    };

    log::info!("Installing dependencies: {}", packages.join(" "));
    let result = linux::refresh(shell, family)
        .and_then(|_| linux::install_packages(shell, family, packages));
    match result {
        Ok(()) => StepOutcome::Done,
        Err(e) => {
            log::warn!("Dependency installation failed: {:#}", e);
            StepOutcome::Degraded(format!("dependency installation failed: {e}"))
        }
    }
}
