pub mod apt;
pub mod dnf;
pub mod pacman;

use crate::host::OsFamily;
use crate::shell::Shell;

/// Refreshes the package index where the package manager needs it done
/// separately from installs.
pub fn refresh(shell: &impl Shell, family: &OsFamily) -> anyhow::Result<()> {
    match family {
        OsFamily::Debian => apt::update(shell),
        OsFamily::Fedora | OsFamily::Arch => Ok(()),
        OsFamily::Other(id) => Err(anyhow::anyhow!("No supported package manager for '{}'", id)),
    }
}

/// Installs a batch of packages with the package manager of `family`.
/// Returns Ok(()) if all packages are installed successfully, otherwise returns an error.
pub fn install_packages(
    shell: &impl Shell,
    family: &OsFamily,
    packages: &[&str],
) -> anyhow::Result<()> {
    match family {
        OsFamily::Debian => apt::install_packages(shell, packages),
        OsFamily::Fedora => dnf::install_packages(shell, packages),
        OsFamily::Arch => pacman::install_packages(shell, packages),
        OsFamily::Other(id) => Err(anyhow::anyhow!("No supported package manager for '{}'", id)),
    }
}
