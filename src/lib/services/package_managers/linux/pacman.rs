use crate::shell::Shell;

/// Syncs the package databases and installs a batch of packages using pacman.
/// Packages that are already up to date are left alone.
pub fn install_packages(shell: &impl Shell, packages: &[&str]) -> anyhow::Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let mut args = vec!["-Sy", "--noconfirm", "--needed"];
    args.extend_from_slice(packages);
    shell
        .run_checked("pacman", &args)
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("pacman -S failed: {}", e))
}
