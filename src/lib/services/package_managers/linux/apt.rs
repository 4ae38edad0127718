use crate::shell::Shell;

/// Refreshes the apt package index.
pub fn update(shell: &impl Shell) -> anyhow::Result<()> {
    shell.run_checked("apt-get", &["update"])?;
    Ok(())
}

/// Installs a batch of packages using apt-get.
/// Returns Ok(()) if all packages are installed successfully, otherwise returns an error.
pub fn install_packages(shell: &impl Shell, packages: &[&str]) -> anyhow::Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let mut args = vec!["install", "-y"];
    args.extend_from_slice(packages);
    shell
        .run_checked("apt-get", &args)
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("apt-get install failed: {}", e))
}
