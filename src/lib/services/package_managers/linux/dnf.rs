use crate::shell::Shell;

/// Installs a batch of packages using dnf. dnf refreshes metadata on its own.
pub fn install_packages(shell: &impl Shell, packages: &[&str]) -> anyhow::Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let mut args = vec!["install", "-y"];
    args.extend_from_slice(packages);
    shell
        .run_checked("dnf", &args)
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("dnf install failed: {}", e))
}
