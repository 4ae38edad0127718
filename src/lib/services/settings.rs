use std::io;
use std::path::PathBuf;

use crate::config::InstallConfig;

/// Renders `settings.ini`. Only the config goes in, never the host profile.
pub fn render(config: &InstallConfig) -> String {
    format!(
        "# Generated by botstrap {version}. Change the default passwords.\n\
         \n\
         [remote]\n\
         enabled = true\n\
         port = {remote_port}\n\
         username = {remote_user}\n\
         password = {remote_pass}\n\
         \n\
         [web]\n\
         port = {web_port}\n\
         username = {web_user}\n\
         password = {web_pass}\n\
         \n\
         [paths]\n\
         install_root = {root}\n\
         web_dir = {web_dir}\n",
        version = crate::VERSION.unwrap_or("unknown"),
        remote_port = config.remote.port,
        remote_user = config.remote.username,
        remote_pass = config.remote.password,
        web_port = config.web.port,
        web_user = config.web.username,
        web_pass = config.web.password,
        root = config.install_root.display(),
        web_dir = config.web_dir().display(),
    )
}

/// Writes `settings.ini`, readable by root only since it holds passwords.
pub fn write(config: &InstallConfig) -> io::Result<PathBuf> {
    let path = config.settings_path();
    crate::write_file(&path, render(config).as_bytes(), 0o600)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn section<'a>(text: &'a str, name: &str) -> Vec<&'a str> {
        let header = format!("[{name}]");
        text.lines()
            .skip_while(|l| *l != header)
            .skip(1)
            .take_while(|l| !l.starts_with('['))
            .filter(|l| !l.is_empty())
            .collect()
    }

    #[test]
    fn holds_both_ports_and_credential_pairs() {
        let text = render(&InstallConfig::default());

        assert_eq!(
            section(&text, "remote"),
            vec!["enabled = true", "port = 8080", "username = admin", "password = admin"]
        );
        assert_eq!(
            section(&text, "web"),
            vec!["port = 5000", "username = admin", "password = changeme"]
        );
        let ports: Vec<&str> = text.lines().filter(|l| l.starts_with("port = ")).collect();
        assert_eq!(ports, vec!["port = 8080", "port = 5000"]);
    }

    #[test]
    fn only_paths_depend_on_install_root() {
        let a = render(&InstallConfig::default());
        let b = render(&InstallConfig::rooted_at("/srv/elsewhere"));
        assert_eq!(section(&a, "remote"), section(&b, "remote"));
        assert_eq!(section(&a, "web"), section(&b, "web"));
    }

    #[test]
    fn write_creates_private_file() {
        let root = TempDir::new().unwrap();
        let config = InstallConfig::rooted_at(root.path());

        let path = write(&config).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), render(&config));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
        }
    }
}
