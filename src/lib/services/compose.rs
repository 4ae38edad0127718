use std::io;
use std::path::PathBuf;

use crate::config::InstallConfig;

pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Same two-process topology as the systemd units, for container users. The
/// web container installs its own packages since the host venv is not
/// portable across interpreters.
pub fn render(config: &InstallConfig) -> String {
    let root = config.install_root.display();
    let web_dir = config.web_dir();
    let fallback = config.fallback_requirements.join(" ");
    format!(
        "services:\n\
         \x20 bot:\n\
         \x20   image: debian:bookworm-slim\n\
         \x20   working_dir: {root}\n\
         \x20   command: [\"{binary}\"]\n\
         \x20   volumes:\n\
         \x20     - {root}:{root}\n\
         \x20   ports:\n\
         \x20     - \"{remote_port}:{remote_port}\"\n\
         \x20   restart: on-failure\n\
         \n\
         \x20 web:\n\
         \x20   image: python:3.11-slim\n\
         \x20   working_dir: {web_dir}\n\
         \x20   command:\n\
         \x20     - sh\n\
         \x20     - -c\n\
         \x20     - >-\n\
         \x20       (test -f requirements.txt && pip install --no-cache-dir -r requirements.txt\n\
         \x20       || pip install --no-cache-dir {fallback})\n\
         \x20       && exec python app.py --port {web_port} --bot-url http://bot:{remote_port}\n\
         \x20       --bot-user {remote_user} --bot-pass {remote_pass} --settings {settings}\n\
         \x20   volumes:\n\
         \x20     - {root}:{root}\n\
         \x20   ports:\n\
         \x20     - \"{web_port}:{web_port}\"\n\
         \x20   depends_on:\n\
         \x20     - bot\n\
         \x20   restart: on-failure\n",
        root = root,
        binary = config.binary_path().display(),
        remote_port = config.remote.port,
        web_dir = web_dir.display(),
        fallback = fallback,
        web_port = config.web.port,
        remote_user = config.remote.username,
        remote_pass = config.remote.password,
        settings = config.settings_path().display(),
    )
}

pub fn write(config: &InstallConfig) -> io::Result<PathBuf> {
    let path = config.install_root.join(COMPOSE_FILE);
    crate::write_file(&path, render(config).as_bytes(), 0o644)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}
