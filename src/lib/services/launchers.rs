use std::io;
use std::path::PathBuf;

use crate::config::InstallConfig;
use crate::services::package_managers::pip;

pub const START_BOT: &str = "start_bot.sh";
pub const START_WEB: &str = "start_web.sh";
pub const START_ALL: &str = "start_all.sh";

/// Command line that runs the dashboard from its venv.
pub fn web_command(config: &InstallConfig) -> String {
    format!(
        "{python} app.py --port {port} --bot-url {url} --bot-user {user} --bot-pass {pass} --settings {settings}",
        python = pip::venv_python(&config.web_dir()).display(),
        port = config.web.port,
        url = config.bot_api_url(),
        user = config.remote.username,
        pass = config.remote.password,
        settings = config.settings_path().display(),
    )
}

pub fn render_start_bot(config: &InstallConfig) -> String {
    format!(
        "#!/bin/sh\n\
         # Starts the bot in the foreground.\n\
         cd \"{root}\" || exit 1\n\
         exec \"{binary}\" \"$@\"\n",
        root = config.install_root.display(),
        binary = config.binary_path().display(),
    )
}

pub fn render_start_web(config: &InstallConfig) -> String {
    format!(
        "#!/bin/sh\n\
         # Starts the web dashboard in the foreground.\n\
         cd \"{web_dir}\" || exit 1\n\
         exec {command}\n",
        web_dir = config.web_dir().display(),
        command = web_command(config),
    )
}

pub fn render_start_all(config: &InstallConfig) -> String {
    format!(
        "#!/bin/sh\n\
         # Starts the bot in the background, then the dashboard in the foreground.\n\
         cd \"{root}\" || exit 1\n\
         ./{start_bot} &\n\
         sleep {delay}\n\
         exec ./{start_web}\n",
        root = config.install_root.display(),
        start_bot = START_BOT,
        delay = config.launch_delay_secs,
        start_web = START_WEB,
    )
}

/// Writes the three launcher scripts into the install root, mode 0755.
pub fn write(config: &InstallConfig) -> io::Result<Vec<PathBuf>> {
    let scripts = [
        (START_BOT, render_start_bot(config)),
        (START_WEB, render_start_web(config)),
        (START_ALL, render_start_all(config)),
    ];
    let mut written = Vec::with_capacity(scripts.len());
    for (name, contents) in scripts {
        let path = config.install_root.join(name);
        crate::write_file(&path, contents.as_bytes(), 0o755)?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
