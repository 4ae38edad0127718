use std::io;
use std::path::PathBuf;

use crate::config::InstallConfig;
use crate::services::launchers;

pub fn render_bot_unit(config: &InstallConfig) -> String {
    format!(
        "[Unit]\n\
         Description=Bot\n\
         After=network-online.target\n\
         Wants=network-online.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         WorkingDirectory={root}\n\
         ExecStart={binary}\n\
         Restart=on-failure\n\
         RestartSec={restart}\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        root = config.install_root.display(),
        binary = config.binary_path().display(),
        restart = config.restart_sec,
    )
}

pub fn render_web_unit(config: &InstallConfig) -> String {
    format!(
        "[Unit]\n\
         Description=Bot web dashboard\n\
         After=network-online.target {bot_unit}\n\
         Requires={bot_unit}\n\
         \n\
         [Service]\n\
         Type=simple\n\
         WorkingDirectory={web_dir}\n\
         ExecStart={command}\n\
         Restart=on-failure\n\
         RestartSec={restart}\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        bot_unit = config.bot_unit_name(),
        web_dir = config.web_dir().display(),
        command = launchers::web_command(config),
        restart = config.restart_sec,
    )
}

/// Writes both units into the unit directory. They are not enabled.
pub fn write_units(config: &InstallConfig) -> io::Result<Vec<PathBuf>> {
    let units = [
        (config.bot_unit_name(), render_bot_unit(config)),
        (config.web_unit_name(), render_web_unit(config)),
    ];
    let mut written = Vec::with_capacity(units.len());
    for (name, contents) in units {
        let path = config.unit_dir.join(&name);
        log::info!("Installing unit: {} → {}", name, path.display());
        crate::write_file(&path, contents.as_bytes(), 0o644)?;
        written.push(path);
    }
    Ok(written)
}
