pub mod compose;
pub mod dashboard;
pub mod download;
pub mod launchers;
pub mod package_managers;
pub mod runtime;
pub mod settings;
pub mod systemd;
