use std::io;
use std::process::{Command, Stdio};

/// Captured result of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandOutput {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        CommandOutput {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Every package manager, interpreter and probe the installer touches goes
/// through this trait.
///
/// `run` returns `Err` only when the program could not be started at all
/// (typically `NotFound`); a non-zero exit is reported through
/// [`CommandOutput::success`].
pub trait Shell {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;

    /// Whether `program` resolves on `PATH`.
    fn has(&self, program: &str) -> bool;

    fn sh(&self, script: &str) -> io::Result<CommandOutput> {
        self.run("sh", &["-c", script])
    }

    /// Like [`Shell::run`], but a non-zero exit becomes an error.
    fn run_checked(&self, program: &str, args: &[&str]) -> anyhow::Result<CommandOutput> {
        let output = self.run(program, args)?;
        if output.success {
            Ok(output)
        } else {
            anyhow::bail!(
                "`{} {}` failed: {}",
                program,
                args.join(" "),
                output.stderr.trim()
            )
        }
    }
}

/// Runs commands on the local machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        log::debug!("$ {} {}", program, args.join(" "));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        let result = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        if !result.success {
            log::debug!("{} exited with {}: {}", program, output.status, result.stderr.trim());
        }
        Ok(result)
    }

    fn has(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
