use std::path::{Path, PathBuf};

use crate::installer::StepOutcome;
use crate::services::runtime::PythonRuntime;
use crate::shell::Shell;

pub fn venv_dir(web_dir: &Path) -> PathBuf {
    web_dir.join("venv")
}

pub fn venv_python(web_dir: &Path) -> PathBuf {
    venv_dir(web_dir).join("bin").join("python")
}

/// Creates `<web_dir>/venv` with `runtime` and upgrades pip inside it.
pub fn create_venv(shell: &impl Shell, runtime: &PythonRuntime, web_dir: &Path) -> anyhow::Result<PathBuf> {
    let venv = venv_dir(web_dir);
    log::info!("Creating virtualenv {}", venv.display());
    shell.run_checked(
        &runtime.interpreter.to_string_lossy(),
        &["-m", "venv", &*venv.to_string_lossy()],
    )?;

    let python = venv_python(web_dir);
    shell.run_checked(
        &python.to_string_lossy(),
        &["-m", "pip", "install", "--upgrade", "pip"],
    )?;
    Ok(python)
}

/// Installs `requirements.txt` when the dashboard ships one, otherwise the
/// `fallback` packages. Returns whether the fallback set was used.
pub fn install_requirements(
    shell: &impl Shell,
    python: &Path,
    web_dir: &Path,
    fallback: &[String],
) -> anyhow::Result<bool> {
    let requirements = web_dir.join("requirements.txt");
    let python = python.to_string_lossy();

    if requirements.is_file() {
        log::info!("Installing dashboard requirements from {}", requirements.display());
        shell.run_checked(
            &python,
            &["-m", "pip", "install", "-r", &*requirements.to_string_lossy()],
        )?;
        return Ok(false);
    }

    log::warn!(
        "{} not found, installing fallback packages: {}",
        requirements.display(),
        fallback.join(" ")
    );
    let mut args = vec!["-m", "pip", "install"];
    args.extend(fallback.iter().map(String::as_str));
    shell.run_checked(&python, &args)?;
    Ok(true)
}

/// Sets up the dashboard's isolated environment. Failures degrade the install
/// rather than abort it.
pub fn setup(shell: &impl Shell, runtime: &PythonRuntime, web_dir: &Path, fallback: &[String]) -> StepOutcome {
    let result = create_venv(shell, runtime, web_dir)
        .and_then(|python| install_requirements(shell, &python, web_dir, fallback));
    match result {
        Ok(false) => StepOutcome::Done,
        Ok(true) => StepOutcome::Degraded(format!(
            "no requirements.txt, installed {}",
            fallback.join(", ")
        )),
        Err(e) => {
            log::warn!("Dashboard environment setup failed: {:#}", e);
            StepOutcome::Degraded(format!("virtualenv setup failed: {e}"))
        }
    }
}
