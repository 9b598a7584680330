use log::{debug, error, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use super::deck::SolverDeck;
use crate::config::Config;
use crate::error::{LutError, exit_status};

/// Anything able to run a deck and produce the output file it names.
pub trait OpticalSolver {
    fn run(&self, deck: &Path) -> Result<(), LutError>;
}

impl<S: OpticalSolver + ?Sized> OpticalSolver for &S {
    fn run(&self, deck: &Path) -> Result<(), LutError> {
        (**self).run(deck)
    }
}

/// The MOPSMAP executable, fed the deck path as its only argument.
#[derive(Debug, Clone)]
pub struct Mopsmap {
    executable: PathBuf,
}

impl Mopsmap {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, LutError> {
        Ok(Self::new(config.solver_executable()?))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl OpticalSolver for Mopsmap {
    fn run(&self, deck: &Path) -> Result<(), LutError> {
        let command = format!("{} {}", self.executable.display(), deck.display());
        debug!("Running {}", command);

        let output = Command::new(&self.executable)
            .arg(deck)
            .output()
            .map_err(|source| LutError::SolverLaunch {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let code = output.status.code();
            error!("Solver command failed: {}", command);
            error!("  {}", exit_status(code));
            error!("  stdout: {}", stdout.trim_end());
            error!("  stderr: {}", stderr.trim_end());
            return Err(LutError::SolverExecution {
                command,
                code,
                stdout,
                stderr,
            });
        }

        if !stdout.trim().is_empty() {
            info!("{}", stdout.trim_end());
        }

        Ok(())
    }
}

/// Polls until `path` exists, giving up after `timeout`.
pub fn wait_for_file(
    path: &Path,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<(), LutError> {
    let start = Instant::now();

    while !path.exists() {
        let waited = start.elapsed();
        if waited >= timeout {
            return Err(LutError::Timeout {
                path: path.to_path_buf(),
                waited,
            });
        }
        thread::sleep(poll_interval.min(timeout - waited));
    }

    Ok(())
}

/// Runs decks through a solver and waits for their output.
#[derive(Debug)]
pub struct SolverController<S> {
    solver: S,
    poll_interval: Duration,
    timeout: Duration,
}

impl<S: OpticalSolver> SolverController<S> {
    pub fn new(solver: S, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            solver,
            poll_interval,
            timeout,
        }
    }

    /// Returns once the output file named in the deck exists. Output left over from a
    /// previous run is removed first so it can never be mistaken for the new one.
    pub fn invoke(&self, deck: &SolverDeck) -> Result<PathBuf, LutError> {
        wait_for_file(&deck.deck_path, self.poll_interval, self.timeout)?;

        match fs::remove_file(&deck.output_path) {
            Ok(()) => debug!("Removed stale output {}", deck.output_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.solver.run(&deck.deck_path)?;
        wait_for_file(&deck.output_path, self.poll_interval, self.timeout)?;

        Ok(deck.output_path.clone())
    }
}
