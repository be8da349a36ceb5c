//! External build step (the bundler that produces the compiled CSS/JS).

use std::{
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

use thiserror::Error;
use tracing::{debug, info};

/// Build command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No program configured.
    #[error("build command is empty")]
    Empty,

    /// The program could not be started.
    #[error("failed to run `{program}` in {dir}: {source}")]
    Spawn {
        program: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and reported failure.
    #[error("`{program}` failed with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Result type for build command operations.
pub type Result<T> = std::result::Result<T, CommandError>;

/// An argv-style command run without a shell.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    argv: Vec<String>,
    working_dir: PathBuf,
}

impl BuildCommand {
    /// Create a command from program plus arguments.
    pub fn new(argv: Vec<String>, working_dir: impl Into<PathBuf>) -> Result<Self> {
        if argv.first().is_none_or(|program| program.is_empty()) {
            return Err(CommandError::Empty);
        }
        Ok(Self {
            argv,
            working_dir: working_dir.into(),
        })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run to completion with inherited stdio.
    ///
    /// A non-zero exit is an error; the child's own output is the diagnostic.
    pub fn run(&self) -> Result<()> {
        info!(
            program = self.program(),
            args = ?self.args(),
            dir = %self.working_dir.display(),
            "running build command"
        );

        let status = Command::new(self.program())
            .args(self.args())
            .current_dir(&self.working_dir)
            .status()
            .map_err(|source| CommandError::Spawn {
                program: self.program().to_string(),
                dir: self.working_dir.clone(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::Failed {
                program: self.program().to_string(),
                status,
            });
        }

        debug!(program = self.program(), "build command finished");
        Ok(())
    }
}
