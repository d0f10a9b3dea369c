//! External build tool invocations.

use std::fmt;
use std::process::Command;

use jojo_common::error::{JojoError, Result};

/// A build tool program with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name, looked up on `PATH`.
    pub program: String,
    /// Arguments, passed verbatim.
    pub args: Vec<String>,
}

impl Invocation {
    /// Starts an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes invocations.
pub trait CommandRunner {
    /// Runs `invocation` to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits unsuccessfully.
    fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Runs invocations as child processes of the current one.
///
/// The child inherits the working directory and standard streams, so build
/// tool output reaches the terminal as it is produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let program = which::which(&invocation.program).map_err(|_| JojoError::NotFound {
            kind: "build tool",
            id: invocation.program.clone(),
        })?;
        tracing::debug!(program = %program.display(), "resolved build tool");

        let status = Command::new(&program)
            .args(&invocation.args)
            .status()
            .map_err(|e| JojoError::io(&program, e))?;
        if !status.success() {
            return Err(JojoError::CommandFailed {
                command: invocation.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
