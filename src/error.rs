//! Error types used by the vmvisor runtime.
//!
//! This module defines one error enum per concern:
//!
//! - [`ArgsError`] — argument-buffer construction failures.
//! - [`ControlError`] — control-socket and QMP protocol failures.
//! - [`ProfileError`] — VM profile loading failures.
//! - [`SupervisorError`] — failures of the supervision state machine itself.
//!
//! Setup-phase errors (bind, spawn, handshake) are fatal and abort the
//! supervisor; steady-state errors while forwarding a shutdown request are
//! surfaced as events and otherwise ignored, because the child's own
//! termination is the authoritative signal of completion.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling an argument vector.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ArgsError {
    /// Computing the next power-of-two capacity overflowed `usize`.
    #[error("argument buffer capacity overflow")]
    CapacityOverflow,

    /// A token contained an interior NUL byte and cannot be represented
    /// in an execv-style argument vector.
    #[error("argument contains an interior NUL byte")]
    NulByte,
}

/// Errors raised by the control-socket client.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ControlError {
    /// The control socket path exceeds the platform's addressable limit.
    #[error("control socket path too long for a unix socket address: {path:?}")]
    InvalidAddress {
        /// The offending path.
        path: PathBuf,
    },

    /// Socket read/write failure.
    #[error("control socket i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The peer sent something that is not a well-formed protocol message.
    #[error("control protocol violation: {detail}")]
    Protocol {
        /// What was malformed, including a hex dump for undecodable payloads.
        detail: String,
    },
}

impl ControlError {
    /// Returns a short stable label (snake_case) for use in event reasons.
    ///
    /// # Example
    /// ```
    /// use vmvisor::ControlError;
    ///
    /// let err = ControlError::Protocol { detail: "no return field".into() };
    /// assert_eq!(err.as_label(), "control_protocol");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ControlError::InvalidAddress { .. } => "control_invalid_address",
            ControlError::Io(_) => "control_io",
            ControlError::Protocol { .. } => "control_protocol",
        }
    }
}

/// Errors raised while loading a VM profile.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Neither `$HOME` nor an explicit config directory is available.
    #[error("cannot resolve user directories: HOME is not set")]
    HomeNotSet,

    /// The profile was found neither at the given path nor under the
    /// user config directory.
    #[error("no such profile: {name}")]
    NotFound {
        /// The profile name or path as given on the command line.
        name: String,
    },

    /// The profile file exists but could not be read.
    #[error("couldn't read profile {path:?}: {source}")]
    Io {
        /// Path of the file that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Errors produced by the supervision state machine.
///
/// All of these are fatal: the supervisor gives up and the process exits
/// nonzero with a descriptive message.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// Argument vector construction failed.
    #[error(transparent)]
    Args(#[from] ArgsError),

    /// Control socket setup or handshake failed.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Registering OS signal streams failed.
    #[error("failed to register signal handlers: {0}")]
    Signals(#[source] io::Error),

    /// The child process could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program name from the launch specification.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// Waiting on the child failed.
    #[error("failed to wait for vm process: {0}")]
    Wait(#[source] io::Error),

    /// The child was killed by a signal or dumped core.
    #[error("vm terminated abnormally with signal {signal} ({name})")]
    ChildSignaled {
        /// Raw signal number from the wait status.
        signal: i32,
        /// Human-readable signal name (e.g. `SIGKILL`).
        name: &'static str,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in event reasons.
    ///
    /// # Example
    /// ```
    /// use vmvisor::SupervisorError;
    ///
    /// let err = SupervisorError::ChildSignaled { signal: 9, name: "SIGKILL" };
    /// assert_eq!(err.as_label(), "child_signaled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::Args(_) => "args",
            SupervisorError::Control(_) => "control",
            SupervisorError::Signals(_) => "signals",
            SupervisorError::Spawn { .. } => "spawn",
            SupervisorError::Wait(_) => "wait",
            SupervisorError::ChildSignaled { .. } => "child_signaled",
        }
    }
}
