//! # Termination-signal handling.
//!
//! [`SignalStreams`] bundles the interrupt/terminate/quit unix signal
//! streams. The bundle is registered **before** the child is spawned so a
//! signal arriving between setup and the event loop is buffered by the
//! streams rather than lost — the async rendition of blocking the signal
//! set up front.
//!
//! Child-death is deliberately not part of this bundle: the supervisor
//! observes it through `Child::wait()`, which also means stop/continue
//! notifications are never surfaced and need no explicit ignoring.

use std::io;

use tokio::signal::unix::{signal, Signal, SignalKind};

/// Termination signal observed by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT (Ctrl-C in terminal).
    Interrupt,
    /// SIGTERM (default kill signal).
    Terminate,
    /// SIGQUIT.
    Quit,
}

impl ShutdownSignal {
    /// Returns the conventional signal name.
    pub fn name(&self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Quit => "SIGQUIT",
        }
    }
}

/// Registered termination-signal streams.
pub(crate) struct SignalStreams {
    interrupt: Signal,
    terminate: Signal,
    quit: Signal,
}

impl SignalStreams {
    /// Registers all three streams. Must happen before the child spawns.
    pub(crate) fn register() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    /// Waits for the next termination signal.
    ///
    /// Cancel safe: each arm is a plain `Signal::recv`.
    pub(crate) async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.quit.recv() => ShutdownSignal::Quit,
        }
    }
}
