//! # Supervisor: vm lifecycle and signal multiplexing.
//!
//! The [`Supervisor`] owns the whole child lifecycle. Its states:
//!
//! ```text
//! Init ──► ChildStarted ──► ControlReady ──► (ShuttingDown) ──► Terminated
//!
//! Init:          register signal streams, bind the control socket
//! ChildStarted:  spawn the vm; it connects back over the socket
//! ControlReady:  accept (raced against child death) + QMP handshake
//! event loop:    select! over termination signals and child death
//! Terminated:    wait status decoded into the process exit code
//! ```
//!
//! ## Rules
//! - The signal streams and the listening socket exist **before** the
//!   child does, so neither an early signal nor an early connect is lost.
//! - The accept is intentional backpressure — the supervisor has nothing
//!   to do before a control channel exists — but it is raced against
//!   child death so a vm that dies without connecting cannot wedge it.
//! - Shutdown forwarding is fire-and-forget: a failed `system_powerdown`
//!   is published as an event and the loop keeps waiting; the child's own
//!   termination is the authoritative end. A repeated signal simply
//!   re-sends the same command. There is no force-kill escalation.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use vmvisor::{Config, LaunchSpec, LogWriter, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let spec = LaunchSpec::new("qemu-system-x86_64").arg("-enable-kvm");
//!     let sup = Supervisor::new(Config::default(), vec![Arc::new(LogWriter)]);
//!     let code = sup.run(spec).await?;
//!     std::process::exit(code);
//! }
//! ```

use std::process::ExitStatus;
use std::sync::Arc;

use crate::config::Config;
use crate::control::{ControlClient, ControlListener, Reply, CMD_POWERDOWN};
use crate::core::child;
use crate::core::signals::{ShutdownSignal, SignalStreams};
use crate::error::SupervisorError;
use crate::events::{Bus, Event, EventKind};
use crate::launch::LaunchSpec;
use crate::profile::Dirs;
use crate::subscribers::{Subscriber, SubscriberSet};

/// Supervises one vm process from spawn to termination.
pub struct Supervisor {
    /// Runtime configuration.
    pub cfg: Config,
    /// Event bus; tests and external observers may subscribe.
    pub bus: Bus,
    /// Fan-out set for subscribers.
    subs: SubscriberSet,
}

impl Supervisor {
    /// Creates a supervisor with the given config and subscribers.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscriber>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        Self {
            cfg,
            bus,
            subs: SubscriberSet::new(subscribers),
        }
    }

    /// Runs the vm described by `spec` until it terminates, returning the
    /// exit code the supervisor process should report.
    ///
    /// Setup failures (bind, spawn, handshake) are fatal errors; see the
    /// module docs for the steady-state rules.
    pub async fn run(&self, spec: LaunchSpec) -> Result<i32, SupervisorError> {
        let sock_path = self.control_socket_path();
        let listener = ControlListener::bind(&sock_path)?;
        let mut signals = SignalStreams::register().map_err(SupervisorError::Signals)?;

        let mut vm = child::spawn(&spec, listener.path())?;
        if let Some(pid) = vm.id() {
            self.emit(Event::now(EventKind::ChildSpawned).with_pid(pid)).await;
        }

        // Rendezvous: exactly one inbound connection is expected. Racing
        // the accept against child death keeps a vm that exits without
        // ever connecting (scenarios: instant clean exit, killed during
        // boot) from wedging the supervisor.
        let mut control = tokio::select! {
            accepted = listener.accept() => accepted?,
            status = vm.wait() => {
                let status = status.map_err(SupervisorError::Wait)?;
                return self.finish(status).await;
            }
        };
        self.emit(Event::now(EventKind::ControlConnected)).await;

        control.handshake().await?;
        self.emit(Event::now(EventKind::ControlReady)).await;

        loop {
            tokio::select! {
                sig = signals.recv() => {
                    self.forward_powerdown(&mut control, sig).await;
                }
                status = vm.wait() => {
                    let status = status.map_err(SupervisorError::Wait)?;
                    return self.finish(status).await;
                }
            }
        }
    }

    /// Control socket path, unique per supervisor instance.
    fn control_socket_path(&self) -> std::path::PathBuf {
        let dir = self
            .cfg
            .socket_dir
            .clone()
            .unwrap_or_else(Dirs::runtime_dir);
        dir.join(format!("vmvisor-{}.sock", std::process::id()))
    }

    /// Forwards one termination signal as a graceful powerdown request.
    ///
    /// Best effort: failures become events, never errors — the child may
    /// already be on its way out, and its death is observed independently.
    async fn forward_powerdown(&self, control: &mut ControlClient, sig: ShutdownSignal) {
        self.emit(Event::now(EventKind::ShutdownRequested).with_signal(sig.name()))
            .await;

        match control.command(CMD_POWERDOWN).await {
            Ok(Reply::Ok) => {
                self.emit(Event::now(EventKind::PowerdownSent)).await;
            }
            Ok(Reply::Closed) => {
                self.emit(
                    Event::now(EventKind::PowerdownFailed)
                        .with_reason("control channel closed by vm"),
                )
                .await;
            }
            Err(err) => {
                self.emit(Event::now(EventKind::PowerdownFailed).with_reason(err.to_string()))
                    .await;
            }
        }
    }

    /// Decodes the terminal wait status and publishes the matching event.
    async fn finish(&self, status: ExitStatus) -> Result<i32, SupervisorError> {
        match child::classify_exit(status) {
            Ok(code) => {
                self.emit(Event::now(EventKind::ChildExited).with_code(code)).await;
                Ok(code)
            }
            Err(err) => {
                if let SupervisorError::ChildSignaled { name, .. } = &err {
                    self.emit(Event::now(EventKind::ChildSignaled).with_signal(*name))
                        .await;
                }
                Err(err)
            }
        }
    }

    /// Delivers one event to the subscribers, then to bus observers.
    ///
    /// Subscribers are awaited inline so terminal events are flushed
    /// before `run` returns and the process exits.
    async fn emit(&self, ev: Event) {
        self.subs.emit(&ev).await;
        self.bus.publish(ev);
    }
}
