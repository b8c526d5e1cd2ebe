//! # vmvisor
//!
//! **vmvisor** launches and supervises a single QEMU virtual machine,
//! translating OS termination signals into graceful shutdown requests over
//! QMP and propagating the vm's exit status back to the caller.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  profile file (Key=Value)        CLI toggles (-f, -s)
//!          │                              │
//!          ▼                              ▼
//!     ┌──────────┐  to_launch_spec  ┌────────────┐
//!     │ VmProfile├─────────────────►│ LaunchSpec │
//!     └──────────┘                  └─────┬──────┘
//!                                         ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                   │
//! │  - ControlListener (bound before spawn)                       │
//! │  - SignalStreams   (registered before spawn)                  │
//! │  - ArgBuffer       (argv arena, + "-qmp unix:<sock>" tail)    │
//! │  - Bus / SubscriberSet (lifecycle events → LogWriter, ...)    │
//! └──────┬──────────────────────────────────────────────┬─────────┘
//!        │ spawn (pre_exec: setsid, clear signal mask)  │
//!        ▼                                              │
//!   qemu-system-x86_64 ── connects ──► ControlClient ◄──┘
//!                                      (QMP handshake)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Init ──► ChildStarted ──► ControlReady ──► (ShuttingDown) ──► Terminated
//!
//! event loop {
//!   SIGINT/SIGTERM/SIGQUIT ──► command("system_powerdown")   (best effort)
//!   child death            ──► decode wait status ──► exit code
//! }
//! ```
//!
//! ## Features
//! | Area            | Description                                         | Key types                          |
//! |-----------------|-----------------------------------------------------|------------------------------------|
//! | **Argv arena**  | Growable, index-tracked argument buffer.            | [`ArgBuffer`], [`ArgVec`]          |
//! | **Control**     | QMP handshake and single-command request/response.  | [`ControlClient`], [`Reply`]       |
//! | **Supervision** | Signal multiplexing and faithful exit codes.        | [`Supervisor`], [`Config`]         |
//! | **Profiles**    | On-disk VM descriptions and directory context.      | [`VmProfile`], [`Dirs`]            |
//! | **Events**      | Lifecycle telemetry for subscribers.                | [`Event`], [`EventKind`], [`Bus`]  |
//! | **Errors**      | Typed errors per concern.                           | [`SupervisorError`], [`ControlError`] |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use vmvisor::{Config, Dirs, LogWriter, Supervisor, VmProfile};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dirs = Dirs::resolve()?;
//!     let profile = VmProfile::load("arch", &dirs)?;
//!
//!     let mut cfg = Config::default();
//!     cfg.socket_dir = Some(dirs.runtime.clone());
//!
//!     let sup = Supervisor::new(cfg, vec![Arc::new(LogWriter)]);
//!     let code = sup.run(profile.to_launch_spec()).await?;
//!     std::process::exit(code);
//! }
//! ```

mod config;
mod control;
mod core;
mod error;
mod events;
mod launch;
mod profile;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use control::{hex_dump, ConnState, ControlClient, ControlListener, Reply, CMD_CAPABILITIES, CMD_POWERDOWN};
pub use crate::core::Supervisor;
pub use error::{ArgsError, ControlError, ProfileError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use launch::{ArgBuffer, ArgVec, LaunchSpec};
pub use profile::{Dirs, VmProfile};
pub use subscribers::{LogWriter, Subscriber, SubscriberSet};
