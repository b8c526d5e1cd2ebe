//! # Supervisor configuration.
//!
//! [`Config`] defines the runtime knobs: event bus capacity and where the
//! per-instance control socket lives.
//!
//! # Example
//! ```
//! use vmvisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.bus_capacity = 64;
//! assert!(cfg.socket_dir.is_none());
//! ```

use std::path::PathBuf;

/// Runtime configuration for the supervisor.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Directory for the control socket. `None` means the per-user runtime
    /// directory (`$XDG_RUNTIME_DIR`, falling back to the temp dir).
    pub socket_dir: Option<PathBuf>,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `bus_capacity = 128`
    /// - `socket_dir = None` (per-user runtime directory)
    fn default() -> Self {
        Self {
            bus_capacity: 128,
            socket_dir: None,
        }
    }
}
