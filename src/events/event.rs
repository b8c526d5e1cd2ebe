//! # Lifecycle events emitted by the supervisor.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! for it (timestamp, sequence number, pid, exit code, signal name, reason).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order.
//!
//! ## Example
//! ```rust
//! use vmvisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::ShutdownRequested).with_signal("SIGINT");
//!
//! assert_eq!(ev.kind, EventKind::ShutdownRequested);
//! assert_eq!(ev.signal.as_deref(), Some("SIGINT"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Startup events ===
    /// The vm child process was spawned.
    ///
    /// Sets:
    /// - `pid`: child process id
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ChildSpawned,

    /// The child connected its control channel (accepted, not yet negotiated).
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ControlConnected,

    /// The capability handshake completed; the control channel is usable.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ControlReady,

    // === Shutdown events ===
    /// A termination signal was observed and is being forwarded to the vm.
    ///
    /// Sets:
    /// - `signal`: signal name (e.g. `SIGINT`)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ShutdownRequested,

    /// The vm acknowledged a `system_powerdown` request.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PowerdownSent,

    /// A `system_powerdown` request could not be delivered or was rejected.
    ///
    /// The supervisor stays in its loop: the child's own termination is the
    /// authoritative signal of completion.
    ///
    /// Sets:
    /// - `reason`: delivery failure detail
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PowerdownFailed,

    // === Terminal events ===
    /// The child exited on its own (status decoded from the wait status).
    ///
    /// Sets:
    /// - `code`: the child's exit code
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ChildExited,

    /// The child was killed by a signal or dumped core.
    ///
    /// Sets:
    /// - `signal`: signal name (e.g. `SIGKILL`)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ChildSignaled,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Child process id, if applicable.
    pub pid: Option<u32>,
    /// Child exit code, if applicable.
    pub code: Option<i32>,
    /// Signal name, if applicable.
    pub signal: Option<Arc<str>>,
    /// Human-readable reason (delivery failures, protocol violations).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            pid: None,
            code: None,
            signal: None,
            reason: None,
        }
    }

    /// Attaches a child process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches a child exit code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a signal name.
    #[inline]
    pub fn with_signal(mut self, signal: impl Into<Arc<str>>) -> Self {
        self.signal = Some(signal.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::ChildSpawned);
        let b = Event::now(EventKind::ChildExited);
        assert!(b.seq > a.seq, "seq {} should exceed {}", b.seq, a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::now(EventKind::ChildSignaled)
            .with_pid(42)
            .with_code(1)
            .with_signal("SIGTERM")
            .with_reason("killed externally");
        assert_eq!(ev.pid, Some(42));
        assert_eq!(ev.code, Some(1));
        assert_eq!(ev.signal.as_deref(), Some("SIGTERM"));
        assert_eq!(ev.reason.as_deref(), Some("killed externally"));
    }
}
