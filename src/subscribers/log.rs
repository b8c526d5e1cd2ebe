//! # Built-in logging subscriber.
//!
//! [`LogWriter`] prints one human-readable line per event. This is the
//! supervisor's user-visible surface: the shutdown-forwarding status line
//! goes to stdout, failure conditions go to stderr. No protocol traffic is
//! surfaced beyond these lines.
//!
//! ## Output format
//! ```text
//! [spawned] pid=4242
//! [control-ready]
//! [shutdown-requested] signal=SIGINT, sending ACPI powerdown request to vm
//! [powerdown-failed] err="control socket i/o failed: broken pipe"
//! [exited] code=0
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;
use async_trait::async_trait;

/// Prints lifecycle events as one-line status messages.
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn handle(&self, e: &Event) {
        match e.kind {
            EventKind::ChildSpawned => {
                if let Some(pid) = e.pid {
                    println!("[spawned] pid={pid}");
                }
            }
            EventKind::ControlConnected => {
                println!("[control-connected]");
            }
            EventKind::ControlReady => {
                println!("[control-ready]");
            }
            EventKind::ShutdownRequested => {
                let signal = e.signal.as_deref().unwrap_or("?");
                println!("[shutdown-requested] signal={signal}, sending ACPI powerdown request to vm");
            }
            // The acknowledgement is not surfaced; the status line above
            // already covered the forwarding.
            EventKind::PowerdownSent => {}
            EventKind::PowerdownFailed => {
                let reason = e.reason.as_deref().unwrap_or("unknown");
                eprintln!("[powerdown-failed] err={reason:?}");
            }
            EventKind::ChildExited => match e.code {
                Some(0) | None => println!("[exited] code=0"),
                Some(code) => eprintln!("[exited] vm terminated with error code {code}"),
            },
            EventKind::ChildSignaled => {
                let signal = e.signal.as_deref().unwrap_or("?");
                eprintln!("[killed] vm terminated abnormally with signal {signal}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
