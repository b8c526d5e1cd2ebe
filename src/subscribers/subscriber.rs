//! # Core subscriber trait.
//!
//! `Subscriber` is the extension point for plugging custom event handlers
//! into the runtime: logging, desktop notifications, test probes.
//!
//! ## Contract
//! - Handlers are awaited by the supervisor's listener task; they should
//!   avoid blocking the async runtime (prefer async I/O).
//! - A handler that lags only delays other subscribers, never the
//!   supervisor loop itself (the listener reads from the broadcast bus).

use crate::events::Event;
use async_trait::async_trait;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Handle a single event.
    ///
    /// # Parameters
    /// - `event`: Reference to the event (does not transfer ownership)
    async fn handle(&self, event: &Event);

    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
