//! # Event subscribers for the vmvisor runtime.
//!
//! This module provides the [`Subscriber`] trait, the [`SubscriberSet`]
//! fan-out container, and the built-in [`LogWriter`] that renders events as
//! one-line status messages.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor ── publish(Event) ──► Bus ──► subscriber listener
//!                                               │
//!                                               ▼
//!                                     SubscriberSet::emit(&Event)
//!                                         ┌─────┴─────┬────────┐
//!                                         ▼           ▼        ▼
//!                                     LogWriter    Custom    ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use vmvisor::{Event, EventKind, Subscriber};
//! use async_trait::async_trait;
//!
//! struct ExitRecorder;
//!
//! #[async_trait]
//! impl Subscriber for ExitRecorder {
//!     async fn handle(&self, event: &Event) {
//!         if event.kind == EventKind::ChildExited {
//!             // record event.code somewhere...
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscriber;
