//! QMP control channel: listener, client, and wire format.
//!
//! The supervised vm is told to shut down over a local stream socket
//! speaking newline-terminated single-line JSON. This module implements
//! the narrow slice of QMP the supervisor needs:
//! - [`ControlListener`] - bind/accept the per-instance unix socket
//! - [`ControlClient`] - handshake and single-command request/response
//! - [`Reply`] - acknowledgement vs. distinguishable peer-closed result
//!
//! Scope limit: exactly two commands ([`CMD_CAPABILITIES`],
//! [`CMD_POWERDOWN`]) and no request/response correlation layer (no
//! message ids). The supervisor never has more than one command in flight.

mod client;
mod wire;

pub use client::{ConnState, ControlClient, ControlListener, Reply};
pub use wire::hex_dump;

/// Capability negotiation command, sent once during the handshake.
pub const CMD_CAPABILITIES: &str = "qmp_capabilities";

/// Graceful shutdown request, sent when a termination signal arrives.
pub const CMD_POWERDOWN: &str = "system_powerdown";
