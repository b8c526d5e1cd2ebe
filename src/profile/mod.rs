//! VM profiles and user directory context.
//!
//! The supervisor core consumes a fully-resolved [`LaunchSpec`]; this
//! module produces one. [`Dirs`] resolves the user's home/config/runtime
//! directories once at startup, and [`VmProfile`] loads an on-disk
//! `Key=Value` profile, fills in a random MAC address when none is
//! configured, and converts itself into the launch specification.
//!
//! [`LaunchSpec`]: crate::LaunchSpec

mod dirs;
mod vm;

pub use dirs::Dirs;
pub use vm::VmProfile;
