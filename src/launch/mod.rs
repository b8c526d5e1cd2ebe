//! Launch specification and argument-vector assembly.
//!
//! This module provides the types that turn a resolved VM description into
//! an execv-style argument vector:
//! - [`ArgBuffer`] - growable, index-tracked argument arena
//! - [`ArgVec`] - borrowed, NUL-terminated argument vector
//! - [`LaunchSpec`] - resolved program name plus ordered argument tokens

mod args;
mod spec;

pub use args::{ArgBuffer, ArgVec};
pub use spec::LaunchSpec;
