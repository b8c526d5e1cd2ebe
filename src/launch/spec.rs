//! # Launch specification for the supervised vm.
//!
//! [`LaunchSpec`] bundles the resolved program name with the ordered
//! argument tokens that determine how the child is started. It is produced
//! by the profile layer (or built directly in tests) and consumed by the
//! supervisor, which appends the control-socket tail and materializes the
//! final argument vector through an [`ArgBuffer`].
//!
//! ## Rules
//! - Tokens are stored in emission order; the first materialized vector
//!   element is always the program name.
//! - Immutable input: the supervisor never edits it, only appends its own
//!   control-socket arguments after it.
//!
//! ## Example
//! ```rust
//! use vmvisor::LaunchSpec;
//!
//! let spec = LaunchSpec::new("qemu-system-x86_64")
//!     .arg("-enable-kvm")
//!     .arg_pair("-m", "4G")
//!     .arg("-snapshot");
//!
//! assert_eq!(spec.program(), "qemu-system-x86_64");
//! assert_eq!(spec.tokens().len(), 4);
//! ```

use crate::error::ArgsError;
use crate::launch::ArgBuffer;

/// Resolved program name plus ordered flag/value tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    program: String,
    tokens: Vec<String>,
}

impl LaunchSpec {
    /// Creates a specification for the given program with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            tokens: Vec::new(),
        }
    }

    /// Appends a single flag token (e.g. `-enable-kvm`).
    pub fn arg(mut self, flag: impl Into<String>) -> Self {
        self.tokens.push(flag.into());
        self
    }

    /// Appends a flag/value pair as two tokens (e.g. `-m 4G`).
    pub fn arg_pair(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.push(flag.into());
        self.tokens.push(value.into());
        self
    }

    /// Returns the program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the argument tokens in emission order (program excluded).
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Writes the program name and every token into `buf`, in order.
    pub fn write_args(&self, buf: &mut ArgBuffer) -> Result<(), ArgsError> {
        buf.push(&self.program)?;
        for token in &self.tokens {
            buf.push(token)?;
        }
        Ok(())
    }
}
