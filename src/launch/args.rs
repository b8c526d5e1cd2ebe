//! # Growable argument arena with an offset index.
//!
//! [`ArgBuffer`] assembles an arbitrarily long command line into a single
//! byte arena: every token is stored back-to-back, NUL-terminated, with a
//! parallel index of start offsets. [`ArgBuffer::materialize`] then turns
//! the arena into an [`ArgVec`] — one `&CStr` per token in insertion order
//! plus the terminating null entry an execv-style interface expects.
//!
//! ## Rules
//! - Only **offsets** survive growth. Pointers into the arena are never
//!   stored across an append; they are recomputed at materialization time,
//!   and the borrow held by [`ArgVec`] prevents further appends while any
//!   materialized pointer is alive.
//! - Growth doubles: new capacity is the next power of two ≥ the required
//!   size, independently for the byte arena and the offset index, so the
//!   amortized cost of an append is O(1).
//! - Overflow while computing the next power of two is reported as
//!   [`ArgsError::CapacityOverflow`], never wrapped.
//!
//! ## Example
//! ```rust
//! use vmvisor::ArgBuffer;
//!
//! let mut buf = ArgBuffer::new();
//! buf.push("qemu-system-x86_64")?;
//! buf.push("-enable-kvm")?;
//! buf.push_format(format_args!("-smp={}", 4))?;
//!
//! let argv = buf.materialize();
//! assert_eq!(argv.len(), 4); // three tokens + terminating null entry
//! # Ok::<(), vmvisor::ArgsError>(())
//! ```

use std::ffi::{CStr, OsStr};
use std::fmt;
use std::os::unix::ffi::OsStrExt;

use libc::c_char;

use crate::error::ArgsError;

/// Minimum byte-arena capacity, used when the reserve hint is smaller.
const MIN_BYTES: usize = 64;
/// Minimum offset-index capacity.
const MIN_OFFSETS: usize = 8;

/// Computes the next power-of-two capacity ≥ `required`.
///
/// Rejects overflow instead of wrapping: a command line that large is a
/// bug, not a growth request.
fn next_capacity(required: usize) -> Result<usize, ArgsError> {
    required
        .checked_next_power_of_two()
        .ok_or(ArgsError::CapacityOverflow)
}

/// Counting sink for the measuring pass of [`ArgBuffer::push_format`].
struct LenCounter(usize);

impl fmt::Write for LenCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// Appending sink for the writing pass of [`ArgBuffer::push_format`].
struct VecWriter<'a>(&'a mut Vec<u8>);

impl fmt::Write for VecWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Growable byte arena plus offset index, producing a NUL-terminated,
/// pointer-stable argument vector.
///
/// The buffer is append-only during construction; [`ArgBuffer::clear`]
/// resets it for reuse without releasing capacity.
#[derive(Debug)]
pub struct ArgBuffer {
    /// All argument strings back-to-back, each terminated by a single NUL.
    bytes: Vec<u8>,
    /// Start offset of each argument in `bytes`, insertion-ordered.
    offsets: Vec<usize>,
}

impl Default for ArgBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgBuffer {
    /// Creates an empty buffer with the default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(MIN_BYTES)
    }

    /// Creates an empty buffer with at least `hint` bytes of arena capacity.
    ///
    /// Hints below the minimum default are rounded up to it.
    pub fn with_capacity(hint: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(hint.max(MIN_BYTES)),
            offsets: Vec::with_capacity(MIN_OFFSETS),
        }
    }

    /// Returns the number of appended tokens.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` when no token has been appended.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the current byte-arena capacity.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Appends one token, copying it plus a NUL terminator into the arena.
    ///
    /// A zero-length token is legal and produces an empty string argument.
    /// Tokens with an interior NUL byte are rejected with
    /// [`ArgsError::NulByte`].
    pub fn push(&mut self, token: impl AsRef<[u8]>) -> Result<(), ArgsError> {
        let token = token.as_ref();
        if token.contains(&0) {
            return Err(ArgsError::NulByte);
        }

        self.reserve_bytes(token.len() + 1)?;
        self.reserve_offsets()?;

        self.offsets.push(self.bytes.len());
        self.bytes.extend_from_slice(token);
        self.bytes.push(0);
        Ok(())
    }

    /// Appends one token produced by formatting.
    ///
    /// Two-pass: a trial pass through a counting sink measures the exact
    /// formatted length, the arena grows to fit, then the real pass writes
    /// the token. Output is never truncated, no matter how far it exceeds
    /// the initial capacity.
    pub fn push_format(&mut self, args: fmt::Arguments<'_>) -> Result<(), ArgsError> {
        use fmt::Write as _;

        let mut counter = LenCounter(0);
        // Infallible: LenCounter::write_str never errors.
        let _ = counter.write_fmt(args);
        let len = counter.0;

        let reserve = len.checked_add(1).ok_or(ArgsError::CapacityOverflow)?;
        self.reserve_bytes(reserve)?;
        self.reserve_offsets()?;

        let start = self.bytes.len();
        let _ = VecWriter(&mut self.bytes).write_fmt(args);
        debug_assert_eq!(self.bytes.len() - start, len);

        if self.bytes[start..].contains(&0) {
            self.bytes.truncate(start);
            return Err(ArgsError::NulByte);
        }

        self.bytes.push(0);
        self.offsets.push(start);
        Ok(())
    }

    /// Resets length counters without releasing allocated capacity.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.offsets.clear();
    }

    /// Returns the borrowed argument vector: one entry per appended token,
    /// in insertion order, plus the terminating null entry.
    ///
    /// The arena stays alive behind the returned vector; the shared borrow
    /// makes appending impossible while it exists.
    pub fn materialize(&self) -> ArgVec<'_> {
        let args = self
            .offsets
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = self
                    .offsets
                    .get(i + 1)
                    .copied()
                    .unwrap_or(self.bytes.len());
                // SAFETY: every offset starts a run of non-NUL bytes ending
                // in the single NUL that push/push_format appended, and
                // `end` is the next token's start (or the arena length),
                // i.e. one past that NUL.
                unsafe { CStr::from_bytes_with_nul_unchecked(&self.bytes[start..end]) }
            })
            .collect();
        ArgVec { args }
    }

    /// Grows the arena so that `additional` more bytes fit.
    fn reserve_bytes(&mut self, additional: usize) -> Result<(), ArgsError> {
        let required = self
            .bytes
            .len()
            .checked_add(additional)
            .ok_or(ArgsError::CapacityOverflow)?;
        if required > self.bytes.capacity() {
            let cap = next_capacity(required)?;
            self.bytes.reserve_exact(cap - self.bytes.len());
        }
        Ok(())
    }

    /// Grows the offset index so that one more entry fits.
    fn reserve_offsets(&mut self) -> Result<(), ArgsError> {
        let required = self
            .offsets
            .len()
            .checked_add(1)
            .ok_or(ArgsError::CapacityOverflow)?;
        if required > self.offsets.capacity() {
            let cap = next_capacity(required)?;
            self.offsets.reserve_exact(cap - self.offsets.len());
        }
        Ok(())
    }
}

/// Borrowed argument vector produced by [`ArgBuffer::materialize`].
///
/// Holds one `&CStr` per token; [`ArgVec::as_ptrs`] adds the terminating
/// null entry for execv-style consumers.
#[derive(Debug)]
pub struct ArgVec<'a> {
    args: Vec<&'a CStr>,
}

impl<'a> ArgVec<'a> {
    /// Vector length including the terminating null entry
    /// (token count + 1).
    pub fn len(&self) -> usize {
        self.args.len() + 1
    }

    /// Always `false`: even an empty buffer materializes to the
    /// terminating null entry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over the tokens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &'a CStr> + '_ {
        self.args.iter().copied()
    }

    /// Returns the first token — the program name — if any.
    pub fn program(&self) -> Option<&'a OsStr> {
        self.args.first().map(|c| OsStr::from_bytes(c.to_bytes()))
    }

    /// Iterates over the tokens after the program name.
    pub fn tail(&self) -> impl Iterator<Item = &'a OsStr> + '_ {
        self.args
            .iter()
            .skip(1)
            .map(|c| OsStr::from_bytes(c.to_bytes()))
    }

    /// Returns the raw execv-style vector: one pointer per token plus a
    /// terminating null pointer.
    ///
    /// The pointers borrow the arena; they stay valid for the lifetime of
    /// this `ArgVec`.
    pub fn as_ptrs(&self) -> Vec<*const c_char> {
        let mut ptrs: Vec<*const c_char> = self.args.iter().map(|c| c.as_ptr()).collect();
        ptrs.push(std::ptr::null());
        ptrs
    }
}
