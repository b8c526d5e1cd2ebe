//! # Control-socket listener and client.
//!
//! The supervisor binds a per-instance unix socket **before** spawning the
//! vm, so the child can connect as soon as it execs. The one expected
//! inbound connection is accepted into a [`ControlClient`], which performs
//! the fixed two-step handshake and then carries single-command
//! request/response exchanges for the rest of the vm's lifetime.
//!
//! ## Connection states
//! ```text
//! Handshaking ──handshake()──► Ready ──peer EOF──► Closed
//! ```
//!
//! ## Rules
//! - `handshake()` reads exactly one greeting before sending exactly one
//!   capability-negotiation command; if the greeting read fails, nothing
//!   is sent.
//! - A zero-byte read is orderly peer shutdown: [`Reply::Closed`], not an
//!   error.
//! - A protocol violation does **not** close the connection; that decision
//!   belongs to the caller (fatal during handshake, logged in steady
//!   state).

use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};

use crate::control::wire;
use crate::control::CMD_CAPABILITIES;
use crate::error::ControlError;

/// Upper bound for a single inbound protocol message.
const READ_BUF_SIZE: usize = 4096;

/// Maximum unix socket path length, including the terminating NUL.
fn sun_path_limit() -> usize {
    let addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
    addr.sun_path.len()
}

/// Lifecycle state of a control connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Accepted, greeting and capability negotiation still pending.
    Handshaking,
    /// Negotiated; commands may be issued.
    Ready,
    /// The peer performed an orderly shutdown.
    Closed,
}

/// Bound control socket, listening for the one expected vm connection.
///
/// The socket file is unlinked when the listener is dropped, on every exit
/// path.
#[derive(Debug)]
pub struct ControlListener {
    inner: UnixListener,
    path: PathBuf,
}

impl ControlListener {
    /// Binds and listens on `path`.
    ///
    /// Fails with [`ControlError::InvalidAddress`] when the path does not
    /// fit a unix socket address. A stale socket file from a previous
    /// instance is removed first.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self, ControlError> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().as_bytes().len() + 1 > sun_path_limit() {
            return Err(ControlError::InvalidAddress { path });
        }

        let _ = fs::remove_file(&path);
        let inner = UnixListener::bind(&path)?;
        Ok(Self { inner, path })
    }

    /// Returns the bound socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accepts the next inbound connection.
    pub async fn accept(&self) -> Result<ControlClient, ControlError> {
        let (stream, _addr) = self.inner.accept().await?;
        Ok(ControlClient::new(stream))
    }
}

impl Drop for ControlListener {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Outcome of one request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The peer acknowledged the command.
    Ok,
    /// The peer closed the connection with zero bytes — orderly shutdown,
    /// not an error at this layer.
    Closed,
}

/// One accepted control connection. Not reused across vm instances.
pub struct ControlClient {
    stream: UnixStream,
    state: ConnState,
}

impl ControlClient {
    /// Wraps an accepted stream; the connection starts out handshaking.
    pub(crate) fn new(stream: UnixStream) -> Self {
        Self {
            stream,
            state: ConnState::Handshaking,
        }
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Performs the fixed two-step handshake: read and discard the peer's
    /// greeting, then negotiate capabilities and validate the
    /// acknowledgement.
    ///
    /// Any failure here is a protocol error; the capability command is not
    /// sent if the greeting read fails.
    pub async fn handshake(&mut self) -> Result<(), ControlError> {
        if self.state != ConnState::Handshaking {
            return Err(ControlError::Protocol {
                detail: format!("handshake in state {:?}", self.state),
            });
        }

        let mut buf = [0u8; READ_BUF_SIZE];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            self.state = ConnState::Closed;
            return Err(ControlError::Protocol {
                detail: "peer closed before sending a greeting".into(),
            });
        }
        // Greeting content is deliberately not validated; one received
        // message is all the protocol requires before negotiation.

        self.send_command(CMD_CAPABILITIES).await?;
        match self.recv_response().await? {
            Reply::Ok => {
                self.state = ConnState::Ready;
                Ok(())
            }
            Reply::Closed => Err(ControlError::Protocol {
                detail: "peer closed during capability negotiation".into(),
            }),
        }
    }

    /// Serializes `{"execute": name}` and writes it with the line
    /// terminator. Returns the number of bytes written.
    pub async fn send_command(&mut self, name: &str) -> Result<usize, ControlError> {
        let line = wire::encode_command(name);
        self.stream.write_all(&line).await?;
        Ok(line.len())
    }

    /// Reads one response.
    ///
    /// A zero-byte read is orderly peer shutdown and yields
    /// [`Reply::Closed`]. Anything else must parse as a JSON object with
    /// an array-shaped `"return"` field; violations yield
    /// [`ControlError::Protocol`] and leave the connection open.
    pub async fn recv_response(&mut self) -> Result<Reply, ControlError> {
        let mut buf = [0u8; READ_BUF_SIZE];
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            self.state = ConnState::Closed;
            return Ok(Reply::Closed);
        }

        wire::validate_reply(&buf[..n])?;
        Ok(Reply::Ok)
    }

    /// Sends one command and reads its acknowledgement.
    ///
    /// Only valid on a negotiated connection.
    pub async fn command(&mut self, name: &str) -> Result<Reply, ControlError> {
        if self.state != ConnState::Ready {
            return Err(ControlError::Protocol {
                detail: format!("command {name:?} issued in state {:?}", self.state),
            });
        }

        self.send_command(name).await?;
        self.recv_response().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::CMD_POWERDOWN;

    const GREETING: &[u8] = b"{\"QMP\": {\"version\": {}, \"capabilities\": []}}\r\n";

    fn pair() -> (ControlClient, UnixStream) {
        let (a, b) = UnixStream::pair().expect("socketpair");
        (ControlClient::new(a), b)
    }

    fn ready_pair() -> (ControlClient, UnixStream) {
        let (mut client, peer) = pair();
        client.state = ConnState::Ready;
        (client, peer)
    }

    async fn read_line(peer: &mut UnixStream) -> Vec<u8> {
        let mut buf = [0u8; READ_BUF_SIZE];
        let n = peer.read(&mut buf).await.expect("peer read");
        buf[..n].to_vec()
    }

    #[tokio::test]
    async fn test_handshake_reads_greeting_then_negotiates() {
        let (mut client, mut peer) = pair();

        let driver = tokio::spawn(async move {
            peer.write_all(GREETING).await.unwrap();
            let sent = read_line(&mut peer).await;
            assert_eq!(sent, b"{\"execute\":\"qmp_capabilities\"}\n");
            peer.write_all(b"{\"return\": []}\r\n").await.unwrap();
            peer
        });

        client.handshake().await.expect("handshake");
        assert_eq!(client.state(), ConnState::Ready);
        driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_handshake_sends_nothing_when_greeting_read_fails() {
        let (mut client, peer) = pair();
        let (mut peer_rx, peer_tx) = peer.into_split();
        // Closing the peer's write half delivers EOF before any greeting.
        drop(peer_tx);

        let err = client.handshake().await.unwrap_err();
        assert!(matches!(err, ControlError::Protocol { .. }), "got {err}");
        assert_eq!(client.state(), ConnState::Closed);

        // The client must not have sent the negotiation command.
        drop(client);
        let mut leftover = Vec::new();
        peer_rx.read_to_end(&mut leftover).await.unwrap();
        assert!(leftover.is_empty(), "unexpected bytes: {leftover:?}");
    }

    #[tokio::test]
    async fn test_handshake_rejects_malformed_negotiation_response() {
        let (mut client, mut peer) = pair();

        let driver = tokio::spawn(async move {
            peer.write_all(GREETING).await.unwrap();
            let _ = read_line(&mut peer).await;
            peer.write_all(b"{\"error\": \"nope\"}\n").await.unwrap();
            peer
        });

        let err = client.handshake().await.unwrap_err();
        assert!(matches!(err, ControlError::Protocol { .. }), "got {err}");
        driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_command_yields_closed_on_clean_eof() {
        let (mut client, mut peer) = ready_pair();

        let driver = tokio::spawn(async move {
            let _ = read_line(&mut peer).await;
            // Dropping the peer closes the connection with zero bytes.
        });

        let reply = client.command(CMD_POWERDOWN).await.expect("command");
        assert_eq!(reply, Reply::Closed);
        assert_eq!(client.state(), ConnState::Closed);
        driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_command_protocol_error_leaves_connection_open() {
        let (mut client, mut peer) = ready_pair();

        let driver = tokio::spawn(async move {
            let _ = read_line(&mut peer).await;
            peer.write_all(b"garbage\n").await.unwrap();
            // Second round: a well-formed acknowledgement.
            let _ = read_line(&mut peer).await;
            peer.write_all(b"{\"return\": []}\n").await.unwrap();
            peer
        });

        let err = client.command(CMD_POWERDOWN).await.unwrap_err();
        assert!(matches!(err, ControlError::Protocol { .. }), "got {err}");
        assert_eq!(client.state(), ConnState::Ready, "caller decides closing");

        let reply = client.command(CMD_POWERDOWN).await.expect("retry");
        assert_eq!(reply, Reply::Ok);
        driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_command_rejects_non_array_return() {
        let (mut client, mut peer) = ready_pair();

        let driver = tokio::spawn(async move {
            let _ = read_line(&mut peer).await;
            peer.write_all(b"{\"return\": {}}\n").await.unwrap();
            peer
        });

        let err = client.command(CMD_POWERDOWN).await.unwrap_err();
        assert!(matches!(err, ControlError::Protocol { .. }), "got {err}");
        driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_command_requires_ready_state() {
        let (mut client, _peer) = pair();
        let err = client.command(CMD_POWERDOWN).await.unwrap_err();
        assert!(matches!(err, ControlError::Protocol { .. }), "got {err}");
    }

    #[tokio::test]
    async fn test_send_command_reports_bytes_written() {
        let (mut client, mut peer) = ready_pair();
        let n = client.send_command(CMD_POWERDOWN).await.unwrap();
        let line = read_line(&mut peer).await;
        assert_eq!(n, line.len());
        assert_eq!(line, b"{\"execute\":\"system_powerdown\"}\n");
    }

    #[tokio::test]
    async fn test_bind_rejects_overlong_path() {
        let long = std::env::temp_dir().join("x".repeat(200)).join("ctl.sock");
        let err = ControlListener::bind(&long).unwrap_err();
        assert!(matches!(err, ControlError::InvalidAddress { .. }), "got {err}");
    }

    #[tokio::test]
    async fn test_bind_accept_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctl.sock");

        let listener = ControlListener::bind(&path).unwrap();
        assert!(path.exists());

        let connect = UnixStream::connect(&path);
        let (accepted, _conn) = tokio::join!(listener.accept(), connect);
        let client = accepted.unwrap();
        assert_eq!(client.state(), ConnState::Handshaking);

        drop(listener);
        assert!(!path.exists(), "socket file must be unlinked on drop");
    }
}
