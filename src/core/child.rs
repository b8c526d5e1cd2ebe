//! # Child process management.
//!
//! Spawning builds the execv-style argument vector through [`ArgBuffer`],
//! appends the control-socket tail, and starts the vm in its own session:
//! a `pre_exec` hook clears the inherited signal mask and calls `setsid`,
//! falling back to `setpgid(0, 0)`. The parent repeats the group
//! assignment on its side right after spawn — whichever side runs first,
//! the other's attempt degrades to a no-op, which closes the window where
//! a group-directed signal could arrive before the child has joined its
//! own group.
//!
//! Exit statuses are classified here as well: a clean exit propagates the
//! child's own code, a signal death is a fatal error naming the signal.

use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::ExitStatus;

use tokio::process::{Child, Command};

use crate::error::SupervisorError;
use crate::launch::{ArgBuffer, LaunchSpec};

/// Spawns the vm described by `spec`, telling it to connect its control
/// channel to `sock_path`.
pub(crate) fn spawn(spec: &LaunchSpec, sock_path: &Path) -> Result<Child, SupervisorError> {
    let mut buf = ArgBuffer::with_capacity(1024);
    spec.write_args(&mut buf)?;
    buf.push("-monitor")?;
    buf.push("none")?;
    buf.push("-qmp")?;
    buf.push_format(format_args!("unix:{}", sock_path.display()))?;

    let argv = buf.materialize();
    let Some(program) = argv.program() else {
        return Err(SupervisorError::Spawn {
            program: spec.program().into(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector"),
        });
    };

    let mut cmd = Command::new(program);
    cmd.args(argv.tail());

    unsafe {
        cmd.pre_exec(|| {
            // The parent's signal setup must not leak into the vm.
            let mut set: libc::sigset_t = std::mem::zeroed();
            libc::sigemptyset(&mut set);
            libc::sigprocmask(libc::SIG_SETMASK, &set, std::ptr::null_mut());

            if libc::setsid() == -1 {
                if libc::setpgid(0, 0) == -1 {
                    return Err(io::Error::last_os_error());
                }
            } else {
                let _ = libc::setpgid(0, 0);
            }
            Ok(())
        });
    }

    let child = cmd.spawn().map_err(|source| SupervisorError::Spawn {
        program: spec.program().into(),
        source,
    })?;

    // Parent half of the group assignment; no-op (or rejected, once the
    // child is a session leader) when the child side already ran.
    if let Some(pid) = child.id() {
        unsafe {
            let _ = libc::setpgid(pid as libc::pid_t, pid as libc::pid_t);
        }
    }

    Ok(child)
}

/// Decodes a wait status into the supervisor's exit code.
///
/// Clean exits propagate the child's own status (zero or not); a child
/// killed by a signal or dumping core is an error naming the signal.
pub(crate) fn classify_exit(status: ExitStatus) -> Result<i32, SupervisorError> {
    if let Some(code) = status.code() {
        Ok(code)
    } else if let Some(sig) = status.signal() {
        Err(SupervisorError::ChildSignaled {
            signal: sig,
            name: signal_name(sig),
        })
    } else {
        // wait() only reports terminated children, so this is unreachable
        // in practice; refuse to guess instead of fabricating a code.
        Err(SupervisorError::Wait(io::Error::new(
            io::ErrorKind::Other,
            "unrecognized wait status",
        )))
    }
}

/// Conventional name for a signal number.
pub(crate) fn signal_name(sig: i32) -> &'static str {
    match sig {
        libc::SIGHUP => "SIGHUP",
        libc::SIGINT => "SIGINT",
        libc::SIGQUIT => "SIGQUIT",
        libc::SIGILL => "SIGILL",
        libc::SIGABRT => "SIGABRT",
        libc::SIGBUS => "SIGBUS",
        libc::SIGFPE => "SIGFPE",
        libc::SIGKILL => "SIGKILL",
        libc::SIGUSR1 => "SIGUSR1",
        libc::SIGSEGV => "SIGSEGV",
        libc::SIGUSR2 => "SIGUSR2",
        libc::SIGPIPE => "SIGPIPE",
        libc::SIGALRM => "SIGALRM",
        libc::SIGTERM => "SIGTERM",
        _ => "unknown signal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_clean_exits() {
        assert_eq!(classify_exit(ExitStatus::from_raw(0)).unwrap(), 0);
        // Wait statuses encode the exit code in the high byte.
        assert_eq!(classify_exit(ExitStatus::from_raw(2 << 8)).unwrap(), 2);
    }

    #[test]
    fn test_classify_signal_death() {
        let err = classify_exit(ExitStatus::from_raw(libc::SIGTERM)).unwrap_err();
        match err {
            SupervisorError::ChildSignaled { signal, name } => {
                assert_eq!(signal, libc::SIGTERM);
                assert_eq!(name, "SIGTERM");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_classify_core_dump() {
        // Core-dump bit set on top of the signal number.
        let err = classify_exit(ExitStatus::from_raw(0x80 | libc::SIGSEGV)).unwrap_err();
        assert!(matches!(
            err,
            SupervisorError::ChildSignaled { signal, .. } if signal == libc::SIGSEGV
        ));
    }

    #[test]
    fn test_signal_name_fallback() {
        assert_eq!(signal_name(libc::SIGKILL), "SIGKILL");
        assert_eq!(signal_name(250), "unknown signal");
    }

    #[tokio::test]
    async fn test_spawn_appends_control_socket_tail() {
        // `true` ignores the extra arguments and exits 0; the spawn path
        // still exercises argv assembly and the pre_exec setup.
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("ctl.sock");

        let mut child = spawn(&LaunchSpec::new("true"), &sock).unwrap();
        let status = child.wait().await.unwrap();
        assert_eq!(classify_exit(status).unwrap(), 0);
    }
}
