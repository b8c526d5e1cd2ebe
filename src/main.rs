//! vmvisor binary: load a VM profile, supervise the vm, exit faithfully.
//!
//! Setup errors print as `vmvisor: <error>` on stderr and exit 1; once the
//! vm is running, the process exit code mirrors the vm's own.

use std::process::exit;
use std::sync::Arc;

use clap::Parser;

use vmvisor::{Config, Dirs, LogWriter, Supervisor, VmProfile};

/// Launch and supervise a QEMU virtual machine.
#[derive(Parser, Debug)]
#[command(name = "vmvisor", version, about = "Launch and supervise a QEMU virtual machine")]
struct Cli {
    /// Start the vm in fullscreen mode (if graphical)
    #[arg(short, long)]
    fullscreen: bool,

    /// Write to temporary files instead of the disk image file
    #[arg(short, long)]
    snapshot: bool,

    /// Profile path, or a name resolved as <config>/vm/<name>.conf
    profile: String,
}

fn fatal(err: impl std::fmt::Display) -> ! {
    eprintln!("vmvisor: {err}");
    exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let dirs = match Dirs::resolve() {
        Ok(dirs) => dirs,
        Err(err) => fatal(err),
    };

    let mut profile = match VmProfile::load(&cli.profile, &dirs) {
        Ok(profile) => profile,
        Err(err) => fatal(err),
    };
    profile.fullscreen = cli.fullscreen;
    profile.snapshot = cli.snapshot;

    let mut cfg = Config::default();
    cfg.socket_dir = Some(dirs.runtime.clone());

    let sup = Supervisor::new(cfg, vec![Arc::new(LogWriter)]);
    match sup.run(profile.to_launch_spec()).await {
        Ok(code) => exit(code),
        Err(err) => fatal(err),
    }
}
