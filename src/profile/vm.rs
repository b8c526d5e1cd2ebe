//! # On-disk VM profiles.
//!
//! A profile is a plain `Key=Value` file describing one virtual machine.
//! [`VmProfile::load`] reads it from an explicit path, or falls back to
//! `<config>/vm/<name>.conf` when the path does not exist, and fills in a
//! random locally-administered MAC address when `NetMacAddress` is unset.
//! [`VmProfile::to_launch_spec`] then emits the QEMU command line in a
//! fixed flag order.
//!
//! ## Recognized keys
//! `CPU`, `SMP`, `Memory`, `MemoryFile`, `Disk`, `DiskInterface`,
//! `NetInterface`, `NetModel`, `NetMacAddress`, `RealTimeClock`,
//! `Graphics`, `SoundHardware`, `SerialPort`. Unknown keys and lines
//! without `=` are ignored; `#` starts a comment line.

use std::fs;
use std::path::Path;

use crate::error::ProfileError;
use crate::launch::LaunchSpec;
use crate::profile::Dirs;

/// Default hypervisor binary, resolved through `$PATH`.
const QEMU_PROGRAM: &str = "qemu-system-x86_64";

/// One parsed VM profile plus the CLI toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmProfile {
    /// `-cpu` model.
    pub cpu: Option<String>,
    /// `-smp` topology.
    pub smp: Option<String>,
    /// `-m` memory size.
    pub memory: Option<String>,
    /// `-mem-path` backing file.
    pub memory_file: Option<String>,
    /// Disk image path.
    pub disk: Option<String>,
    /// Disk interface (`virtio`, `ide`, ...).
    pub disk_interface: Option<String>,
    /// Host tap interface name.
    pub net_interface: Option<String>,
    /// NIC model.
    pub net_model: Option<String>,
    /// NIC MAC address; randomized at load time when unset.
    pub net_macaddr: Option<String>,
    /// `-rtc base=` value.
    pub rtc: Option<String>,
    /// `-vga` model, or `none` for `-nographic`.
    pub graphics: Option<String>,
    /// `-soundhw` value.
    pub soundhw: Option<String>,
    /// `-serial` value.
    pub serial: Option<String>,

    /// Start fullscreen (CLI toggle).
    pub fullscreen: bool,
    /// Write to temporary files instead of the disk image (CLI toggle).
    pub snapshot: bool,
}

impl VmProfile {
    /// Loads a profile from `name`.
    ///
    /// `name` is tried as a path first; when no such file exists the
    /// profile is looked up as `<config>/vm/<name>.conf`. A missing
    /// `NetMacAddress` is filled with a random locally-administered
    /// address, like the `52:54:00` QEMU OUI.
    pub fn load(name: &str, dirs: &Dirs) -> Result<Self, ProfileError> {
        let direct = Path::new(name);
        let path = if direct.exists() {
            direct.to_path_buf()
        } else {
            let fallback = dirs.config.join("vm").join(format!("{name}.conf"));
            if !fallback.exists() {
                return Err(ProfileError::NotFound { name: name.into() });
            }
            fallback
        };

        let text = fs::read_to_string(&path).map_err(|source| ProfileError::Io {
            path: path.clone(),
            source,
        })?;

        let mut profile = Self::parse(&text);
        profile.ensure_macaddr();
        Ok(profile)
    }

    /// Parses profile text. Pure: no filesystem access, no randomness.
    fn parse(text: &str) -> Self {
        let mut profile = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            let field = match key.trim() {
                "CPU" => &mut profile.cpu,
                "SMP" => &mut profile.smp,
                "Memory" => &mut profile.memory,
                "MemoryFile" => &mut profile.memory_file,
                "Disk" => &mut profile.disk,
                "DiskInterface" => &mut profile.disk_interface,
                "NetInterface" => &mut profile.net_interface,
                "NetModel" => &mut profile.net_model,
                "NetMacAddress" => &mut profile.net_macaddr,
                "RealTimeClock" => &mut profile.rtc,
                "Graphics" => &mut profile.graphics,
                "SoundHardware" => &mut profile.soundhw,
                "SerialPort" => &mut profile.serial,
                _ => continue,
            };
            *field = Some(value.to_string());
        }

        profile
    }

    /// Fills `net_macaddr` with a random locally-administered address when
    /// it is unset.
    pub fn ensure_macaddr(&mut self) {
        if self.net_macaddr.is_none() {
            let octets: [u8; 3] = rand::random();
            self.net_macaddr = Some(format!(
                "52:54:00:{:02x}:{:02x}:{:02x}",
                octets[0], octets[1], octets[2]
            ));
        }
    }

    /// Emits the launch specification in the fixed flag order.
    pub fn to_launch_spec(&self) -> LaunchSpec {
        let mut spec = LaunchSpec::new(QEMU_PROGRAM).arg("-enable-kvm");

        if let Some(cpu) = &self.cpu {
            spec = spec.arg_pair("-cpu", cpu);
        }
        if let Some(smp) = &self.smp {
            spec = spec.arg_pair("-smp", smp);
        }
        if let Some(memory) = &self.memory {
            spec = spec.arg_pair("-m", memory);
        }
        if let Some(file) = &self.memory_file {
            spec = spec.arg_pair("-mem-path", file);
        }
        if let Some(serial) = &self.serial {
            spec = spec.arg_pair("-serial", serial);
        }

        if let Some(disk) = &self.disk {
            let drive = match &self.disk_interface {
                Some(iface) => {
                    format!("file={disk},if={iface},index=0,media=disk,cache=none")
                }
                None => format!("file={disk},index=0,media=disk,cache=none"),
            };
            spec = spec.arg_pair("-drive", drive);
        }

        if let Some(ifname) = &self.net_interface {
            spec = spec.arg_pair(
                "-net",
                format!("tap,ifname={ifname},script=no,downscript=no"),
            );
        }

        if let Some(model) = &self.net_model {
            let nic = match &self.net_macaddr {
                Some(mac) => format!("nic,model={model},macaddr={mac}"),
                None => format!("nic,model={model}"),
            };
            spec = spec.arg_pair("-net", nic);
        }

        if let Some(base) = &self.rtc {
            spec = spec.arg_pair("-rtc", format!("base={base}"));
        }

        if let Some(graphics) = &self.graphics {
            if graphics == "none" {
                spec = spec.arg("-nographic");
            } else {
                spec = spec.arg_pair("-vga", graphics);
            }
        }

        if let Some(soundhw) = &self.soundhw {
            spec = spec.arg_pair("-soundhw", soundhw);
        }
        if self.fullscreen {
            spec = spec.arg("-full-screen");
        }
        if self.snapshot {
            spec = spec.arg("-snapshot");
        }

        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_keys() {
        let text = "\
CPU=host
SMP=4
Memory=4G
MemoryFile=/hugepages/vm
Disk=/img/arch.qcow2
DiskInterface=virtio
NetInterface=tap0
NetModel=virtio-net
NetMacAddress=52:54:00:aa:bb:cc
RealTimeClock=utc
Graphics=std
SoundHardware=hda
SerialPort=stdio
";
        let p = VmProfile::parse(text);
        assert_eq!(p.cpu.as_deref(), Some("host"));
        assert_eq!(p.smp.as_deref(), Some("4"));
        assert_eq!(p.memory.as_deref(), Some("4G"));
        assert_eq!(p.memory_file.as_deref(), Some("/hugepages/vm"));
        assert_eq!(p.disk.as_deref(), Some("/img/arch.qcow2"));
        assert_eq!(p.disk_interface.as_deref(), Some("virtio"));
        assert_eq!(p.net_interface.as_deref(), Some("tap0"));
        assert_eq!(p.net_model.as_deref(), Some("virtio-net"));
        assert_eq!(p.net_macaddr.as_deref(), Some("52:54:00:aa:bb:cc"));
        assert_eq!(p.rtc.as_deref(), Some("utc"));
        assert_eq!(p.graphics.as_deref(), Some("std"));
        assert_eq!(p.soundhw.as_deref(), Some("hda"));
        assert_eq!(p.serial.as_deref(), Some("stdio"));
    }

    #[test]
    fn test_parse_skips_comments_blanks_and_unknown_keys() {
        let text = "\
# a comment
Bogus=value
JustAnOption

CPU = host
";
        let p = VmProfile::parse(text);
        assert_eq!(p.cpu.as_deref(), Some("host"), "keys are trimmed");
        assert_eq!(p, VmProfile {
            cpu: Some("host".into()),
            ..VmProfile::default()
        });
    }

    #[test]
    fn test_ensure_macaddr_generates_qemu_oui() {
        let mut p = VmProfile::default();
        p.ensure_macaddr();
        let mac = p.net_macaddr.unwrap();
        assert_eq!(mac.len(), 17, "mac {mac} has wrong length");
        assert!(mac.starts_with("52:54:00:"), "mac {mac} has wrong prefix");
        assert!(
            mac[9..].chars().all(|c| c.is_ascii_hexdigit() || c == ':'),
            "mac {mac} has non-hex suffix"
        );

        let mut q = VmProfile {
            net_macaddr: Some("52:54:00:aa:bb:cc".into()),
            ..VmProfile::default()
        };
        q.ensure_macaddr();
        assert_eq!(q.net_macaddr.as_deref(), Some("52:54:00:aa:bb:cc"));
    }

    #[test]
    fn test_launch_spec_emission_order() {
        let p = VmProfile {
            cpu: Some("host".into()),
            smp: Some("4".into()),
            memory: Some("4G".into()),
            disk: Some("/img/arch.qcow2".into()),
            disk_interface: Some("virtio".into()),
            net_interface: Some("tap0".into()),
            net_model: Some("virtio-net".into()),
            net_macaddr: Some("52:54:00:aa:bb:cc".into()),
            rtc: Some("utc".into()),
            graphics: Some("std".into()),
            snapshot: true,
            ..VmProfile::default()
        };

        let spec = p.to_launch_spec();
        assert_eq!(spec.program(), "qemu-system-x86_64");
        assert_eq!(
            spec.tokens(),
            &[
                "-enable-kvm",
                "-cpu",
                "host",
                "-smp",
                "4",
                "-m",
                "4G",
                "-drive",
                "file=/img/arch.qcow2,if=virtio,index=0,media=disk,cache=none",
                "-net",
                "tap,ifname=tap0,script=no,downscript=no",
                "-net",
                "nic,model=virtio-net,macaddr=52:54:00:aa:bb:cc",
                "-rtc",
                "base=utc",
                "-vga",
                "std",
                "-snapshot",
            ]
        );
    }

    #[test]
    fn test_launch_spec_minimal_profile() {
        let spec = VmProfile::default().to_launch_spec();
        assert_eq!(spec.tokens(), &["-enable-kvm"]);
    }

    #[test]
    fn test_graphics_none_means_nographic() {
        let p = VmProfile {
            graphics: Some("none".into()),
            ..VmProfile::default()
        };
        assert_eq!(p.to_launch_spec().tokens(), &["-enable-kvm", "-nographic"]);
    }

    #[test]
    fn test_load_direct_path_and_mac_fill() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.conf");
        std::fs::write(&path, "CPU=host\n").unwrap();

        let dirs = Dirs {
            home: dir.path().into(),
            config: dir.path().join(".config"),
            runtime: dir.path().into(),
        };
        let p = VmProfile::load(path.to_str().unwrap(), &dirs).unwrap();
        assert_eq!(p.cpu.as_deref(), Some("host"));
        assert!(p.net_macaddr.is_some(), "mac must be filled at load time");
    }

    #[test]
    fn test_load_falls_back_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let vm_dir = dir.path().join("vm");
        std::fs::create_dir_all(&vm_dir).unwrap();
        std::fs::write(vm_dir.join("arch.conf"), "Memory=2G\n").unwrap();

        let dirs = Dirs {
            home: dir.path().into(),
            config: dir.path().into(),
            runtime: dir.path().into(),
        };
        let p = VmProfile::load("arch", &dirs).unwrap();
        assert_eq!(p.memory.as_deref(), Some("2G"));
    }

    #[test]
    fn test_load_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = Dirs {
            home: dir.path().into(),
            config: dir.path().into(),
            runtime: dir.path().into(),
        };
        let err = VmProfile::load("missing", &dirs).unwrap_err();
        assert!(matches!(err, ProfileError::NotFound { .. }), "got {err}");
    }
}
