//! # User directory context.
//!
//! [`Dirs`] resolves the directories the supervisor needs exactly once at
//! startup and is passed explicitly to whoever needs it — there is no
//! process-wide cache behind it.
//!
//! - Config: `$XDG_CONFIG_HOME` or `~/.config` (profile lookup)
//! - Runtime: `$XDG_RUNTIME_DIR` or the system temp dir (control sockets)

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::ProfileError;

/// Resolved user directories.
#[derive(Debug, Clone)]
pub struct Dirs {
    /// The user's home directory.
    pub home: PathBuf,
    /// User configuration directory (`$XDG_CONFIG_HOME` or `~/.config`).
    pub config: PathBuf,
    /// Per-user runtime directory (`$XDG_RUNTIME_DIR` or the temp dir).
    pub runtime: PathBuf,
}

impl Dirs {
    /// Resolves all directories from the environment.
    pub fn resolve() -> Result<Self, ProfileError> {
        Self::from_parts(
            env::var_os("HOME"),
            env::var_os("XDG_CONFIG_HOME"),
            env::var_os("XDG_RUNTIME_DIR"),
        )
    }

    /// Returns the runtime directory alone; unlike [`Dirs::resolve`] this
    /// never fails, so the supervisor core can fall back to it without a
    /// home directory.
    pub fn runtime_dir() -> PathBuf {
        env::var_os("XDG_RUNTIME_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir)
    }

    fn from_parts(
        home: Option<OsString>,
        xdg_config: Option<OsString>,
        xdg_runtime: Option<OsString>,
    ) -> Result<Self, ProfileError> {
        let home = home
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(ProfileError::HomeNotSet)?;

        let config = xdg_config
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".config"));

        let runtime = xdg_runtime
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Self {
            home,
            config,
            runtime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_is_required() {
        let err = Dirs::from_parts(None, None, None).unwrap_err();
        assert!(matches!(err, ProfileError::HomeNotSet));

        let err = Dirs::from_parts(Some(OsString::new()), None, None).unwrap_err();
        assert!(matches!(err, ProfileError::HomeNotSet));
    }

    #[test]
    fn test_xdg_overrides_win() {
        let dirs = Dirs::from_parts(
            Some("/home/u".into()),
            Some("/custom/config".into()),
            Some("/run/user/1000".into()),
        )
        .unwrap();
        assert_eq!(dirs.config, PathBuf::from("/custom/config"));
        assert_eq!(dirs.runtime, PathBuf::from("/run/user/1000"));
    }

    #[test]
    fn test_defaults_derive_from_home_and_tempdir() {
        let dirs = Dirs::from_parts(Some("/home/u".into()), None, None).unwrap();
        assert_eq!(dirs.home, PathBuf::from("/home/u"));
        assert_eq!(dirs.config, PathBuf::from("/home/u/.config"));
        assert_eq!(dirs.runtime, env::temp_dir());
    }
}
