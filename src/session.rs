//! Per-session interface configuration state.
//!
//! Every shell command runs in its own short-lived process, so "which
//! interface am I configuring" can't live in memory. It is kept in one small
//! file per session instead, named after a [SessionKey]. The file holds the
//! interface name on a single line; no file means the session is not in
//! interface configuration mode.

use std::{
    fmt, fs,
    io::{ErrorKind, Write},
    os::unix::fs::DirBuilderExt,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Identifies an interactive session across its command invocations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Uses an explicit token handed down by the shell. Tokens end up in a
    /// file name, so only ASCII alphanumerics, `-` and `_` are accepted.
    pub fn new(token: &str) -> Result<Self> {
        let valid = !token.is_empty()
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(Error::InvalidArgument(format!(
                "'{}' is not a valid session token",
                token
            )));
        }
        Ok(SessionKey(token.into()))
    }

    /// Keys the session on our parent process, i.e. the long-lived shell
    /// that spawns each command.
    pub fn from_parent_process() -> Self {
        SessionKey(std::os::unix::process::parent_id().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// File-backed store of the current interface of each session
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        SessionStore {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the record for `key`
    pub fn path_for(&self, key: &SessionKey) -> PathBuf {
        self.dir.join(format!("vppsh-{}.session", key))
    }

    /// Records `interface` as the current interface of `key`, replacing any
    /// previous one. The record is written to a fresh temp file and renamed
    /// over the old path, so readers never see a partial write and a symlink
    /// planted at the path is replaced rather than followed.
    pub fn set_current(&self, key: &SessionKey, interface: &str) -> Result<()> {
        let interface = interface.trim();
        if interface.is_empty() || interface.contains(char::is_whitespace) {
            return Err(Error::InvalidArgument(format!(
                "'{}' is not a valid interface name",
                interface
            )));
        }
        self.ensure_dir()?;
        let mut file = NamedTempFile::new_in(&self.dir)?;
        writeln!(file, "{}", interface)?;
        file.persist(self.path_for(key)).map_err(|err| err.error)?;
        log::debug!("session: {} now configuring {}", key, interface);
        Ok(())
    }

    /// Creates the store directory, private to us, if it doesn't exist
    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.is_dir() {
            fs::DirBuilder::new()
                .recursive(true)
                .mode(0o700)
                .create(&self.dir)?;
        }
        Ok(())
    }

    /// Returns the current interface of `key`, or `None` if the session is
    /// not in interface configuration mode
    pub fn get_current(&self, key: &SessionKey) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => {
                let name = content.lines().next().unwrap_or("").trim();
                Ok(if name.is_empty() {
                    None
                } else {
                    Some(name.to_owned())
                })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Leaves interface configuration mode. Clearing a session that has no
    /// record is not an error.
    pub fn clear_current(&self, key: &SessionKey) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {
                log::debug!("session: {} left interface mode", key);
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
