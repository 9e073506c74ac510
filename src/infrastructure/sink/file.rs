//! authorized_keys file sink
//!
//! Writes are whole-file replaces, not rename swaps: a reader racing a write
//! can see a truncated file, and a failed chown leaves the new contents behind.

use std::ffi::CString;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::domain::{DomainError, KeySink};

const FILE_MODE: u32 = 0o600;

/// Who should own the written file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOwner {
    /// Resolved through the system user database on every write
    Name(String),
    /// Numeric `uid:gid`
    Ids { uid: u32, gid: u32 },
}

impl FileOwner {
    /// `"1000:1000"` is taken as numeric ids, anything else as a user name
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();

        if value.is_empty() {
            return Err(DomainError::configuration("Owner must not be empty"));
        }

        if let Some((uid, gid)) = value.split_once(':') {
            if let (Ok(uid), Ok(gid)) = (uid.parse(), gid.parse()) {
                return Ok(Self::Ids { uid, gid });
            }
        }

        Ok(Self::Name(value.to_string()))
    }

    pub fn resolve(&self) -> Result<(u32, u32), DomainError> {
        match self {
            Self::Ids { uid, gid } => Ok((*uid, *gid)),
            Self::Name(name) => lookup_user(name),
        }
    }
}

impl std::fmt::Display for FileOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::Ids { uid, gid } => write!(f, "{}:{}", uid, gid),
        }
    }
}

/// Writes the rendered keys to a file with mode 0600 owned by `owner`
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    owner: FileOwner,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, owner: FileOwner) -> Self {
        Self {
            path: path.into(),
            owner,
        }
    }

    async fn write_file(&self, contents: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(FILE_MODE)
            .open(&self.path)
            .await?;

        file.write_all(contents).await?;
        file.flush().await?;

        // mode() only applies on creation
        tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(FILE_MODE)).await
    }
}

#[async_trait]
impl KeySink for FileSink {
    async fn write(&self, contents: &[u8]) -> Result<(), DomainError> {
        self.write_file(contents).await.map_err(|e| {
            DomainError::sink(format!(
                "failed to write authorized file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        info!(file = %self.path.display(), bytes = contents.len(), "File has been written");

        let (uid, gid) = self.owner.resolve()?;

        std::os::unix::fs::chown(&self.path, Some(uid), Some(gid)).map_err(|e| {
            DomainError::sink(format!(
                "failed to chown authorized file {} to {}: {}",
                self.path.display(),
                self.owner,
                e
            ))
        })?;

        info!(owner = %self.owner, uid, gid, "User permissions have been updated");

        Ok(())
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

/// Look up a user's uid and primary gid by name
pub fn lookup_user(name: &str) -> Result<(u32, u32), DomainError> {
    let c_name = CString::new(name)
        .map_err(|_| DomainError::sink(format!("invalid user name {:?}", name)))?;

    let mut buffer: Vec<libc::c_char> = vec![0; 1024];

    loop {
        // SAFETY: passwd is plain data; getpwnam_r only writes into `passwd`
        // and `buffer`, and `result` points at `passwd` or is null.
        let mut passwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        let code = unsafe {
            libc::getpwnam_r(
                c_name.as_ptr(),
                &mut passwd,
                buffer.as_mut_ptr(),
                buffer.len(),
                &mut result,
            )
        };

        if code == libc::ERANGE && buffer.len() < 1 << 20 {
            buffer.resize(buffer.len() * 2, 0);
            continue;
        }

        if code != 0 {
            return Err(DomainError::sink(format!(
                "failed to lookup users uid/gid for {}: {}",
                name,
                std::io::Error::from_raw_os_error(code)
            )));
        }

        if result.is_null() {
            return Err(DomainError::sink(format!("user {} does not exist", name)));
        }

        return Ok((passwd.pw_uid, passwd.pw_gid));
    }
}
