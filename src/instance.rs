//! Process singleton
//!
//! An exclusive advisory lock on a file in the temp directory. The OS
//! releases the lock when the holding process exits, crashed or not, so a
//! left-over file never blocks the next start. The file itself stays on
//! disk and only records the holder's PID for diagnostics.

use std::fs::{File, OpenOptions, TryLockError};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::InstanceError;

/// Lock name used by the application
pub const APP_LOCK_NAME: &str = "screen_qr";

/// Held for as long as this process is the single instance
#[derive(Debug)]
pub struct InstanceGuard {
    name: String,
    path: PathBuf,
    // lock lives as long as the handle
    _file: File,
}

fn lock_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.lock", name))
}

impl InstanceGuard {
    /// Acquire the application lock in the system temp directory
    pub fn acquire(name: &str) -> Result<Self, InstanceError> {
        Self::acquire_in(&std::env::temp_dir(), name)
    }

    /// Acquire `name` inside `dir`
    ///
    /// Fails with [`InstanceError::AlreadyRunning`] while any other handle
    /// holds the lock, whatever the file currently contains.
    pub fn acquire_in(dir: &Path, name: &str) -> Result<Self, InstanceError> {
        let path = lock_path(dir, name);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                debug!("Instance lock {} is held elsewhere", path.display());
                return Err(InstanceError::AlreadyRunning {
                    name: name.to_string(),
                });
            }
            Err(TryLockError::Error(e)) => return Err(e.into()),
        }

        file.set_len(0)?;
        write!(file, "{}", std::process::id())?;
        file.flush()?;
        info!("Instance lock acquired at {}", path.display());
        Ok(Self {
            name: name.to_string(),
            path,
            _file: file,
        })
    }

    /// Lock name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock file location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        debug!("Releasing instance lock {}", self.path.display());
    }
}
