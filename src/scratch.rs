//! Run-scoped scratch directory holding the pre-processed patch files.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

use crate::manifest::PatchId;
use crate::patch::{npy_path, png_path};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Remove whatever is at `path` (best effort), wait until it is really gone,
    /// then create an empty directory there.
    pub fn create(path: impl Into<PathBuf>, max_wait: Duration) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            info!("Removing stale scratch directory {:?}", path);
            if let Err(e) = fs::remove_dir_all(&path) {
                warn!("Ignoring failed removal of {:?}: {}", path, e);
            }
        }
        wait_until_absent(&path, max_wait)?;

        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create scratch directory {:?}", path))?;
        debug!("scratch directory ready at {:?}", path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn npy_path(&self, id: &PatchId) -> PathBuf {
        npy_path(&self.path, id)
    }

    pub fn png_path(&self, id: &PatchId) -> PathBuf {
        png_path(&self.path, id)
    }

    /// Number of regular files directly inside the directory.
    pub fn count_files(&self) -> Result<usize> {
        let mut n = 0;
        for entry in fs::read_dir(&self.path)
            .with_context(|| format!("listing scratch directory {:?}", self.path))?
        {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                n += 1;
            }
        }
        Ok(n)
    }

    /// Delete the directory and everything in it. Unlike the pre-run removal, failure is an error.
    pub fn remove(self) -> Result<()> {
        fs::remove_dir_all(&self.path)
            .with_context(|| format!("Failed to delete scratch directory {:?}", self.path))?;
        info!("Deleted scratch directory {:?}", self.path);
        Ok(())
    }
}

fn wait_until_absent(path: &Path, max_wait: Duration) -> Result<()> {
    let start = Instant::now();
    while path.exists() {
        if start.elapsed() >= max_wait {
            bail!("{:?} still exists after waiting {:?} for its deletion", path, max_wait);
        }
        thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}
