use anyhow::{ensure, Result};
use log::{debug, info};

use crate::channel::DatasetLayout;
use crate::manifest::PatchId;
use crate::patch::{load_channels, load_npy, load_png};
use crate::scratch::ScratchDir;

/// Check that all three loaders return the same array for every patch.
///
/// Runs outside the timed passes; the benchmark itself never compares outputs.
pub fn verify_equivalence(layout: &DatasetLayout, scratch: &ScratchDir, ids: &[PatchId]) -> Result<()> {
    info!("Verifying loader equivalence over {} patches", ids.len());
    for id in ids {
        let channels = load_channels(layout, id)?;
        let png = load_png(scratch.path(), id)?;
        let npy = load_npy(scratch.path(), id)?;
        ensure!(
            npy == channels,
            "patch {}: .npy array {:?} differs from stacked channels {:?}",
            id,
            npy.dim(),
            channels.dim()
        );
        ensure!(
            png == channels,
            "patch {}: .png array {:?} differs from stacked channels {:?}",
            id,
            png.dim(),
            channels.dim()
        );
        debug!("patch {} => all loaders agree", id);
    }
    Ok(())
}
