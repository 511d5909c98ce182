use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use crate::channel::DatasetLayout;
use crate::manifest::PatchId;
use crate::patch::{load_channels, write_patch_npy, write_patch_png};
use crate::scratch::ScratchDir;

/// Materialize the `.npy` and `.png` forms of every sampled patch.
///
/// Stops at the first patch that fails to load or write. Returns the number of
/// files written, which is two per patch.
pub fn preprocess(layout: &DatasetLayout, ids: &[PatchId], scratch: &ScratchDir) -> Result<usize> {
    info!("Pre-processing {} patches into {:?}", ids.len(), scratch.path());

    let pb = ProgressBar::new(ids.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}")?
            .progress_chars("##-"),
    );

    let mut written = 0;
    for id in ids {
        let patch = load_channels(layout, id)
            .with_context(|| format!("loading source channels of patch {}", id))?;
        let npy = write_patch_npy(scratch.path(), id, &patch)?;
        let png = write_patch_png(scratch.path(), id, &patch)?;
        written += 2;
        debug!("patch {} shape={:?} => {:?}, {:?}", id, patch.dim(), npy, png);
        pb.inc(1);
    }
    pb.finish_with_message("pre-processing done");

    info!("Wrote {} files for {} patches", written, ids.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::patch::{load_npy, load_png, PatchArray};
    use image::{ImageBuffer, ImageFormat, Luma};
    use std::time::Duration;
    use tempfile::tempdir;

    fn write_band(layout: &DatasetLayout, c: Channel, id: &PatchId, value: impl Fn(u32, u32) -> u16) {
        let path = layout.channel_path(c, id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(8, 5, |x, y| Luma([value(x, y)]));
        img.save_with_format(&path, ImageFormat::Tiff).unwrap();
    }

    #[test]
    fn one_patch_yields_matching_npy_and_png() {
        let data = tempdir().unwrap();
        let layout = DatasetLayout::new(data.path(), "train", "TIF");
        let id = PatchId::from("patch_1_1_by_1");
        for c in Channel::ALL {
            let k = c.index() as u32;
            write_band(&layout, c, &id, |x, y| (k * 16_000 + y * 100 + x) as u16);
        }

        let scratch = ScratchDir::create(data.path().join("scratch"), Duration::from_secs(5)).unwrap();
        let written = preprocess(&layout, &[id.clone()], &scratch).unwrap();
        assert_eq!(written, 2);
        assert_eq!(scratch.count_files().unwrap(), 2);
        assert!(scratch.npy_path(&id).is_file());
        assert!(scratch.png_path(&id).is_file());

        let from_npy: PatchArray = load_npy(scratch.path(), &id).unwrap();
        let from_png = load_png(scratch.path(), &id).unwrap();
        assert_eq!(from_npy.dim(), (5, 8, 4));
        assert_eq!(from_npy, from_png);
        assert_eq!(from_npy[(2, 3, Channel::Blue.index())], 3 * 16_000 + 203);
    }

    #[test]
    fn missing_source_aborts_the_pass() {
        let data = tempdir().unwrap();
        let layout = DatasetLayout::new(data.path(), "train", "TIF");
        let good = PatchId::from("good");
        for c in Channel::ALL {
            write_band(&layout, c, &good, |x, _| x as u16);
        }
        let missing = PatchId::from("missing");

        let scratch = ScratchDir::create(data.path().join("scratch"), Duration::from_secs(5)).unwrap();
        let err = preprocess(&layout, &[good, missing], &scratch).unwrap_err();
        assert!(format!("{:#}", err).contains("patch missing"));
    }
}
