#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{ImageBuffer, ImageFormat, Luma};
use patch_format_bench::{Channel, DatasetLayout, PatchId};

pub const HEIGHT: u32 = 12;
pub const WIDTH: u32 = 9;

/// Deterministic 16-bit band value; distinct per patch, channel and pixel.
pub fn band_value(patch: usize, channel: Channel, x: u32, y: u32) -> u16 {
    (patch as u32 * 3_001 + channel.index() as u32 * 13_007 + y * WIDTH + x) as u16
}

/// Write a 38-Cloud style dataset: one TIFF per band and patch plus a manifest
/// with a header line and a trailing line break.
pub fn synthetic_dataset(root: &Path, n_patches: usize) -> (DatasetLayout, Vec<PatchId>) {
    let layout = DatasetLayout::new(root, "train", "TIF");
    let ids: Vec<PatchId> = (0..n_patches)
        .map(|i| PatchId::from(format!("patch_{}_1_by_1_LC08_L1TP_TEST", i + 1)))
        .collect();

    for (p, id) in ids.iter().enumerate() {
        for c in Channel::ALL {
            let path = layout.channel_path(c, id);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            let img: ImageBuffer<Luma<u16>, Vec<u16>> =
                ImageBuffer::from_fn(WIDTH, HEIGHT, |x, y| Luma([band_value(p, c, x, y)]));
            img.save_with_format(&path, ImageFormat::Tiff).unwrap();
        }
    }

    let mut manifest = String::from("name\n");
    for id in &ids {
        manifest.push_str(id.as_str());
        manifest.push('\n');
    }
    fs::write(root.join("training_patches_38-cloud_nonempty.csv"), manifest).unwrap();

    (layout, ids)
}
