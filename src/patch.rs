//! The stacked patch array and the three ways of getting one off disk.
//!
//! - `load_channels`: four single-band source images, decoded and stacked (loader A).
//! - `load_png`: one 16-bit RGBA PNG written by the pre-processor (loader B).
//! - `load_npy`: one `.npy` array written by the pre-processor (loader C).
//!
//! All three return `(height, width, 4)` arrays with bands in `Channel::ALL` order.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, ensure, Context, Result};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use ndarray::{Array2, Array3, ArrayView2, Axis};
use ndarray_npy::{read_npy, write_npy};

use crate::channel::{Channel, DatasetLayout};
use crate::manifest::PatchId;

pub type PatchArray = Array3<u16>;

pub const NUM_CHANNELS: usize = Channel::ALL.len();

type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

pub fn npy_path(dir: &Path, id: &PatchId) -> PathBuf {
    dir.join(format!("{}.npy", id))
}

pub fn png_path(dir: &Path, id: &PatchId) -> PathBuf {
    dir.join(format!("{}.png", id))
}

/// Decode one single-band image into a `(height, width)` grid.
///
/// Values are kept as stored: 16-bit bands pass through, 8-bit bands are widened
/// without rescaling. Anything with more than one band is rejected.
pub fn read_channel(path: &Path) -> Result<Array2<u16>> {
    let img = image::io::Reader::open(path)
        .with_context(|| format!("opening channel image {:?}", path))?
        .with_guessed_format()
        .with_context(|| format!("probing format of {:?}", path))?
        .decode()
        .with_context(|| format!("decoding channel image {:?}", path))?;
    let (w, h, raw) = match img {
        DynamicImage::ImageLuma16(buf) => (buf.width(), buf.height(), buf.into_raw()),
        DynamicImage::ImageLuma8(buf) => (
            buf.width(),
            buf.height(),
            buf.into_raw().into_iter().map(u16::from).collect(),
        ),
        other => bail!(
            "channel image {:?} has colour type {:?}, expected a single 8- or 16-bit band",
            path,
            other.color()
        ),
    };
    Array2::from_shape_vec((h as usize, w as usize), raw)
        .with_context(|| format!("reshaping {:?} to ({}, {})", path, h, w))
}

/// Stack single-band grids along a new last axis.
pub fn stack_channels(channels: &[Array2<u16>]) -> Result<PatchArray> {
    let views: Vec<ArrayView2<u16>> = channels.iter().map(|c| c.view()).collect();
    ndarray::stack(Axis(2), &views).context("stacking channels of differing shapes")
}

/// Loader A: read the four source bands of a patch and stack them.
pub fn load_channels(layout: &DatasetLayout, id: &PatchId) -> Result<PatchArray> {
    let bands = Channel::ALL
        .iter()
        .map(|&c| read_channel(&layout.channel_path(c, id)))
        .collect::<Result<Vec<_>>>()?;
    stack_channels(&bands).with_context(|| format!("patch {}", id))
}

/// Loader B: decode the pre-processed 4-channel PNG of a patch.
pub fn load_png(scratch: &Path, id: &PatchId) -> Result<PatchArray> {
    let path = png_path(scratch, id);
    let img = image::open(&path)
        .with_context(|| format!("decoding {:?}", path))?
        .into_rgba16();
    let (w, h) = img.dimensions();
    Array3::from_shape_vec((h as usize, w as usize, NUM_CHANNELS), img.into_raw())
        .with_context(|| format!("reshaping {:?} to ({}, {}, {})", path, h, w, NUM_CHANNELS))
}

/// Loader C: deserialize the pre-processed `.npy` array of a patch.
pub fn load_npy(scratch: &Path, id: &PatchId) -> Result<PatchArray> {
    let path = npy_path(scratch, id);
    read_npy(&path).with_context(|| format!("reading {:?}", path))
}

/// Reinterpret a stacked patch as RGBA pixels; nir lands in R, blue in A.
pub fn to_rgba16(patch: &PatchArray) -> Result<Rgba16Image> {
    let (h, w, c) = patch.dim();
    ensure!(c == NUM_CHANNELS, "expected {} channels, got {}", NUM_CHANNELS, c);
    // Logical-order iteration, so non-standard layouts come out row-major too.
    let raw: Vec<u16> = patch.iter().copied().collect();
    ImageBuffer::from_raw(w as u32, h as u32, raw)
        .ok_or_else(|| anyhow!("pixel buffer does not fit a {}x{} RGBA image", w, h))
}

pub fn write_patch_png(scratch: &Path, id: &PatchId, patch: &PatchArray) -> Result<PathBuf> {
    let path = png_path(scratch, id);
    to_rgba16(patch)?
        .save_with_format(&path, ImageFormat::Png)
        .with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

pub fn write_patch_npy(scratch: &Path, id: &PatchId, patch: &PatchArray) -> Result<PathBuf> {
    let path = npy_path(scratch, id);
    write_npy(&path, patch).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}
