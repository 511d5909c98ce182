//! Benchmark of on-disk representations for 4-band cloud-detection patches.
//!
//! Sampled patches are read three ways: as four single-band source images that
//! get stacked on load, as one 16-bit RGBA PNG, and as one `.npy` array. The PNG
//! and `.npy` forms are written into a scratch directory that lives for one run.

pub mod channel;
pub mod manifest;
pub mod patch;
pub mod preprocess;
pub mod scratch;
pub mod timing;
pub mod verify;

pub use channel::{Channel, DatasetLayout};
pub use manifest::{parse_manifest, read_manifest, sample_patches, PatchId};
pub use patch::{load_channels, load_npy, load_png, PatchArray};
pub use preprocess::preprocess;
pub use scratch::ScratchDir;
pub use timing::{time_passes, TimingReport};
pub use verify::verify_equivalence;
