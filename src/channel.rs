use std::fmt;
use std::path::PathBuf;

use crate::manifest::PatchId;

/// Spectral band of a patch. `Channel::ALL` is the stacking order used by every loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Nir,
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Nir, Channel::Red, Channel::Green, Channel::Blue];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Nir => "nir",
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }

    /// Position of this band on the last axis of a stacked patch.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the single-band source images live.
///
/// `<data_root>/<split>_<channel>/<channel>_<patch id>.<extension>`, e.g.
/// `train_nir/nir_patch_1_1_by_1_LC08_....TIF`.
#[derive(Clone, Debug)]
pub struct DatasetLayout {
    pub data_root: PathBuf,
    pub split: String,
    pub extension: String,
}

impl DatasetLayout {
    pub fn new(data_root: impl Into<PathBuf>, split: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            data_root: data_root.into(),
            split: split.into(),
            extension: extension.into(),
        }
    }

    pub fn channel_dir(&self, channel: Channel) -> PathBuf {
        self.data_root.join(format!("{}_{}", self.split, channel.name()))
    }

    pub fn channel_path(&self, channel: Channel, id: &PatchId) -> PathBuf {
        self.channel_dir(channel)
            .join(format!("{}_{}.{}", channel.name(), id, self.extension))
    }
}
