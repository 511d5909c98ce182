use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use patch_format_bench::{
    load_channels, load_npy, load_png, preprocess, read_manifest, sample_patches, time_passes,
    verify_equivalence, DatasetLayout, ScratchDir,
};

#[derive(Parser, Debug)]
#[command(name = "patch-format-bench", version = "0.1.0")]
struct Args {
    /// Path to the training-data root containing the <split>_<channel> folders
    #[arg(long, default_value = "./data/38-Cloud_training")]
    data_root: String,

    /// Manifest listing patch ids, one per line after a header line
    /// (defaults to <data_root>/training_patches_38-cloud_nonempty.csv)
    #[arg(long)]
    manifest: Option<String>,

    /// Folder prefix of the per-channel folders, e.g. "train" => train_nir, train_red, ...
    #[arg(long, default_value = "train")]
    split: String,

    /// File extension of the single-band source images
    #[arg(long, default_value = "TIF")]
    extension: String,

    /// Scratch directory for the pre-processed .npy / .png files (deleted at the end)
    #[arg(long, default_value = "./tmp_patch_formats")]
    scratch_dir: String,

    /// Number of patches to sample (without replacement)
    #[arg(long, default_value = "100")]
    sample_size: usize,

    /// Number of timed runs per loader
    #[arg(long, default_value = "7")]
    repeats: usize,

    /// Full passes over the sample within one timed run
    #[arg(long, default_value = "1")]
    loops: usize,

    /// Seed for the patch sample; random when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Check that all three loaders return identical arrays before timing
    #[arg(long, default_value_t = false)]
    verify: bool,

    /// How long to wait for a stale scratch directory to disappear
    #[arg(long, default_value = "30")]
    delete_timeout_secs: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();
    info!("=== patch-format-bench start ===");

    let args = Args::parse();
    info!("Parsed command-line args: {:?}", args);

    run(&args)?;
    info!("=== Done. ===");
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let layout = DatasetLayout::new(&args.data_root, args.split.as_str(), args.extension.as_str());
    let manifest_path = args
        .manifest
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| layout.data_root.join("training_patches_38-cloud_nonempty.csv"));

    // 1) sample
    let all_ids = read_manifest(&manifest_path)?;
    info!("Manifest {:?} lists {} patches", manifest_path, all_ids.len());
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let ids = sample_patches(&all_ids, args.sample_size, &mut rng)?;
    info!("Sampled {} patches", ids.len());

    // 2) materialize the alternate forms
    let scratch = ScratchDir::create(&args.scratch_dir, Duration::from_secs(args.delete_timeout_secs))?;
    let written = preprocess(&layout, &ids, &scratch)?;
    let on_disk = scratch.count_files()?;
    info!("Scratch directory holds {} files ({} written)", on_disk, written);

    if args.verify {
        verify_equivalence(&layout, &scratch, &ids)?;
        info!("All loaders agree on {} patches", ids.len());
    }

    // 3) time each loader in turn
    let reports = [
        time_passes("4x single-band image + stack", &ids, args.repeats, args.loops, |id| {
            load_channels(&layout, id)
        })?,
        time_passes("1x 4-channel PNG", &ids, args.repeats, args.loops, |id| {
            load_png(scratch.path(), id)
        })?,
        time_passes("1x .npy array", &ids, args.repeats, args.loops, |id| {
            load_npy(scratch.path(), id)
        })?,
    ];
    for report in &reports {
        println!("{}", report);
    }

    // 4) cleanup
    scratch
        .remove()
        .context("Scratch cleanup failed after timing")?;
    Ok(())
}
