//! Patch manifest parsing and sampling.
//!
//! The manifest is a plain listing with one patch identifier per line. Its first
//! line is a column header.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Key of one spatial tile. Used to name every file that belongs to the patch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(String);

impl PatchId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PatchId {
    fn from(s: &str) -> Self {
        PatchId(s.to_string())
    }
}

impl From<String> for PatchId {
    fn from(s: String) -> Self {
        PatchId(s)
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse manifest text: drop the header line and any empty entries
/// (the trailing one left by a final line break in particular).
pub fn parse_manifest(text: &str) -> Vec<PatchId> {
    text.split('\n')
        .skip(1)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(PatchId::from)
        .collect()
}

pub fn read_manifest(path: &Path) -> Result<Vec<PatchId>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading manifest {:?}", path))?;
    let ids = parse_manifest(&text);
    ensure_unique(&ids).with_context(|| format!("manifest {:?}", path))?;
    debug!("manifest {:?} => {} patch ids", path, ids.len());
    Ok(ids)
}

/// Patch ids must be unique for the sample and the scratch files to be one per patch.
pub fn ensure_unique(ids: &[PatchId]) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for (entry, id) in ids.iter().enumerate() {
        ensure!(seen.insert(id), "duplicate patch id {} (entry #{})", id, entry + 1);
    }
    Ok(())
}

/// Pick `n` distinct patches at random, in arbitrary order.
pub fn sample_patches<R: Rng + ?Sized>(ids: &[PatchId], n: usize, rng: &mut R) -> Result<Vec<PatchId>> {
    ensure!(
        n <= ids.len(),
        "cannot sample {} patches from a manifest of {} without replacement",
        n,
        ids.len()
    );
    Ok(ids.choose_multiple(rng, n).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    #[test]
    fn header_and_trailing_blank_are_dropped() {
        let text = "name\npatch_1_1_by_1_LC08\npatch_2_1_by_1_LC08\n";
        let ids = parse_manifest(text);
        assert_eq!(
            ids,
            vec![PatchId::from("patch_1_1_by_1_LC08"), PatchId::from("patch_2_1_by_1_LC08")]
        );
    }

    #[test]
    fn crlf_listing_parses_like_lf() {
        let ids = parse_manifest("name\r\na\r\nb\r\n");
        assert_eq!(ids, vec![PatchId::from("a"), PatchId::from("b")]);
    }

    #[test]
    fn header_only_manifest_is_empty() {
        assert!(parse_manifest("name\n").is_empty());
        assert!(parse_manifest("").is_empty());
    }

    #[test]
    fn duplicate_ids_in_manifest_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        fs::write(&path, "name\na\na\nb\n").unwrap();
        let err = read_manifest(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate patch id a (entry #2)"));

        fs::write(&path, "name\na\nb\n").unwrap();
        assert_eq!(read_manifest(&path).unwrap().len(), 2);
    }

    #[test]
    fn sample_is_distinct_subset() {
        let ids: Vec<PatchId> = (0..50).map(|i| PatchId::from(format!("patch_{i}"))).collect();
        let universe: HashSet<_> = ids.iter().cloned().collect();
        let mut rng = StdRng::seed_from_u64(7);
        for n in [0, 1, 10, 50] {
            let sample = sample_patches(&ids, n, &mut rng).unwrap();
            assert_eq!(sample.len(), n);
            let unique: HashSet<_> = sample.iter().cloned().collect();
            assert_eq!(unique.len(), n, "duplicate ids in sample of {n}");
            assert!(unique.is_subset(&universe));
        }
    }

    #[test]
    fn oversampling_is_rejected() {
        let ids = vec![PatchId::from("a"), PatchId::from("b")];
        let mut rng = StdRng::seed_from_u64(1);
        let err = sample_patches(&ids, 3, &mut rng).unwrap_err();
        assert!(err.to_string().contains("cannot sample 3"));
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let ids: Vec<PatchId> = (0..20).map(|i| PatchId::from(format!("p{i}"))).collect();
        let a = sample_patches(&ids, 5, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = sample_patches(&ids, 5, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
