// ============================================================
// Layer 4 — CIFAR-10 Reader
// ============================================================
// Downloads the binary distribution of CIFAR-10 on first use
// and parses its record files.
//
// Binary layout (one file = 10 000 records):
//
//   ┌───────┬──────────────────────────────────────────┐
//   │ label │ 1024 red │ 1024 green │ 1024 blue bytes  │
//   │ 1 B   │ row-major 32×32 per channel              │
//   └───────┴──────────────────────────────────────────┘
//
// Training split: data_batch_1.bin … data_batch_5.bin (50 000)
// Test split:     test_batch.bin                     (10 000)
//
// Reference: https://www.cs.toronto.edu/~kriz/cifar.html

use anyhow::{bail, Context, Result};
use burn::data::network::downloader::download_file_as_bytes;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tar::Archive;

use crate::domain::traits::SampleSource;

const URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";
const ARCHIVE_DIR: &str = "cifar-10-batches-bin";
const META_FILE: &str = "batches.meta.txt";
const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const TEST_FILES: [&str; 1] = ["test_batch.bin"];

pub const WIDTH:       usize = 32;
pub const HEIGHT:      usize = 32;
pub const CHANNELS:    usize = 3;
pub const NUM_CLASSES: usize = 10;
pub const IMAGE_BYTES: usize = CHANNELS * HEIGHT * WIDTH;
const RECORD_BYTES:    usize = 1 + IMAGE_BYTES;

/// One labelled CIFAR-10 image, channel-major (`3 × 32 × 32`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CifarSample {
    pub image: Vec<u8>,
    pub label: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    fn files(&self) -> &'static [&'static str] {
        match self {
            Split::Train => &TRAIN_FILES,
            Split::Test  => &TEST_FILES,
        }
    }
}

/// Reads one split of CIFAR-10 from `root`, downloading and unpacking
/// the archive there first if it is missing.
pub struct CifarReader {
    root:  PathBuf,
    split: Split,
}

impl CifarReader {
    pub fn new(root: impl Into<PathBuf>, split: Split) -> Self {
        Self { root: root.into(), split }
    }

    pub fn train(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Split::Train)
    }

    pub fn test(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Split::Test)
    }
}

impl SampleSource for CifarReader {
    type Sample = CifarSample;

    fn load_all(&self) -> Result<Vec<CifarSample>> {
        let dir = ensure_downloaded(&self.root)?;
        let mut samples = Vec::new();

        for name in self.split.files() {
            let path  = dir.join(name);
            let bytes = fs::read(&path)
                .with_context(|| format!("Cannot read CIFAR-10 file '{}'", path.display()))?;
            let parsed = parse_records(&bytes)
                .with_context(|| format!("Malformed CIFAR-10 file '{}'", path.display()))?;
            tracing::debug!("Read {} samples from '{}'", parsed.len(), path.display());
            samples.extend(parsed);
        }

        Ok(samples)
    }
}

/// Make sure `root/cifar-10-batches-bin` exists, fetching the archive
/// when it does not. Returns the directory holding the batch files.
pub fn ensure_downloaded(root: &Path) -> Result<PathBuf> {
    let dir = root.join(ARCHIVE_DIR);
    if dir.join(META_FILE).exists() {
        return Ok(dir);
    }

    fs::create_dir_all(root)
        .with_context(|| format!("Cannot create dataset directory '{}'", root.display()))?;

    tracing::info!("Downloading CIFAR-10 into '{}'", root.display());
    let bytes = download_file_as_bytes(URL, "cifar-10-binary.tar.gz");

    let mut archive = Archive::new(GzDecoder::new(&bytes[..]));
    archive
        .unpack(root)
        .with_context(|| format!("Cannot unpack CIFAR-10 archive into '{}'", root.display()))?;

    Ok(dir)
}

/// Split a CIFAR-10 binary file into samples.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<CifarSample>> {
    if bytes.len() % RECORD_BYTES != 0 {
        bail!(
            "file length {} is not a multiple of the {}-byte record size",
            bytes.len(),
            RECORD_BYTES
        );
    }

    bytes
        .chunks_exact(RECORD_BYTES)
        .enumerate()
        .map(|(i, record)| {
            let label = record[0];
            if label as usize >= NUM_CLASSES {
                bail!("record {i} has label {label}, expected 0..{NUM_CLASSES}");
            }
            Ok(CifarSample { image: record[1..].to_vec(), label })
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: u8, fill: u8) -> Vec<u8> {
        let mut r = vec![label];
        r.extend(std::iter::repeat(fill).take(IMAGE_BYTES));
        r
    }

    #[test]
    fn test_parse_two_records() {
        let mut bytes = record(3, 7);
        bytes.extend(record(9, 200));

        let samples = parse_records(&bytes).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label, 3);
        assert_eq!(samples[1].image.len(), IMAGE_BYTES);
        assert!(samples[1].image.iter().all(|&p| p == 200));
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let mut bytes = record(1, 0);
        bytes.pop();
        assert!(parse_records(&bytes).is_err());
    }

    #[test]
    fn test_out_of_range_label_is_rejected() {
        let err = parse_records(&record(10, 0)).unwrap_err();
        assert!(err.to_string().contains("label 10"));
    }

    #[test]
    fn test_reader_uses_existing_files() {
        let root = tempfile::tempdir().unwrap();
        let dir  = root.path().join(ARCHIVE_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(META_FILE), "airplane\nautomobile\nbird\ncat\ndeer\n").unwrap();

        let mut test_bytes = record(0, 1);
        test_bytes.extend(record(4, 2));
        test_bytes.extend(record(8, 3));
        fs::write(dir.join("test_batch.bin"), test_bytes).unwrap();

        let samples = CifarReader::test(root.path()).load_all().unwrap();
        let labels: Vec<u8> = samples.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec![0, 4, 8]);
    }
}
