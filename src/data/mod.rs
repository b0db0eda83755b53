// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the CIFAR-10 archive to tensor batches.
//
//   cifar-10-binary.tar.gz
//       │
//       ▼
//   CifarReader      → downloads, unpacks, parses records
//       │
//       ▼
//   CifarDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   CifarBatcher     → augment (train only), normalize, stack
//       │
//       ▼
//   DataLoader       → shuffles and prefetches with worker threads
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// CIFAR-10 download and binary record parsing
pub mod cifar;

/// Random crop / flip transforms on raw images
pub mod augment;

/// Implements Burn's Dataset trait for CIFAR samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
