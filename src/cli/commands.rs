// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `evaluate` and `inspect`
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::variant::ModelVariant;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a SqueezeNext variant on CIFAR-10
    Train(TrainArgs),

    /// Score the best checkpoint of a variant on the test split
    Evaluate(EvaluateArgs),

    /// Build a variant and print its shapes and parameter count
    Inspect(InspectArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Network variant: SqNxt_23_1x, SqNxt_23_1x_v5, SqNxt_23_2x or SqNxt_23_2x_v5
    #[arg(long, default_value = "SqNxt_23_1x")]
    pub variant: ModelVariant,

    /// Base learning rate, decayed by 0.2 after epochs 60, 120 and 160
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// Number of the first epoch
    #[arg(long, default_value_t = 1)]
    pub start_epoch: usize,

    /// Number of epochs to run
    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 80)]
    pub test_batch_size: usize,

    /// Data loader worker threads
    #[arg(long, default_value_t = 8)]
    pub num_workers: usize,

    /// Seed for weight initialization and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Adam L2 penalty
    #[arg(long, default_value_t = 5e-4)]
    pub weight_decay: f64,

    /// Where the training split is downloaded and unpacked
    #[arg(long, default_value = "train_data")]
    pub train_dir: String,

    /// Where the test split is downloaded and unpacked
    #[arg(long, default_value = "test_data")]
    pub test_dir: String,

    /// Checkpoints go to <checkpoint-root>/<variant>/
    #[arg(long, default_value = "checkpoint")]
    pub checkpoint_root: String,

    /// Keep Adam moment estimates across epochs instead of resetting them
    #[arg(long)]
    pub keep_optimizer_state: bool,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            variant:              a.variant,
            lr:                   a.lr,
            start_epoch:          a.start_epoch,
            epochs:               a.epochs,
            batch_size:           a.batch_size,
            test_batch_size:      a.test_batch_size,
            num_workers:          a.num_workers,
            seed:                 a.seed,
            weight_decay:         a.weight_decay,
            train_dir:            a.train_dir,
            test_dir:             a.test_dir,
            checkpoint_root:      a.checkpoint_root,
            keep_optimizer_state: a.keep_optimizer_state,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, default_value = "SqNxt_23_1x")]
    pub variant: ModelVariant,

    /// Directory the checkpoints were written to during training
    #[arg(long, default_value = "checkpoint")]
    pub checkpoint_root: String,

    #[arg(long, default_value = "test_data")]
    pub test_dir: String,

    #[arg(long, default_value_t = 80)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 8)]
    pub num_workers: usize,
}

/// All arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[arg(long, default_value = "SqNxt_23_1x")]
    pub variant: ModelVariant,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let Commands::Train(args) = parse(&["squeezenext-cifar", "train"]) else {
            panic!("expected train");
        };
        let cfg      = TrainConfig::from(args);
        let defaults = TrainConfig::default();
        assert_eq!(cfg.variant, defaults.variant);
        assert_eq!(cfg.lr, defaults.lr);
        assert_eq!(cfg.epochs, defaults.epochs);
        assert_eq!(cfg.batch_size, defaults.batch_size);
        assert_eq!(cfg.test_batch_size, defaults.test_batch_size);
        assert_eq!(cfg.weight_decay, defaults.weight_decay);
        assert_eq!(cfg.checkpoint_root, defaults.checkpoint_root);
        assert!(!cfg.keep_optimizer_state);
    }

    #[test]
    fn test_train_flags() {
        let Commands::Train(args) = parse(&[
            "squeezenext-cifar", "train",
            "--variant", "SqNxt_23_2x_v5",
            "--epochs", "3",
            "--keep-optimizer-state",
        ]) else {
            panic!("expected train");
        };
        assert_eq!(args.variant, ModelVariant::Sqnxt23x2V5);
        assert_eq!(args.epochs, 3);
        assert!(args.keep_optimizer_state);
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        assert!(Cli::try_parse_from(["squeezenext-cifar", "inspect", "--variant", "SqNxt_99"]).is_err());
    }
}
