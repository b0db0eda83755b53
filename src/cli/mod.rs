// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with `clap` and prints results.
// All work is delegated to Layer 2 (application).
//
//   1. `train`      trains a variant on CIFAR-10
//   2. `evaluate`   scores the best checkpoint of a variant
//   3. `inspect`    prints a variant's shapes
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, InspectArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "squeezenext-cifar",
    version = "0.1.0",
    about = "Train SqueezeNext networks on CIFAR-10 and evaluate the best checkpoint."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Inspect(args)  => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training of {}", args.variant);
    let session = TrainUseCase::new(args.into()).execute()?;

    let epochs = session.history().len();
    match session.best_epoch() {
        Some(epoch) => println!("Training complete after {epochs} epochs. Best checkpoint from epoch {epoch}."),
        None        => println!("Training complete after {epochs} epochs. No epoch improved on 0% accuracy; nothing saved."),
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(
        args.variant,
        args.checkpoint_root,
        args.test_dir,
        args.batch_size,
        args.num_workers,
    )
    .execute()?;

    println!(
        "{} (epoch {}): Test_Loss: {:.4} Acc@1: {:.4}",
        report.meta.variant,
        report.meta.epoch,
        report.totals.mean_loss(),
        report.totals.accuracy() * 100.0,
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let summary = InspectUseCase::new(args.variant).execute();
    println!("{}", args.variant);
    println!("  stem channels:   {}", summary.stem_channels);
    println!("  stage channels:  {:?}", summary.stage_channels);
    println!("  head channels:   {}", summary.head_channels);
    println!("  residual blocks: {}", summary.blocks);
    println!("  parameters:      {}", summary.num_params);
    println!("  output shape:    {:?}", summary.output_dims);
    Ok(())
}
