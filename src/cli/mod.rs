// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction. clap parses the
// arguments; every computation is delegated to Layer 2 and
// this layer only prints the results.
//
// Four commands are supported, in walkthrough order:
//   1. `autograd`    — differentiate a tiny expression
//   2. `walkthrough` — one loss/backward/SGD step on a batch
//   3. `train`       — the full training loop
//   4. `classify`    — probabilities for one test image
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;
pub mod view;

use anyhow::Result;
use clap::Parser;
use commands::{AutogradArgs, ClassifyArgs, Commands, TrainArgs, WalkthroughArgs};

use crate::domain::image::LabelSet;

#[derive(Parser, Debug)]
#[command(
    name = "mlp-walkthrough",
    version,
    about = "Loss, autograd and SGD for a small MLP image classifier, one step at a time."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Autograd(args)    => run_autograd(args),
            Commands::Walkthrough(args) => run_walkthrough(args),
            Commands::Train(args)       => run_train(args),
            Commands::Classify(args)    => run_classify(args),
        }
    }
}

fn run_autograd(args: AutogradArgs) -> Result<()> {
    use crate::application::walkthrough_use_case::WalkthroughUseCase;

    let demo = WalkthroughUseCase::autograd(args.backend.into(), args.rows, args.cols)?;
    let cols = demo.shape[1];

    println!("x (requires grad: {}):\n{}\n", demo.tracks_grad, view::render_matrix(&demo.x, cols, 4));
    println!("y = x²:\n{}\n", view::render_matrix(&demo.y, cols, 4));
    println!("z = mean(y) = {:.4}\n", demo.z);
    println!("dz/dx from z.backward():\n{}\n", view::render_matrix(&demo.grad, cols, 4));
    println!("2x / n (analytic):\n{}\n", view::render_matrix(&demo.expected_grad, cols, 4));
    println!("max |autograd - analytic| = {:e}", demo.max_abs_error);
    Ok(())
}

fn run_walkthrough(args: WalkthroughArgs) -> Result<()> {
    use crate::application::walkthrough_use_case::WalkthroughUseCase;

    let preview  = args.preview;
    let use_case = WalkthroughUseCase::new(args.try_into()?);
    let r        = use_case.single_step(preview)?;

    println!("Batch of {} images → logits {:?}", r.batch_size, r.logits_shape);
    println!("Loss before the step: {:.4}", r.loss_before);
    println!();
    println!("First layer weights (first {}):", r.weight_before.len());
    println!("  before   {}", view::render_matrix(&r.weight_before, r.weight_before.len(), 5));
    println!("  gradient {}", view::render_matrix(&r.gradient, r.gradient.len(), 5));
    println!("  after    {}", view::render_matrix(&r.weight_after, r.weight_after.len(), 5));
    println!();
    println!("mean |gradient|          = {:e}", r.grad_abs_mean);
    println!("largest weight change    = {:e}", r.max_weight_step);
    println!("max |W' - (W - lr·g)|    = {:e}  (lr = {})", r.max_sgd_error, r.learning_rate);
    println!("Loss after the step:  {:.4}", r.loss_after);
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let use_case = TrainUseCase::new(args.try_into()?);
    let report   = use_case.execute()?;

    println!("\nepoch | training loss | val loss | val accuracy");
    for m in &report.epochs {
        let best = if report.best_epoch == Some(m.epoch) { " *" } else { "" };
        println!(
            "{:>5} | {:>13.4} | {:>8.4} | {:>11.1}%{}",
            m.epoch, m.train_loss, m.val_loss, m.val_accuracy * 100.0, best
        );
    }
    println!(
        "\nTraining complete ({} parameters). Loss {}.",
        report.parameter_count,
        if report.loss_decreased() { "decreased" } else { "did not decrease" }
    );
    if let Some(last) = report.final_metrics() {
        println!("Final validation accuracy: {:.1}%", last.val_accuracy * 100.0);
    }
    if let Some(best) = report.best_epoch {
        println!("Lowest validation loss at epoch {best} (*)");
    }
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    use crate::application::classify_use_case::ClassifyUseCase;

    let labels: LabelSet = args.labels.into();
    let use_case = ClassifyUseCase::new(&args.checkpoint_dir, args.backend.map(Into::into))?;
    let (image, prediction) = use_case.classify_test_image(args.index)?;

    println!("{}", view::render_image(&image));
    println!("{}", view::render_probabilities(&prediction, labels, 40));
    println!(
        "Predicted: {} ({:.1}%)   Actual: {}",
        labels.name(prediction.class()),
        prediction.confidence() * 100.0,
        labels.name(image.label as usize)
    );
    Ok(())
}
