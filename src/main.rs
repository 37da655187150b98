use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use neurite::data::{load_dataset, load_inputs};
use neurite::{test, NetError, Network, NetworkSpec, Result, SavePolicy, TrainConfig, Trainer};

/// Train, evaluate and query feed-forward digit classifiers on IDX data.
#[derive(Parser)]
#[command(name = "neurite", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a fresh network and save it as a model directory.
    Train(TrainArgs),
    /// Report the accuracy of a saved model on a labelled set.
    Test(TestArgs),
    /// Print the prediction and per-class confidence for one image.
    Predict(PredictArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Model directory (layer_<i>/neuron_<n>/...).
    #[arg(long)]
    model: PathBuf,
    /// Architecture JSON; defaults to 784 → 16 → 16 → 10.
    #[arg(long)]
    arch: Option<String>,
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[arg(long)]
    images: PathBuf,
    #[arg(long)]
    labels: PathBuf,
    /// Read at most this many training examples.
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long, requires = "test_labels")]
    test_images: Option<PathBuf>,
    #[arg(long, requires = "test_images")]
    test_labels: Option<PathBuf>,
    #[arg(long, default_value_t = 10_000)]
    epochs: usize,
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,
    #[arg(long, default_value_t = 32)]
    batch_size: usize,
    /// Seeds weight initialization and window sampling.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Replace an existing model directory without asking.
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct TestArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[arg(long)]
    images: PathBuf,
    #[arg(long)]
    labels: PathBuf,
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct PredictArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[arg(long)]
    images: PathBuf,
    /// Index of the image inside the file.
    #[arg(long, default_value_t = 0)]
    index: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Train(args) => run_train(args),
        Command::Test(args) => run_test(args),
        Command::Predict(args) => run_predict(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn architecture(args: &ModelArgs) -> Result<NetworkSpec> {
    match &args.arch {
        Some(path) => NetworkSpec::load_json(path),
        None => Ok(NetworkSpec::digits()),
    }
}

fn loaded_network(args: &ModelArgs) -> Result<Network> {
    let spec = architecture(args)?;
    let mut network = Network::from_spec(&spec, &mut StdRng::seed_from_u64(0))?;
    network.load(&args.model)?;
    Ok(network)
}

fn run_train(args: TrainArgs) -> Result<()> {
    let spec = architecture(&args.model)?;
    let train = load_dataset(&args.images, &args.labels, args.limit)?;
    let held_out = match (&args.test_images, &args.test_labels) {
        (Some(images), Some(labels)) => Some(load_dataset(images, labels, None)?),
        _ => None,
    };
    info!(name = %spec.name, examples = train.len(), "training");

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut network = Network::from_spec(&spec, &mut rng)?;
    let config = TrainConfig::new(args.epochs, args.learning_rate, args.batch_size).with_seed(args.seed);
    let eval = held_out.as_ref().map(|d| (d.inputs.as_slice(), d.labels.as_slice()));
    Trainer::new(config).train(&mut network, &train.inputs, &train.labels, eval)?;

    let policy = if args.force {
        SavePolicy::Overwrite
    } else if !args.model.model.exists() {
        SavePolicy::FailIfExists
    } else if confirm_overwrite(&args.model.model)? {
        SavePolicy::Overwrite
    } else {
        info!("model not saved");
        return Ok(());
    };
    network.save(&args.model.model, policy)
}

fn run_test(args: TestArgs) -> Result<()> {
    let mut network = loaded_network(&args.model)?;
    let data = load_dataset(&args.images, &args.labels, args.limit)?;
    let accuracy = test(&mut network, &data.inputs, &data.labels)?;
    println!("Accuracy: {:.2}% ({} examples)", accuracy * 100.0, data.len());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let mut network = loaded_network(&args.model)?;
    let inputs = load_inputs(&args.images, Some(images_needed(args.index)))?;
    let image = inputs.get(args.index).ok_or_else(|| {
        NetError::InvalidData(format!("no image at index {}", args.index))
    })?;
    let prediction = network.predict(image)?;
    let confidence = network.outputs()[prediction];
    if confidence < 0.7 {
        println!("I see ...");
    } else {
        println!("I see a {prediction}!");
    }
    for (class, &output) in network.outputs().iter().enumerate() {
        let width = (output.clamp(0.0, 1.0) * 40.0) as usize;
        println!("{class} {} {output:.3}", "#".repeat(width));
    }
    Ok(())
}

/// How many images to read so that `index` is included.
fn images_needed(index: usize) -> usize {
    index.saturating_add(1)
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    print!("Folder '{}' already exists. Overwrite? (y/N): ", path.display());
    io::stdout().flush().map_err(|e| NetError::io("stdout", e))?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| NetError::io("stdin", e))?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
