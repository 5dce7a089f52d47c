use autocrop::batch::BatchSettings;
use autocrop::config::{self, CliOverrides};
use autocrop::imaging::RustBackend;
use autocrop::output;
use autocrop::run::{RunRequest, run};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autocrop")]
#[command(version)]
#[command(about = "Process images by cropping out black borders")]
#[command(long_about = "\
Process images by cropping out black borders

Rows and columns at the edges of each image whose mean intensity is at or
below the threshold are removed. Images that are dark everywhere are written
back unchanged.

Each -f folder is written to <output>/<folder name>; each -i image is written
directly into <output>. Images that fail to decode or encode are reported and
skipped; the exit status is non-zero only if the run itself cannot proceed.

Set RUST_LOG=debug to see detected boxes.")]
struct Cli {
    /// Input folder containing images to process (repeatable)
    #[arg(short, long = "folder", value_name = "DIR")]
    folders: Vec<PathBuf>,

    /// Individual image to process (repeatable)
    #[arg(short, long = "image", value_name = "FILE")]
    images: Vec<PathBuf>,

    /// Base output directory
    #[arg(short, long, required_unless_present = "gen_config")]
    output: Option<PathBuf>,

    /// Threshold for determining black borders (0-255) [default: 60]
    #[arg(short, long)]
    threshold: Option<u8>,

    /// Number of worker threads [default: number of CPU cores]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Config file (TOML); command-line flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a stock config file with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("An error occurred: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }
    if cli.folders.is_empty() && cli.images.is_empty() {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "At least one input folder (-f) or image (-i) must be specified",
            )
            .exit();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let run_config = config::load_config(
        cli.config.as_deref(),
        CliOverrides {
            threshold: cli.threshold,
            workers: cli.workers,
        },
    )?;
    let request = RunRequest {
        folders: cli.folders,
        images: cli.images,
        output: cli.output.ok_or("an output directory (-o) is required")?,
        settings: BatchSettings {
            threshold: run_config.threshold(),
            workers: config::effective_workers(&run_config.processing),
        },
    };
    let backend = RustBackend::with_quality(run_config.jpeg_quality());

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = output::spawn_printer(rx);
    let result = run(&backend, &request, Some(&tx));
    drop(tx);
    output::join_printer(printer)?;
    result?;

    output::print_completion();
    Ok(())
}
