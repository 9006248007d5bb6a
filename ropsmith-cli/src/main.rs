mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ropsmith_core::{BinaryImage, ScanConfig};

use report::Report;

/// Executable classifier and return-opcode scanner
#[derive(Parser)]
#[command(
    name = "ropsmith",
    about = "Identify executable images and list `ret` gadget sites in ELF64 code",
    version,
    author
)]
struct Cli {
    /// Path to binary file
    #[arg(required = true)]
    path: std::path::PathBuf,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show container format, bitness, byte order and architecture
    Info,
    /// Scan the .text section for return opcodes
    Scan {
        /// Bytes of context shown before each match (default: 16)
        #[arg(
            short,
            long,
            num_args = 0..=1,
            default_missing_value = "",
            allow_hyphen_values = true
        )]
        context: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let bin = BinaryImage::open(&cli.path)
        .with_context(|| format!("Error loading binary file {}", cli.path.display()))?;

    if !cli.json {
        println!("{}", report::banner());
    }

    match cli.command {
        Command::Info => {
            if cli.json {
                let report = Report::new(bin.path(), bin.classification());
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", bin.path().display());
                println!("{}", report::classification_table(&bin.classification()));
            }
        }

        Command::Scan { context } => {
            let config = ScanConfig::from_context_arg(context.as_deref());
            log::debug!("Scan configuration: {config:?}");
            let scan = bin
                .scan(&config)
                .with_context(|| format!("scan of {} failed", bin.path().display()))?;

            if cli.json {
                let report = Report::new(bin.path(), bin.classification()).with_scan(&scan);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Scanning {} (context={}):",
                    bin.path().display(),
                    config.context_bytes
                );
                println!("{}", report::classification_table(&bin.classification()));
                print!("{}", report::render_scan(&scan));
            }
        }
    }

    Ok(())
}
