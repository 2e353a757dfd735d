use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand};
use sasdocs::cli::{self, CliError, InputOptions};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "sasdocs")]
#[command(about = "sasdocs - Parse SAS programs into macros, steps and dataset lineage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// SAS files to parse (reads stdin if none are given)
    files: Vec<PathBuf>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,

    /// Skip macro definitions and calls
    #[arg(long)]
    no_macros: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show line count, node counts and coverage per program
    Summary {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Dump the reconstructed node tree
    Parse {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// List statements with macros opened up
    Objects {
        #[command(flatten)]
        inputs: Inputs,

        /// Only list one kind, e.g. dataStep or macroCall
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Export the dataset lineage graph as node-link JSON
    Lineage {
        #[command(flatten)]
        inputs: Inputs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sasdocs=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summary { inputs } => {
            input_options(inputs).and_then(|options| cli::execute_summary(&options))
        }
        Commands::Parse { inputs } => {
            input_options(inputs).and_then(|options| cli::execute_parse(&options))
        }
        Commands::Objects { inputs, kind } => input_options(inputs)
            .and_then(|options| cli::execute_objects(&options, kind.as_deref())),
        Commands::Lineage { inputs } => run_lineage(inputs),
    };

    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn input_options(inputs: Inputs) -> Result<InputOptions, CliError> {
    let stdin = if inputs.files.is_empty() {
        cli::read_stdin()?
    } else {
        None
    };
    Ok(InputOptions {
        files: inputs.files,
        stdin,
        no_macros: inputs.no_macros,
        pretty: inputs.pretty,
    })
}

fn run_lineage(inputs: Inputs) -> Result<String, CliError> {
    let options = input_options(inputs)?;
    let report = cli::execute_lineage(&options)?;
    for defect in &report.defects {
        eprintln!("warning: {}", defect);
    }
    Ok(report.json)
}
