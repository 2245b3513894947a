//! Command-line converter.
//!
//! Usage:
//!   snapinator game.sb3                 # XML to stdout
//!   snapinator game.sb2 -o game.xml     # XML to a file
//!   snapinator game.sb3 --url           # "open in Snap!" link
//!   snapinator game.sb3 -c snap.yaml    # custom asset server / scale

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapinator::{ConvertConfig, ReadOptions, Snapinator};

#[derive(Parser)]
#[command(name = "snapinator")]
#[command(about = "Convert Scratch projects to Snap! XML")]
struct Args {
    /// Project file (.sb, .sb2, .sb3 or project JSON)
    input: PathBuf,

    /// Write output here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// YAML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Project name (defaults to the input file stem)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Drop scripts and comments
    #[arg(long)]
    no_scripts: bool,

    /// Print the Snap! editor link instead of XML
    #[arg(long)]
    url: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> snapinator::Result<()> {
    let config = match &args.config {
        Some(path) => ConvertConfig::load(path)?,
        None => ConvertConfig::default(),
    };
    let app = Snapinator::new(config);

    let blob = std::fs::read(&args.input)?;
    let name = args.name.clone().unwrap_or_else(|| project_name(&args.input));
    let options = ReadOptions {
        has_scripts: !args.no_scripts,
        ..ReadOptions::default()
    };

    let project = app.read_project(&name, &blob, options).await?;
    let output = if args.url {
        app.snap_open_url(&project)?
    } else {
        app.to_xml_string(&project)?
    };

    match &args.output {
        Some(path) => std::fs::write(path, output)?,
        None => println!("{output}"),
    }
    Ok(())
}

/// File name without any extension, like `game` for `game.sb3`.
fn project_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file,
    }
}
