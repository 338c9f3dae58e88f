use clap::{Parser, Subcommand};
use log::{error, info};
use sceneview::app::{print_scene_info, run_cli, run_grayscale, run_gui};
use sceneview::io::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

/// Scene-graph viewer backed by a CPU rasterizer.
#[derive(Parser, Debug)]
#[command(name = "sceneview", version, about)]
struct Cli {
    /// Viewer configuration (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a scene in an interactive window
    View {
        /// Scene file (.obj or .toml)
        scene: PathBuf,
    },
    /// Render one frame of a scene to an image file
    Render {
        scene: PathBuf,
        /// Output image; defaults to `render.output` from the config
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print scene statistics and the node tree
    Info { scene: PathBuf },
    /// Convert an image to grayscale
    Gray { input: PathBuf, output: PathBuf },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("minifb", log::LevelFilter::Warn)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            match Config::load(path) {
                Ok(config) => config,
                Err(e) => {
                    error!("{e}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => Config::default(),
    };

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Command::View { scene } => run_gui(&scene, &config),
        Command::Render { scene, output } => {
            let output = output.unwrap_or_else(|| config.render.output.clone());
            run_cli(&scene, &output, &config).map_err(Into::into)
        }
        Command::Info { scene } => print_scene_info(&scene, &config).map_err(Into::into),
        Command::Gray { input, output } => run_grayscale(&input, &output).map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
