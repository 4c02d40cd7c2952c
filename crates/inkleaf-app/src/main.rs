//! Replay tool entry point (native).
//!
//! Usage:
//!   inkleaf --script session.json --out pages/
//!   inkleaf --script session.json --config engine.json --data-url

#[cfg(feature = "native")]
mod cli {
    use clap::Parser;
    use inkleaf_app::{Engine, ReplayError, Script, run_script};
    use inkleaf_core::{EngineConfig, FileSink};
    use inkleaf_render::ImageCrateDecoder;
    use std::path::{Path, PathBuf};

    /// Replay a recorded annotation session and write the page snapshots.
    #[derive(Parser, Debug)]
    #[command(name = "inkleaf", about = "Headless Inkleaf session replay")]
    pub struct CliArgs {
        /// JSON script of pointer events and commands.
        #[arg(short, long, value_name = "SCRIPT.json")]
        pub script: PathBuf,

        /// Engine configuration (JSON). Overrides the script's own config.
        #[arg(short, long, value_name = "CONFIG.json")]
        pub config: Option<PathBuf>,

        /// Directory for `page-<n>.png` snapshots.
        /// Defaults to the platform data directory.
        #[arg(short, long, value_name = "DIR")]
        pub out: Option<PathBuf>,

        /// Print the final page as a data URL on stdout.
        #[arg(long)]
        pub data_url: bool,
    }

    pub async fn run(args: CliArgs) -> Result<(), ReplayError> {
        let script = Script::from_path(&args.script)?;
        let config = match &args.config {
            Some(path) => EngineConfig::from_path(path)
                .map_err(|e| ReplayError::Engine(e.into()))?,
            None => script.config.clone().unwrap_or_default(),
        };
        let sink = match args.out {
            Some(dir) => FileSink::new(dir),
            None => FileSink::default_location(),
        }
        .map_err(|e| ReplayError::Engine(e.into()))?;
        log::info!("Writing snapshots to {}", sink.base_path().display());

        let mut engine = Engine::new(config, Box::new(sink))?;
        let base_dir = args.script.parent().unwrap_or(Path::new("."));
        let summary = run_script(&mut engine, &script, &ImageCrateDecoder::new(), base_dir).await;
        log::info!(
            "Replayed {} steps on {} page(s), {} failed load(s)",
            summary.steps,
            engine.page_count(),
            summary.failed_loads
        );

        engine.save();
        if args.data_url {
            let snapshot = engine.snapshot().map_err(|e| ReplayError::Engine(e.into()))?;
            println!("{}", snapshot.to_data_url());
        }
        Ok(())
    }
}

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    let args = cli::CliArgs::parse();
    log::info!("Starting Inkleaf replay");

    match pollster::block_on(cli::run(args)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
