use std::fs::File;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use livepad::frontend::{Frontend, Runtime, TerminalFrontend};
use livepad::services::{FsStore, LogTelemetry, Telemetry};
use livepad::widget::BundledAssets;
use livepad::{Cli, Config, Workspace};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;

    // The terminal belongs to the editor, so logs only go somewhere when a
    // file is given.
    let mut logger = env_logger::Builder::from_default_env();
    match &config.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            logger.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            logger.filter_level(log::LevelFilter::Off);
        }
    }
    logger.init();

    let store = FsStore::new(&config.store_dir);
    log::info!("storing pads under {}", store.root().display());
    let runtime = Runtime::new(Arc::new(store), Arc::new(BundledAssets::new()));

    let telemetry: Rc<dyn Telemetry> = Rc::new(LogTelemetry);
    let workspace = Workspace::new(Rc::new(config), telemetry);

    let mut frontend = TerminalFrontend::new();
    frontend.init()?;
    frontend.run(workspace, runtime)?;

    Ok(())
}
