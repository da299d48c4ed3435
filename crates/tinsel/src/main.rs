use choreo::Layout;
use clap::Parser;
use relm4::prelude::*;
use std::path::PathBuf;
use tinsel::config;
use tinsel::gui::app::{AppInit, AppModel};
use tinsel::gui::stage::ViewState;
use tinsel::sys::runtime;

#[derive(Parser, Debug)]
#[command(name = "tinsel", version, about = "Photo tree viewer", long_about = None)]
struct Cli {
    /// Write the default config file (if missing), print its path and exit.
    #[arg(long)]
    write_config: bool,
    /// Read this config file instead of the one in the user config directory.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Seed for per-card speeds and sway phases.
    #[arg(long)]
    seed: Option<u64>,
    /// Start in this layout (formed or chaos).
    #[arg(long)]
    layout: Option<Layout>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.write_config {
        let path = config::write_default_config()?;
        println!("{}", path.display());
        return Ok(());
    }

    let config_path = match cli.config {
        Some(path) => Some(
            config::resolve_config_path(path)
                .map_err(|e| anyhow::anyhow!("Invalid config path: {}", e))?,
        ),
        None => config::get_config_path()
            .map_err(|e| log::warn!("Config file disabled: {}", e))
            .ok(),
    };
    let mut config = config::load_or_default(config_path.as_deref());
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let layout = cli.layout.unwrap_or(config.initial_layout);

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    let handle = runtime::start_background_services(tx, config_path.clone())
        .map_err(|e| anyhow::anyhow!("Failed to start background runtime: {}", e))?;

    let state = ViewState::new(&config, layout, handle);
    log::info!(
        "Showing {} photos, starting {}",
        state.stage().scene().len(),
        layout
    );

    let app = RelmApp::new("org.tinsel.viewer");
    app.run::<AppModel>(AppInit {
        state,
        window: config.window.clone(),
        config_path,
        rx,
    });
    Ok(())
}
