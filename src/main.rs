use anyhow::{Context, Result};
use clap::Parser;
use ledanim::config::Settings;
use ledanim::engine::{self, EngineCommand, SceneManager};
use ledanim::osc;
use ledanim::output::LedOutput;
use ledanim::store;
use log::info;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

/// Real-time LED animation playback engine with OSC control.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the settings file.
    #[arg(short, long, default_value = "config/settings.json")]
    config: PathBuf,
    /// Scene JSON to load at startup (overrides the settings file).
    #[arg(long)]
    scenes: Option<String>,
    /// Dissolve pattern JSON to load at startup (overrides the settings file).
    #[arg(long)]
    dissolves: Option<String>,
    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Control messages queue up here between frames; the input worker blocks
/// once the queue is full rather than dropping commands.
const COMMAND_QUEUE_DEPTH: usize = 64;

fn main() -> Result<()> {
    let args = Args::parse();
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", if args.verbose { "debug" } else { "info" });
    }
    pretty_env_logger::init();

    let settings = Settings::load(&args.config)?;

    let mut manager = SceneManager::new(settings.master_brightness, settings.speed_percent);
    if let Some(path) = args.scenes.as_ref().or(settings.scene_file.as_ref()) {
        manager.load_show(store::load_scene_set(path)?);
    }
    if let Some(path) = args.dissolves.as_ref().or(settings.dissolve_file.as_ref()) {
        manager.load_dissolves(store::load_dissolve_set(path)?);
    }

    let output = LedOutput::new(
        settings.osc.output_address.clone(),
        settings.led_destinations.clone(),
    )
    .context("binding LED output socket")?;

    let input = UdpSocket::bind((settings.osc.input_host.as_str(), settings.osc.input_port))
        .with_context(|| {
            format!(
                "binding OSC input socket {}:{}",
                settings.osc.input_host, settings.osc.input_port
            )
        })?;
    info!(
        "OSC control channel listening on {}:{}",
        settings.osc.input_host, settings.osc.input_port
    );

    let (tx, rx) = mpsc::sync_channel::<EngineCommand>(COMMAND_QUEUE_DEPTH);
    let _input_worker = thread::Builder::new()
        .name("osc-input".to_string())
        .spawn(move || osc::run_input_worker(input, tx))
        .context("spawning OSC input worker")?;

    engine::run_engine(rx, &settings, manager, output);
    Ok(())
}
