use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use golos::audio::capture::{list_devices, CpalDeviceFactory};
use golos::audio::{AudioSourceFactory, WavFileFactory};
use golos::config::Config;
use golos::session::{Event, EventPoller, SessionController, StatusStyle};
use golos::stt::vosk::VoskEngine;
use golos::stt::{ModelHandle, ModelStore};
use owo_colors::OwoColorize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "golos", version, about = "Offline speech recognition over Vosk")]
struct Cli {
    /// Path to a config file (default: ~/.config/golos/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to a Vosk model directory
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Audio input device name
    #[arg(long, global = true)]
    device: Option<String>,

    /// Recognize a WAV file instead of the microphone
    #[arg(long)]
    wav: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available audio input devices
    Devices,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Devices) => list_audio_devices(),
        None => {
            let config = load_config(&cli)?;
            run_session(cli, config)
        }
    }
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/golos/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(path) = cli.config.as_deref() {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())
    };

    Ok(config.with_env_overrides())
}

fn list_audio_devices() -> Result<()> {
    let devices = list_devices()?;

    if devices.is_empty() {
        bail!("No audio input devices found");
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

/// Interactive session: `start`/`stop` toggle recording, `quit` exits.
fn run_session(cli: Cli, config: Config) -> Result<()> {
    let model_path = cli
        .model
        .or_else(|| config.model.path.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No model configured. Pass --model or set model.path in the config.")
        })?;

    let mut models = ModelStore::new();
    let handle = ModelHandle::new(model_path);
    let model_name = handle.name().to_string();
    models.install(handle.clone());

    println!("Loading model '{}'...", model_name);
    let engine = Arc::new(VoskEngine::new(&handle)?);

    let device = cli.device.as_deref().or(config.audio.device.as_deref());
    let devices: Arc<dyn AudioSourceFactory> = match cli.wav {
        Some(path) => Arc::new(WavFileFactory::new(path)),
        None => Arc::new(CpalDeviceFactory::new(device)),
    };

    let (mut controller, poller) = SessionController::new(devices, engine, config.session_config());

    let printer_done = Arc::new(AtomicBool::new(false));
    let printer = spawn_event_printer(poller, Arc::clone(&printer_done));

    println!("Commands: start, stop, quit");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "start" => {
                let _ = controller.start(&models);
            }
            "stop" => controller.stop(),
            "quit" | "q" | "exit" => break,
            "" => {}
            other => eprintln!("Unknown command: {}", other),
        }
    }

    controller.shutdown();
    printer_done.store(true, Ordering::SeqCst);
    if printer.join().is_err() {
        eprintln!("golos: event printer panicked");
    }

    Ok(())
}

/// Drains session events on a timer tick and renders them to the terminal.
fn spawn_event_printer(
    poller: EventPoller,
    done: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        while !done.load(Ordering::SeqCst) {
            for event in poller.poll() {
                render_event(&event);
            }
            std::thread::sleep(Duration::from_millis(100));
        }
        // Final drain so nothing emitted during shutdown is lost
        for event in poller.poll() {
            render_event(&event);
        }
    })
}

fn render_event(event: &Event) {
    match event {
        Event::Log { message } => println!("{}", message.dimmed()),
        Event::StatusChanged { text, style } => match style {
            StatusStyle::Active => println!("[{}]", text.green()),
            StatusStyle::Success => println!("[{}]", text.green()),
            StatusStyle::Error => println!("[{}]", text.red()),
            StatusStyle::Neutral => println!("[{}]", text),
        },
        Event::TranscriptAppended { text } => println!("{}", text.bold()),
        Event::ErrorRaised { title, message } => {
            eprintln!("{}", format!("{}: {}", title, message).red());
        }
        Event::InfoRaised { title, message } => {
            println!("{}: {}", title.bold(), message);
        }
        // Button state is a GUI affordance; the terminal has no buttons
        Event::ButtonsUpdated { .. } => {}
    }
    let _ = std::io::stdout().flush();
}
