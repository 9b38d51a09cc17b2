use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use timed_audio::audio::{CpalInput, RodioOutput};
use timed_audio::{Capture, Config, FileFormat, Playback, Preset, Strategy, Worker, WorkerError};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (default: ~/.config/timed-audio/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding recordings. Overrides the config file.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record from the default input device.
    Record {
        /// File name such as `take.wav`; the next free `Record_<n>` otherwise.
        #[arg(long)]
        name: Option<String>,

        /// Stop after this many timer units (0 = until Ctrl+C).
        #[arg(long, default_value_t = 0)]
        duration: u64,

        #[arg(long, value_enum)]
        format: Option<FileFormat>,

        #[arg(long, value_enum)]
        preset: Option<Preset>,
    },

    /// Play an existing audio file on the default output device.
    Play {
        path: PathBuf,

        /// Stop after this many timer units (0 = until the file ends or Ctrl+C).
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },

    /// Delete the output directory and every recording in it.
    Erase,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Command::Record { format, preset, .. } = &args.command {
        if let Some(format) = format {
            config.default_format = *format;
        }
        if let Some(preset) = preset {
            config.preset = *preset;
            config.settings = None;
        }
    }
    config.validate()?;

    // Audio stream handles are !Send, so workers live on a LocalSet
    let local = tokio::task::LocalSet::new();
    local.run_until(run(args.command, config)).await
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Record { name, duration, .. } => {
            let capture = Capture::new(CpalInput::new(), config.capture_options());
            let mut recorder = Worker::new(capture, duration, config.tick());
            recorder.strategy_mut().set_file_name(name);

            recorder.start().await.context("Failed to start recording")?;
            tracing::info!("Recording... press Ctrl+C to stop");

            if let Some(file) = drive(&mut recorder).await? {
                tracing::info!("Recording saved to: {}", file.path.display());
            }
        }

        Command::Play { path, duration } => {
            let playback = Playback::new(RodioOutput::new(), path);
            let mut player = Worker::new(playback, duration, config.tick());
            player.start().await.context("Failed to start playback")?;
            drive(&mut player).await?;
        }

        Command::Erase => {
            let capture = Capture::new(CpalInput::new(), config.capture_options());
            Worker::new(capture, 0, config.tick())
                .erase()
                .context("Failed to erase recordings")?;
        }
    }

    Ok(())
}

/// Wait for the timer, the device or Ctrl+C, whichever ends the session first.
async fn drive<S: Strategy>(worker: &mut Worker<S>) -> Result<Option<S::Output>> {
    if worker.timer().is_unbounded() {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl+C")?;
                tracing::info!("Received Ctrl+C, stopping");
            }
            _ = device_finished(worker) => {
                tracing::debug!("Device finished on its own");
            }
        }
    } else {
        tokio::select! {
            finished = worker.run() => return Ok(finished?),
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl+C")?;
                tracing::info!("Received Ctrl+C, stopping");
            }
        }
    }

    match worker.stop().await {
        Ok(output) => Ok(Some(output)),
        Err(WorkerError::AlreadyStopped(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn device_finished<S: Strategy>(worker: &Worker<S>) {
    let unit = worker.timer().unit();
    while worker.strategy().is_engaged() {
        tokio::time::sleep(unit).await;
    }
}
