// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use sfxpad::samples::{PlayOptions, SampleId, SamplePlayer, SoundRef};
use sfxpad::session::SessionStore;
use sfxpad::{assets, audio, config};
use tracing::info;

/// How often `play` checks whether its voices have finished.
const PLAY_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A sixteen-pad sound effect player."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available audio output devices.
    Devices {},
    /// Loads the sample bank and plays the given sounds, waiting for them to finish.
    Play {
        /// The path to the player configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stereo position from -1.0 (left) to 1.0 (right).
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        pan: f32,
        /// Sounds to play: sample numbers (1-16) or sample file names like hit-07.mp3.
        #[arg(required = true)]
        sounds: Vec<String>,
    },
    /// Serves the static asset directory.
    #[cfg(feature = "server")]
    Serve {
        /// The path to the player configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Port to listen on. Overrides the PORT environment variable.
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory to serve. Defaults to the configured server root.
        root: Option<PathBuf>,
    },
    /// Prints the session tag, creating it if necessary.
    Session {
        /// The path to the player configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Sample numbers are accepted as plain numbers; anything else is treated as a file name.
fn parse_sound(arg: &str) -> SoundRef {
    match arg.parse::<usize>().ok().and_then(SampleId::from_number) {
        Some(id) => SoundRef::Id(id),
        None => SoundRef::Name(arg.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Play {
            config,
            pan,
            sounds,
        } => {
            let config = config::load(config.as_deref())?;
            let session = SessionStore::new(config.session_file()).session_tag()?;
            let device = audio::get_device(config.audio())?;
            let assets = assets::from_config(&config)?;

            let player = SamplePlayer::new(assets, device, session);
            let bank = player.load().await;
            info!(loaded = bank.loaded_count(), "Ready");

            for sound in sounds.iter().map(|sound| parse_sound(sound)) {
                if player.play(sound.clone(), PlayOptions::at(pan)).await.is_none() {
                    println!("Nothing played for {:?}.", sound);
                }
            }

            tokio::select! {
                _ = async {
                    while player.active_voices() > 0 {
                        tokio::time::sleep(PLAY_POLL_INTERVAL).await;
                    }
                } => {}
                _ = tokio::signal::ctrl_c() => player.stop_all(),
            }
        }
        #[cfg(feature = "server")]
        Commands::Serve { config, port, root } => {
            let config = config::load(config.as_deref())?;
            let root = root.unwrap_or_else(|| config.server().root().to_path_buf());
            let port = sfxpad::server::resolve_port(port, config.server())?;
            sfxpad::server::serve(root, port).await?;
        }
        Commands::Session { config } => {
            let config = config::load(config.as_deref())?;
            let session = SessionStore::new(config.session_file()).session_tag()?;
            println!("{}", session);
        }
    }

    Ok(())
}
