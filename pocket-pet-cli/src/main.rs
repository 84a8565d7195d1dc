//! Pocket Pet CLI - look after a virtual pet from the terminal.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pocket_pet_core::{
    event, Clock, Config, DecayScheduler, Event, Interaction, Outcome, Pet, PetStore,
    SystemClock, PRESET_APPEARANCES,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Pocket Pet - a single virtual pet whose stats decay over time.
///
/// Every command loads the pet from the data directory, applies the
/// command, and saves it again. Use `run` to keep the pet alive with
/// passive decay until interrupted.
#[derive(Parser, Debug)]
#[command(name = "pocket-pet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the saved pet.
    #[arg(
        short = 'd',
        long = "data-dir",
        default_value = ".pocket-pet",
        env = "POCKET_PET_DATA_DIR"
    )]
    pub data_dir: PathBuf,

    /// Seconds between decay ticks while running.
    #[arg(long = "decay-interval", default_value = "10")]
    pub decay_interval: u64,

    /// Enable debug logging.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new pet, replacing any existing one.
    Create {
        /// The pet's name.
        name: String,

        /// The pet's appearance (see `presets`).
        #[arg(short = 'a', long = "appearance", default_value = "🐱")]
        appearance: String,
    },

    /// Feed the pet.
    Feed,

    /// Play with the pet.
    Play,

    /// Pet the pet.
    Pet,

    /// Show the current pet.
    Status,

    /// Remove the pet.
    Clear,

    /// Replace the pet with a fresh default pet.
    Reinit,

    /// List the preset appearances.
    Presets,

    /// Keep the pet running with passive decay.
    Run {
        /// Stop after this many decay ticks instead of waiting for Ctrl-C.
        #[arg(long = "ticks")]
        ticks: Option<u64>,
    },
}

impl Cli {
    /// Convert CLI arguments to a Config.
    pub fn to_config(&self) -> Config {
        Config::new()
            .data_dir(&self.data_dir)
            .decay_interval_secs(self.decay_interval)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_pet(pet: Option<&Pet>) {
    match pet {
        Some(pet) => println!("{}", pet),
        None => println!("No pet yet! Create one to get started."),
    }
}

fn report(outcome: Outcome, store: &PetStore) {
    match outcome {
        Outcome::Applied => print_pet(store.pet()),
        Outcome::NoPet => println!("No pet yet! Create one to get started."),
    }
}

fn clear_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Applied => "Pet cleared.",
        Outcome::NoPet => "No pet to clear.",
    }
}

async fn run(config: &Config, store: PetStore, max_ticks: Option<u64>) -> anyhow::Result<()> {
    let clock = store.clock();
    let (tx, mut events) = event::channel();
    let store = store.with_events(tx).into_shared();

    let Some(handle) = DecayScheduler::from_config(config)?
        .start(store.clone(), clock)
        .await
    else {
        bail!("no pet to run; create one first");
    };

    print_pet(store.lock().await.pet());
    let mut decays = 0u64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                println!("{}", event);
                if matches!(event, Event::Decayed { .. }) {
                    decays += 1;
                    if max_ticks.is_some_and(|max| decays >= max) {
                        break;
                    }
                }
            }
        }
    }

    handle.stop().await;
    print_pet(store.lock().await.pet());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.to_config();
    config.validate()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut store = PetStore::load_with_config(&config, Arc::new(config.file_storage()), clock);

    match cli.command {
        Command::Create { name, appearance } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("pet name must not be empty");
            }
            store
                .create_pet(name, appearance)
                .context("pet created but could not be saved")?;
            print_pet(store.pet());
        }
        Command::Feed => report(store.interact(Interaction::Feed)?, &store),
        Command::Play => report(store.interact(Interaction::Play)?, &store),
        Command::Pet => report(store.interact(Interaction::Affection)?, &store),
        Command::Status => print_pet(store.pet()),
        Command::Clear => println!("{}", clear_message(store.clear()?)),
        Command::Reinit => {
            store.reinitialize()?;
            print_pet(store.pet());
        }
        Command::Presets => println!("{}", PRESET_APPEARANCES.join(" ")),
        Command::Run { ticks } => run(&config, store, ticks).await?,
    }

    Ok(())
}
