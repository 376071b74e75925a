//! Nova Strike headless runner
//!
//! Plays one session on autopilot at a fixed 16 ms step and logs the outcome.
//! Rendering and real input belong to the host that embeds the library.
//!
//! # Usage
//!
//! ```bash
//! nova-strike
//! nova-strike --seed 42 --character 4
//! nova-strike --frames 36000 --settings lobby.json
//! ```

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

#[cfg(not(target_arch = "wasm32"))]
use nova_strike::{
    Settings,
    sim::{Character, GamePhase, Session, TickInput, tick},
};

#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: f32 = 16.0;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "nova-strike")]
#[command(
    author,
    version,
    about = "Nova Strike - headless arcade shoot-em-up simulation"
)]
struct Args {
    /// Seed for the session RNG
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Ship archetype (0 Classic, 1 Blade, 2 Heavy, 3 Stealth, 4 Hexagon, 5 Triangle, 6 Star)
    #[arg(
        long,
        short = 'c',
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..7)
    )]
    character: u8,

    /// Maximum number of 16 ms frames to simulate
    #[arg(long, short = 'f', default_value_t = 60 * 60 * 3)]
    frames: u32,

    /// Settings JSON file (falls back to defaults if unreadable)
    #[arg(long, short = 's')]
    settings: Option<PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    let mut session = Session::new(args.seed, settings);
    let character = Character::from_index(args.character);
    session.start_game(character);
    log::info!(
        "Nova Strike (headless) starting: seed {}, {}",
        args.seed,
        character.name()
    );

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let mut frames = 0;
    while frames < args.frames {
        tick(&mut session, &input, FRAME_MS);
        frames += 1;

        match session.phase {
            GamePhase::AbilitySelect => {
                if let Some(ability) = session.select_ability(0) {
                    log::info!("Autopilot picked {}", ability.def().name);
                }
            }
            GamePhase::GameOver => break,
            _ => {}
        }
    }

    log::info!(
        "Finished after {} frames: score {}, wave {}, level {}, lives {}",
        frames,
        session.score,
        session.wave.number,
        session.progression.level,
        session.lifecycle.lives
    );
    match session.snapshot().to_json() {
        Ok(json) => log::info!("Profile: {}", json),
        Err(e) => log::warn!("Could not encode profile: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a web host; there is no standalone wasm binary
}
