//! Totem Run
//!
//! Headless demo: a scripted bot plays one run against the core, then the
//! recorded inputs are replayed to check the run is deterministic.
//!
//! Usage: `totem-run [seed phrase]`

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use totem_run::{
    GameConfig, GameEvent, InputFrame, InputRecording, RunPhase, RunSession, TICK_RATE, VERSION,
    Vec2, VirtualClock,
    core::rng::derive_run_seed,
    game::tick::replay_run,
};

/// Ten minutes of simulated play.
const MAX_TICKS: u32 = TICK_RATE * 600;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Totem Run v{}", VERSION);

    let mut config = GameConfig::from_env()?;
    if let Some(phrase) = std::env::args().nth(1) {
        config.seed = derive_run_seed(&phrase);
        info!("Seed phrase: {:?}", phrase);
    }
    info!("Seed: {}", hex::encode(config.seed.to_be_bytes()));

    demo_run(config);
    Ok(())
}

/// Scripted player that clears rooms in the simplest possible way.
struct Bot {
    position: Vec2,
}

impl Bot {
    /// Units moved per tick.
    const SPEED: f32 = 2.0;

    /// Stand-off distance when attacking.
    const STRIKE_DISTANCE: f32 = 15.0;

    fn next_frame(&mut self, session: &RunSession) -> InputFrame {
        if let Some(portal) = session.rooms().exit_portal() {
            self.position = self.position.move_toward(portal, Self::SPEED);
            return InputFrame::at(self.position).transition();
        }

        let nearest_enemy = session
            .combat()
            .enemies()
            .iter()
            .filter(|e| !e.dead)
            .min_by(|a, b| {
                let da = a.position.distance_squared(self.position);
                let db = b.position.distance_squared(self.position);
                da.total_cmp(&db)
            });
        if let Some(enemy) = nearest_enemy {
            if self.position.distance(enemy.position) > Self::STRIKE_DISTANCE {
                self.position = self.position.move_toward(enemy.position, Self::SPEED);
            }
            return InputFrame::at(self.position).attack();
        }

        let totems = session.totems();
        if totems.is_resolving() {
            return InputFrame::at(self.position);
        }

        let pending = totems.totems().iter().find(|t| t.activated).map(|t| t.element);
        let target = totems
            .totems()
            .iter()
            .filter(|t| !t.activated)
            .find(|t| pending.map_or(true, |element| t.element == element));

        match target {
            Some(totem) if self.position.distance(totem.position) < 1.0 => {
                InputFrame::at(self.position).interact()
            }
            Some(totem) => {
                self.position = self.position.move_toward(totem.position, Self::SPEED);
                InputFrame::at(self.position)
            }
            None => InputFrame::at(self.position),
        }
    }
}

fn demo_run(config: GameConfig) {
    info!("=== Starting Demo Run ===");

    let seed = config.seed;
    let mut session = RunSession::new(config.clone(), seed);
    let mut bot = Bot { position: session.player_position() };
    let mut recording = InputRecording::new(seed);
    let mut clock = VirtualClock::new();
    let mut total_events = 0;

    info!(
        "Run has {} rooms (rest at {}, boss at {})",
        session.rooms().total_rooms(),
        session.rooms().run_config().rest_room_index,
        session.rooms().run_config().boss_room_index
    );

    for tick in 0..MAX_TICKS {
        let frame = bot.next_frame(&session);
        recording.record(tick, frame);

        let result = session.tick(&frame, clock.now());
        clock.step_frame();
        total_events += result.events.len();

        for event in &result.events {
            match event {
                GameEvent::RoomCleared => {
                    info!("Room {} cleared at tick {}", session.rooms().current_index() + 1, tick);
                }
                GameEvent::PlayerDamaged { current, max } if current < max => {
                    info!("Player hit: {}/{}", current, max);
                }
                _ => {}
            }
        }

        if result.room_changed {
            bot.position = session.player_position();
        }
        if result.run_ended {
            info!("Run ended at tick {}", tick);
            break;
        }
    }

    info!("=== Run Results ===");
    match session.phase() {
        RunPhase::Won => info!("Victory!"),
        RunPhase::Dead => info!("Defeated in room {}", session.rooms().current_index() + 1),
        RunPhase::Playing => warn!("Tick limit reached in room {}", session.rooms().current_index() + 1),
    }

    let essence = session.essence();
    info!(
        "Essence: fire {}, water {}, earth {}, air {}",
        essence.fire, essence.water, essence.earth, essence.air
    );
    info!("Total events: {}", total_events);

    let hash = session.fingerprint();
    info!("Final State Hash: {}", hex::encode(hash));

    info!("=== Verifying Determinism ===");
    let (replayed, replay_events) = replay_run(config, &recording);
    let replay_hash = replayed.fingerprint();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash && replay_events.len() == total_events {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }
}
