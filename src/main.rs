//! Headless runner: plays one level with a simple autopilot and logs what
//! happens

use std::path::PathBuf;

use anyhow::Context;
use burrow::core::{EnemyTuning, PlayerTuning};
use burrow::prelude::*;
use clap::Parser;

/// Run a level without a window
#[derive(Debug, Parser)]
#[command(name = "burrow", version, about)]
struct Args {
    /// Seed for level generation and every random decision
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Difficulty of the generated level
    #[arg(long, default_value_t = 1)]
    difficulty: u32,

    /// Level file to play instead of a generated one (.json or .ron)
    #[arg(long)]
    level: Option<PathBuf>,

    /// Simulation config (.ron)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the player's starting lives
    #[arg(long)]
    lives: Option<u32>,

    /// Override the pumps needed to pop an enemy
    #[arg(long)]
    pumps_to_kill: Option<u32>,

    /// Maximum number of ticks to run
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Write the played level as JSON
    #[arg(long)]
    write_level: Option<PathBuf>,
}

/// Walk towards the nearest enemy, shoot when lined up, pump when hooked
fn autopilot(sim: &Simulation) -> PlayerInput {
    let pump = sim.pump();
    if pump.attached().is_some() {
        return if sim.clock().tick() % 2 == 0 {
            PlayerInput::pump()
        } else {
            PlayerInput::idle()
        };
    }
    if pump.is_active() {
        return PlayerInput::idle();
    }

    let player = sim.player();
    let here = player.block();
    let target = sim
        .world()
        .query::<&Enemy>()
        .iter()
        .map(|(_, enemy)| enemy.block())
        .min_by_key(|b| (b.x - here.x).abs() + (b.y - here.y).abs());
    let Some(target) = target else {
        return PlayerInput::idle();
    };

    let delta = target - here;
    let range = sim.config().pump.range as i32;
    let lined_up = (delta.x == 0 && delta.y.abs() <= range) || (delta.y == 0 && delta.x.abs() <= range);
    let toward = if delta.x != 0 {
        IVec2::new(delta.x.signum(), 0)
    } else {
        IVec2::new(0, delta.y.signum())
    };

    match Direction::from_offset(toward) {
        Some(direction) if lined_up && direction == player.facing() && !player.is_moving() => {
            PlayerInput::pump()
        }
        Some(direction) => PlayerInput::moving(direction),
        None => PlayerInput::pump(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load_ron(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    }
    .with_seed(args.seed);
    if let Some(lives) = args.lives {
        let player = PlayerTuning {
            lives,
            ..config.player.clone()
        };
        config = config.with_player(player);
    }
    if let Some(pumps_to_kill) = args.pumps_to_kill {
        let enemy = EnemyTuning {
            pumps_to_kill: pumps_to_kill.max(1),
            ..config.enemy.clone()
        };
        config = config.with_enemy(enemy);
    }

    let level = match &args.level {
        Some(path) => LevelData::load_or_fallback(path),
        None => generate_endless(args.difficulty, args.seed),
    };

    if let Some(path) = &args.write_level {
        level
            .save_json(path)
            .with_context(|| format!("writing level {}", path.display()))?;
        log::info!("Level written to {}", path.display());
    }

    let mut sim = Simulation::new(&level, config);
    let mut points = Vec::new();
    for _ in 0..args.ticks {
        let input = autopilot(&sim);
        let running = sim.tick(&input);
        for event in sim.events().iter() {
            log::debug!("tick {}: {event:?}", sim.clock().tick());
            if let Some(kind) = event.score_kind() {
                points.push(kind);
            }
        }
        if !running {
            break;
        }
    }

    let dug = points.iter().filter(|k| **k == ScoreKind::Dig).count();
    let defeated = points.iter().filter(|k| **k == ScoreKind::EnemyDefeat).count();
    match sim.outcome() {
        Some(outcome) => log::info!(
            "{outcome:?} after {} ticks ({:.1} s)",
            sim.clock().tick(),
            sim.clock().elapsed()
        ),
        None => log::info!("No outcome after {} ticks", sim.clock().tick()),
    }
    log::info!(
        "Blocks dug: {dug}, enemies defeated: {defeated}, lives left: {}",
        sim.player().lives()
    );

    Ok(())
}
