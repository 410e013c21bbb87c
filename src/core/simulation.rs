//! The simulation context
//!
//! Owns the grid, the actor tables, the player, the pump, the event queue,
//! the RNG and the clock, and advances everything once per tick in a fixed
//! order: player, pump, enemies, fire, rocks, reaping.

use glam::IVec2;
use hecs::Entity;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;

use crate::actors::{
    DamageOutcome, Enemy, EnemyContext, EnemyState, Player, PlayerView, Pump, PumpContext, Rock,
    RockStep,
};
use crate::core::config::SimConfig;
use crate::core::events::{DefeatCause, EventQueue, GameEvent};
use crate::core::time::Clock;
use crate::ecs::{FireHazard, Fruit, World};
use crate::grid::Grid;
use crate::input::{InputRecording, PlayerInput};
use crate::level::{EnemyType, LevelData, generate_endless};

/// How a level ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every enemy was defeated
    Won,
    /// The player ran out of lives
    Lost,
}

/// One running level
pub struct Simulation {
    config: SimConfig,
    level_id: String,
    grid: Grid,
    world: World,
    player: Player,
    pump: Pump,
    events: EventQueue,
    rng: ChaCha8Rng,
    clock: Clock,
    outcome: Option<Outcome>,
}

impl Simulation {
    /// Build a simulation from a level description
    #[must_use]
    pub fn new(level: &LevelData, config: SimConfig) -> Self {
        let grid = Grid::from_level(level, config.grid.block_size);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut world = World::new();

        let start = grid.find_player_start();
        let player = Player::new(start, grid.block_to_world(start), config.player.lives);

        for block in grid.rock_spawns() {
            world.spawn((Rock::new(block, grid.block_to_world(block)),));
        }
        for block in grid.fruit_spawns() {
            world.spawn((Fruit { block },));
        }

        let max_wake = config.enemy.max_wake_delay;
        for (enemy_type, block) in grid.enemy_spawns(level) {
            let wake_delay = if max_wake > 0.0 {
                rng.gen_range(0.0..max_wake)
            } else {
                0.0
            };
            let enemy = Enemy::new(
                enemy_type,
                block,
                grid.block_to_world(block),
                wake_delay,
                &config.enemy,
            );
            world.spawn((enemy,));
        }

        log::info!(
            "Level '{}' loaded: {} enemies, {} rocks, {} fruit, player at ({}, {})",
            level.level_id,
            world.count::<Enemy>(),
            world.count::<Rock>(),
            world.count::<Fruit>(),
            start.x,
            start.y
        );

        Self {
            clock: Clock::new(config.tick_rate),
            level_id: level.level_id.clone(),
            config,
            grid,
            world,
            player,
            pump: Pump::new(),
            events: EventQueue::new(),
            rng,
            outcome: None,
        }
    }

    /// Build a simulation on a freshly generated endless level, seeded from
    /// the config
    #[must_use]
    pub fn generated(difficulty: u32, config: SimConfig) -> Self {
        let level = generate_endless(difficulty, config.seed);
        Self::new(&level, config)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Id of the running level
    #[must_use]
    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    /// The dig grid
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Actor tables
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The player
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The pump
    #[must_use]
    pub fn pump(&self) -> &Pump {
        &self.pump
    }

    /// Events published by the last tick
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Mutable access for draining events
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Simulation clock
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Set once the level is won or lost
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether ticks still advance the level
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.outcome.is_none()
    }

    /// Enemies still in play
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.world.count::<Enemy>()
    }

    /// Rocks still in play
    #[must_use]
    pub fn rock_count(&self) -> usize {
        self.world.count::<Rock>()
    }

    /// Blocks currently holding a rock
    #[must_use]
    pub fn rock_blocks(&self) -> FxHashSet<IVec2> {
        self.world
            .query::<&Rock>()
            .iter()
            .map(|(_, rock)| rock.block())
            .collect()
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance one tick. Returns `false` once the level has an outcome; the
    /// clock then stays put but events are still rotated.
    pub fn tick(&mut self, input: &PlayerInput) -> bool {
        if self.outcome.is_some() {
            self.events.swap();
            return false;
        }

        self.clock.advance();
        let dt = self.clock.delta();
        let rocks = self.rock_blocks();

        self.update_player(input, &rocks, dt);
        self.update_pump(input, &rocks, dt);
        self.update_enemies(&rocks, dt);
        self.check_enemy_contact();
        self.update_fire(dt);
        self.update_rocks(dt);
        self.reap_enemies();

        self.events.swap();
        self.outcome.is_none()
    }

    /// Feed a whole recording, collecting every published event in order
    pub fn run_recording(&mut self, recording: &InputRecording) -> Vec<GameEvent> {
        let mut published = Vec::new();
        for input in recording.iter() {
            self.tick(&input);
            published.extend(self.events.iter().cloned());
        }
        published
    }

    fn update_player(&mut self, input: &PlayerInput, rocks: &FxHashSet<IVec2>, dt: f32) {
        let tuning = &self.config.player;
        self.player
            .handle_input(input, self.pump.is_active(), &self.grid, rocks, tuning);
        self.player.advance(dt, &self.grid, rocks, tuning);

        for block in self.player.dig(&mut self.grid, tuning) {
            self.events.push(GameEvent::BlockDug { block });
        }

        let block = self.player.block();
        let picked = self.world.handles_where::<Fruit>(|fruit| fruit.block == block);
        for _ in 0..self.world.despawn_all(picked) {
            log::debug!("Fruit collected at ({}, {})", block.x, block.y);
            self.events.push(GameEvent::FruitCollected { block });
        }
    }

    fn update_pump(&mut self, input: &PlayerInput, rocks: &FxHashSet<IVec2>, dt: f32) {
        if !self.player.is_alive() {
            return;
        }
        let ctx = PumpContext {
            grid: &self.grid,
            rocks,
            origin: self.player.position(),
            facing: self.player.facing(),
            player_moving: self.player.is_moving(),
            tuning: &self.config.pump,
            enemy: &self.config.enemy,
            dt,
        };
        self.pump.update(input, &ctx, &mut self.world);
    }

    fn update_enemies(&mut self, rocks: &FxHashSet<IVec2>, dt: f32) {
        let player = self.player.is_alive().then(|| PlayerView {
            block: self.player.block(),
            position: self.player.position(),
        });
        let ctx = EnemyContext {
            grid: &self.grid,
            rocks,
            player,
            tuning: &self.config.enemy,
            fygar: &self.config.fygar,
            dt,
        };

        let mut breaths = Vec::new();
        for entity in self.world.handles::<Enemy>() {
            let Ok(mut enemy) = self.world.get_mut::<Enemy>(entity) else {
                continue;
            };
            if let Some(blocks) = enemy.update(&ctx, &mut self.rng) {
                breaths.push((entity, blocks));
            }
        }

        for (source, blocks) in breaths {
            log::debug!("Fire from {source:?} over {} blocks", blocks.len());
            self.world.spawn((FireHazard {
                source,
                blocks,
                remaining: self.config.fygar.fire_duration,
            },));
        }
    }

    fn check_enemy_contact(&mut self) {
        if !self.player.is_alive() {
            return;
        }
        let body = self.player.collider(self.config.player.collision_half_extent);
        let half = self.config.enemy.collision_half_extent;
        let touched = self
            .world
            .query::<&Enemy>()
            .iter()
            .any(|(_, enemy)| enemy.is_harmful() && enemy.collider(half).overlaps(&body));
        if touched {
            self.damage_player();
        }
    }

    fn update_fire(&mut self, dt: f32) {
        let here = self.grid.world_to_block(self.player.position());
        let mut burned = false;
        let mut expired = Vec::new();
        for (entity, fire) in self.world.query_mut::<&mut FireHazard>() {
            fire.remaining -= dt;
            if fire.remaining <= 0.0 {
                expired.push(entity);
            } else if fire.covers(here) {
                burned = true;
            }
        }
        self.world.despawn_all(expired);
        if burned && self.player.is_alive() {
            self.damage_player();
        }
    }

    fn update_rocks(&mut self, dt: f32) {
        let player_block = self.player.is_alive().then(|| self.player.block());
        let rock_half = self.config.rock.collision_half_extent;
        let enemy_half = self.config.enemy.collision_half_extent;

        for entity in self.world.handles::<Rock>() {
            let (step, crush_box) = {
                let Ok(mut rock) = self.world.get_mut::<Rock>(entity) else {
                    continue;
                };
                let step = rock.update(&self.grid, player_block, &self.config.rock, dt, &mut self.rng);
                (step, rock.is_dangerous().then(|| rock.collider(rock_half)))
            };
            if step == RockStep::Remove {
                if self.world.despawn(entity).is_err() {
                    log::warn!("Crumbled rock {entity:?} was already gone");
                }
                continue;
            }
            let Some(crush_box) = crush_box else {
                continue;
            };

            let victims = self.world.handles_where::<Enemy>(|enemy| {
                enemy.state() != EnemyState::Dying
                    && enemy.collider(enemy_half).overlaps(&crush_box)
            });
            for victim in victims {
                if let Ok(mut enemy) = self.world.get_mut::<Enemy>(victim) {
                    enemy.die(DefeatCause::Crushed);
                }
                log::debug!("Rock {entity:?} crushed {victim:?}");
                self.events.push(GameEvent::RockCrush {
                    rock: entity,
                    enemy: victim,
                });
            }

            let body = self.player.collider(self.config.player.collision_half_extent);
            if self.player.is_alive() && crush_box.overlaps(&body) {
                self.damage_player();
            }
        }
    }

    fn reap_enemies(&mut self) {
        let mut dead: Vec<(Entity, EnemyType, DefeatCause)> = self
            .world
            .query::<&Enemy>()
            .iter()
            .filter(|(_, enemy)| enemy.state() == EnemyState::Dying)
            .map(|(entity, enemy)| {
                let cause = enemy.defeat_cause().unwrap_or(DefeatCause::Pumped);
                (entity, enemy.enemy_type(), cause)
            })
            .collect();
        if dead.is_empty() {
            return;
        }
        dead.sort_by_key(|(entity, _, _)| entity.id());

        for (entity, kind, cause) in dead {
            if self.world.despawn(entity).is_err() {
                log::warn!("Defeated {kind:?} {entity:?} was already gone");
                continue;
            }
            log::debug!("{kind:?} {entity:?} defeated ({cause:?})");
            self.events.push(GameEvent::EnemyDefeated {
                enemy: entity,
                kind,
                cause,
            });
        }

        if self.outcome.is_none() && self.world.count::<Enemy>() == 0 {
            log::info!(
                "Level '{}' complete after {} ticks",
                self.level_id,
                self.clock.tick()
            );
            self.events.push(GameEvent::LevelComplete);
            self.outcome = Some(Outcome::Won);
        }
    }

    fn damage_player(&mut self) {
        match self.player.take_damage(&self.config.player) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Hurt(lives) => self.events.push(GameEvent::PlayerDamaged { lives }),
            DamageOutcome::Died => {
                self.pump.force_retract(&mut self.world, &self.config.enemy);
                self.events.push(GameEvent::PlayerDied);
                if self.outcome.is_none() {
                    log::info!(
                        "Level '{}' lost after {} ticks",
                        self.level_id,
                        self.clock.tick()
                    );
                    self.outcome = Some(Outcome::Lost);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Direction;
    use crate::level::{EnemySpawnData, LevelPoint};

    fn level(map: &[&str], enemies: &[(&str, i32, i32)]) -> LevelData {
        LevelData {
            level_id: "test".to_string(),
            map: map.iter().map(|r| (*r).to_string()).collect(),
            enemies: enemies
                .iter()
                .map(|(tag, x, y)| EnemySpawnData {
                    enemy_type: (*tag).to_string(),
                    position: LevelPoint::new(*x, *y),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn quiet_config() -> SimConfig {
        let mut config = SimConfig::default().with_seed(5);
        config.enemy.ghost_chance = 0.0;
        config.enemy.max_wake_delay = 0.0;
        config
    }

    #[test]
    fn test_spawns_actors_from_level() {
        let lvl = level(&["#####", "#*RB#", "#000#", "#####"], &[("P", 3, 2)]);
        let sim = Simulation::new(&lvl, quiet_config());

        assert_eq!(sim.enemy_count(), 1);
        assert_eq!(sim.rock_count(), 1);
        assert_eq!(sim.world().count::<Fruit>(), 1);
        assert_eq!(sim.player().block(), IVec2::new(1, 2));
        assert!(sim.is_running());
    }

    #[test]
    fn test_fruit_pickup_publishes_event() {
        let mut lvl = level(&["#####", "#0B0#", "#####"], &[]);
        lvl.player_start_position = LevelPoint::new(1, 1);
        let mut sim = Simulation::new(&lvl, quiet_config());

        let mut collected = false;
        for _ in 0..30 {
            sim.tick(&PlayerInput::moving(Direction::Right));
            collected |= sim
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::FruitCollected { .. }));
        }
        assert!(collected);
        assert_eq!(sim.world().count::<Fruit>(), 0);
    }

    #[test]
    fn test_digging_publishes_block_dug() {
        let mut lvl = level(&["#####", "#011#", "#####"], &[]);
        lvl.player_start_position = LevelPoint::new(1, 1);
        let mut sim = Simulation::new(&lvl, quiet_config());

        let mut dug = Vec::new();
        for _ in 0..40 {
            sim.tick(&PlayerInput::moving(Direction::Right));
            dug.extend(sim.events().iter().filter_map(|e| match e {
                GameEvent::BlockDug { block } => Some(*block),
                _ => None,
            }));
        }
        assert_eq!(dug, vec![IVec2::new(2, 1), IVec2::new(3, 1)]);
    }

    #[test]
    fn test_events_live_for_one_tick() {
        let mut lvl = level(&["###", "#1#", "###"], &[]);
        lvl.player_start_position = LevelPoint::new(1, 1);
        let mut sim = Simulation::new(&lvl, quiet_config());

        sim.tick(&PlayerInput::idle());
        assert_eq!(sim.events().len(), 1);
        sim.tick(&PlayerInput::idle());
        assert!(sim.events().is_empty());
    }

    #[test]
    fn test_contact_hurts_then_grace_window() {
        let mut lvl = level(&["#####", "#000#", "#####"], &[("P", 2, 1)]);
        lvl.player_start_position = LevelPoint::new(1, 1);
        let mut sim = Simulation::new(&lvl, quiet_config());

        let mut hits = Vec::new();
        for _ in 0..60 {
            sim.tick(&PlayerInput::idle());
            hits.extend(sim.events().iter().filter_map(|e| match e {
                GameEvent::PlayerDamaged { lives } => Some(*lives),
                _ => None,
            }));
        }
        assert_eq!(hits, vec![2]);
        assert!(sim.player().is_invulnerable());
    }

    #[test]
    fn test_death_ends_level() {
        let mut lvl = level(&["#####", "#000#", "#####"], &[("P", 3, 1)]);
        lvl.player_start_position = LevelPoint::new(1, 1);
        let mut config = quiet_config();
        config.player.lives = 1;
        let mut sim = Simulation::new(&lvl, config);

        let mut died = false;
        for _ in 0..120 {
            if !sim.tick(&PlayerInput::idle()) {
                died = sim.events().iter().any(|e| *e == GameEvent::PlayerDied);
                break;
            }
        }
        assert!(died);
        assert_eq!(sim.outcome(), Some(Outcome::Lost));

        // Stopped: the clock no longer moves
        let tick = sim.clock().tick();
        assert!(!sim.tick(&PlayerInput::idle()));
        assert_eq!(sim.clock().tick(), tick);
        assert!(sim.events().is_empty());
    }
}
