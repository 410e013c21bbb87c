//! The player's pump: shoot, attach, inflate, retract

use glam::{IVec2, Vec2};
use hecs::Entity;
use rustc_hash::FxHashSet;

use crate::actors::enemy::{Enemy, EnemyState};
use crate::core::{EnemyTuning, PumpTuning};
use crate::ecs::World;
use crate::grid::Grid;
use crate::input::{Direction, PlayerInput};

/// Pump state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpPhase {
    /// Ready to shoot
    Idle,
    /// Tip in flight
    Shooting {
        /// Where the shot started
        origin: Vec2,
        /// Flight direction
        direction: Direction,
        /// World distance covered so far
        traveled: f32,
    },
    /// Hooked into an enemy
    Attached {
        /// The inflated enemy
        enemy: Entity,
    },
    /// Pulling back
    Retracting {
        /// Seconds until idle
        remaining: f32,
    },
}

/// Everything the pump reads from the rest of the simulation
#[derive(Debug, Clone, Copy)]
pub struct PumpContext<'a> {
    /// Grid for obstacle checks
    pub grid: &'a Grid,
    /// Blocks holding a rock
    pub rocks: &'a FxHashSet<IVec2>,
    /// Player world position
    pub origin: Vec2,
    /// Player facing
    pub facing: Direction,
    /// Whether the player is between blocks
    pub player_moving: bool,
    /// Pump tuning
    pub tuning: &'a PumpTuning,
    /// Enemy tuning (hit box, inflation)
    pub enemy: &'a EnemyTuning,
    /// Tick length
    pub dt: f32,
}

/// Pump state machine. Holds at most one enemy.
#[derive(Debug, Clone)]
pub struct Pump {
    phase: PumpPhase,
}

impl Pump {
    /// Idle pump
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: PumpPhase::Idle,
        }
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> PumpPhase {
        self.phase
    }

    /// Anything but idle. The player cannot walk while this is true.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != PumpPhase::Idle
    }

    /// Enemy currently hooked
    #[must_use]
    pub fn attached(&self) -> Option<Entity> {
        match self.phase {
            PumpPhase::Attached { enemy } => Some(enemy),
            _ => None,
        }
    }

    /// Tip position while shooting
    #[must_use]
    pub fn tip(&self) -> Option<Vec2> {
        match self.phase {
            PumpPhase::Shooting {
                origin,
                direction,
                traveled,
            } => Some(origin + direction.offset().as_vec2() * traveled),
            _ => None,
        }
    }

    /// Advance one tick
    pub fn update(&mut self, input: &PlayerInput, ctx: &PumpContext<'_>, world: &mut World) {
        match self.phase {
            PumpPhase::Idle => {
                if input.pump && !ctx.player_moving {
                    log::debug!("Pump fired {:?}", ctx.facing);
                    self.phase = PumpPhase::Shooting {
                        origin: ctx.origin,
                        direction: ctx.facing,
                        traveled: 0.0,
                    };
                    self.shoot(ctx, world);
                }
            }
            PumpPhase::Shooting { .. } => self.shoot(ctx, world),
            PumpPhase::Attached { enemy } => {
                if !world.contains(enemy) {
                    log::debug!("Hooked enemy {enemy:?} is gone");
                    self.phase = PumpPhase::Idle;
                    return;
                }
                let popped = world
                    .get::<Enemy>(enemy)
                    .map_or(true, |e| e.state() == EnemyState::Dying);
                if popped {
                    self.force_retract(world, ctx.enemy);
                    return;
                }
                if let Ok(mut target) = world.get_mut::<Enemy>(enemy) {
                    if input.pump {
                        target.pump_inflate(ctx.enemy);
                    }
                    if input.direction.is_some() {
                        target.stop_inflation(ctx.enemy);
                        self.phase = PumpPhase::Retracting {
                            remaining: ctx.tuning.retract_delay,
                        };
                    }
                }
            }
            PumpPhase::Retracting { remaining } => {
                let remaining = remaining - ctx.dt;
                self.phase = if remaining <= 0.0 {
                    PumpPhase::Idle
                } else {
                    PumpPhase::Retracting { remaining }
                };
            }
        }
    }

    /// Drop everything at once and let the hooked enemy deflate
    pub fn force_retract(&mut self, world: &mut World, tuning: &EnemyTuning) {
        if let Some(entity) = self.attached() {
            if let Ok(mut enemy) = world.get_mut::<Enemy>(entity) {
                enemy.stop_inflation(tuning);
            }
        }
        self.phase = PumpPhase::Idle;
    }

    /// One flight step: enemies are hit before obstacles
    fn shoot(&mut self, ctx: &PumpContext<'_>, world: &mut World) {
        let PumpPhase::Shooting {
            origin,
            direction,
            traveled,
        } = self.phase
        else {
            return;
        };

        let max_distance = ctx.tuning.range * ctx.grid.block_size();
        let traveled = (traveled + ctx.tuning.shoot_speed * ctx.dt).min(max_distance);
        let tip = origin + direction.offset().as_vec2() * traveled;

        if let Some(entity) = self.find_target(tip, ctx, world) {
            if let Ok(mut enemy) = world.get_mut::<Enemy>(entity) {
                enemy.start_inflation(ctx.grid);
            }
            log::debug!("Pump attached to {entity:?}");
            self.phase = PumpPhase::Attached { enemy: entity };
            return;
        }

        let blocked =
            ctx.grid.is_point_solid(tip) || ctx.rocks.contains(&ctx.grid.world_to_block(tip));
        self.phase = if blocked || traveled >= max_distance {
            PumpPhase::Retracting {
                remaining: ctx.tuning.retract_delay,
            }
        } else {
            PumpPhase::Shooting {
                origin,
                direction,
                traveled,
            }
        };
    }

    /// Nearest living enemy touched by the tip
    fn find_target(&self, tip: Vec2, ctx: &PumpContext<'_>, world: &World) -> Option<Entity> {
        let half = ctx.enemy.collision_half_extent;
        world
            .query::<&Enemy>()
            .iter()
            .filter(|(_, e)| e.state() != EnemyState::Dying)
            .filter(|(_, e)| e.collider(half).overlaps_circle(tip, ctx.tuning.tip_radius))
            .map(|(entity, e)| (entity, e.position().distance_squared(tip)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.id().cmp(&b.0.id())))
            .map(|(entity, _)| entity)
    }
}

impl Default for Pump {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{EnemyType, LevelData};

    const DT: f32 = 1.0 / 60.0;

    struct Fixture {
        grid: Grid,
        rocks: FxHashSet<IVec2>,
        pump: PumpTuning,
        enemy: EnemyTuning,
        world: World,
    }

    impl Fixture {
        fn new(row: &str) -> Self {
            let level = LevelData {
                map: vec![row.to_string()],
                ..Default::default()
            };
            Self {
                grid: Grid::from_level(&level, 3.0),
                rocks: FxHashSet::default(),
                pump: PumpTuning::default(),
                enemy: EnemyTuning::default(),
                world: World::new(),
            }
        }

        fn spawn(&mut self, x: i32) -> Entity {
            let block = IVec2::new(x, 0);
            let enemy = Enemy::new(
                EnemyType::Pooka,
                block,
                self.grid.block_to_world(block),
                0.0,
                &self.enemy,
            );
            self.world.spawn((enemy,))
        }

        fn step(&mut self, pump: &mut Pump, input: PlayerInput) {
            let ctx = PumpContext {
                grid: &self.grid,
                rocks: &self.rocks,
                origin: self.grid.block_to_world(IVec2::new(0, 0)),
                facing: Direction::Right,
                player_moving: false,
                tuning: &self.pump,
                enemy: &self.enemy,
                dt: DT,
            };
            pump.update(&input, &ctx, &mut self.world);
        }

        fn state(&self, entity: Entity) -> EnemyState {
            self.world
                .get::<Enemy>(entity)
                .map(|e| e.state())
                .unwrap_or(EnemyState::Dying)
        }
    }

    fn run_until(f: &mut Fixture, pump: &mut Pump, max: usize, done: impl Fn(&Pump) -> bool) -> bool {
        for _ in 0..max {
            if done(pump) {
                return true;
            }
            f.step(pump, PlayerInput::idle());
        }
        done(pump)
    }

    #[test]
    fn test_shot_attaches_to_enemy_in_tunnel() {
        let mut f = Fixture::new("00000");
        let target = f.spawn(2);
        let mut pump = Pump::new();

        f.step(&mut pump, PlayerInput::pump());
        assert!(pump.is_active());
        assert!(run_until(&mut f, &mut pump, 60, |p| p.attached().is_some()));
        assert_eq!(pump.attached(), Some(target));
        assert_eq!(f.state(target), EnemyState::Inflated);
    }

    #[test]
    fn test_pumping_kills_then_pump_retracts() {
        let mut f = Fixture::new("00000");
        let target = f.spawn(1);
        let mut pump = Pump::new();

        f.step(&mut pump, PlayerInput::pump());
        assert!(run_until(&mut f, &mut pump, 60, |p| p.attached().is_some()));

        for _ in 0..f.enemy.pumps_to_kill {
            f.step(&mut pump, PlayerInput::pump());
        }
        assert_eq!(f.state(target), EnemyState::Dying);

        f.step(&mut pump, PlayerInput::idle());
        assert_eq!(pump.phase(), PumpPhase::Idle);
    }

    #[test]
    fn test_direction_releases_enemy() {
        let mut f = Fixture::new("00000");
        let target = f.spawn(1);
        let mut pump = Pump::new();

        f.step(&mut pump, PlayerInput::pump());
        assert!(run_until(&mut f, &mut pump, 60, |p| p.attached().is_some()));

        f.step(&mut pump, PlayerInput::moving(Direction::Left));
        assert!(matches!(pump.phase(), PumpPhase::Retracting { .. }));
        // No pumps landed, so the enemy recovers at once
        assert_eq!(f.state(target), EnemyState::Normal);

        assert!(run_until(&mut f, &mut pump, 10, |p| !p.is_active()));
    }

    #[test]
    fn test_ground_stops_the_tip() {
        let mut f = Fixture::new("00111");
        let target = f.spawn(4);
        let mut pump = Pump::new();

        f.step(&mut pump, PlayerInput::pump());
        assert!(run_until(&mut f, &mut pump, 60, |p| {
            matches!(p.phase(), PumpPhase::Retracting { .. } | PumpPhase::Idle)
        }));
        assert_eq!(f.state(target), EnemyState::Normal);
    }

    #[test]
    fn test_out_of_range_retracts() {
        let mut f = Fixture::new("0000000");
        let target = f.spawn(6);
        let mut pump = Pump::new();

        f.step(&mut pump, PlayerInput::pump());
        assert!(run_until(&mut f, &mut pump, 120, |p| !p.is_active()));
        assert_eq!(f.state(target), EnemyState::Normal);
    }

    #[test]
    fn test_no_shot_while_moving() {
        let f = Fixture::new("00000");
        let mut world = World::new();
        let mut pump = Pump::new();
        let ctx = PumpContext {
            grid: &f.grid,
            rocks: &f.rocks,
            origin: Vec2::ZERO,
            facing: Direction::Right,
            player_moving: true,
            tuning: &f.pump,
            enemy: &f.enemy,
            dt: DT,
        };
        pump.update(&PlayerInput::pump(), &ctx, &mut world);
        assert!(!pump.is_active());
    }

    #[test]
    fn test_force_retract_deflates_target() {
        let mut f = Fixture::new("00000");
        let target = f.spawn(1);
        let mut pump = Pump::new();

        f.step(&mut pump, PlayerInput::pump());
        assert!(run_until(&mut f, &mut pump, 60, |p| p.attached().is_some()));

        pump.force_retract(&mut f.world, &f.enemy);
        assert_eq!(pump.phase(), PumpPhase::Idle);
        assert_eq!(f.state(target), EnemyState::Normal);
    }

    #[test]
    fn test_lost_target_retracts() {
        let mut f = Fixture::new("00000");
        let target = f.spawn(1);
        let mut pump = Pump::new();

        f.step(&mut pump, PlayerInput::pump());
        assert!(run_until(&mut f, &mut pump, 60, |p| p.attached().is_some()));

        f.world.despawn(target).unwrap();
        f.step(&mut pump, PlayerInput::idle());
        assert_eq!(pump.phase(), PumpPhase::Idle);
    }
}
