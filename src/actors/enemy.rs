//! Enemy behavior: block walking, ghosting through ground, inflation.
//!
//! Pooka and Fygar share one state machine; the Fygar's fire attack is
//! variant data checked inside the Normal state. The enemy only reads the
//! grid, it never digs.

use glam::{IVec2, Vec2};
use rand::Rng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::actors::fygar::{AttackStep, FygarAttack, fire_blocks, sees_player};
use crate::actors::transit::Transit;
use crate::ai::{Seek, StateMachine, SteeringBehavior, Transition, Wander, find_path};
use crate::core::{DefeatCause, EnemyTuning, FygarTuning};
use crate::ecs::Aabb;
use crate::grid::Grid;
use crate::input::Direction;
use crate::level::EnemyType;

/// Behavior state of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyState {
    /// Walking the tunnels block by block
    Normal,
    /// Drifting through ground towards the player
    Ghost,
    /// Caught by the pump
    Inflated,
    /// Popped or crushed; removed at the end of the tick
    Dying,
}

/// Variant-specific data
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyKind {
    /// Plain chaser
    Pooka,
    /// Chaser with a fire attack
    Fygar(FygarAttack),
}

impl EnemyKind {
    /// Fresh variant data for a species
    #[must_use]
    pub fn from_type(enemy_type: EnemyType) -> Self {
        match enemy_type {
            EnemyType::Pooka => Self::Pooka,
            EnemyType::Fygar => Self::Fygar(FygarAttack::new()),
        }
    }

    /// Species of this variant
    #[must_use]
    pub fn enemy_type(&self) -> EnemyType {
        match self {
            Self::Pooka => EnemyType::Pooka,
            Self::Fygar(_) => EnemyType::Fygar,
        }
    }
}

/// What enemies know about the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    /// Player block
    pub block: IVec2,
    /// Player world position
    pub position: Vec2,
}

/// Read-only inputs to one enemy update
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    /// Shared grid
    pub grid: &'a Grid,
    /// Blocks occupied by rocks
    pub rocks: &'a FxHashSet<IVec2>,
    /// The player, if alive
    pub player: Option<PlayerView>,
    /// Shared enemy tuning
    pub tuning: &'a EnemyTuning,
    /// Fygar tuning
    pub fygar: &'a FygarTuning,
    /// Tick length
    pub dt: f32,
}

impl EnemyContext<'_> {
    /// Movable for an enemy: inside the grid, walkable, and not a rock
    #[must_use]
    pub fn can_move_to(&self, block: IVec2) -> bool {
        self.grid.is_valid_block(block) && self.grid.is_walkable(block) && !self.rocks.contains(&block)
    }
}

/// One enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    kind: EnemyKind,
    fsm: StateMachine<EnemyState>,
    block: IVec2,
    position: Vec2,
    facing: Direction,
    transit: Option<Transit>,
    wake_delay: f32,
    idle_time: f32,
    inflation: u32,
    scale: f32,
    deflate_timer: Option<f32>,
    path: Option<Vec<IVec2>>,
    wander: Wander,
    defeat_cause: Option<DefeatCause>,
}

impl Enemy {
    /// Spawn an enemy standing at the center of `block`
    #[must_use]
    pub fn new(
        enemy_type: EnemyType,
        block: IVec2,
        position: Vec2,
        wake_delay: f32,
        tuning: &EnemyTuning,
    ) -> Self {
        Self {
            kind: EnemyKind::from_type(enemy_type),
            fsm: StateMachine::new(EnemyState::Normal),
            block,
            position,
            facing: Direction::Right,
            transit: None,
            wake_delay,
            idle_time: 0.0,
            inflation: 0,
            scale: 1.0,
            deflate_timer: None,
            path: None,
            wander: Wander::new(tuning.wander_radius, tuning.wander_jitter, tuning.ghost_speed),
            defeat_cause: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current behavior state
    #[must_use]
    pub fn state(&self) -> EnemyState {
        self.fsm.current()
    }

    /// Variant data
    #[must_use]
    pub fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    /// Species
    #[must_use]
    pub fn enemy_type(&self) -> EnemyType {
        self.kind.enemy_type()
    }

    /// Block the enemy stands in (updated when a move completes)
    #[must_use]
    pub fn block(&self) -> IVec2 {
        self.block
    }

    /// World position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Last horizontal or vertical direction moved or attacked in
    #[must_use]
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Mid-move between blocks
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.transit.is_some()
    }

    /// Pump count
    #[must_use]
    pub fn inflation(&self) -> u32 {
        self.inflation
    }

    /// Visual scale (1.0 when not inflated)
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Path from the last move decision
    #[must_use]
    pub fn last_path(&self) -> Option<&[IVec2]> {
        self.path.as_deref()
    }

    /// Why the enemy is dying
    #[must_use]
    pub fn defeat_cause(&self) -> Option<DefeatCause> {
        self.defeat_cause
    }

    /// Fygar charge warning
    #[must_use]
    pub fn is_flashing(&self, tuning: &FygarTuning) -> bool {
        match &self.kind {
            EnemyKind::Fygar(attack) => attack.is_flashing(tuning.flash_period),
            EnemyKind::Pooka => false,
        }
    }

    /// Collision box
    #[must_use]
    pub fn collider(&self, half_extent: f32) -> Aabb {
        Aabb::new(self.position, half_extent)
    }

    /// Whether contact with this enemy hurts the player
    #[must_use]
    pub fn is_harmful(&self) -> bool {
        matches!(self.state(), EnemyState::Normal | EnemyState::Ghost)
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Advance one tick. Returns the burning blocks when a Fygar breathes
    /// fire this tick.
    pub fn update(
        &mut self,
        ctx: &EnemyContext<'_>,
        rng: &mut impl Rng,
    ) -> Option<SmallVec<[IVec2; 4]>> {
        self.fsm.begin_tick(ctx.dt);
        if let EnemyKind::Fygar(attack) = &mut self.kind {
            attack.tick_cooldown(ctx.dt);
        }

        match self.fsm.current() {
            EnemyState::Dying => None,
            EnemyState::Inflated => {
                self.update_inflated(ctx.tuning, ctx.dt);
                None
            }
            _ if self.wake_delay > 0.0 => {
                self.wake_delay -= ctx.dt;
                None
            }
            EnemyState::Normal => self.update_normal(ctx, rng),
            EnemyState::Ghost => {
                self.update_ghost(ctx, rng);
                None
            }
        }
    }

    fn update_normal(
        &mut self,
        ctx: &EnemyContext<'_>,
        rng: &mut impl Rng,
    ) -> Option<SmallVec<[IVec2; 4]>> {
        if self.transit.is_some() {
            self.step_transit(ctx.dt);
            return None;
        }

        if let EnemyKind::Fygar(attack) = &mut self.kind {
            if attack.is_attacking() {
                return match attack.advance(ctx.dt, ctx.fygar) {
                    AttackStep::Breathe(facing) => {
                        let blocks =
                            fire_blocks(ctx.grid, self.block, facing, ctx.fygar.fire_length, ctx.rocks);
                        (!blocks.is_empty()).then_some(blocks)
                    }
                    AttackStep::Busy | AttackStep::Done => None,
                };
            }
        }

        self.idle_time += ctx.dt;
        let stuck = self.idle_time > ctx.tuning.stuck_threshold;
        let aggressive = rng.gen_range(0.0f32..1.0) < ctx.tuning.ghost_chance;
        if (stuck || aggressive) && self.enter_ghost() {
            return None;
        }

        if let (EnemyKind::Fygar(attack), Some(player)) = (&mut self.kind, ctx.player) {
            if attack.can_attack() {
                if let Some(facing) =
                    sees_player(self.block, player.block, ctx.fygar.attack_range, ctx.rocks)
                {
                    attack.start_charge(facing);
                    self.facing = facing;
                    return None;
                }
            }
        }

        if let Some(dir) = self.next_direction(ctx, rng) {
            let target = self.block + dir.offset();
            self.facing = dir;
            self.transit = Some(Transit::new(
                self.position,
                ctx.grid.block_to_world(target),
                target,
                ctx.tuning.move_time,
            ));
            self.step_transit(ctx.dt);
        }
        None
    }

    fn step_transit(&mut self, dt: f32) {
        let Some(transit) = self.transit.as_mut() else {
            return;
        };
        let arrived = transit.advance(dt);
        self.position = transit.position();
        if arrived {
            self.block = transit.target();
            self.transit = None;
            self.idle_time = 0.0;
        }
    }

    /// First path step towards the player, else a random movable direction
    fn next_direction(&mut self, ctx: &EnemyContext<'_>, rng: &mut impl Rng) -> Option<Direction> {
        if let Some(player) = ctx.player {
            self.path = find_path(ctx.grid, self.block, player.block);
            let step = self.path.as_ref().and_then(|p| p.first().copied());
            if let Some(step) = step {
                if ctx.can_move_to(step) {
                    return Direction::from_offset(step - self.block);
                }
            }
        }
        self.random_direction(ctx, rng)
    }

    fn random_direction(&self, ctx: &EnemyContext<'_>, rng: &mut impl Rng) -> Option<Direction> {
        let mut dirs = Direction::ALL;
        dirs.shuffle(rng);
        dirs.into_iter()
            .find(|d| ctx.can_move_to(self.block + d.offset()))
    }

    fn update_ghost(&mut self, ctx: &EnemyContext<'_>, rng: &mut impl Rng) {
        let velocity = match ctx.player {
            Some(player) => Seek::new(player.position, ctx.tuning.ghost_speed).calculate(self.position),
            None => {
                self.wander.update(rng);
                self.wander.calculate(self.position)
            }
        };
        self.position += velocity * ctx.dt;
        if velocity.x > 0.0 {
            self.facing = Direction::Right;
        } else if velocity.x < 0.0 {
            self.facing = Direction::Left;
        }

        if self.fsm.time_in_state() > ctx.tuning.min_ghost_duration {
            let block = ctx.grid.world_to_block(self.position);
            let center = ctx.grid.block_to_world(block);
            if self.position.distance(center) < ctx.tuning.ghost_exit_radius
                && ctx.can_move_to(block)
                && self.fsm.apply(Transition::To(EnemyState::Normal))
            {
                self.block = block;
                self.position = center;
                self.idle_time = 0.0;
            }
        }
    }

    fn update_inflated(&mut self, tuning: &EnemyTuning, dt: f32) {
        let Some(timer) = self.deflate_timer else {
            return;
        };
        let timer = timer - dt;
        if timer > 0.0 {
            self.deflate_timer = Some(timer);
            return;
        }

        self.inflation = self.inflation.saturating_sub(1);
        let target = 1.0 + tuning.inflate_scale_step * self.inflation as f32;
        self.scale += (target - self.scale) * 0.5;
        if self.inflation == 0 {
            self.finish_deflation();
        } else {
            self.deflate_timer = Some(timer + tuning.deflate_rate);
        }
    }

    fn finish_deflation(&mut self) {
        self.scale = 1.0;
        self.deflate_timer = None;
        self.idle_time = 0.0;
        self.fsm.force(EnemyState::Normal);
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Turn into a ghost. Ignored while inflated or dying, and after another
    /// transition this tick. Returns `true` on change.
    pub fn enter_ghost(&mut self) -> bool {
        if matches!(self.state(), EnemyState::Inflated | EnemyState::Dying) {
            return false;
        }
        if !self.fsm.apply(Transition::To(EnemyState::Ghost)) {
            return false;
        }
        self.transit = None;
        if let EnemyKind::Fygar(attack) = &mut self.kind {
            attack.abort();
        }
        true
    }

    /// Caught by the pump: stop everything and wait for pumps. A ghost
    /// takes the block it is floating in.
    pub fn start_inflation(&mut self, grid: &Grid) {
        if self.state() == EnemyState::Dying {
            return;
        }
        if self.state() == EnemyState::Ghost {
            self.block = grid.world_to_block(self.position);
        }
        self.transit = None;
        self.deflate_timer = None;
        if let EnemyKind::Fygar(attack) = &mut self.kind {
            attack.abort();
        }
        self.fsm.force(EnemyState::Inflated);
    }

    /// One pump. Pops the enemy on reaching the kill count.
    pub fn pump_inflate(&mut self, tuning: &EnemyTuning) {
        if self.state() != EnemyState::Inflated {
            return;
        }
        self.deflate_timer = None;
        self.inflation += 1;
        self.scale += tuning.inflate_scale_step;
        if self.inflation >= tuning.pumps_to_kill {
            self.die(DefeatCause::Pumped);
        }
    }

    /// Pump released: deflate one step every `deflate_rate` seconds
    pub fn stop_inflation(&mut self, tuning: &EnemyTuning) {
        if self.state() != EnemyState::Inflated {
            return;
        }
        if self.inflation == 0 {
            self.finish_deflation();
        } else {
            self.deflate_timer = Some(tuning.deflate_rate);
        }
    }

    /// Enter the terminal state
    pub fn die(&mut self, cause: DefeatCause) {
        if self.state() == EnemyState::Dying {
            return;
        }
        self.transit = None;
        self.deflate_timer = None;
        if let EnemyKind::Fygar(attack) = &mut self.kind {
            attack.abort();
        }
        self.defeat_cause = Some(cause);
        self.fsm.force(EnemyState::Dying);
    }
}
