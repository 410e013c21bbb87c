//! The player: block movement, digging, lives

use glam::{IVec2, Vec2};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::actors::transit::Transit;
use crate::core::PlayerTuning;
use crate::ecs::Aabb;
use crate::grid::{DigOutcome, Grid};
use crate::input::{Direction, PlayerInput};

/// Result of a hit on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable or already dead
    Ignored,
    /// Lost a life, this many remain
    Hurt(u32),
    /// Lost the last life
    Died,
}

/// Player state
#[derive(Debug, Clone)]
pub struct Player {
    block: IVec2,
    position: Vec2,
    facing: Direction,
    next: Option<Direction>,
    transit: Option<Transit>,
    lives: u32,
    invulnerable: f32,
    alive: bool,
}

impl Player {
    /// Place the player at the center of `block`, facing right
    #[must_use]
    pub fn new(block: IVec2, position: Vec2, lives: u32) -> Self {
        Self {
            block,
            position,
            facing: Direction::Right,
            next: None,
            transit: None,
            lives,
            invulnerable: 0.0,
            alive: true,
        }
    }

    /// Block the player stands in. Changes when a move completes.
    #[must_use]
    pub fn block(&self) -> IVec2 {
        self.block
    }

    /// World position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Last direction pressed
    #[must_use]
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Between two blocks
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.transit.is_some()
    }

    /// Lives left
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Inside the post-hit grace window
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    /// Still in the game
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Collision box
    #[must_use]
    pub fn collider(&self, half_extent: f32) -> Aabb {
        Aabb::new(self.position, half_extent)
    }

    /// Apply one tick of input. Ignored while the pump is out.
    ///
    /// A direction turns the player; if idle a move starts at once,
    /// otherwise it is buffered for when the current move ends.
    pub fn handle_input(
        &mut self,
        input: &PlayerInput,
        pump_active: bool,
        grid: &Grid,
        rocks: &FxHashSet<IVec2>,
        tuning: &PlayerTuning,
    ) {
        if !self.alive || pump_active {
            return;
        }
        let Some(direction) = input.direction else {
            return;
        };
        self.facing = direction;
        if self.transit.is_some() {
            self.next = Some(direction);
        } else {
            self.try_start_move(direction, grid, rocks, tuning);
        }
    }

    /// Move one block if the target is inside the grid, not a wall and not
    /// holding a rock. Returns `true` when a move started.
    pub fn try_start_move(
        &mut self,
        direction: Direction,
        grid: &Grid,
        rocks: &FxHashSet<IVec2>,
        tuning: &PlayerTuning,
    ) -> bool {
        let target = self.block + direction.offset();
        if !grid.can_move_to_block(target) || rocks.contains(&target) {
            return false;
        }
        self.transit = Some(Transit::new(
            self.position,
            grid.block_to_world(target),
            target,
            tuning.move_time,
        ));
        true
    }

    /// Step the current move; chains into the buffered direction on arrival
    pub fn advance(
        &mut self,
        dt: f32,
        grid: &Grid,
        rocks: &FxHashSet<IVec2>,
        tuning: &PlayerTuning,
    ) {
        if !self.alive {
            return;
        }
        self.invulnerable = (self.invulnerable - dt).max(0.0);

        let Some(transit) = self.transit.as_mut() else {
            return;
        };
        let arrived = transit.advance(dt);
        self.position = transit.position();
        if !arrived {
            return;
        }

        self.block = transit.target();
        self.transit = None;
        if let Some(next) = self.next.take() {
            self.try_start_move(next, grid, rocks, tuning);
        }
    }

    /// Dig every micro-cell under the player's body. Returns the blocks
    /// cleared this call.
    pub fn dig(&self, grid: &mut Grid, tuning: &PlayerTuning) -> SmallVec<[IVec2; 4]> {
        let mut cleared = SmallVec::new();
        if !self.alive {
            return cleared;
        }
        for (block, cell) in grid.micro_cells_overlapping(self.position, tuning.dig_half_extent) {
            if grid.request_dig(block, cell) == DigOutcome::BlockCleared {
                cleared.push(block);
            }
        }
        cleared
    }

    /// Lose a life unless invulnerable. Surviving starts the grace window.
    pub fn take_damage(&mut self, tuning: &PlayerTuning) -> DamageOutcome {
        if !self.alive || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            log::info!("Player died at ({}, {})", self.block.x, self.block.y);
            self.alive = false;
            self.transit = None;
            self.next = None;
            return DamageOutcome::Died;
        }
        log::debug!("Player hit, {} lives left", self.lives);
        self.invulnerable = tuning.invulnerability_time;
        DamageOutcome::Hurt(self.lives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;

    const DT: f32 = 1.0 / 60.0;

    fn grid(rows: &[&str]) -> Grid {
        let level = LevelData {
            map: rows.iter().map(|r| (*r).to_string()).collect(),
            ..Default::default()
        };
        Grid::from_level(&level, 3.0)
    }

    fn player_at(grid: &Grid, block: IVec2) -> Player {
        Player::new(block, grid.block_to_world(block), 3)
    }

    /// Run movement and digging like the simulation does
    fn tick(player: &mut Player, grid: &mut Grid, input: PlayerInput, rocks: &FxHashSet<IVec2>) -> Vec<IVec2> {
        let tuning = PlayerTuning::default();
        player.handle_input(&input, false, grid, rocks, &tuning);
        player.advance(DT, grid, rocks, &tuning);
        player.dig(grid, &tuning).to_vec()
    }

    #[test]
    fn test_standing_still_clears_own_block() {
        let mut g = grid(&["111"]);
        let mut player = player_at(&g, IVec2::new(1, 0));
        let rocks = FxHashSet::default();

        let cleared = tick(&mut player, &mut g, PlayerInput::idle(), &rocks);
        assert_eq!(cleared, vec![IVec2::new(1, 0)]);
        // The body stays inside its own block
        assert_eq!(g.dig_progress(IVec2::new(0, 0)), 0);

        // Second request for the same cells reports nothing
        assert!(tick(&mut player, &mut g, PlayerInput::idle(), &rocks).is_empty());
    }

    #[test]
    fn test_walking_through_ground_digs_it() {
        let mut g = grid(&["0111"]);
        let mut player = player_at(&g, IVec2::new(0, 0));
        let rocks = FxHashSet::default();

        let mut cleared = Vec::new();
        for _ in 0..60 {
            cleared.extend(tick(&mut player, &mut g, PlayerInput::moving(Direction::Right), &rocks));
        }
        assert_eq!(player.block(), IVec2::new(3, 0));
        assert!(cleared.contains(&IVec2::new(1, 0)));
        assert!(cleared.contains(&IVec2::new(2, 0)));
        assert!(g.is_walkable(IVec2::new(3, 0)));
    }

    #[test]
    fn test_walls_and_rocks_block_movement() {
        let mut g = grid(&["#00"]);
        let mut player = player_at(&g, IVec2::new(1, 0));
        let mut rocks = FxHashSet::default();
        rocks.insert(IVec2::new(2, 0));

        for d in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            tick(&mut player, &mut g, PlayerInput::moving(d), &rocks);
            assert!(!player.is_moving());
        }
        assert_eq!(player.facing(), Direction::Down);
        assert_eq!(player.block(), IVec2::new(1, 0));
    }

    #[test]
    fn test_buffered_direction_chains() {
        let mut g = grid(&["000", "000"]);
        let mut player = player_at(&g, IVec2::new(0, 0));
        let rocks = FxHashSet::default();

        tick(&mut player, &mut g, PlayerInput::moving(Direction::Right), &rocks);
        tick(&mut player, &mut g, PlayerInput::moving(Direction::Up), &rocks);
        for _ in 0..40 {
            tick(&mut player, &mut g, PlayerInput::idle(), &rocks);
        }
        assert_eq!(player.block(), IVec2::new(1, 1));
        assert_eq!(player.position(), g.block_to_world(IVec2::new(1, 1)));
    }

    #[test]
    fn test_pump_freezes_input() {
        let g = grid(&["000"]);
        let mut player = player_at(&g, IVec2::new(0, 0));
        let rocks = FxHashSet::default();
        let tuning = PlayerTuning::default();

        player.handle_input(&PlayerInput::moving(Direction::Right), true, &g, &rocks, &tuning);
        assert!(!player.is_moving());
        assert_eq!(player.facing(), Direction::Right);

        player.handle_input(&PlayerInput::moving(Direction::Up), true, &g, &rocks, &tuning);
        assert_eq!(player.facing(), Direction::Right);
    }

    #[test]
    fn test_damage_and_invulnerability() {
        let g = grid(&["000"]);
        let mut player = player_at(&g, IVec2::new(0, 0));
        let rocks = FxHashSet::default();
        let tuning = PlayerTuning::default();

        assert_eq!(player.take_damage(&tuning), DamageOutcome::Hurt(2));
        assert!(player.is_invulnerable());
        assert_eq!(player.take_damage(&tuning), DamageOutcome::Ignored);

        // Grace window runs out
        for _ in 0..130 {
            player.advance(DT, &g, &rocks, &tuning);
        }
        assert!(!player.is_invulnerable());
        assert_eq!(player.take_damage(&tuning), DamageOutcome::Hurt(1));
    }

    #[test]
    fn test_last_life_kills() {
        let g = grid(&["000"]);
        let mut player = Player::new(IVec2::ZERO, g.block_to_world(IVec2::ZERO), 1);
        let tuning = PlayerTuning::default();

        assert_eq!(player.take_damage(&tuning), DamageOutcome::Died);
        assert!(!player.is_alive());
        assert_eq!(player.take_damage(&tuning), DamageOutcome::Ignored);
    }
}
