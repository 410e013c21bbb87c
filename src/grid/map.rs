//! The dig grid: block types, micro-cell dig state and coordinate transforms.
//!
//! The symbol map is the source of truth for block types; the dig masks track
//! progress inside ground blocks. Both are private and only `request_dig`
//! mutates them.

use glam::{IVec2, Vec2};
use smallvec::SmallVec;

use crate::ai::NavGrid;
use crate::grid::block::{BlockType, CELLS_PER_AXIS, DigMask, symbol};
use crate::level::{EnemyType, LevelData, LevelPoint};

/// Result of a dig request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigOutcome {
    /// Nothing changed (invalid target, not ground, or already dug)
    Ignored,
    /// A micro-cell was dug, the block still has ground left
    Dug,
    /// The last micro-cell was dug and the block is now empty
    BlockCleared,
}

/// A micro-cell address: owning block plus cell within the block
pub type MicroCell = (IVec2, IVec2);

/// Block grid with per-block 3x3 dig progress.
///
/// Internal coordinates have `y = 0` at the bottom row; level rows are
/// stored top-first, see [`Grid::to_internal_y`].
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    block_size: f32,
    symbols: Vec<char>,
    dug: Vec<DigMask>,
    start_hint: LevelPoint,
}

impl Grid {
    /// Build a grid from a level description.
    ///
    /// Rows are right-padded with the empty symbol to the longest row,
    /// spaces become empty and unknown symbols are logged and treated as
    /// empty. Never fails.
    #[must_use]
    pub fn from_level(level: &LevelData, block_size: f32) -> Self {
        let width = level
            .map
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0)
            .max(1) as i32;
        let height = level.map.len() as i32;
        if height == 0 {
            log::warn!("Level '{}' has an empty map", level.level_id);
        }

        let mut symbols = vec![symbol::EMPTY; (width * height) as usize];
        for (row_index, row) in level.map.iter().enumerate() {
            let y = height - 1 - row_index as i32;
            for (x, c) in row.chars().enumerate() {
                let c = match c {
                    ' ' => symbol::EMPTY,
                    c if symbol::is_known(c) => c,
                    c => {
                        log::warn!("Unknown symbol '{c}' at ({x},{y}) treated as empty");
                        symbol::EMPTY
                    }
                };
                symbols[(y * width) as usize + x] = c;
            }
        }

        log::info!(
            "Grid initialized: {}x{} blocks for level '{}'",
            width,
            height,
            level.level_id
        );

        Self {
            width,
            height,
            block_size,
            symbols,
            dug: vec![DigMask::default(); (width * height) as usize],
            start_hint: level.player_start_position,
        }
    }

    /// Width in blocks
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in blocks
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// World size of one block
    #[must_use]
    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Flip between level rows (top-down) and internal rows (bottom-up).
    /// The mapping is its own inverse.
    #[must_use]
    pub fn to_internal_y(&self, y: i32) -> i32 {
        self.height - 1 - y
    }

    fn index(&self, block: IVec2) -> Option<usize> {
        self.is_valid_block(block)
            .then(|| (block.y * self.width + block.x) as usize)
    }

    fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.block_size * 0.5
    }

    // ------------------------------------------------------------------
    // Coordinate transforms
    // ------------------------------------------------------------------

    /// World position of a block's center. The grid is centered on the origin.
    #[must_use]
    pub fn block_to_world(&self, block: IVec2) -> Vec2 {
        block.as_vec2() * self.block_size - self.half_extents() + Vec2::splat(self.block_size * 0.5)
    }

    /// Block containing a world position
    #[must_use]
    pub fn world_to_block(&self, position: Vec2) -> IVec2 {
        ((position + self.half_extents()) / self.block_size)
            .floor()
            .as_ivec2()
    }

    fn world_to_global_cell(&self, position: Vec2) -> IVec2 {
        let cell_size = self.block_size / CELLS_PER_AXIS as f32;
        ((position + self.half_extents()) / cell_size)
            .floor()
            .as_ivec2()
    }

    fn split_global_cell(global: IVec2) -> MicroCell {
        (
            IVec2::new(
                global.x.div_euclid(CELLS_PER_AXIS),
                global.y.div_euclid(CELLS_PER_AXIS),
            ),
            IVec2::new(
                global.x.rem_euclid(CELLS_PER_AXIS),
                global.y.rem_euclid(CELLS_PER_AXIS),
            ),
        )
    }

    /// Micro-cell containing a world position
    #[must_use]
    pub fn world_to_micro_cell(&self, position: Vec2) -> MicroCell {
        Self::split_global_cell(self.world_to_global_cell(position))
    }

    /// Every micro-cell touched by an axis-aligned box.
    ///
    /// Cells outside the grid are included; `request_dig` ignores them.
    #[must_use]
    pub fn micro_cells_overlapping(&self, center: Vec2, half_extent: f32) -> SmallVec<[MicroCell; 16]> {
        let cell_size = self.block_size / CELLS_PER_AXIS as f32;
        let offset = self.half_extents();
        let min = ((center - Vec2::splat(half_extent) + offset) / cell_size)
            .floor()
            .as_ivec2();
        let max = ((center + Vec2::splat(half_extent) + offset) / cell_size)
            .ceil()
            .as_ivec2()
            - IVec2::ONE;

        let mut cells = SmallVec::new();
        for gy in min.y..=max.y {
            for gx in min.x..=max.x {
                cells.push(Self::split_global_cell(IVec2::new(gx, gy)));
            }
        }
        cells
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether a block coordinate lies inside the grid
    #[must_use]
    pub fn is_valid_block(&self, block: IVec2) -> bool {
        block.x >= 0 && block.x < self.width && block.y >= 0 && block.y < self.height
    }

    /// Current symbol of a block
    #[must_use]
    pub fn symbol_at(&self, block: IVec2) -> Option<char> {
        self.index(block).map(|i| self.symbols[i])
    }

    /// Type of a block. Out-of-range blocks are indestructible.
    #[must_use]
    pub fn block_type(&self, block: IVec2) -> BlockType {
        self.symbol_at(block)
            .map_or(BlockType::Indestructible, BlockType::from_symbol)
    }

    /// Walkable for enemies: empty, or ground with at least one dug micro-cell
    #[must_use]
    pub fn is_walkable(&self, block: IVec2) -> bool {
        let Some(i) = self.index(block) else {
            return false;
        };
        match BlockType::from_symbol(self.symbols[i]) {
            BlockType::Empty => true,
            BlockType::Indestructible => false,
            BlockType::Ground => self.dug[i].any(),
        }
    }

    /// The player may enter anything except walls (ground is dug on the way)
    #[must_use]
    pub fn can_move_to_block(&self, block: IVec2) -> bool {
        self.block_type(block) != BlockType::Indestructible
    }

    /// Whether one micro-cell has been dug
    #[must_use]
    pub fn is_micro_cell_dug(&self, block: IVec2, cell: IVec2) -> bool {
        match (self.index(block), DigMask::index(cell.x, cell.y)) {
            (Some(i), Some(bit)) => self.dug[i].is_dug(bit),
            _ => false,
        }
    }

    /// Number of dug micro-cells in a block
    #[must_use]
    pub fn dig_progress(&self, block: IVec2) -> u32 {
        self.index(block).map_or(0, |i| self.dug[i].count())
    }

    /// Solid for projectiles: outside the grid, a wall, or undug ground
    #[must_use]
    pub fn is_point_solid(&self, position: Vec2) -> bool {
        let (block, cell) = self.world_to_micro_cell(position);
        match self.block_type(block) {
            BlockType::Empty => false,
            BlockType::Indestructible => true,
            BlockType::Ground => !self.is_micro_cell_dug(block, cell),
        }
    }

    // ------------------------------------------------------------------
    // Digging
    // ------------------------------------------------------------------

    /// Dig one micro-cell. This is the only way dig state changes.
    ///
    /// Idempotent: repeated requests for the same cell are ignored, so a
    /// block reports [`DigOutcome::BlockCleared`] exactly once.
    pub fn request_dig(&mut self, block: IVec2, cell: IVec2) -> DigOutcome {
        let (Some(i), Some(bit)) = (self.index(block), DigMask::index(cell.x, cell.y)) else {
            return DigOutcome::Ignored;
        };
        if BlockType::from_symbol(self.symbols[i]) != BlockType::Ground {
            return DigOutcome::Ignored;
        }
        if !self.dug[i].dig(bit) {
            return DigOutcome::Ignored;
        }
        if self.dug[i].is_full() {
            self.symbols[i] = symbol::EMPTY;
            log::debug!("Block ({}, {}) fully dug", block.x, block.y);
            DigOutcome::BlockCleared
        } else {
            DigOutcome::Dug
        }
    }

    // ------------------------------------------------------------------
    // Spawns
    // ------------------------------------------------------------------

    fn blocks_with_symbol(&self, wanted: char) -> Vec<IVec2> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| IVec2::new(x, y)))
            .filter(|&b| self.symbol_at(b) == Some(wanted))
            .collect()
    }

    /// Blocks holding a rock spawn
    #[must_use]
    pub fn rock_spawns(&self) -> Vec<IVec2> {
        self.blocks_with_symbol(symbol::ROCK)
    }

    /// Blocks holding a fruit spawn
    #[must_use]
    pub fn fruit_spawns(&self) -> Vec<IVec2> {
        self.blocks_with_symbol(symbol::FRUIT)
    }

    /// Resolve a level's enemy list into grid blocks.
    ///
    /// Unknown type tags and spawns outside the grid are logged and skipped.
    #[must_use]
    pub fn enemy_spawns(&self, level: &LevelData) -> Vec<(EnemyType, IVec2)> {
        level
            .enemies
            .iter()
            .filter_map(|spawn| {
                let Some(kind) = EnemyType::from_tag(&spawn.enemy_type) else {
                    log::error!("Unknown enemy type '{}'", spawn.enemy_type);
                    return None;
                };
                let block = IVec2::new(spawn.position.x, self.to_internal_y(spawn.position.y));
                if !self.is_valid_block(block) {
                    log::warn!(
                        "Enemy spawn ({}, {}) lies outside the grid",
                        spawn.position.x,
                        spawn.position.y
                    );
                    return None;
                }
                Some((kind, block))
            })
            .collect()
    }

    /// Player start: the explicit level position if set, else the first `*`
    /// marker scanning rows top-down, else `(1, 1)`.
    #[must_use]
    pub fn find_player_start(&self) -> IVec2 {
        if self.start_hint.is_set() {
            return IVec2::new(self.start_hint.x, self.to_internal_y(self.start_hint.y));
        }

        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let block = IVec2::new(x, y);
                if self.symbol_at(block) == Some(symbol::PLAYER_START) {
                    return block;
                }
            }
        }

        log::warn!("No player start found, using default (1,1)");
        IVec2::new(1, 1)
    }

    /// Export the current symbol map as level rows, top row first
    #[must_use]
    pub fn to_level_rows(&self) -> Vec<String> {
        (0..self.height)
            .rev()
            .map(|y| {
                let start = (y * self.width) as usize;
                self.symbols[start..start + self.width as usize].iter().collect()
            })
            .collect()
    }
}

impl NavGrid for Grid {
    fn is_walkable(&self, block: IVec2) -> bool {
        Grid::is_walkable(self, block)
    }
}
