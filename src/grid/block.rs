//! Block types, level symbols and per-block dig progress

/// Level map symbols.
pub mod symbol {
    /// Indestructible wall
    pub const INDESTRUCTIBLE: char = '#';
    /// Destructible ground (3x3 micro-cells)
    pub const GROUND: char = '1';
    /// Rock spawn (the block itself is empty)
    pub const ROCK: char = 'R';
    /// Fruit spawn (the block itself is empty)
    pub const FRUIT: char = 'B';
    /// Empty tunnel
    pub const EMPTY: char = '0';
    /// Fallback player start marker
    pub const PLAYER_START: char = '*';

    /// Whether the symbol belongs to the level alphabet
    #[must_use]
    pub fn is_known(c: char) -> bool {
        matches!(
            c,
            INDESTRUCTIBLE | GROUND | ROCK | FRUIT | EMPTY | PLAYER_START
        )
    }
}

/// Coarse type of a grid block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Open tunnel
    Empty,
    /// Diggable ground
    Ground,
    /// Wall that nothing passes through
    Indestructible,
}

impl BlockType {
    /// Map a level symbol to its block type. Unknown symbols are empty.
    #[must_use]
    pub fn from_symbol(c: char) -> Self {
        match c {
            symbol::INDESTRUCTIBLE => Self::Indestructible,
            symbol::GROUND => Self::Ground,
            _ => Self::Empty,
        }
    }
}

/// Number of micro-cells per block axis
pub const CELLS_PER_AXIS: i32 = 3;

/// Dig progress of one block, one bit per micro-cell (`cell_y * 3 + cell_x`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigMask(u16);

impl DigMask {
    /// All nine micro-cells dug
    pub const FULL: Self = Self(0x1FF);

    /// Bit index of a micro-cell, `None` when out of range
    #[must_use]
    pub fn index(cell_x: i32, cell_y: i32) -> Option<u32> {
        let range = 0..CELLS_PER_AXIS;
        if range.contains(&cell_x) && range.contains(&cell_y) {
            Some((cell_y * CELLS_PER_AXIS + cell_x) as u32)
        } else {
            None
        }
    }

    /// Check a single micro-cell
    #[must_use]
    pub fn is_dug(self, index: u32) -> bool {
        self.0 & (1 << index) != 0
    }

    /// Mark a micro-cell. Returns `false` if it was already dug.
    pub fn dig(&mut self, index: u32) -> bool {
        let bit = 1 << index;
        if self.0 & bit != 0 {
            return false;
        }
        self.0 |= bit;
        true
    }

    /// At least one micro-cell dug
    #[must_use]
    pub fn any(self) -> bool {
        self.0 != 0
    }

    /// Every micro-cell dug
    #[must_use]
    pub fn is_full(self) -> bool {
        self.0 == Self::FULL.0
    }

    /// Number of dug micro-cells
    #[must_use]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}
