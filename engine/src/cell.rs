use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::Terrain;

bitflags! {
    /// Per-cell state bits.
    #[derive(
        Copy, Clone, Default, Debug, Eq, PartialEq, Hash, Serialize,
        Deserialize,
    )]
    pub struct CellFlags: u16 {
        /// In the player's current line of sight.
        const VIEW = 1 << 0;
        /// Lit by the player's light source.
        const LITE = 1 << 1;
        /// Permanently lit.
        const GLOW = 1 << 2;
        /// Remembered by the player.
        const MARK = 1 << 3;
        /// Scratch bit for diffing the view and light sets.
        const TEMP = 1 << 4;
        /// Redraw notice is pending.
        const REDRAW = 1 << 5;
        /// Memorization notice is pending.
        const MEMORIZE = 1 << 6;
        /// Trap went off here.
        const UNSAFE = 1 << 7;
        /// There's an item on the floor.
        const ITEM = 1 << 8;
    }
}

impl CellFlags {
    /// Bits that survive saving and loading a floor. Everything else is
    /// recomputed after load.
    pub const PERSISTENT: CellFlags = CellFlags::GLOW
        .union(CellFlags::MARK)
        .union(CellFlags::ITEM);
}

/// A single map cell.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct Cell {
    pub terrain: Terrain,
    pub flags: CellFlags,
}

impl Cell {
    pub fn new(terrain: Terrain) -> Self {
        Cell {
            terrain,
            flags: CellFlags::empty(),
        }
    }

    pub fn has(&self, flags: CellFlags) -> bool {
        self.flags.contains(flags)
    }
}
