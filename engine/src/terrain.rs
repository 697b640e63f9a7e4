use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

use crate::{Mover, Options};

bitflags! {
    /// Static capabilities of a terrain class.
    #[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
    pub struct TerrainFlags: u16 {
        /// Ground movers can walk here.
        const PASSABLE = 1 << 0;
        /// Flying movers can cross even when ground movers can't.
        const FLYABLE = 1 << 1;
        /// Sight doesn't pass through.
        const OPAQUE = 1 << 2;
        /// Remembered once seen regardless of lighting.
        const INTERESTING = 1 << 3;
        /// Solid rock for the purposes of corridor following.
        const WALL = 1 << 4;
        const DOOR = 1 << 5;
        /// Passable by pathing at an extra cost, movement needs to open it
        /// first.
        const SLOW = 1 << 6;
        const STAIRS = 1 << 7;
    }
}

/// Terrain class of a single map cell.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    EnumCount,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "char", into = "char")]
pub enum Terrain {
    #[default]
    Granite,
    Permanent,
    Vein,
    Floor,
    OpenDoor,
    BrokenDoor,
    ClosedDoor,
    /// Stuck or locked door that can't be opened or pathed through.
    SealedDoor,
    Rubble,
    Water,
    Lava,
    UpStairs,
    DownStairs,
}

use Terrain::*;

impl Terrain {
    pub const fn flags(self) -> TerrainFlags {
        const P: TerrainFlags = TerrainFlags::PASSABLE;
        const F: TerrainFlags = TerrainFlags::FLYABLE;
        const O: TerrainFlags = TerrainFlags::OPAQUE;
        const I: TerrainFlags = TerrainFlags::INTERESTING;
        const W: TerrainFlags = TerrainFlags::WALL;
        const D: TerrainFlags = TerrainFlags::DOOR;
        const S: TerrainFlags = TerrainFlags::SLOW;
        const X: TerrainFlags = TerrainFlags::STAIRS;

        match self {
            Granite | Permanent | Vein | Rubble => O.union(I).union(W),
            Floor => P,
            OpenDoor | BrokenDoor => P.union(I).union(D),
            ClosedDoor => O.union(I).union(D).union(S),
            SealedDoor => O.union(I).union(D),
            Water | Lava => F.union(I),
            UpStairs | DownStairs => P.union(I).union(X),
        }
    }

    pub fn is_passable(self) -> bool {
        self.flags().contains(TerrainFlags::PASSABLE)
    }

    pub fn blocks_sight(self) -> bool {
        self.flags().contains(TerrainFlags::OPAQUE)
    }

    /// Sight passes through, the counterpart of a floor for lighting and
    /// corridor following.
    pub fn is_floor_like(self) -> bool {
        !self.blocks_sight()
    }

    pub fn is_interesting(self) -> bool {
        self.flags().contains(TerrainFlags::INTERESTING)
    }

    pub fn is_wall(self) -> bool {
        self.flags().contains(TerrainFlags::WALL)
    }

    pub fn is_door(self) -> bool {
        self.flags().contains(TerrainFlags::DOOR)
    }

    /// Door that blocks movement, openable or not.
    pub fn is_closed_door(self) -> bool {
        matches!(self, ClosedDoor | SealedDoor)
    }

    pub fn is_stairs(self) -> bool {
        self.flags().contains(TerrainFlags::STAIRS)
    }

    /// Whether a mover of the given class can occupy this terrain.
    pub fn can_enter(self, mover: Mover) -> bool {
        let f = self.flags();
        f.contains(TerrainFlags::PASSABLE)
            || (mover == Mover::Flying && f.contains(TerrainFlags::FLYABLE))
    }

    /// Whether pathing can go through this terrain, possibly by opening it
    /// first.
    pub fn can_path(self, mover: Mover) -> bool {
        self.can_enter(mover) || self.flags().contains(TerrainFlags::SLOW)
    }

    /// Extra flow cost for entering this terrain.
    pub fn path_penalty(self, door_penalty: i32) -> i32 {
        if self.flags().contains(TerrainFlags::SLOW) {
            door_penalty
        } else {
            0
        }
    }

    /// Whether a runner should stop when this terrain comes into view next
    /// to the run path.
    pub fn stops_run(self, opts: &Options) -> bool {
        match self {
            Granite | Permanent | Vein | Rubble | Floor => false,
            OpenDoor | BrokenDoor => !opts.run_ignore_doors,
            UpStairs | DownStairs => !opts.run_ignore_stairs,
            ClosedDoor | SealedDoor | Water | Lava => true,
        }
    }
}

impl TryFrom<char> for Terrain {
    type Error = &'static str;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '#' => Ok(Granite),
            'X' => Ok(Permanent),
            '%' => Ok(Vein),
            '.' => Ok(Floor),
            '\'' => Ok(OpenDoor),
            '/' => Ok(BrokenDoor),
            '+' => Ok(ClosedDoor),
            '=' => Ok(SealedDoor),
            ':' => Ok(Rubble),
            '~' => Ok(Water),
            '&' => Ok(Lava),
            '<' => Ok(UpStairs),
            '>' => Ok(DownStairs),
            _ => Err("invalid terrain char"),
        }
    }
}

impl From<Terrain> for char {
    fn from(val: Terrain) -> Self {
        // NB. This must match TryFrom inputs above.
        match val {
            Granite => '#',
            Permanent => 'X',
            Vein => '%',
            Floor => '.',
            OpenDoor => '\'',
            BrokenDoor => '/',
            ClosedDoor => '+',
            SealedDoor => '=',
            Rubble => ':',
            Water => '~',
            Lava => '&',
            UpStairs => '<',
            DownStairs => '>',
        }
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn glyphs_round_trip() {
        for t in Terrain::iter() {
            assert_eq!(Terrain::try_from(char::from(t)), Ok(t));
        }
        assert!(Terrain::try_from('?').is_err());
    }

    #[test]
    fn mover_classes() {
        assert!(Floor.can_enter(Mover::Ground));
        assert!(!Water.can_enter(Mover::Ground));
        assert!(Water.can_enter(Mover::Flying));
        assert!(!Granite.can_enter(Mover::Flying));

        // Closed doors path for everyone, sealed ones for no one.
        assert!(!ClosedDoor.can_enter(Mover::Ground));
        assert!(ClosedDoor.can_path(Mover::Ground));
        assert!(ClosedDoor.can_path(Mover::Flying));
        assert!(!SealedDoor.can_path(Mover::Ground));
        assert!(!SealedDoor.can_path(Mover::Flying));

        assert_eq!(ClosedDoor.path_penalty(3), 3);
        assert_eq!(OpenDoor.path_penalty(3), 0);
    }

    #[test]
    fn capabilities() {
        for t in Terrain::iter() {
            // Everything except plain floor is worth remembering.
            assert_eq!(t.is_interesting(), t != Floor, "{t:?}");
            // Walls are never passable.
            if t.is_wall() {
                assert!(!t.is_passable() && t.blocks_sight());
            }
        }
        assert!(ClosedDoor.is_closed_door() && SealedDoor.is_closed_door());
        assert!(!OpenDoor.is_closed_door());
        assert!(UpStairs.is_stairs() && DownStairs.is_stairs());
    }

    #[test]
    fn run_stops() {
        let opts = Options::default();
        assert!(!Floor.stops_run(&opts));
        assert!(!OpenDoor.stops_run(&opts));
        assert!(ClosedDoor.stops_run(&opts));
        assert!(!DownStairs.stops_run(&opts));

        let opts = Options {
            run_ignore_stairs: false,
            run_ignore_doors: false,
            ..Default::default()
        };
        assert!(OpenDoor.stops_run(&opts));
        assert!(DownStairs.stops_run(&opts));
    }
}
