use std::fmt;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use util::Grid;

use crate::prelude::*;

/// Grid store of the currently loaded floor.
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
#[serde(from = "FloorData", into = "FloorData")]
pub struct Floor {
    cells: Grid<Cell>,
    /// Bumped on every terrain change.
    revision: u64,
}

/// A floor parsed from a text map along with where things start on it.
#[derive(Clone, Debug)]
pub struct Layout {
    pub floor: Floor,
    pub player: IVec2,
    pub monsters: Vec<(IVec2, Mover)>,
}

impl Floor {
    /// Create a floor of solid rock.
    pub fn new(size: impl Into<IVec2>) -> Self {
        Floor {
            cells: Grid::new(size, Cell::default()),
            revision: 0,
        }
    }

    /// Build a floor from a text map.
    ///
    /// Terrain uses the glyphs of `Terrain`'s char conversion. Additionally
    /// `@` is the player's starting cell, `m` a ground monster, `b` a
    /// flying monster and `$` an item, all standing on plain floor. Blank
    /// lines are skipped and surrounding whitespace is trimmed from every
    /// line.
    pub fn parse(text: &str) -> anyhow::Result<Layout> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            bail!("empty map");
        };
        let width = first.chars().count();

        let mut floor = Floor::new([width as i32, lines.len() as i32]);
        let mut player = None;
        let mut monsters = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                bail!("map line {} has wrong width", y + 1);
            }

            for (x, c) in line.chars().enumerate() {
                let pos = ivec2(x as i32, y as i32);
                let mut cell = Cell::new(Terrain::Floor);
                match c {
                    '@' => {
                        if player.replace(pos).is_some() {
                            bail!("multiple player spawns in map");
                        }
                    }
                    'm' => monsters.push((pos, Mover::Ground)),
                    'b' => monsters.push((pos, Mover::Flying)),
                    '$' => cell.flags.insert(CellFlags::ITEM),
                    c => match Terrain::try_from(c) {
                        Ok(t) => cell.terrain = t,
                        Err(_) => bail!("unknown map glyph {c:?}"),
                    },
                }
                floor.cells[pos] = cell;
            }
        }

        let Some(player) = player else {
            bail!("no player spawn in map");
        };

        Ok(Layout {
            floor,
            player,
            monsters,
        })
    }

    pub fn width(&self) -> i32 {
        self.cells.width()
    }

    pub fn height(&self) -> i32 {
        self.cells.height()
    }

    pub fn size(&self) -> IVec2 {
        self.cells.size()
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        self.cells.contains(pos)
    }

    pub fn positions(&self) -> impl Iterator<Item = IVec2> + 'static {
        self.cells.positions()
    }

    pub fn cell(&self, pos: IVec2) -> Option<&Cell> {
        self.cells.get(pos)
    }

    pub fn terrain(&self, pos: IVec2) -> Option<Terrain> {
        self.cells.get(pos).map(|c| c.terrain)
    }

    /// Flags of the cell, empty for positions outside the floor.
    pub fn flags(&self, pos: IVec2) -> CellFlags {
        self.cells.get(pos).map_or(CellFlags::empty(), |c| c.flags)
    }

    pub fn has(&self, pos: IVec2, flags: CellFlags) -> bool {
        self.flags(pos).contains(flags)
    }

    pub(crate) fn insert(&mut self, pos: IVec2, flags: CellFlags) {
        if let Some(c) = self.cells.get_mut(pos) {
            c.flags.insert(flags);
        }
    }

    pub(crate) fn remove(&mut self, pos: IVec2, flags: CellFlags) {
        if let Some(c) = self.cells.get_mut(pos) {
            c.flags.remove(flags);
        }
    }

    /// Change terrain, return whether anything changed.
    ///
    /// Callers working on a live floor should go through
    /// `Runtime::set_terrain` so that dependent state gets recomputed.
    pub fn set_terrain(&mut self, pos: IVec2, terrain: Terrain) -> bool {
        match self.cells.get_mut(pos) {
            Some(c) if c.terrain != terrain => {
                c.terrain = terrain;
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    /// Terrain revision, changes whenever any terrain cell changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Make cells permanently lit.
    pub fn illuminate(&mut self, area: impl IntoIterator<Item = IVec2>) {
        for pos in area {
            self.insert(pos, CellFlags::GLOW);
        }
    }

    pub fn illuminate_all(&mut self) {
        self.illuminate(self.positions());
    }

    pub fn set_item(&mut self, pos: IVec2, present: bool) {
        if present {
            self.insert(pos, CellFlags::ITEM);
        } else {
            self.remove(pos, CellFlags::ITEM);
        }
    }
}

impl fov::Sight for Floor {
    fn transmits_sight(&self, pos: [i32; 2]) -> Option<bool> {
        self.terrain(pos.into()).map(|t| !t.blocks_sight())
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pos = ivec2(x, y);
                let c = match self.cell(pos) {
                    Some(c) if c.has(CellFlags::ITEM) => '$',
                    Some(c) => char::from(c.terrain),
                    None => ' ',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Saved form of a floor, only terrain and persistent bits.
#[derive(Serialize, Deserialize)]
struct FloorData {
    terrain: Grid<Terrain>,
    flags: Grid<CellFlags>,
}

impl From<Floor> for FloorData {
    fn from(floor: Floor) -> Self {
        FloorData {
            terrain: floor.cells.map(|c| c.terrain),
            flags: floor.cells.map(|c| c.flags & CellFlags::PERSISTENT),
        }
    }
}

impl From<FloorData> for Floor {
    fn from(data: FloorData) -> Self {
        let cells = Grid::from_fn(data.terrain.size(), |p| Cell {
            terrain: data.terrain.get(p).copied().unwrap_or_default(),
            flags: data.flags.get(p).copied().unwrap_or_default()
                & CellFlags::PERSISTENT,
        });
        Floor { cells, revision: 0 }
    }
}
