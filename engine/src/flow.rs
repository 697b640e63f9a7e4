//! Multi-source breadth-first distance fields.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, IntoEnumIterator};
use util::Grid;

use crate::prelude::*;

/// Movement class, decides which terrain a flow field crosses.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    EnumCount,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Mover {
    Ground,
    Flying,
}

#[derive(Copy, Clone, Default, Debug)]
struct FlowCell {
    /// Build pass that last reached this cell.
    when: u32,
    distance: i32,
    cost: i32,
}

/// Distance and cost fields for every mover class, built from a set of
/// source cells.
///
/// Distance counts steps. Cost counts steps plus a penalty for every
/// closed door entered along the way. Cells the last build didn't reach
/// have no values.
#[derive(Clone, Default, Debug)]
pub struct FlowField {
    anchor: Option<IVec2>,
    valid: bool,
    /// Floor terrain revision the field was built against.
    revision: u64,
    /// Current build pass, cells with an older stamp are unreached.
    stamp: u32,
    grids: Vec<Grid<FlowCell>>,
}

impl FlowField {
    pub fn new(size: IVec2) -> Self {
        FlowField {
            grids: vec![Grid::new(size, FlowCell::default()); Mover::COUNT],
            ..Default::default()
        }
    }

    /// Rebuild the field from `sources` on `floor`.
    ///
    /// The first source is recorded as the anchor. A `boundary` cell gets a
    /// value when reached but the search doesn't continue past it. Cells
    /// at `max_depth` steps are recorded but not expanded.
    pub fn build(
        &mut self,
        floor: &Floor,
        sources: &[IVec2],
        boundary: Option<IVec2>,
        max_depth: i32,
        door_penalty: i32,
    ) {
        if self.grids.len() != Mover::COUNT
            || self.grids.iter().any(|g| g.size() != floor.size())
        {
            *self = FlowField::new(floor.size());
        }

        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            // Stamp wrapped around, old stamps could now look current.
            for g in self.grids.iter_mut() {
                g.fill(FlowCell::default());
            }
            self.stamp = 1;
        }
        let stamp = self.stamp;

        for (mover, grid) in Mover::iter().zip(self.grids.iter_mut()) {
            let mut queue = VecDeque::new();
            for &pos in sources {
                if let Some(c) = grid.get_mut(pos) {
                    *c = FlowCell {
                        when: stamp,
                        distance: 0,
                        cost: 0,
                    };
                    queue.push_back(pos);
                }
            }

            while let Some(pos) = queue.pop_front() {
                let Some(&here) = grid.get(pos) else { continue };

                if here.distance >= max_depth {
                    continue;
                }
                if Some(pos) == boundary && !sources.contains(&pos) {
                    continue;
                }

                for dir in DIR_8 {
                    let next = pos + dir;
                    let Some(terrain) = floor.terrain(next) else {
                        continue;
                    };
                    if !terrain.can_path(mover) {
                        continue;
                    }

                    let distance = here.distance + 1;
                    let cost =
                        here.cost + 1 + terrain.path_penalty(door_penalty);

                    let Some(c) = grid.get_mut(next) else { continue };
                    if c.when != stamp {
                        *c = FlowCell {
                            when: stamp,
                            distance,
                            cost,
                        };
                        queue.push_back(next);
                    } else if distance < c.distance || cost < c.cost {
                        c.distance = c.distance.min(distance);
                        c.cost = c.cost.min(cost);
                        queue.push_back(next);
                    }
                }
            }
        }

        self.anchor = sources.first().copied();
        self.revision = floor.revision();
        self.valid = true;

        log::debug!(
            "flow: built from {:?}, reached {} cells",
            self.anchor,
            self.reached_count(Mover::Ground)
        );
    }

    fn cell(&self, mover: Mover, pos: IVec2) -> Option<&FlowCell> {
        self.grids
            .get(mover as usize)?
            .get(pos)
            .filter(|c| self.stamp != 0 && c.when == self.stamp)
    }

    /// Step count from the nearest source, `None` if unreached.
    pub fn distance(&self, mover: Mover, pos: IVec2) -> Option<i32> {
        self.cell(mover, pos).map(|c| c.distance)
    }

    /// Travel cost from the cheapest source, `None` if unreached.
    pub fn cost(&self, mover: Mover, pos: IVec2) -> Option<i32> {
        self.cell(mover, pos).map(|c| c.cost)
    }

    pub fn is_reached(&self, mover: Mover, pos: IVec2) -> bool {
        self.cell(mover, pos).is_some()
    }

    pub fn reached_count(&self, mover: Mover) -> usize {
        self.grids.get(mover as usize).map_or(0, |g| {
            g.iter().filter(|(_, c)| c.when == self.stamp).count()
        })
    }

    /// Position the field was last built from.
    pub fn anchor(&self) -> Option<IVec2> {
        self.anchor
    }

    /// Field has been built and not invalidated since.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Mark the field for rebuilding on next use.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Forget everything, including reached cells.
    pub fn clear(&mut self) {
        let size = self.grids.first().map_or(IVec2::ZERO, |g| g.size());
        *self = FlowField::new(size);
    }
}

impl Runtime {
    /// Bring the pursuit field up to date for monsters to read.
    ///
    /// The field is reused when it's still anchored on the player's cell.
    /// While running, it's also reused if the old anchor is still in view.
    /// That is an approximation, the player may have moved to where the old
    /// distances are off by a few steps, but it saves a rebuild per step.
    pub fn refresh_pursuit_flow(&mut self) {
        let pos = self.player.pos;
        let flow = &self.pursuit;

        let fresh = flow.is_valid()
            && flow.revision() == self.floor.revision()
            && flow.anchor().is_some_and(|a| {
                a == pos
                    || (self.player.is_running()
                        && self.floor.has(a, CellFlags::VIEW))
            });

        if !fresh {
            self.pursuit.build(
                &self.floor,
                &[pos],
                None,
                self.options.flow_depth,
                self.options.door_penalty,
            );
        }
    }

    /// Bring the travel field for `dest` up to date.
    ///
    /// Return false if the player's cell can't be reached from `dest`.
    pub fn refresh_travel_flow(&mut self, dest: IVec2) -> bool {
        let pos = self.player.pos;
        let flow = &self.travel_flow;

        let fresh = flow.is_valid()
            && flow.anchor() == Some(dest)
            && flow.revision() == self.floor.revision()
            && flow.is_reached(Mover::Ground, pos);

        if !fresh {
            self.travel_flow.build(
                &self.floor,
                &[dest],
                Some(pos),
                self.options.travel_depth,
                self.options.door_penalty,
            );
        }

        self.travel_flow.is_reached(Mover::Ground, pos)
    }

    /// Field monsters use to close in on the player.
    pub fn pursuit_flow(&self) -> &FlowField {
        &self.pursuit
    }

    pub fn travel_flow(&self) -> &FlowField {
        &self.travel_flow
    }
}

#[cfg(test)]
mod test {
    use quickcheck_macros::quickcheck;

    use super::*;

    fn build(map: &str, sources: &[IVec2], depth: i32) -> (Floor, FlowField) {
        let floor = Floor::parse(map).unwrap().floor;
        let mut flow = FlowField::new(floor.size());
        flow.build(&floor, sources, None, depth, 3);
        (floor, flow)
    }

    #[test]
    fn corridor() {
        let (_, flow) = build(
            "
            ############
            #@.........#
            ############",
            &[ivec2(1, 1)],
            32,
        );
        for x in 1..11 {
            let pos = ivec2(x, 1);
            assert_eq!(flow.distance(Mover::Ground, pos), Some(x - 1));
            assert_eq!(flow.cost(Mover::Ground, pos), Some(x - 1));
        }
        assert!(!flow.is_reached(Mover::Ground, ivec2(0, 1)));
        assert_eq!(flow.anchor(), Some(ivec2(1, 1)));
    }

    #[test]
    fn door_penalty() {
        let (_, flow) = build(
            "
            ##########
            #@..+....#
            ##########",
            &[ivec2(1, 1)],
            32,
        );
        let door = ivec2(4, 1);
        assert_eq!(flow.distance(Mover::Ground, door), Some(3));
        assert_eq!(flow.cost(Mover::Ground, door), Some(6));
        assert_eq!(flow.distance(Mover::Ground, ivec2(6, 1)), Some(5));
        assert_eq!(flow.cost(Mover::Ground, ivec2(6, 1)), Some(8));
    }

    #[test]
    fn sealed_doors_and_water() {
        let (_, flow) = build(
            "
            #########
            #@.=.~..#
            #########",
            &[ivec2(1, 1)],
            32,
        );
        assert!(!flow.is_reached(Mover::Ground, ivec2(3, 1)));
        assert!(!flow.is_reached(Mover::Flying, ivec2(4, 1)));

        let (_, flow) = build(
            "
            #######
            #@.~..#
            #######",
            &[ivec2(1, 1)],
            32,
        );
        assert!(!flow.is_reached(Mover::Ground, ivec2(4, 1)));
        assert_eq!(flow.distance(Mover::Flying, ivec2(4, 1)), Some(3));
    }

    #[test]
    fn depth_cap() {
        let (_, flow) = build(
            "
            ##########
            #@.......#
            ##########",
            &[ivec2(1, 1)],
            3,
        );
        assert_eq!(flow.distance(Mover::Ground, ivec2(4, 1)), Some(3));
        assert!(!flow.is_reached(Mover::Ground, ivec2(5, 1)));
    }

    #[test]
    fn boundary_is_not_expanded() {
        let floor = Floor::parse("#@....#").unwrap().floor;
        let mut flow = FlowField::new(floor.size());
        flow.build(&floor, &[ivec2(1, 0)], Some(ivec2(3, 0)), 32, 3);
        assert_eq!(flow.distance(Mover::Ground, ivec2(3, 0)), Some(2));
        assert!(!flow.is_reached(Mover::Ground, ivec2(4, 0)));
    }

    #[test]
    fn rebuild_forgets_old_cells() {
        let floor = Floor::parse("#@..#.#").unwrap().floor;
        let mut flow = FlowField::new(floor.size());
        flow.build(&floor, &[ivec2(5, 0)], None, 32, 3);
        assert!(flow.is_reached(Mover::Ground, ivec2(5, 0)));
        flow.build(&floor, &[ivec2(1, 0)], None, 32, 3);
        assert!(!flow.is_reached(Mover::Ground, ivec2(5, 0)));
        assert_eq!(flow.reached_count(Mover::Ground), 3);
    }

    #[test]
    fn multiple_sources() {
        let (_, flow) = build(
            "
            #########
            #@......#
            #########",
            &[ivec2(1, 1), ivec2(7, 1)],
            32,
        );
        assert_eq!(flow.distance(Mover::Ground, ivec2(4, 1)), Some(3));
        assert_eq!(flow.distance(Mover::Ground, ivec2(6, 1)), Some(1));
    }

    #[quickcheck]
    fn distances_are_consistent(walls: Vec<(u8, u8)>, depth: u8) -> bool {
        let mut floor = Floor::new([12, 12]);
        for p in floor.positions().collect::<Vec<_>>() {
            floor.set_terrain(p, Terrain::Floor);
        }
        for (x, y) in walls {
            let p = ivec2((x % 12) as i32, (y % 12) as i32);
            if p != ivec2(6, 6) {
                floor.set_terrain(p, Terrain::Granite);
            }
        }
        let depth = (depth % 16) as i32;
        let mut flow = FlowField::new(floor.size());
        flow.build(&floor, &[ivec2(6, 6)], None, depth, 3);

        floor.positions().all(|p| {
            let Some(d) = flow.distance(Mover::Ground, p) else {
                return true;
            };
            if d > depth {
                return false;
            }
            if p == ivec2(6, 6) {
                return d == 0;
            }
            // Every reached cell has a neighbor one step closer.
            DIR_8.iter().any(|&dir| {
                flow.distance(Mover::Ground, p + dir) == Some(d - 1)
            })
        })
    }
}
