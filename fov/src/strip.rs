use crate::{distance, line_of_sight, Sight};

const VIEW: u8 = 1 << 0;
/// Cell is seen through an unobstructed path, children inheriting from
/// two easy parents skip the line of sight check.
const EASY: u8 = 1 << 1;

/// Octants as (axis, side) unit vector pairs.
///
/// Strip `n` of an octant runs along the axis direction, offset `n` cells
/// towards the side direction.
const OCTANTS: [([i32; 2], [i32; 2]); 8] = [
    ([0, 1], [1, 0]),
    ([0, 1], [-1, 0]),
    ([0, -1], [1, 0]),
    ([0, -1], [-1, 0]),
    ([1, 0], [0, 1]),
    ([1, 0], [0, -1]),
    ([-1, 0], [0, 1]),
    ([-1, 0], [0, -1]),
];

/// Axis rays, in the same order the octants pair up in `OCTANTS`.
const AXES: [[i32; 2]; 4] = [[0, 1], [0, -1], [1, 0], [-1, 0]];

const DIAGONALS: [[i32; 2]; 4] = [[1, 1], [-1, 1], [1, -1], [-1, -1]];

/// Largest radius a scan covers, longer ones are cut down to this.
const MAX_RADIUS: i32 = 255;

/// Compute the set of cells visible from `origin` within `radius`.
///
/// Cells are returned in discovery order, origin first. Opaque cells that
/// bound the visible area are included. The origin cell and its immediate
/// neighbors are always visible when inside the map.
///
/// The scan first walks the diagonal and axis rays out of the origin, then
/// sweeps each octant in strips parallel to its axis. Every cell has two
/// parents in the previous strip, a diagonal one and an orthogonal one, and
/// becomes visible based on whether the parents were visible. Where the
/// parents disagree a line of sight test settles it. Each strip is never
/// longer than the furthest unblocked cell of the previous strip.
pub fn field_of_view<S, V>(map: &S, origin: V, radius: i32) -> Vec<V>
where
    S: Sight + ?Sized,
    V: From<[i32; 2]> + Into<[i32; 2]>,
{
    let origin = origin.into();
    if map.transmits_sight(origin).is_none() {
        return Vec::new();
    }

    let mut scan = Scan::new(map, origin, radius.clamp(0, MAX_RADIUS));
    scan.mark(origin, VIEW | EASY);

    let radius = scan.radius;
    let mut diagonal_reach = 0;
    while distance([0, 0], [diagonal_reach + 1; 2]) <= radius {
        diagonal_reach += 1;
    }
    for dir in DIAGONALS {
        scan.ray(dir, diagonal_reach);
    }

    let reach = AXES.map(|dir| scan.ray(dir, radius));
    let mut limits: [i32; 8] = std::array::from_fn(|i| reach[i / 2]);

    for n in 1..=radius {
        // Longest strip that stays within radius.
        let len = radius - n - (n >> 1);
        if len < 1 {
            break;
        }

        for (limit, &(axis, side)) in limits.iter_mut().zip(&OCTANTS) {
            if n >= *limit {
                continue;
            }

            let at = |a: i32, s: i32| {
                [
                    origin[0] + axis[0] * a + side[0] * s,
                    origin[1] + axis[1] * a + side[1] * s,
                ]
            };

            // Furthest unblocked cell of this strip.
            let mut k = n;
            for d in 1..=len {
                let cell = at(n + d, n);
                let diagonal_parent = at(n + d - 1, n - 1);
                let orthogonal_parent = at(n + d - 1, n);

                if scan.blocks(cell, diagonal_parent, orthogonal_parent) {
                    if n + d >= *limit {
                        break;
                    }
                } else {
                    k = n + d;
                }
            }
            *limit = k + 1;
        }
    }

    scan.seen.into_iter().map(V::from).collect()
}

struct Scan<'a, S: ?Sized> {
    map: &'a S,
    origin: [i32; 2],
    radius: i32,
    /// Flags for the square of side 2 * radius + 1 around origin.
    flags: Vec<u8>,
    seen: Vec<[i32; 2]>,
}

impl<'a, S: Sight + ?Sized> Scan<'a, S> {
    fn new(map: &'a S, origin: [i32; 2], radius: i32) -> Self {
        let w = (2 * radius + 1) as usize;
        Scan {
            map,
            origin,
            radius,
            flags: vec![0; w * w],
            seen: Vec::new(),
        }
    }

    fn idx(&self, pos: [i32; 2]) -> Option<usize> {
        let w = 2 * self.radius + 1;
        let x = pos[0] - self.origin[0] + self.radius;
        let y = pos[1] - self.origin[1] + self.radius;
        (x >= 0 && y >= 0 && x < w && y < w).then(|| (y * w + x) as usize)
    }

    fn flags(&self, pos: [i32; 2]) -> u8 {
        self.idx(pos).map_or(0, |i| self.flags[i])
    }

    fn mark(&mut self, pos: [i32; 2], flags: u8) {
        if let Some(i) = self.idx(pos) {
            if self.flags[i] & VIEW == 0 {
                self.seen.push(pos);
            }
            self.flags[i] |= flags;
        }
    }

    /// Walk a ray out of origin up to `len` cells.
    ///
    /// Return the step at which the ray was stopped by an opaque cell or
    /// the map edge, or `len + 1` if it went the whole way.
    fn ray(&mut self, dir: [i32; 2], len: i32) -> i32 {
        for d in 1..=len {
            let pos =
                [self.origin[0] + dir[0] * d, self.origin[1] + dir[1] * d];
            match self.map.transmits_sight(pos) {
                None => return d,
                Some(clear) => {
                    self.mark(pos, VIEW | EASY);
                    if !clear {
                        return d;
                    }
                }
            }
        }
        len + 1
    }

    /// Decide visibility of a strip cell from its parents.
    ///
    /// Return whether the cell blocks further scanning of the strip, which
    /// is the case for opaque cells and for cells that couldn't be seen.
    fn blocks(
        &mut self,
        cell: [i32; 2],
        diagonal_parent: [i32; 2],
        orthogonal_parent: [i32; 2],
    ) -> bool {
        let f1 = self.map.is_clear(diagonal_parent);
        let f2 = self.map.is_clear(orthogonal_parent);
        if !f1 && !f2 {
            return true;
        }

        let g1 = self.flags(diagonal_parent);
        let g2 = self.flags(orthogonal_parent);
        let v1 = f1 && g1 & VIEW != 0;
        let v2 = f2 && g2 & VIEW != 0;
        if !v1 && !v2 {
            return true;
        }

        let Some(clear) = self.map.transmits_sight(cell) else {
            return true;
        };
        let wall = !clear;

        let z1 = v1 && g1 & EASY != 0;
        let z2 = v2 && g2 & EASY != 0;

        if z1 && z2 {
            self.mark(cell, VIEW | EASY);
        } else if z1 || (v1 && v2) || wall {
            // Primary parent seen easily, both parents seen, or the cell
            // is a wall next to a visible parent.
            self.mark(cell, VIEW);
        } else if line_of_sight(self.map, self.origin, cell) {
            self.mark(cell, VIEW);
        } else {
            return true;
        }

        wall
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::test_map::TestMap;

    fn fov(
        map: &TestMap,
        origin: [i32; 2],
        radius: i32,
    ) -> HashSet<[i32; 2]> {
        field_of_view(map, origin, radius).into_iter().collect()
    }

    #[test]
    fn open_area() {
        let map = TestMap::open(20, 20);
        let seen = fov(&map, [5, 5], 10);
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(
                    seen.contains(&[x, y]),
                    distance([5, 5], [x, y]) <= 10,
                    "mismatch at {x}, {y}"
                );
            }
        }
    }

    #[test]
    fn origin_comes_first() {
        let map = TestMap::open(9, 9);
        let seen: Vec<[i32; 2]> = field_of_view(&map, [4, 4], 3);
        assert_eq!(seen[0], [4, 4]);
    }

    #[test]
    fn zero_radius() {
        let map = TestMap::open(9, 9);
        let seen: Vec<[i32; 2]> = field_of_view(&map, [4, 4], 0);
        assert_eq!(seen, vec![[4, 4]]);
    }

    #[test]
    fn huge_radius_is_capped() {
        let map = TestMap::open(9, 9);
        assert_eq!(fov(&map, [4, 4], i32::MAX), fov(&map, [4, 4], 20));
        assert_eq!(fov(&map, [4, 4], i32::MAX).len(), 81);
    }

    #[test]
    fn outside_map() {
        let map = TestMap::open(9, 9);
        let seen: Vec<[i32; 2]> = field_of_view(&map, [-1, 4], 5);
        assert!(seen.is_empty());
    }

    #[test]
    fn neighbors_of_closet() {
        let map = TestMap::new(
            "
            #####
            #####
            ##.##
            #####
            #####",
        );
        let seen = fov(&map, [2, 2], 10);
        assert_eq!(seen.len(), 9);
        for y in 1..=3 {
            for x in 1..=3 {
                assert!(seen.contains(&[x, y]));
            }
        }
    }

    #[test]
    fn pillar_shadow() {
        let mut map = TestMap::open(15, 11);
        map.set_wall([7, 5]);
        let seen = fov(&map, [5, 5], 10);
        assert!(seen.contains(&[6, 5]));
        assert!(seen.contains(&[7, 5]));
        for x in 8..15 {
            assert!(!seen.contains(&[x, 5]), "saw through pillar at {x}");
        }
        // Off-axis cells next to the shadow are still seen.
        assert!(seen.contains(&[8, 6]));
        assert!(seen.contains(&[8, 4]));
    }

    #[test]
    fn wall_hides_far_side() {
        let mut map = TestMap::open(12, 11);
        for y in 0..11 {
            map.set_wall([5, y]);
        }
        let seen = fov(&map, [2, 5], 20);
        assert!(seen.contains(&[5, 5]));
        assert!(seen.iter().all(|p| p[0] <= 5));
        // The whole near side is visible.
        for y in 0..11 {
            for x in 0..5 {
                assert!(seen.contains(&[x, y]));
            }
        }
    }

    #[quickcheck]
    fn open_map_is_a_disc(x: u8, y: u8, r: u8) -> bool {
        let map = TestMap::open(24, 24);
        let origin = [(x % 24) as i32, (y % 24) as i32];
        let radius = (r % 16) as i32;
        let seen = fov(&map, origin, radius);

        (0..24)
            .flat_map(|y| (0..24).map(move |x| [x, y]))
            .all(|p| seen.contains(&p) == (distance(origin, p) <= radius))
    }

    #[quickcheck]
    fn no_duplicates_and_within_radius(walls: Vec<(u8, u8)>, r: u8) -> bool {
        let mut map = TestMap::open(16, 16);
        for (x, y) in walls {
            let p = [(x % 16) as i32, (y % 16) as i32];
            if p != [8, 8] {
                map.set_wall(p);
            }
        }
        let radius = (r % 12) as i32;
        let seen: Vec<[i32; 2]> = field_of_view(&map, [8, 8], radius);
        let unique: HashSet<_> = seen.iter().copied().collect();

        unique.len() == seen.len()
            && seen.iter().all(|&p| distance([8, 8], p) <= radius)
            && seen.iter().all(|&p| {
                p[0] >= 0
                    && p[1] >= 0
                    && p[0] < map.width()
                    && p[1] < map.height()
            })
    }
}
