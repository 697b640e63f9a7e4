use crate::Sight;

/// Direct line of sight test between two cells.
///
/// Only the cells strictly between the endpoints need to transmit sight,
/// the endpoints themselves may be opaque. The line is sampled at every
/// cell center along its longer axis. When the line passes exactly between
/// two cells, it gets through if either of them is clear.
pub fn line_of_sight<S: Sight + ?Sized, V: Into<[i32; 2]>>(
    map: &S,
    a: V,
    b: V,
) -> bool {
    let (a, b) = (a.into(), b.into());
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let (ax, ay) = (dx.abs(), dy.abs());

    // Adjacent or identical cells.
    if ax < 2 && ay < 2 {
        return true;
    }

    let (sx, sy) = (dx.signum(), dy.signum());

    // Knight's moves see past either of the two cells in between.
    if ax == 1 && ay == 2 && map.is_clear([a[0], a[1] + sy]) {
        return true;
    }
    if ay == 1 && ax == 2 && map.is_clear([a[0] + sx, a[1]]) {
        return true;
    }

    // Walk along the major axis, `major` and `minor` map axis-relative
    // steps back to map coordinates.
    let (len, rise, major, minor) = if ax >= ay {
        (ax, ay, [sx, 0], [0, sy])
    } else {
        (ay, ax, [0, sy], [sx, 0])
    };

    let at = |i: i32, j: i32| {
        [
            a[0] + major[0] * i + minor[0] * j,
            a[1] + major[1] * i + minor[1] * j,
        ]
    };

    for i in 1..len {
        // Minor offset of the line at the center of the i-th major step,
        // rounded half up: floor((2 * rise * i + len) / (2 * len)).
        let num = 2 * rise * i + len;
        let den = 2 * len;
        let j = num / den;

        if num % den == 0 && j > 0 {
            // Exactly between cells j - 1 and j.
            if !map.is_clear(at(i, j - 1)) && !map.is_clear(at(i, j)) {
                return false;
            }
        } else if !map.is_clear(at(i, j)) {
            return false;
        }
    }

    true
}
