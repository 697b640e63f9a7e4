use engine::prelude::*;

/// Draw the part of the floor under the view panel as the player knows it.
///
/// Remembered and currently seen cells show their terrain, everything else
/// is blank. Seen monsters are drawn over the terrain.
pub fn render(r: &Runtime) -> String {
    let panel = r.panel();
    let floor = r.floor();
    let end = (panel.origin + panel.size).min(floor.size());

    let mut ret = String::new();
    for y in panel.origin.y..end.y {
        let mut line = String::new();
        for x in panel.origin.x..end.x {
            line.push(glyph(r, ivec2(x, y)));
        }
        ret.push_str(line.trim_end());
        ret.push('\n');
    }
    ret
}

fn glyph(r: &Runtime, pos: IVec2) -> char {
    if pos == r.player().pos {
        return '@';
    }

    if let Some(mob) = r.mob_at(pos).filter(|m| m.is_visible(r)) {
        return match mob.get(r).map(|m| m.mover) {
            Some(Mover::Flying) => 'b',
            _ => 'm',
        };
    }

    let floor = r.floor();
    if !floor.has(pos, CellFlags::MARK) && !r.player_can_see(pos) {
        return ' ';
    }
    if floor.has(pos, CellFlags::ITEM) {
        return '$';
    }
    floor.terrain(pos).map_or(' ', char::from)
}
