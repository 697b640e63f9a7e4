//! Monster pursuit.

use crate::prelude::*;

impl MobId {
    /// Whether the pursuit field connects the monster to the player.
    pub fn can_path_to_player(&self, r: &impl AsRef<Runtime>) -> bool {
        let r = r.as_ref();
        let Some(mob) = self.get(r) else { return false };
        r.pursuit.is_reached(mob.mover, mob.pos)
    }

    /// Step that takes the monster closer to the player, if there is one.
    ///
    /// Monsters next to the player stay put, fighting is someone else's
    /// business. Closed doors, other monsters and cells with no lower
    /// pursuit cost are never stepped into.
    pub fn pursuit_direction(&self, r: &impl AsRef<Runtime>) -> Option<IVec2> {
        let r = r.as_ref();
        let mob = self.get(r)?;
        let pos = mob.pos;

        if (r.player.pos - pos).is_neighbor() {
            return None;
        }

        let mut best_cost = r.pursuit.cost(mob.mover, pos)?;
        let mut best = None;

        for dir in DIR_8 {
            let next = pos + dir;
            let Some(cost) = r.pursuit.cost(mob.mover, next) else {
                continue;
            };
            if cost >= best_cost {
                continue;
            }
            let Some(terrain) = r.floor.terrain(next) else {
                continue;
            };
            if !terrain.can_enter(mob.mover)
                || terrain.is_closed_door()
                || next == r.player.pos
                || r.mob_at(next).is_some()
            {
                continue;
            }

            best_cost = cost;
            best = Some(dir);
        }

        best
    }
}

impl Runtime {
    /// Take one turn for a monster.
    pub(crate) fn mob_act(&mut self, id: MobId) {
        if let Some(dir) = id.pursuit_direction(self) {
            self.move_mob(id, dir);
        }
    }
}
