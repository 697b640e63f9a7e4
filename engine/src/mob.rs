//! Monsters on the current floor.

use crate::{prelude::*, TURN_ENERGY};

/// A monster.
#[derive(Clone, Debug)]
pub struct Mob {
    pub pos: IVec2,
    pub mover: Mover,
    /// Speed offset from normal.
    pub speed: i32,
    /// Energy still needed before the next turn.
    pub need: i32,
    /// Player currently sees this monster.
    pub(crate) visible: bool,
}

/// Handle to a monster slot.
///
/// Handles stay valid through a world tick. Removed monsters are compacted
/// away between ticks and the remaining ones renumbered, so don't hold on
/// to handles across ticks.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MobId(pub(crate) usize);

impl MobId {
    pub fn get<'a>(&self, r: &'a impl AsRef<Runtime>) -> Option<&'a Mob> {
        r.as_ref().mobs.get(self.0)?.as_ref()
    }

    fn get_mut<'a>(
        &self,
        r: &'a mut impl AsMut<Runtime>,
    ) -> Option<&'a mut Mob> {
        r.as_mut().mobs.get_mut(self.0)?.as_mut()
    }

    pub fn is_alive(&self, r: &impl AsRef<Runtime>) -> bool {
        self.get(r).is_some()
    }

    pub fn pos(&self, r: &impl AsRef<Runtime>) -> Option<IVec2> {
        self.get(r).map(|m| m.pos)
    }

    /// Player can see this monster.
    pub fn is_visible(&self, r: &impl AsRef<Runtime>) -> bool {
        self.get(r).is_some_and(|m| m.visible)
    }

    pub fn set_speed(&self, r: &mut impl AsMut<Runtime>, speed: i32) {
        if let Some(m) = self.get_mut(r) {
            m.speed = speed;
        }
    }

    /// Remove the monster, its slot is freed on the next compaction.
    pub fn kill(&self, r: &mut impl AsMut<Runtime>) {
        let r = r.as_mut();
        let Some(mob) = r.mobs.get_mut(self.0).and_then(Option::take) else {
            return;
        };
        log::debug!("mob {}: removed at {}", self.0, mob.pos);
        r.redraw(mob.pos);
    }

    /// Put the monster on another cell without checking terrain.
    ///
    /// Return false if the cell is outside the floor or taken.
    pub fn place(&self, r: &mut impl AsMut<Runtime>, pos: IVec2) -> bool {
        let r = r.as_mut();
        if !r.floor.contains(pos)
            || pos == r.player.pos
            || r.mob_at(pos).is_some()
        {
            return false;
        }
        let Some(mob) = self.get_mut(r) else {
            return false;
        };

        let old = std::mem::replace(&mut mob.pos, pos);
        r.redraw(old);
        r.redraw(pos);
        r.update_mob(*self, true);
        true
    }
}

impl Runtime {
    /// Add a monster to the floor.
    ///
    /// Return `None` if the cell is outside the floor, taken, or terrain the
    /// monster can't stand on.
    pub fn spawn_mob(&mut self, pos: IVec2, mover: Mover) -> Option<MobId> {
        let terrain = self.floor.terrain(pos)?;
        if !terrain.can_enter(mover)
            || pos == self.player.pos
            || self.mob_at(pos).is_some()
        {
            log::warn!("spawn_mob: can't put {mover:?} monster at {pos}");
            return None;
        }

        let id = MobId(self.mobs.len());
        self.mobs.push(Some(Mob {
            pos,
            mover,
            speed: 0,
            need: TURN_ENERGY,
            visible: false,
        }));
        log::debug!("mob {}: spawned at {pos}", id.0);

        self.update_mob(id, false);
        Some(id)
    }

    pub fn mob_at(&self, pos: IVec2) -> Option<MobId> {
        self.mobs
            .iter()
            .position(|m| m.as_ref().is_some_and(|m| m.pos == pos))
            .map(MobId)
    }

    /// Live monsters in processing order.
    pub fn mobs(&self) -> impl Iterator<Item = MobId> + '_ {
        self.mobs
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_some())
            .map(|(i, _)| MobId(i))
    }

    pub(crate) fn update_mobs(&mut self) {
        for i in 0..self.mobs.len() {
            self.update_mob(MobId(i), false);
        }
    }

    /// Recheck whether the player sees a monster and disturb if something
    /// about it caught their eye.
    pub(crate) fn update_mob(&mut self, id: MobId, moved: bool) {
        let Some(pos) = id.pos(self) else { return };

        let seen = self.player_can_see(pos);
        let changed = id.is_visible(self) != seen;

        if changed {
            if let Some(m) = id.get_mut(self) {
                m.visible = seen;
            }
            log::trace!("mob {}: visible {seen}", id.0);
            self.redraw(pos);

            if self.options.disturb_near {
                self.disturb(true, true);
            }
        }

        if moved
            && seen
            && (self.options.disturb_move
                || (self.player_has_los(pos) && self.options.disturb_near))
        {
            self.disturb(false, true);
        }
    }

    /// Step a monster to a neighboring cell, no checks.
    pub(crate) fn move_mob(&mut self, id: MobId, dir: IVec2) {
        let Some(mob) = id.get_mut(self) else { return };
        let old = mob.pos;
        mob.pos += dir;
        let new = mob.pos;

        self.redraw(old);
        self.redraw(new);
        self.update_mob(id, true);
    }

    /// Drop removed monsters, renumbering the rest.
    pub(crate) fn compact_mobs(&mut self) {
        let n = self.mobs.len();
        self.mobs.retain(Option::is_some);
        if self.mobs.len() != n {
            log::trace!("mobs: compacted {} slots", n - self.mobs.len());
        }
    }
}
