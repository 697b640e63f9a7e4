//! Player's view and torchlight bookkeeping.

use crate::prelude::*;

impl Runtime {
    /// Recompute the set of cells in the player's line of sight.
    ///
    /// Cells entering the view are noted and redrawn, cells leaving it are
    /// redrawn.
    pub(crate) fn update_view(&mut self) {
        let old = std::mem::take(&mut self.view);
        for &pos in &old {
            self.floor.insert(pos, CellFlags::TEMP);
            self.floor.remove(pos, CellFlags::VIEW);
        }

        // Nothing on the floor is further away than this.
        let radius = self
            .options
            .sight_radius
            .min(self.floor.width() + self.floor.height());
        let seen = if self.player.is_blind() {
            Vec::new()
        } else {
            fov::field_of_view(&self.floor, self.player.pos, radius)
        };

        for &pos in &seen {
            self.floor.insert(pos, CellFlags::VIEW);
        }

        for &pos in &seen {
            if !self.floor.has(pos, CellFlags::TEMP) {
                self.note_spot(pos);
                self.redraw(pos);
            }
        }

        for &pos in &old {
            if !self.floor.has(pos, CellFlags::VIEW) {
                self.redraw(pos);
            }
            self.floor.remove(pos, CellFlags::TEMP);
        }

        self.view = seen.into_iter().collect();
        self.update |= Update::MONSTERS;
        log::trace!("view: {} cells", self.view.len());
    }

    /// Recompute the cells lit by the player's light source.
    ///
    /// Only cells in view can be lit, so this expects a current view.
    pub(crate) fn update_lite(&mut self) {
        let old = std::mem::take(&mut self.lite);
        for &pos in &old {
            self.floor.insert(pos, CellFlags::TEMP);
            self.floor.remove(pos, CellFlags::LITE);
        }

        let origin = self.player.pos;
        let radius = self.player.cur_light;
        let lit: Vec<IVec2> = if self.player.is_blind() || radius <= 0 {
            Vec::new()
        } else {
            self.view
                .iter()
                .copied()
                .filter(|&p| fov::distance(p, origin) <= radius)
                .collect()
        };

        for &pos in &lit {
            self.floor.insert(pos, CellFlags::LITE);
        }

        for &pos in &lit {
            if !self.floor.has(pos, CellFlags::TEMP) {
                self.note_spot(pos);
                self.redraw(pos);
            }
        }

        for &pos in &old {
            if !self.floor.has(pos, CellFlags::LITE) {
                self.redraw(pos);
            }
            self.floor.remove(pos, CellFlags::TEMP);
        }

        self.lite = lit.into_iter().collect();
        self.update |= Update::MONSTERS;
        log::trace!("lite: {} cells", self.lite.len());
    }

    /// Clear the view set, redrawing everything that was in it.
    pub(crate) fn forget_view(&mut self) {
        for pos in std::mem::take(&mut self.view) {
            self.floor.remove(pos, CellFlags::VIEW);
            self.redraw(pos);
        }
    }

    pub(crate) fn forget_lite(&mut self) {
        for pos in std::mem::take(&mut self.lite) {
            self.floor.remove(pos, CellFlags::LITE);
            self.redraw(pos);
        }
    }

    /// Memorize a cell the player is looking at if the memorization policy
    /// allows.
    pub(crate) fn note_spot(&mut self, pos: IVec2) {
        if self.player.is_blind() {
            return;
        }

        let flags = self.floor.flags(pos);
        if !flags.contains(CellFlags::LITE)
            && !flags.contains(CellFlags::VIEW | CellFlags::GLOW)
        {
            return;
        }
        if flags.contains(CellFlags::MARK) {
            return;
        }
        let Some(terrain) = self.floor.terrain(pos) else {
            return;
        };

        let remember = terrain.is_interesting()
            || (self.options.remember_torch_lit
                && flags.contains(CellFlags::LITE))
            || (self.options.remember_glowing
                && flags.contains(CellFlags::GLOW));

        if remember {
            self.floor.insert(pos, CellFlags::MARK);
            self.memorized(pos);
        }
    }

    /// Cell is in the player's line of sight, whether it's lit or not.
    pub fn player_has_los(&self, pos: IVec2) -> bool {
        self.floor.has(pos, CellFlags::VIEW)
    }

    /// Player perceives the cell right now.
    ///
    /// A glowing cell that blocks sight is only seen if the cell next to it
    /// in the player's direction also glows, so a lit room's walls don't
    /// show up when looking in from a dark corridor.
    pub fn player_can_see(&self, pos: IVec2) -> bool {
        if self.player.is_blind() {
            return false;
        }

        let flags = self.floor.flags(pos);
        if flags.contains(CellFlags::LITE) {
            return true;
        }
        if !flags.contains(CellFlags::VIEW | CellFlags::GLOW) {
            return false;
        }
        if self.floor.terrain(pos).is_some_and(|t| t.is_floor_like()) {
            return true;
        }

        let toward = pos + (self.player.pos - pos).signum();
        self.floor.has(toward, CellFlags::GLOW)
    }

    /// Cells in the player's line of sight, origin first.
    pub fn view(&self) -> &IndexSet<IVec2> {
        &self.view
    }

    /// Cells lit by the player's light source.
    pub fn lite(&self) -> &IndexSet<IVec2> {
        &self.lite
    }
}
