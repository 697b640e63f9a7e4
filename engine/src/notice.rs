use crate::prelude::*;

/// Things the presentation layer should know about.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Notice {
    /// Cell appearance may have changed.
    Redraw(IVec2),
    /// Player remembered a new cell.
    Memorized(IVec2),
    /// View panel moved to a new origin.
    PanelShift(IVec2),
    /// Player's status effects or occupation changed.
    Status,
    /// Hit points fell below the warning threshold.
    HitpointWarning,
    /// A command was declined without spending time.
    Refused(Refusal),
}

impl Runtime {
    /// Queue a redraw notice, at most one is pending per cell.
    pub(crate) fn redraw(&mut self, pos: IVec2) {
        if !self.floor.contains(pos) || self.floor.has(pos, CellFlags::REDRAW)
        {
            return;
        }
        self.floor.insert(pos, CellFlags::REDRAW);
        self.notices.push(Notice::Redraw(pos));
    }

    /// Queue a memorization notice, at most one is pending per cell.
    pub(crate) fn memorized(&mut self, pos: IVec2) {
        if !self.floor.contains(pos)
            || self.floor.has(pos, CellFlags::MEMORIZE)
        {
            return;
        }
        self.floor.insert(pos, CellFlags::MEMORIZE);
        self.notices.push(Notice::Memorized(pos));
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Redraw(pos) => self.redraw(pos),
            Notice::Memorized(pos) => self.memorized(pos),
            _ => self.notices.push(notice),
        }
    }

    /// Drain the pending notices in the order they were raised.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        let ret = std::mem::take(&mut self.notices);
        for n in &ret {
            match *n {
                Notice::Redraw(pos) => {
                    self.floor.remove(pos, CellFlags::REDRAW)
                }
                Notice::Memorized(pos) => {
                    self.floor.remove(pos, CellFlags::MEMORIZE)
                }
                _ => {}
            }
        }
        ret
    }

    /// Look at pending notices without draining them.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}
