use bitflags::bitflags;

use crate::{mob::Mob, panel::Panel, player::Player, prelude::*, FlowField};

bitflags! {
    /// Derived state waiting to be recomputed by `Runtime::update_stuff`.
    #[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
    pub struct Update: u8 {
        /// Recompute the light radius in effect.
        const TORCH = 1 << 0;
        const FORGET_VIEW = 1 << 1;
        const FORGET_LITE = 1 << 2;
        const VIEW = 1 << 3;
        const LITE = 1 << 4;
        /// Invalidate the flow fields.
        const FLOW = 1 << 5;
        /// Recompute which monsters the player can see.
        const MONSTERS = 1 << 6;
        /// Check that the player is still inside the view panel.
        const PANEL = 1 << 7;
    }
}

/// Main data container for the simulation of the currently loaded floor.
#[derive(Clone, Debug)]
pub struct Runtime {
    pub(crate) now: Instant,
    pub(crate) options: Options,

    pub(crate) floor: Floor,
    pub(crate) player: Player,
    /// Monster slots, removed monsters leave a `None` until compaction.
    pub(crate) mobs: Vec<Option<Mob>>,

    pub(crate) view: IndexSet<IVec2>,
    pub(crate) lite: IndexSet<IVec2>,
    pub(crate) pursuit: FlowField,
    pub(crate) travel_flow: FlowField,

    pub(crate) notices: Vec<Notice>,
    pub(crate) update: Update,
    pub(crate) panel: Panel,

    pub(crate) phase: Phase,
    pub(crate) quit: bool,
    pub(crate) leaving: bool,
    /// A disturbance cancelled something since the last input request.
    pub(crate) interrupted: bool,
    /// Queued input should be discarded.
    pub(crate) flush_pending: bool,
}

impl AsRef<Runtime> for Runtime {
    fn as_ref(&self) -> &Runtime {
        self
    }
}

impl AsMut<Runtime> for Runtime {
    fn as_mut(&mut self) -> &mut Runtime {
        self
    }
}

impl Runtime {
    /// Start a session on the given floor with a fresh player.
    pub fn new(layout: Layout, options: Options) -> Self {
        let mut ret = Runtime {
            now: Default::default(),
            panel: Panel::new(options.panel_size),
            options,
            floor: Default::default(),
            player: Default::default(),
            mobs: Default::default(),
            view: Default::default(),
            lite: Default::default(),
            pursuit: Default::default(),
            travel_flow: Default::default(),
            notices: Default::default(),
            update: Default::default(),
            phase: Phase::Idle,
            quit: false,
            leaving: false,
            interrupted: false,
            flush_pending: false,
        };
        ret.enter_floor(layout);
        ret
    }

    /// Load a new floor, the player keeps their stats and status effects.
    pub fn enter_floor(&mut self, layout: Layout) {
        if self.floor.size() != IVec2::ZERO {
            self.leave_floor();
        }

        log::debug!(
            "runtime: entering {}x{} floor at {}",
            layout.floor.width(),
            layout.floor.height(),
            layout.player
        );

        self.floor = layout.floor;
        self.player.pos = layout.player;
        self.pursuit = FlowField::new(self.floor.size());
        self.travel_flow = FlowField::new(self.floor.size());
        self.panel = Panel::new(self.options.panel_size);
        self.leaving = false;
        self.phase = Phase::Idle;

        for (pos, mover) in layout.monsters {
            self.spawn_mob(pos, mover);
        }

        self.update |= Update::TORCH
            | Update::VIEW
            | Update::LITE
            | Update::FLOW
            | Update::MONSTERS
            | Update::PANEL;
        self.update_stuff();
    }

    /// Tear down everything tied to the current floor.
    pub fn leave_floor(&mut self) {
        log::debug!("runtime: leaving floor");
        self.forget_view();
        self.forget_lite();
        self.mobs.clear();
        self.pursuit.clear();
        self.travel_flow.clear();
        self.player.stop_everything();
        self.update = Update::empty();
        // Redraws from forgetting the view point at the old floor.
        self.notices.clear();
        self.interrupted = false;
        self.flush_pending = false;
    }

    /// Recompute derived state that has been flagged as stale.
    pub fn update_stuff(&mut self) {
        // Later steps may flag earlier ones again, go around until settled.
        for _failsafe in 0..4 {
            if self.update.is_empty() {
                return;
            }

            if self.take_update(Update::TORCH) {
                self.calc_light();
            }
            if self.take_update(Update::FORGET_VIEW) {
                self.forget_view();
            }
            if self.take_update(Update::FORGET_LITE) {
                self.forget_lite();
            }
            if self.take_update(Update::VIEW) {
                self.update_view();
            }
            if self.take_update(Update::LITE) {
                self.update_lite();
            }
            if self.take_update(Update::FLOW) {
                self.pursuit.invalidate();
                self.travel_flow.invalidate();
            }
            if self.take_update(Update::MONSTERS) {
                self.update_mobs();
            }
            if self.take_update(Update::PANEL)
                && self.verify_panel()
                && self.options.disturb_panel
            {
                self.disturb(false, false);
            }
        }

        if !self.update.is_empty() {
            log::warn!("update_stuff: did not settle, {:?}", self.update);
        }
    }

    fn take_update(&mut self, flag: Update) -> bool {
        let ret = self.update.contains(flag);
        self.update.remove(flag);
        ret
    }

    /// Work out the light radius in effect.
    fn calc_light(&mut self) {
        let mut light = self.player.light;
        if self.player.is_running()
            && self.options.reduce_light_while_running
            && light > 1
        {
            light = 1;
        }

        if light != self.player.cur_light {
            self.player.cur_light = light;
            self.update |= Update::LITE;
        }
    }

    /// Step the player to a neighboring cell, no checks.
    pub(crate) fn move_player(&mut self, dir: IVec2) {
        let old = self.player.pos;
        self.player.pos += dir;
        self.redraw(old);
        self.redraw(self.player.pos);
        self.update |=
            Update::VIEW | Update::LITE | Update::PANEL | Update::MONSTERS;
    }

    /// Change the terrain of a cell on the live floor.
    pub fn set_terrain(&mut self, pos: IVec2, terrain: Terrain) {
        if self.floor.set_terrain(pos, terrain) {
            self.redraw(pos);
            self.update |= Update::VIEW | Update::LITE | Update::FLOW;
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable access to the player for outside subsystems. Changes that
    /// affect derived state need to be followed by flagging `Update` bits.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Flag derived state for recomputation on the next `update_stuff`.
    pub fn request_update(&mut self, update: Update) {
        self.update |= update;
    }

    pub fn pending_update(&self) -> Update {
        self.update
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving
    }

    pub fn has_quit(&self) -> bool {
        self.quit
    }

    /// Queued input should be discarded by the input layer.
    pub fn take_flush(&mut self) -> bool {
        std::mem::take(&mut self.flush_pending)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ROOM: &str = "
        ########
        #@.....#
        #......#
        ########";

    #[test]
    fn session_start() {
        let r = Runtime::new(Floor::parse(ROOM).unwrap(), Options::default());
        assert!(r.pending_update().is_empty());
        assert_eq!(r.player().light_radius(), 2);
        assert!(r.floor().has(ivec2(1, 1), CellFlags::VIEW | CellFlags::LITE));
        assert!(r.view().contains(&ivec2(6, 2)));
    }

    #[test]
    fn terrain_change_flags_updates() {
        let mut r =
            Runtime::new(Floor::parse(ROOM).unwrap(), Options::default());
        r.refresh_pursuit_flow();
        r.set_terrain(ivec2(3, 1), Terrain::Granite);
        assert!(r.pending_update().contains(Update::VIEW | Update::FLOW));
        r.update_stuff();
        assert!(!r.pursuit_flow().is_valid());
        assert!(r.pending_update().is_empty());

        // No change, nothing flagged.
        r.set_terrain(ivec2(3, 1), Terrain::Granite);
        assert!(r.pending_update().is_empty());
    }

    #[test]
    fn light_while_running() {
        let mut r = Runtime::new(
            Floor::parse(ROOM).unwrap(),
            Options {
                reduce_light_while_running: true,
                ..Default::default()
            },
        );
        r.set_light(3);
        r.update_stuff();
        assert_eq!(r.player().light_radius(), 3);

        r.execute(Command::Run(ivec2(1, 0)));
        r.update_stuff();
        assert_eq!(r.player().light_radius(), 1);
    }

    #[test]
    fn reentry_keeps_player() {
        let mut r =
            Runtime::new(Floor::parse(ROOM).unwrap(), Options::default());
        r.player_mut().hp = 7;
        r.execute(Command::Rest(Rest::Turns(5)));
        assert!(r.player().is_resting());

        r.enter_floor(Floor::parse("#@m.#").unwrap());
        assert_eq!(r.player().hp, 7);
        assert!(!r.player().is_resting());
        assert_eq!(r.player().pos, ivec2(1, 0));
        assert_eq!(r.mobs().count(), 1);
        assert!(!r.floor().has(ivec2(6, 2), CellFlags::VIEW));
    }

    #[test]
    fn smaller_floor_gets_no_stale_notices() {
        let mut r = Runtime::new(
            Floor::parse(ROOM).unwrap(),
            Options {
                flush_on_disturb: true,
                ..Default::default()
            },
        );
        r.execute(Command::Rest(Rest::Turns(5)));
        r.hurt_player(1);

        r.enter_floor(Floor::parse("#@.#").unwrap());
        assert!(!r.take_flush());
        for notice in r.take_notices() {
            if let Notice::Redraw(pos) | Notice::Memorized(pos) = notice {
                assert!(r.floor().contains(pos), "{notice:?} off the floor");
            }
        }
    }
}
