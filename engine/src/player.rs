//! Player state and status effects.

use std::collections::BTreeMap;

use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

use crate::{prelude::*, run::RunState, travel::Travel};

/// Status effects.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Serialize,
    Deserialize,
)]
pub enum Buff {
    Blind,
    Paralyzed,
    Hasted,
    Slowed,
}

impl Buff {
    /// Derived state that needs recomputing when the effect starts or ends.
    pub(crate) fn updates(self) -> Update {
        match self {
            Buff::Blind => {
                Update::FORGET_VIEW
                    | Update::FORGET_LITE
                    | Update::VIEW
                    | Update::LITE
                    | Update::MONSTERS
            }
            Buff::Paralyzed | Buff::Hasted | Buff::Slowed => Update::empty(),
        }
    }
}

/// Active status effects with the instants they run out at.
#[derive(Clone, Default, Debug, Deref, DerefMut, Serialize, Deserialize)]
pub struct Buffs(BTreeMap<Buff, Instant>);

/// The player character.
#[derive(Clone, Debug)]
pub struct Player {
    pub pos: IVec2,
    pub hp: i32,
    pub mhp: i32,
    /// Base speed, status effects modify this.
    pub speed: i32,
    /// Energy still needed before the next turn, can act at zero or below.
    pub need: i32,
    /// Radius of carried light source.
    pub light: i32,
    pub buffs: Buffs,

    pub(crate) dead: bool,
    /// Light radius in effect, depends on the light source and running.
    pub(crate) cur_light: i32,

    pub(crate) resting: Option<Rest>,
    pub(crate) fishing: i32,
    pub(crate) searching: bool,
    pub(crate) repeat: i32,
    pub(crate) last_command: Option<Command>,
    pub(crate) running: Option<RunState>,
    pub(crate) travel: Option<Travel>,
}

impl Default for Player {
    fn default() -> Self {
        Player {
            pos: IVec2::ZERO,
            hp: 20,
            mhp: 20,
            speed: 0,
            need: 0,
            light: 2,
            buffs: Default::default(),
            dead: false,
            cur_light: 0,
            resting: None,
            fishing: 0,
            searching: false,
            repeat: 0,
            last_command: None,
            running: None,
            travel: None,
        }
    }
}

impl Player {
    pub fn has_buff(&self, buff: Buff) -> bool {
        self.buffs.contains_key(&buff)
    }

    pub fn is_blind(&self) -> bool {
        self.has_buff(Buff::Blind)
    }

    pub fn is_paralyzed(&self) -> bool {
        self.has_buff(Buff::Paralyzed)
    }

    /// Speed with status effects applied.
    pub fn effective_speed(&self) -> i32 {
        let mut speed = self.speed;
        if self.has_buff(Buff::Hasted) {
            speed += 10;
        }
        if self.has_buff(Buff::Slowed) {
            speed -= 10;
        }
        speed
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_resting(&self) -> bool {
        self.resting.is_some()
    }

    pub fn is_fishing(&self) -> bool {
        self.fishing > 0
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn is_traveling(&self) -> bool {
        self.travel.is_some()
    }

    /// Remaining repeats of the last command.
    pub fn repeat_count(&self) -> i32 {
        self.repeat
    }

    /// Light radius currently in effect.
    pub fn light_radius(&self) -> i32 {
        self.cur_light
    }

    /// Player is doing something that spans turns without new commands.
    pub fn is_busy(&self) -> bool {
        self.is_resting()
            || self.is_fishing()
            || self.is_running()
            || self.is_traveling()
            || self.repeat > 0
    }

    /// Nothing left to rest for.
    pub(crate) fn is_rested(&self) -> bool {
        self.hp >= self.mhp
            && !self.is_blind()
            && !self.is_paralyzed()
            && !self.has_buff(Buff::Slowed)
    }

    /// Drop all per-floor continuous actions.
    pub(crate) fn stop_everything(&mut self) {
        self.resting = None;
        self.fishing = 0;
        self.repeat = 0;
        self.running = None;
        self.travel = None;
    }
}

impl Runtime {
    /// Start or extend a status effect lasting the given number of game
    /// turns.
    pub fn inc_timed(&mut self, buff: Buff, turns: i64) {
        if turns <= 0 {
            return;
        }
        let until = self.now.after_turns(turns);
        let started = !self.player.has_buff(buff);

        let e = self.player.buffs.entry(buff).or_insert(until);
        *e = (*e).max(until);

        if started {
            log::debug!("player: {buff:?} starts");
            self.status_changed(buff);
        }
    }

    /// End a status effect early.
    pub fn clear_timed(&mut self, buff: Buff) {
        if self.player.buffs.remove(&buff).is_some() {
            log::debug!("player: {buff:?} ends");
            self.status_changed(buff);
        }
    }

    /// Remove status effects that have run out.
    pub(crate) fn expire_buffs(&mut self) {
        let now = self.now;
        let expired: Vec<Buff> = self
            .player
            .buffs
            .iter()
            .filter(|(_, t)| **t <= now)
            .map(|(&b, _)| b)
            .collect();

        for b in expired {
            self.clear_timed(b);
        }
    }

    fn status_changed(&mut self, buff: Buff) {
        self.disturb(false, false);
        self.update |= buff.updates();
        self.notify(Notice::Status);
    }

    /// Change the radius of the carried light source.
    pub fn set_light(&mut self, radius: i32) {
        let radius = radius.max(0);
        if radius == self.player.light {
            return;
        }
        let went_out = radius == 0;
        self.player.light = radius;
        self.update |= Update::TORCH;
        if went_out {
            self.disturb(false, false);
        }
    }

    /// Take damage from an outside source.
    pub fn hurt_player(&mut self, damage: i32) {
        if damage <= 0 || self.player.dead {
            return;
        }

        self.disturb(true, true);
        self.player.hp -= damage;

        if self.player.hp <= 0 {
            log::debug!("player: died");
            self.player.dead = true;
            return;
        }

        let warn = self.player.mhp * self.options.hitpoint_warn / 10;
        if self.player.hp < warn {
            self.notify(Notice::HitpointWarning);
        }
    }

    /// A trap went off at `pos`.
    pub fn trap_fired(&mut self, pos: IVec2) {
        if !self.floor.contains(pos) {
            log::warn!("trap_fired: {pos} is outside floor");
            return;
        }
        self.floor.insert(pos, CellFlags::UNSAFE);
        self.redraw(pos);
        self.disturb(true, true);
    }

    /// Regain hit points while resting, once per game turn.
    pub(crate) fn regenerate(&mut self) {
        if self.player.is_resting() && self.player.hp < self.player.mhp {
            self.player.hp += 1;
        }
    }
}
