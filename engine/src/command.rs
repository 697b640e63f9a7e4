//! Player commands and their immediate effects.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{prelude::*, TURN_ENERGY};

/// Player intent supplied by the input layer.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Command {
    /// Step to a neighboring cell, opening a closed door in the way.
    Walk(IVec2),
    /// Stay in place for a turn.
    Hold,
    Open(IVec2),
    Close(IVec2),
    Rest(Rest),
    /// Run along a corridor in a direction.
    Run(IVec2),
    /// Walk automatically to a destination cell.
    Travel(IVec2),
    /// Toggle search mode.
    Search,
    /// Fish for the given number of turns.
    Fish(i32),
    /// Repeat the last repeatable command this many times.
    Repeat(i32),
    /// Take the stairs the player is standing on.
    TakeStairs,
    Quit,
}

impl Command {
    /// Whether the command can be repeated with `Command::Repeat`.
    pub fn is_repeatable(&self) -> bool {
        matches!(
            self,
            Command::Walk(_)
                | Command::Hold
                | Command::Open(_)
                | Command::Close(_)
        )
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Rest {
    /// Rest for a fixed number of turns.
    Turns(i32),
    /// Rest until hit points are full and no debilitating effect remains.
    AsNeeded,
}

/// Reasons for declining a command.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum Refusal {
    #[strum(to_string = "There is a wall in the way.")]
    Wall,
    #[strum(to_string = "The door is stuck.")]
    Stuck,
    #[strum(to_string = "There is no door there.")]
    NoDoor,
    #[strum(to_string = "Something is in the way.")]
    Occupied,
    #[strum(to_string = "You cannot run in that direction.")]
    CannotRun,
    #[strum(to_string = "You can't find a way there.")]
    NoRoute,
    #[strum(to_string = "There are no stairs here.")]
    NoStairs,
    #[strum(to_string = "There is nothing to repeat.")]
    NothingToRepeat,
    #[strum(to_string = "That is not a direction.")]
    BadDirection,
    #[strum(to_string = "That is off the map.")]
    OutOfBounds,
}

/// Source of player commands.
pub trait Commander {
    /// Next command for a player who is ready to act, `None` if the input
    /// layer has nothing yet.
    fn next_command(&mut self, r: &Runtime) -> Option<Command>;

    /// Whether there's input waiting that should interrupt continuous
    /// actions.
    fn has_pending_input(&mut self) -> bool {
        false
    }

    /// Discard queued input.
    fn flush(&mut self) {}
}

/// A fixed queue of commands, for scripts and tests.
impl Commander for VecDeque<Command> {
    fn next_command(&mut self, _r: &Runtime) -> Option<Command> {
        self.pop_front()
    }

    fn flush(&mut self) {
        self.clear();
    }
}

impl Runtime {
    /// Perform a command, return the energy it used.
    ///
    /// Declined commands use no energy, they raise `Notice::Refused` and
    /// disturb.
    pub fn execute(&mut self, cmd: Command) -> i32 {
        log::trace!("player: {cmd:?}");

        if cmd.is_repeatable() {
            self.player.last_command = Some(cmd);
        }

        match cmd {
            Command::Walk(dir) => self.walk(dir),
            Command::Hold => TURN_ENERGY,
            Command::Open(dir) => self.open(dir),
            Command::Close(dir) => self.close(dir),
            Command::Rest(rest) => {
                match rest {
                    Rest::Turns(n) if n > 0 => self.player.resting = Some(rest),
                    Rest::AsNeeded if !self.player.is_rested() => {
                        self.player.resting = Some(rest)
                    }
                    _ => {}
                }
                self.notify(Notice::Status);
                0
            }
            Command::Run(dir) => self.run(dir),
            Command::Travel(dest) => self.travel(dest),
            Command::Search => {
                self.player.searching = !self.player.searching;
                self.notify(Notice::Status);
                0
            }
            Command::Fish(n) => {
                self.player.fishing = n.max(0);
                self.notify(Notice::Status);
                0
            }
            Command::Repeat(n) => {
                if self.player.last_command.is_some() {
                    self.player.repeat = n.max(0);
                    0
                } else {
                    self.refuse(Refusal::NothingToRepeat)
                }
            }
            Command::TakeStairs => {
                let on_stairs = self
                    .floor
                    .terrain(self.player.pos)
                    .is_some_and(|t| t.is_stairs());
                if on_stairs {
                    log::debug!("player: leaving floor");
                    self.leaving = true;
                    TURN_ENERGY
                } else {
                    self.refuse(Refusal::NoStairs)
                }
            }
            Command::Quit => {
                self.quit = true;
                0
            }
        }
    }

    /// Decline a command, return the zero energy it used.
    pub(crate) fn refuse(&mut self, why: Refusal) -> i32 {
        log::debug!("player: refused, {why:?}");
        self.notify(Notice::Refused(why));
        self.disturb(false, false);
        0
    }

    /// Resolve a direction command to its target cell.
    fn target(&mut self, dir: IVec2) -> Result<IVec2, i32> {
        if !dir.is_neighbor() {
            return Err(self.refuse(Refusal::BadDirection));
        }
        let pos = self.player.pos + dir;
        if !self.floor.contains(pos) {
            log::warn!("player: command targets {pos} outside floor");
            return Err(self.refuse(Refusal::OutOfBounds));
        }
        Ok(pos)
    }

    fn walk(&mut self, dir: IVec2) -> i32 {
        let pos = match self.target(dir) {
            Ok(pos) => pos,
            Err(e) => return e,
        };
        let Some(terrain) = self.floor.terrain(pos) else {
            return 0;
        };

        if terrain == Terrain::ClosedDoor {
            return self.open(dir);
        }
        if terrain == Terrain::SealedDoor {
            return self.refuse(Refusal::Stuck);
        }
        if !terrain.is_passable() {
            return self.refuse(Refusal::Wall);
        }
        if self.mob_at(pos).is_some() {
            return self.refuse(Refusal::Occupied);
        }

        self.move_player(dir);
        TURN_ENERGY
    }

    fn open(&mut self, dir: IVec2) -> i32 {
        let pos = match self.target(dir) {
            Ok(pos) => pos,
            Err(e) => return e,
        };
        match self.floor.terrain(pos) {
            Some(Terrain::ClosedDoor) => {
                self.set_terrain(pos, Terrain::OpenDoor);
                TURN_ENERGY
            }
            Some(Terrain::SealedDoor) => self.refuse(Refusal::Stuck),
            _ => self.refuse(Refusal::NoDoor),
        }
    }

    fn close(&mut self, dir: IVec2) -> i32 {
        let pos = match self.target(dir) {
            Ok(pos) => pos,
            Err(e) => return e,
        };
        match self.floor.terrain(pos) {
            Some(Terrain::OpenDoor) => {
                if self.mob_at(pos).is_some() {
                    return self.refuse(Refusal::Occupied);
                }
                self.set_terrain(pos, Terrain::ClosedDoor);
                TURN_ENERGY
            }
            _ => self.refuse(Refusal::NoDoor),
        }
    }
}
