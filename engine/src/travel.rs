//! Automatic travel to a destination cell.

use crate::{player::Player, prelude::*, TURN_ENERGY};

#[derive(Clone, Debug)]
pub(crate) struct Travel {
    dest: IVec2,
    /// Upper bound on steps still needed, the route cost when started.
    steps_left: i32,
}

impl Travel {
    pub(crate) fn new(dest: IVec2, steps_left: i32) -> Self {
        Travel { dest, steps_left }
    }
}

impl Player {
    /// Where the player is traveling to.
    pub fn travel_destination(&self) -> Option<IVec2> {
        self.travel.as_ref().map(|t| t.dest)
    }

    pub fn travel_steps_left(&self) -> i32 {
        self.travel.as_ref().map_or(0, |t| t.steps_left)
    }
}

impl Runtime {
    /// Start traveling to `dest` and take the first step.
    pub(crate) fn travel(&mut self, dest: IVec2) -> i32 {
        if !self.floor.contains(dest) {
            return self.refuse(Refusal::OutOfBounds);
        }
        if dest == self.player.pos {
            return 0;
        }
        if !self.refresh_travel_flow(dest) {
            return self.refuse(Refusal::NoRoute);
        }

        let steps = self
            .travel_flow
            .cost(Mover::Ground, self.player.pos)
            .unwrap_or_default();
        log::debug!("travel: to {dest}, cost {steps}");
        self.player.travel = Some(Travel::new(dest, steps));
        self.travel_step()
    }

    /// Take the next step towards the travel destination.
    ///
    /// Return the energy used, zero when travel ended.
    pub(crate) fn travel_step(&mut self) -> i32 {
        let Some(Travel { dest, steps_left }) = self.player.travel.clone()
        else {
            return 0;
        };

        if self.player.pos == dest {
            log::debug!("travel: arrived at {dest}");
            self.player.travel = None;
            return 0;
        }

        let dir = if steps_left > 0 && self.refresh_travel_flow(dest) {
            self.travel_direction()
        } else {
            None
        };
        let Some(dir) = dir else {
            log::debug!("travel: lost route to {dest}");
            self.notify(Notice::Refused(Refusal::NoRoute));
            self.disturb(false, true);
            return 0;
        };

        let next = self.player.pos + dir;
        if self.floor.terrain(next) == Some(Terrain::ClosedDoor) {
            self.set_terrain(next, Terrain::OpenDoor);
            return TURN_ENERGY;
        }
        if self.mob_at(next).is_some() {
            log::debug!("travel: blocked at {next}");
            self.disturb(false, true);
            return 0;
        }

        self.move_player(dir);
        if let Some(t) = self.player.travel.as_mut() {
            t.steps_left -= 1;
        }
        if self.player.pos == dest {
            log::debug!("travel: arrived at {dest}");
            self.player.travel = None;
        }
        TURN_ENERGY
    }

    /// Neighbor with the lowest travel cost below the current cell's.
    fn travel_direction(&self) -> Option<IVec2> {
        let pos = self.player.pos;
        let mut best_cost = self.travel_flow.cost(Mover::Ground, pos)?;
        let mut best = None;

        for dir in DIR_8 {
            let Some(cost) = self.travel_flow.cost(Mover::Ground, pos + dir)
            else {
                continue;
            };
            if cost < best_cost {
                best_cost = cost;
                best = Some(dir);
            }
        }
        best
    }
}
