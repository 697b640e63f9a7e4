//! Energy based turn scheduling.
//!
//! Every world tick each actor gains energy according to its speed. An
//! actor whose energy need is at or below zero gets a turn and pays for it
//! by adding the action's cost back onto its need. The player always goes
//! first within a tick, then monsters in slot order.

use crate::{prelude::*, time::energy_per_tick, TURN_ENERGY};

/// Where the scheduler stopped.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub enum Phase {
    /// Between turns, waiting for energy.
    #[default]
    Idle,
    /// Player can act and is waiting for a command.
    Ready,
    /// Player is carrying out an action.
    Acting,
    /// Player was doing something on autopilot and got disturbed. They're
    /// ready for a new command.
    Interrupted,
    /// Player died, quit or is leaving the floor.
    Terminated,
}

impl Runtime {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Nothing more happens on this floor.
    pub fn is_terminated(&self) -> bool {
        self.player.is_dead() || self.quit || self.leaving
    }

    /// Run the world until the player needs to decide something or the
    /// session ends.
    pub fn advance(&mut self, input: &mut impl Commander) -> Phase {
        loop {
            if let Some(phase) = self.tick(input) {
                return phase;
            }
        }
    }

    /// Like `advance`, but give up after `n` world ticks and return
    /// `Phase::Idle`.
    pub fn run_ticks(&mut self, input: &mut impl Commander, n: usize) -> Phase {
        for _ in 0..n {
            if let Some(phase) = self.tick(input) {
                return phase;
            }
        }
        self.phase
    }

    /// Run one world tick.
    ///
    /// If the player is waiting for input or the session ends, stop early
    /// and return the phase. Calling again resumes the same tick from the
    /// player's turn.
    fn tick(&mut self, input: &mut impl Commander) -> Option<Phase> {
        while self.player.need <= 0 {
            self.update_stuff();
            if self.is_terminated() {
                return Some(self.terminate());
            }

            let Some(energy) = self.player_turn(input) else {
                return Some(self.phase);
            };
            self.player.need += energy;

            self.update_stuff();
            if self.is_terminated() {
                return Some(self.terminate());
            }
        }
        self.phase = Phase::Idle;

        self.refresh_pursuit_flow();
        self.process_monsters();
        self.update_stuff();
        if self.is_terminated() {
            return Some(self.terminate());
        }

        if self.now.is_turn_boundary() {
            self.process_world();
        }

        self.player.need -= energy_per_tick(self.player.effective_speed());
        for mob in self.mobs.iter_mut().flatten() {
            mob.need -= energy_per_tick(mob.speed);
        }
        self.now += 1;
        self.compact_mobs();

        None
    }

    fn terminate(&mut self) -> Phase {
        if self.phase != Phase::Terminated {
            log::debug!(
                "scheduler: terminated at {:?}, dead {} quit {} leaving {}",
                self.now,
                self.player.is_dead(),
                self.quit,
                self.leaving
            );
        }
        self.phase = Phase::Terminated;
        self.phase
    }

    /// Give the player one turn.
    ///
    /// Return the energy used, or `None` if the player needs to be asked
    /// for a command first.
    fn player_turn(&mut self, input: &mut impl Commander) -> Option<i32> {
        log::trace!("scheduler: player turn at {:?}", self.now);

        if self.player.is_busy() && input.has_pending_input() {
            self.disturb(false, true);
        }

        if self.player.resting == Some(Rest::AsNeeded)
            && self.player.is_rested()
        {
            self.player.resting = None;
            self.notify(Notice::Status);
        }

        if self.player.is_paralyzed() {
            return Some(TURN_ENERGY);
        }

        if let Some(rest) = self.player.resting {
            if let Rest::Turns(n) = rest {
                self.player.resting = (n > 1).then_some(Rest::Turns(n - 1));
                if n <= 1 {
                    self.notify(Notice::Status);
                }
            }
            return Some(TURN_ENERGY);
        }

        if self.player.fishing > 0 {
            self.player.fishing -= 1;
            if self.player.fishing == 0 {
                self.notify(Notice::Status);
            }
            return Some(TURN_ENERGY);
        }

        // Continuous actions that end without using energy fall through to
        // asking for a new command.
        if self.player.is_running() {
            let energy = self.run_step();
            if energy > 0 {
                return Some(energy);
            }
        }

        if self.player.is_traveling() {
            let energy = self.travel_step();
            if energy > 0 {
                return Some(energy);
            }
        }

        if self.player.repeat > 0 {
            self.player.repeat -= 1;
            if let Some(cmd) = self.player.last_command {
                let energy = self.execute(cmd);
                if energy > 0 {
                    return Some(energy);
                }
            }
        }

        if std::mem::take(&mut self.flush_pending) {
            input.flush();
        }

        if std::mem::take(&mut self.interrupted) {
            self.phase = Phase::Interrupted;
            return None;
        }

        let Some(cmd) = input.next_command(self) else {
            self.phase = Phase::Ready;
            return None;
        };
        self.phase = Phase::Acting;
        Some(self.execute(cmd))
    }

    /// Give every monster that has the energy a turn.
    fn process_monsters(&mut self) {
        for i in 0..self.mobs.len() {
            let id = MobId(i);
            let Some(need) = id.get(self).map(|m| m.need) else {
                continue;
            };
            if need > 0 {
                continue;
            }

            self.mob_act(id);
            if let Some(Some(mob)) = self.mobs.get_mut(i) {
                mob.need += TURN_ENERGY;
            }

            if self.is_terminated() {
                break;
            }
        }
    }

    /// Once per game turn upkeep.
    fn process_world(&mut self) {
        self.expire_buffs();
        self.regenerate();
    }
}

#[cfg(test)]
mod test {
    use std::collections::VecDeque;

    use super::*;
    use crate::Buff;

    const CORRIDOR: &str = "
        ############
        #@.........#
        ############";

    fn runtime(map: &str) -> Runtime {
        Runtime::new(Floor::parse(map).unwrap(), Options::default())
    }

    /// Holds forever and counts its turns.
    #[derive(Default)]
    struct Holder {
        turns: usize,
    }

    impl Commander for Holder {
        fn next_command(&mut self, _r: &Runtime) -> Option<Command> {
            self.turns += 1;
            Some(Command::Hold)
        }
    }

    /// Always has a key waiting.
    struct Impatient(VecDeque<Command>);

    impl Commander for Impatient {
        fn next_command(&mut self, _r: &Runtime) -> Option<Command> {
            self.0.pop_front()
        }

        fn has_pending_input(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn double_speed_gets_twice_the_turns() {
        let mut slow = runtime(CORRIDOR);
        let mut fast = runtime(CORRIDOR);
        fast.player_mut().speed = 10;

        let (mut a, mut b) = (Holder::default(), Holder::default());
        assert_eq!(slow.run_ticks(&mut a, 1000), Phase::Idle);
        assert_eq!(fast.run_ticks(&mut b, 1000), Phase::Idle);

        assert!((95..=105).contains(&a.turns), "{}", a.turns);
        assert!(
            (2 * a.turns - 5..=2 * a.turns + 5).contains(&b.turns),
            "{} vs {}",
            a.turns,
            b.turns
        );
    }

    #[test]
    fn resting_for_turns() {
        let mut r = runtime(CORRIDOR);
        let mut input = VecDeque::from([Command::Rest(Rest::Turns(3))]);
        assert_eq!(r.advance(&mut input), Phase::Ready);
        assert!(!r.player().is_resting());
        assert_eq!(r.now().ticks(), 3 * TICKS_PER_TURN);
    }

    #[test]
    fn resting_as_needed_regenerates() {
        let mut r = runtime(CORRIDOR);
        r.player_mut().hp = 15;
        let mut input = VecDeque::from([Command::Rest(Rest::AsNeeded)]);
        assert_eq!(r.advance(&mut input), Phase::Ready);
        assert_eq!(r.player().hp, r.player().mhp);
        assert!(!r.player().is_resting());
    }

    #[test]
    fn monster_interrupts_rest() {
        let mut r = runtime(
            "
            ############
            #@.......m.#
            ############",
        );
        let mut input = VecDeque::from([Command::Rest(Rest::Turns(100))]);
        assert_eq!(r.advance(&mut input), Phase::Interrupted);
        assert!(!r.player().is_resting());
        assert!(r.mobs().any(|m| m.is_visible(&r)));

        assert_eq!(r.advance(&mut input), Phase::Ready);
    }

    #[test]
    fn pending_input_interrupts() {
        let mut r = runtime(CORRIDOR);
        let mut input =
            Impatient(VecDeque::from([Command::Rest(Rest::Turns(10))]));
        assert_eq!(r.advance(&mut input), Phase::Interrupted);
        assert!(!r.player().is_resting());
    }

    #[test]
    fn repeating() {
        let mut r = runtime(CORRIDOR);
        let mut input = VecDeque::from([
            Command::Walk(ivec2(1, 0)),
            Command::Repeat(2),
        ]);
        assert_eq!(r.advance(&mut input), Phase::Ready);
        assert_eq!(r.player().pos, ivec2(4, 1));
    }

    #[test]
    fn paralysis_skips_input() {
        let mut r = runtime(CORRIDOR);
        r.inc_timed(Buff::Paralyzed, 3);
        let mut input = VecDeque::from([Command::Walk(ivec2(1, 0))]);
        assert_eq!(r.advance(&mut input), Phase::Ready);
        assert!(!r.player().is_paralyzed());
        assert_eq!(r.player().pos, ivec2(2, 1));
        assert!(r.now().ticks() > 3 * TICKS_PER_TURN);
    }

    #[test]
    fn termination() {
        let mut r = runtime(CORRIDOR);
        let mut input = VecDeque::from([Command::Quit]);
        assert_eq!(r.advance(&mut input), Phase::Terminated);
        assert!(r.has_quit());
        // Stays terminated.
        assert_eq!(r.advance(&mut input), Phase::Terminated);

        let mut r = runtime("#@>.#");
        let mut input =
            VecDeque::from([Command::Walk(ivec2(1, 0)), Command::TakeStairs]);
        assert_eq!(r.advance(&mut input), Phase::Terminated);
        assert!(r.is_leaving());

        r.enter_floor(Floor::parse("#.@#").unwrap());
        assert!(!r.is_terminated());
        assert_eq!(r.advance(&mut input), Phase::Ready);
    }

    #[test]
    fn death_ends_session() {
        let mut r = runtime(CORRIDOR);
        r.hurt_player(100);
        let mut input = VecDeque::from([Command::Hold]);
        assert_eq!(r.advance(&mut input), Phase::Terminated);
        assert_eq!(input.len(), 1);
    }
}
