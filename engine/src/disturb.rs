use crate::prelude::*;

impl Runtime {
    /// Something happened that the player should notice, stop whatever
    /// they're doing on autopilot.
    ///
    /// Searching is only stopped when `stop_search` is set and auto-travel
    /// only when `stop_travel` is set. Calling this repeatedly has the same
    /// effect as calling it once.
    pub fn disturb(&mut self, stop_search: bool, stop_travel: bool) {
        let mut cancelled = Vec::new();

        if self.player.repeat > 0 {
            self.player.repeat = 0;
            cancelled.push("repeat");
        }

        if self.player.resting.take().is_some() {
            cancelled.push("rest");
        }

        if self.player.fishing > 0 {
            self.player.fishing = 0;
            cancelled.push("fishing");
        }

        if stop_search && self.player.searching {
            self.player.searching = false;
            cancelled.push("search");
        }

        if self.player.running.take().is_some() {
            // Running may have dimmed the light and reused a stale pursuit
            // field.
            self.update |= Update::TORCH | Update::FLOW;
            cancelled.push("run");
        }

        if stop_travel && self.player.travel.take().is_some() {
            self.update |= Update::FLOW;
            cancelled.push("travel");
        }

        if !self.options.center_player {
            self.verify_panel();
        }

        if self.options.flush_on_disturb {
            self.flush_pending = true;
        }

        if !cancelled.is_empty() {
            log::debug!("disturb: cancelled {}", cancelled.join(", "));
            self.interrupted = true;
            self.notify(Notice::Status);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::travel::Travel;

    fn runtime() -> Runtime {
        let layout = Floor::parse(
            "
            ##########
            #@.......#
            #........#
            ##########",
        )
        .unwrap();
        Runtime::new(layout, Options::default())
    }

    #[test]
    fn cancels_everything() {
        let mut r = runtime();
        r.execute(Command::Rest(Rest::Turns(10)));
        r.execute(Command::Search);
        r.execute(Command::Fish(5));
        r.player.travel = Some(Travel::new(ivec2(8, 2), 7));
        r.execute(Command::Hold);
        r.execute(Command::Repeat(4));
        r.execute(Command::Run(ivec2(1, 0)));
        assert!(r.player().is_running());

        r.disturb(true, true);

        let p = r.player();
        assert!(!p.is_resting());
        assert!(!p.is_running());
        assert!(!p.is_traveling());
        assert!(!p.is_fishing());
        assert!(!p.is_searching());
        assert_eq!(p.repeat_count(), 0);
        assert!(!p.is_busy());
        assert!(r.pending_update().contains(Update::TORCH | Update::FLOW));
    }

    #[test]
    fn partial_disturb() {
        let mut r = runtime();
        r.execute(Command::Search);
        r.player.travel = Some(Travel::new(ivec2(8, 2), 7));

        r.disturb(false, false);
        assert!(r.player().is_searching());
        assert!(r.player().is_traveling());

        r.disturb(false, true);
        assert!(r.player().is_searching());
        assert!(!r.player().is_traveling());
    }

    #[test]
    fn idempotent() {
        let mut r = runtime();
        r.execute(Command::Rest(Rest::Turns(10)));
        r.disturb(true, true);
        r.take_notices();
        r.interrupted = false;

        r.disturb(true, true);
        assert!(!r.interrupted);
        assert!(r.take_notices().is_empty());
    }

    #[test]
    fn flush_request() {
        let mut r = Runtime::new(
            Floor::parse("#@.#").unwrap(),
            Options {
                flush_on_disturb: true,
                ..Default::default()
            },
        );
        assert!(!r.take_flush());
        r.disturb(false, false);
        assert!(r.take_flush());
        assert!(!r.take_flush());
    }
}
