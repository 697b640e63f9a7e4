//! Corridor-following run.
//!
//! Directions are handled as indices into `DIR_8`. A positive turn is
//! counterclockwise, to the runner's left.

use util::dir8_index;

use crate::{prelude::*, RUN_LIMIT, TURN_ENERGY};

#[derive(Clone, Debug)]
pub(crate) struct RunState {
    /// Direction of the next step.
    cur_dir: usize,
    /// Heading the newly adjacent cells are looked up from.
    old_dir: usize,
    /// Running in a room rather than a corridor.
    open_area: bool,
    /// Stop when a gap opens on the left.
    break_left: bool,
    /// Stop when a gap opens on the right.
    break_right: bool,
    steps_left: i32,
}

/// Direction `i` steps to the left of `dir`, negative `i` turns right.
fn turn(dir: usize, i: i32) -> usize {
    (dir as i32 - i).rem_euclid(8) as usize
}

impl Runtime {
    /// Start running in a direction.
    pub(crate) fn run(&mut self, dir: IVec2) -> i32 {
        let Some(dir) = dir8_index(dir) else {
            return self.refuse(Refusal::BadDirection);
        };
        if self.see_wall(dir, self.player.pos) {
            return self.refuse(Refusal::CannotRun);
        }

        log::debug!("run: start {} from {}", DIR_8[dir], self.player.pos);
        self.update |= Update::TORCH;
        self.player.running = Some(self.run_init(dir));
        self.run_move()
    }

    /// Take the next step of an ongoing run.
    ///
    /// Return the energy used, zero when the run stopped.
    pub(crate) fn run_step(&mut self) -> i32 {
        let Some(mut run) = self.player.running.take() else {
            return 0;
        };
        let stop = self.run_test(&mut run);
        self.player.running = Some(run);

        if stop {
            log::debug!("run: stopped at {}", self.player.pos);
            self.disturb(false, false);
            return 0;
        }
        self.run_move()
    }

    fn run_move(&mut self) -> i32 {
        let Some(run) = self.player.running.as_mut() else {
            return 0;
        };
        if run.steps_left <= 0 {
            log::debug!("run: step limit reached");
            self.disturb(false, false);
            return 0;
        }
        run.steps_left -= 1;

        let dir = DIR_8[run.cur_dir];
        let pos = self.player.pos + dir;
        let open = self.floor.terrain(pos).is_some_and(|t| t.is_passable());
        if !open || self.mob_at(pos).is_some() {
            log::debug!("run: blocked at {pos}");
            self.disturb(false, false);
            return 0;
        }

        self.move_player(dir);
        TURN_ENERGY
    }

    /// Known wall one step from `pos`.
    fn see_wall(&self, dir: usize, pos: IVec2) -> bool {
        let pos = pos + DIR_8[dir];
        self.floor.has(pos, CellFlags::MARK)
            && self.floor.terrain(pos).is_some_and(|t| t.is_wall())
    }

    /// Nothing known about the cell one step from `pos`.
    fn see_nothing(&self, dir: usize, pos: IVec2) -> bool {
        let pos = pos + DIR_8[dir];
        if !self.floor.contains(pos) {
            return true;
        }
        !self.floor.has(pos, CellFlags::MARK) && !self.player_can_see(pos)
    }

    /// Known non-wall or unknown cell.
    fn is_open_or_unknown(&self, pos: IVec2) -> bool {
        !self.floor.has(pos, CellFlags::MARK)
            || !self.floor.terrain(pos).is_some_and(|t| t.is_wall())
    }

    /// Look at the walls around the start of a run to tell corridors from
    /// open areas.
    fn run_init(&self, dir: usize) -> RunState {
        let pos = self.player.pos;
        let next = pos + DIR_8[dir];

        let mut run = RunState {
            cur_dir: dir,
            old_dir: dir,
            open_area: true,
            break_left: false,
            break_right: false,
            steps_left: RUN_LIMIT,
        };

        let (mut short_left, mut deep_left) = (false, false);
        let (mut short_right, mut deep_right) = (false, false);

        if self.see_wall(turn(dir, 1), pos) {
            run.break_left = true;
            short_left = true;
        } else if self.see_wall(turn(dir, 1), next) {
            run.break_left = true;
            deep_left = true;
        }

        if self.see_wall(turn(dir, -1), pos) {
            run.break_right = true;
            short_right = true;
        } else if self.see_wall(turn(dir, -1), next) {
            run.break_right = true;
            deep_right = true;
        }

        if run.break_left && run.break_right {
            run.open_area = false;

            if dir % 2 == 1 {
                // Angled corridor entry.
                if deep_left && !deep_right {
                    run.old_dir = turn(dir, -1);
                } else if deep_right && !deep_left {
                    run.old_dir = turn(dir, 1);
                }
            } else if self.see_wall(dir, next) {
                // Blunt corridor entry.
                if short_left && !short_right {
                    run.old_dir = turn(dir, -2);
                } else if short_right && !short_left {
                    run.old_dir = turn(dir, 2);
                }
            }
        }

        run
    }

    /// Look at the cells that became adjacent with the last step and pick
    /// the next direction.
    ///
    /// Return true if the run should stop.
    fn run_test(&self, run: &mut RunState) -> bool {
        let pos = self.player.pos;
        let prev = run.old_dir;
        // Diagonal steps reveal five new neighbors, orthogonal ones three.
        let max = (prev % 2) as i32 + 1;

        let mut option: Option<usize> = None;
        let mut option2: Option<usize> = None;
        let mut check_dir: Option<usize> = None;

        for i in -max..=max {
            let new_dir = turn(prev, i);
            let p = pos + DIR_8[new_dir];

            if self.mob_at(p).is_some_and(|m| m.is_visible(self)) {
                return true;
            }

            let flags = self.floor.flags(p);
            if flags.contains(CellFlags::ITEM | CellFlags::MARK)
                || flags.contains(CellFlags::UNSAFE)
            {
                return true;
            }

            let mut unknown = true;
            if flags.contains(CellFlags::MARK) {
                if self
                    .floor
                    .terrain(p)
                    .is_some_and(|t| t.stops_run(&self.options))
                {
                    return true;
                }
                unknown = false;
            }

            let floor_like =
                self.floor.terrain(p).is_some_and(|t| t.is_floor_like());

            if unknown || floor_like {
                if run.open_area {
                    continue;
                }
                match (option, option2) {
                    (None, _) => option = Some(new_dir),
                    // Three ways to go.
                    (Some(_), Some(_)) => return true,
                    // Two ways that aren't next to each other.
                    (Some(o), None) if o != turn(prev, i - 1) => return true,
                    (Some(o), None) => {
                        if new_dir % 2 == 1 {
                            check_dir = Some(turn(prev, i - 2));
                            option2 = Some(new_dir);
                        } else {
                            check_dir = Some(turn(prev, i + 1));
                            option2 = Some(o);
                            option = Some(new_dir);
                        }
                    }
                }
            } else if run.open_area {
                if i < 0 {
                    run.break_right = true;
                } else if i > 0 {
                    run.break_left = true;
                }
            }
        }

        if run.open_area {
            // Look again for openings on the sides being watched.
            for i in -max..0 {
                let p = pos + DIR_8[turn(prev, i)];
                if self.is_open_or_unknown(p) {
                    if run.break_right {
                        return true;
                    }
                } else if run.break_left {
                    return true;
                }
            }

            for i in (1..=max).rev() {
                let p = pos + DIR_8[turn(prev, i)];
                if self.is_open_or_unknown(p) {
                    if run.break_left {
                        return true;
                    }
                } else if run.break_right {
                    return true;
                }
            }
        } else {
            match (option, option2) {
                (None, _) => return true,
                (Some(o), None) => {
                    run.cur_dir = o;
                    run.old_dir = o;
                }
                (Some(o), Some(o2)) => {
                    let opts = &self.options;
                    if opts.run_use_corners && !opts.run_cut_corners {
                        run.cur_dir = o;
                        run.old_dir = o2;
                    } else {
                        let next = pos + DIR_8[o];
                        let enclosed = self.see_wall(o, next)
                            && check_dir
                                .is_some_and(|d| self.see_wall(d, next));

                        if !enclosed {
                            if opts.run_use_corners
                                && self.see_nothing(o, next)
                                && self.see_nothing(o2, next)
                            {
                                // Might be a corner, can't tell yet.
                                run.cur_dir = o;
                                run.old_dir = o2;
                            } else {
                                // Next to a junction or a room.
                                return true;
                            }
                        } else if opts.run_cut_corners {
                            run.cur_dir = o2;
                            run.old_dir = o2;
                        } else {
                            run.cur_dir = o;
                            run.old_dir = o2;
                        }
                    }
                }
            }
        }

        // Don't run into a known wall.
        self.see_wall(run.cur_dir, pos)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn runtime(map: &str) -> Runtime {
        runtime_with(map, Options::default())
    }

    fn runtime_with(map: &str, options: Options) -> Runtime {
        let mut r = Runtime::new(Floor::parse(map).unwrap(), options);
        r.take_notices();
        r
    }

    /// Run until stopped, return the number of steps taken.
    fn run(r: &mut Runtime, dir: IVec2) -> usize {
        let mut steps = 0;
        let mut energy = r.execute(Command::Run(dir));
        while energy > 0 {
            steps += 1;
            r.update_stuff();
            energy = r.run_step();
        }
        steps
    }

    #[test]
    fn turns() {
        // East, one left is northeast, one right is southeast.
        assert_eq!(turn(2, 1), 1);
        assert_eq!(turn(2, -1), 3);
        assert_eq!(turn(0, 1), 7);
        assert_eq!(turn(7, -1), 0);
    }

    #[test]
    fn corridor_to_end() {
        let mut r = runtime(
            "
            #########
            #@......#
            #########",
        );
        assert_eq!(run(&mut r, ivec2(1, 0)), 6);
        assert_eq!(r.player().pos, ivec2(7, 1));
        assert!(!r.player().is_running());
    }

    #[test]
    fn junction_stops_after_one_step() {
        let mut r = runtime(
            "
            #######
            ###.###
            #@....#
            ###.###
            #######",
        );
        assert_eq!(run(&mut r, ivec2(1, 0)), 1);
        assert_eq!(r.player().pos, ivec2(2, 2));
    }

    #[test]
    fn cuts_corners() {
        let mut r = runtime(
            "
            #####
            #@..#
            ###.#
            ###.#
            #####",
        );
        assert_eq!(run(&mut r, ivec2(1, 0)), 3);
        assert_eq!(r.player().pos, ivec2(3, 3));
    }

    #[test]
    fn stops_at_items() {
        let mut r = runtime(
            "
            ##########
            #@...$...#
            ##########",
        );
        assert_eq!(run(&mut r, ivec2(1, 0)), 3);
        assert_eq!(r.player().pos, ivec2(4, 1));
    }

    #[test]
    fn cannot_run_into_wall() {
        let mut r = runtime("#@#");
        assert_eq!(r.execute(Command::Run(ivec2(1, 0))), 0);
        assert!(!r.player().is_running());
        assert_eq!(r.take_notices(), vec![Notice::Refused(Refusal::CannotRun)]);
    }

    #[test]
    fn stops_next_to_visible_monster() {
        const ROOM: &str = "
            #########
            #.......#
            #@......#
            #....m..#
            #########";

        // The monster coming into view is a disturbance of its own.
        let mut r = runtime(ROOM);
        assert_eq!(run(&mut r, ivec2(1, 0)), 2);
        assert_eq!(r.player().pos, ivec2(3, 2));

        // Without that the run still won't go past it.
        let mut r = runtime_with(
            ROOM,
            Options {
                disturb_near: false,
                ..Default::default()
            },
        );
        assert_eq!(run(&mut r, ivec2(1, 0)), 3);
        assert_eq!(r.player().pos, ivec2(4, 2));
    }

    #[test]
    fn stops_before_trap() {
        let mut r = runtime(
            "
            #########
            #@......#
            #########",
        );
        r.trap_fired(ivec2(5, 1));
        assert_eq!(run(&mut r, ivec2(1, 0)), 3);
        assert_eq!(r.player().pos, ivec2(4, 1));
    }

    #[test]
    fn doors_and_stairs() {
        for map in ["#@...'...#", "#@...>...#"] {
            let map = format!("##########\n{map}\n##########");

            let mut r = runtime(&map);
            assert_eq!(run(&mut r, ivec2(1, 0)), 7);
            assert_eq!(r.player().pos, ivec2(8, 1));

            let mut r = runtime_with(
                &map,
                Options {
                    run_ignore_doors: false,
                    run_ignore_stairs: false,
                    ..Default::default()
                },
            );
            assert_eq!(run(&mut r, ivec2(1, 0)), 3);
            assert_eq!(r.player().pos, ivec2(4, 1));
        }
    }

    #[test]
    fn along_room_wall() {
        let mut r = runtime(
            "
            ##########
            #@.......#
            #........#
            #........#
            ##########",
        );
        assert_eq!(run(&mut r, ivec2(1, 0)), 7);
        assert_eq!(r.player().pos, ivec2(8, 1));
    }

    #[test]
    fn stops_where_wall_ends() {
        let mut r = runtime(
            "
            ####....
            #@......
            #.......
            ########",
        );
        assert_eq!(run(&mut r, ivec2(1, 0)), 2);
        assert_eq!(r.player().pos, ivec2(3, 1));
    }

    #[test]
    fn stops_at_gap_in_wall() {
        let mut r = runtime(
            "
            #########
            #.......#
            #@......#
            ####.####",
        );
        assert_eq!(run(&mut r, ivec2(1, 0)), 2);
        assert_eq!(r.player().pos, ivec2(3, 2));
    }

    #[test]
    fn corner_options() {
        let run_corner = |light, run_use_corners, run_cut_corners| {
            let mut r = runtime_with(
                "
                #####
                #@..#
                ###.#
                ###.#
                #####",
                Options {
                    run_use_corners,
                    run_cut_corners,
                    ..Default::default()
                },
            );
            r.set_light(light);
            r.update_stuff();
            let steps = run(&mut r, ivec2(1, 0));
            (steps, r.player().pos)
        };

        // Walls around the corner are known.
        assert_eq!(run_corner(2, true, true), (3, ivec2(3, 3)));
        assert_eq!(run_corner(2, false, true), (3, ivec2(3, 3)));
        assert_eq!(run_corner(2, true, false), (4, ivec2(3, 3)));
        assert_eq!(run_corner(2, false, false), (4, ivec2(3, 3)));

        // Dim light leaves the far side of the corner unknown.
        assert_eq!(run_corner(1, true, true), (4, ivec2(3, 3)));
        assert_eq!(run_corner(1, false, true), (1, ivec2(2, 1)));
    }
}
