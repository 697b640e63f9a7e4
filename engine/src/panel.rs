use crate::prelude::*;

/// The part of the floor the presentation layer shows.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Panel {
    pub origin: IVec2,
    pub size: IVec2,
}

impl Panel {
    pub fn new(size: IVec2) -> Self {
        Panel {
            origin: IVec2::ZERO,
            size: size.max(IVec2::ONE),
        }
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        let p = pos - self.origin;
        p.cmpge(IVec2::ZERO).all() && p.cmplt(self.size).all()
    }

    /// Where the panel should be for a player at `pos` on a floor of
    /// `floor_size`.
    ///
    /// When centering, the player is kept at the middle. Otherwise the
    /// panel scrolls by half its size once the player gets within two
    /// cells of its edge.
    fn placement(&self, pos: IVec2, floor_size: IVec2, center: bool) -> IVec2 {
        let max = (floor_size - self.size).max(IVec2::ZERO);

        if center {
            return (pos - self.size / 2).clamp(IVec2::ZERO, max);
        }

        let mut origin = self.origin;
        for axis in 0..2 {
            let (p, o, s) = (pos[axis], origin[axis], self.size[axis]);
            if p < o + 2 || p >= o + s - 2 {
                let half = (s / 2).max(1);
                origin[axis] = (p - half / 2).div_euclid(half) * half;
            }
        }
        origin.clamp(IVec2::ZERO, max)
    }
}

impl Runtime {
    /// Scroll the panel to keep the player in view.
    ///
    /// Return whether the panel moved.
    pub(crate) fn verify_panel(&mut self) -> bool {
        let origin = self.panel.placement(
            self.player.pos,
            self.floor.size(),
            self.options.center_player,
        );

        if origin == self.panel.origin {
            return false;
        }

        log::trace!("panel: shift to {origin}");
        self.panel.origin = origin;
        self.notify(Notice::PanelShift(origin));
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn half_panel_scroll() {
        let p = Panel::new(ivec2(20, 10));
        let floor = ivec2(100, 50);

        assert_eq!(p.placement(ivec2(5, 5), floor, false), ivec2(0, 0));
        // Near the right edge, scroll half a panel.
        assert_eq!(p.placement(ivec2(18, 5), floor, false), ivec2(10, 0));
        // Can't scroll past the floor.
        let p = Panel {
            origin: ivec2(80, 40),
            size: ivec2(20, 10),
        };
        assert_eq!(p.placement(ivec2(99, 49), floor, false), ivec2(80, 40));
    }

    #[test]
    fn centered() {
        let p = Panel::new(ivec2(20, 10));
        let floor = ivec2(100, 50);
        assert_eq!(p.placement(ivec2(50, 25), floor, true), ivec2(40, 20));
        assert_eq!(p.placement(ivec2(2, 2), floor, true), ivec2(0, 0));
        assert_eq!(p.placement(ivec2(2, 2), ivec2(10, 5), true), ivec2(0, 0));
    }

    #[test]
    fn walking_shifts_panel() {
        let mut r = Runtime::new(
            Floor::parse(
                "
                ############
                #@.........#
                ############",
            )
            .unwrap(),
            Options {
                panel_size: ivec2(6, 3),
                ..Default::default()
            },
        );
        r.take_notices();
        assert_eq!(r.panel().origin, ivec2(0, 0));

        r.execute(Command::Walk(ivec2(1, 0)));
        r.execute(Command::Walk(ivec2(1, 0)));
        r.update_stuff();
        assert_eq!(r.panel().origin, ivec2(0, 0));

        r.execute(Command::Walk(ivec2(1, 0)));
        r.execute(Command::Walk(ivec2(1, 0)));
        r.update_stuff();
        assert_eq!(r.panel().origin, ivec2(3, 0));
        assert!(r.panel().contains(r.player().pos));
        assert!(r.take_notices().contains(&Notice::PanelShift(ivec2(3, 0))));
    }
}
