use serde::{Deserialize, Serialize};

use crate::TICKS_PER_TURN;

/// An opaque representation of a time instant.
///
/// The unit of time is a world tick, there are `TICKS_PER_TURN` ticks in a
/// game turn.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
)]
pub struct Instant(pub(crate) i64);

impl Instant {
    /// Instant after the given number of game turns.
    pub fn after_turns(self, turns: i64) -> Self {
        self + turns * TICKS_PER_TURN
    }

    /// Whether this instant starts a new game turn.
    pub fn is_turn_boundary(self) -> bool {
        self.0.rem_euclid(TICKS_PER_TURN) == 0
    }

    pub fn ticks(self) -> i64 {
        self.0
    }
}

impl std::ops::Add<i64> for Instant {
    type Output = Self;

    fn add(self, rhs: i64) -> Self::Output {
        Instant(self.0 + rhs)
    }
}

impl std::ops::AddAssign<i64> for Instant {
    fn add_assign(&mut self, rhs: i64) {
        self.0 += rhs;
    }
}

impl std::ops::Sub<Instant> for Instant {
    type Output = i64;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.0 - rhs.0
    }
}

/// Energy gained per world tick at speeds -50 through +69.
#[rustfmt::skip]
const EXTRACT_ENERGY: [i32; 120] = [
    /* -50 */ 1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
    /* -40 */ 2,  2,  2,  2,  2,  2,  2,  2,  2,  2,
    /* -30 */ 2,  2,  2,  2,  2,  2,  2,  3,  3,  3,
    /* -20 */ 3,  3,  3,  3,  3,  4,  4,  4,  4,  4,
    /* -10 */ 5,  5,  5,  5,  6,  6,  7,  7,  8,  9,
    /*   0 */ 10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
    /* +10 */ 20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
    /* +20 */ 30, 31, 32, 33, 34, 35, 36, 36, 37, 37,
    /* +30 */ 38, 38, 39, 39, 40, 40, 40, 41, 41, 41,
    /* +40 */ 42, 42, 42, 43, 43, 43, 44, 44, 44, 44,
    /* +50 */ 45, 45, 45, 45, 45, 46, 46, 46, 46, 46,
    /* +60 */ 47, 47, 47, 47, 47, 48, 48, 48, 48, 48,
];

/// Energy an actor with the given speed gains per world tick.
///
/// Speed is an offset from normal speed 0. Each +10 of speed early on is
/// another full turn per game turn, the gains taper off towards the top
/// and bottom of the scale.
pub fn energy_per_tick(speed: i32) -> i32 {
    if speed < -50 {
        1
    } else if speed >= 70 {
        49
    } else {
        EXTRACT_ENERGY[(speed + 50) as usize]
    }
}
