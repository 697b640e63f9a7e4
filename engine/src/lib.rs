//! Turn scheduling and spatial awareness core of a dungeon simulation.

/// How many world ticks make up one game turn.
pub const TICKS_PER_TURN: i64 = 10;

/// Energy cost of a full turn's worth of action.
pub const TURN_ENERGY: i32 = 100;

/// Longest uninterrupted run in steps.
pub const RUN_LIMIT: i32 = 1000;

mod ai;

mod cell;
pub use cell::{Cell, CellFlags};

mod command;
pub use command::{Command, Commander, Refusal, Rest};

mod disturb;

mod flow;
pub use flow::{FlowField, Mover};

mod floor;
pub use floor::{Floor, Layout};

mod mob;
pub use mob::{Mob, MobId};

mod notice;
pub use notice::Notice;

mod options;
pub use options::Options;

mod panel;
pub use panel::Panel;

mod player;
pub use player::{Buff, Buffs, Player};

pub mod prelude;

mod run;

mod runtime;
pub use runtime::{Runtime, Update};

mod scheduler;
pub use scheduler::Phase;

mod terrain;
pub use terrain::{Terrain, TerrainFlags};

mod time;
pub use time::{energy_per_tick, Instant};

mod travel;

mod view;
