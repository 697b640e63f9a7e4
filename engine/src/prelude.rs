pub use crate::{
    Cell, CellFlags, Command, Commander, Floor, Instant, Layout, MobId, Mover,
    Notice, Options, Phase, Refusal, Rest, Runtime, Terrain, Update,
    TICKS_PER_TURN, TURN_ENERGY,
};
pub use glam::{ivec2, IVec2};
pub use util::{IndexSet, VecExt, DIR_8};
