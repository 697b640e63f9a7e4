use glam::IVec2;

/// 8 directions, clock face order.
///
/// Turning one index up is a step clockwise, one index down is a step
/// counterclockwise. Odd indices are the diagonals.
pub const DIR_8: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([-1, -1]),
];

/// Index of a unit step vector in `DIR_8`.
pub fn dir8_index(dir: IVec2) -> Option<usize> {
    DIR_8.iter().position(|&d| d == dir)
}

pub trait VecExt: Sized + Default {
    /// Absolute size of vector in chessboard metric.
    fn chebyshev_len(&self) -> i32;

    /// Vec points to one of the eight cells surrounding the origin.
    fn is_neighbor(&self) -> bool {
        self.chebyshev_len() == 1
    }
}

impl VecExt for IVec2 {
    fn chebyshev_len(&self) -> i32 {
        self[0].abs().max(self[1].abs())
    }
}
