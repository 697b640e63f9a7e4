use std::ops::{Index, IndexMut};

use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// Dense rectangular array of cells addressed by integer vectors.
///
/// The grid spans from origin (0, 0) to (width - 1, height - 1). Accessors
/// that take a position return `None` for points outside that span, the
/// `Index` impls panic.
#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid of the given size filled with copies of `value`.
    pub fn new(size: impl Into<IVec2>, value: T) -> Self {
        let size = size.into().max(IVec2::ZERO);
        Grid {
            width: size.x,
            height: size.y,
            cells: vec![value; (size.x * size.y) as usize],
        }
    }

    /// Reset every cell to a copy of `value`.
    pub fn fill(&mut self, value: T) {
        for c in self.cells.iter_mut() {
            *c = value.clone();
        }
    }
}

impl<T> Grid<T> {
    /// Create a grid by calling `f` for every position in row-major order.
    pub fn from_fn(
        size: impl Into<IVec2>,
        mut f: impl FnMut(IVec2) -> T,
    ) -> Self {
        let size = size.into().max(IVec2::ZERO);
        let mut cells = Vec::with_capacity((size.x * size.y) as usize);
        for y in 0..size.y {
            for x in 0..size.x {
                cells.push(f(ivec2(x, y)));
            }
        }
        Grid {
            width: size.x,
            height: size.y,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> IVec2 {
        ivec2(self.width, self.height)
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn idx(&self, pos: IVec2) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn get(&self, pos: IVec2) -> Option<&T> {
        self.idx(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: IVec2) -> Option<&mut T> {
        self.idx(pos).map(|i| &mut self.cells[i])
    }

    /// Iterate all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> + 'static {
        let w = self.width;
        (0..self.width * self.height).map(move |i| ivec2(i % w, i / w))
    }

    /// Iterate all cells with their positions in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> {
        self.positions().zip(self.cells.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (IVec2, &mut T)> {
        self.positions().zip(self.cells.iter_mut())
    }

    /// Build a new grid of the same size by mapping every cell.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(&mut f).collect(),
        }
    }
}

impl<T> Index<IVec2> for Grid<T> {
    type Output = T;

    fn index(&self, pos: IVec2) -> &Self::Output {
        self.get(pos).expect("Grid: Position out of bounds")
    }
}

impl<T> IndexMut<IVec2> for Grid<T> {
    fn index_mut(&mut self, pos: IVec2) -> &mut Self::Output {
        self.get_mut(pos).expect("Grid: Position out of bounds")
    }
}
