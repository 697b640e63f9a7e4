//! Generic field-of-view computation.
//!
//! Maps plug in through the [`Sight`] trait. Points are handed around as
//! anything convertible to and from `[i32; 2]` so the crate does not need
//! to know about the vector type of the caller.

mod los;
pub use los::line_of_sight;

mod strip;
pub use strip::field_of_view;

/// Map that can be looked through.
pub trait Sight {
    /// Whether sight passes through the cell at `pos`.
    ///
    /// Returns `None` for positions outside the map. Those are never
    /// visited or reported visible.
    fn transmits_sight(&self, pos: [i32; 2]) -> Option<bool>;

    /// Cell is inside the map and sight passes through it.
    fn is_clear(&self, pos: [i32; 2]) -> bool {
        self.transmits_sight(pos) == Some(true)
    }
}

/// Approximate euclidean distance between two points.
///
/// The longer axis counts fully, the shorter axis counts half. Sight and
/// light radii are measured with this metric.
pub fn distance(a: impl Into<[i32; 2]>, b: impl Into<[i32; 2]>) -> i32 {
    let (a, b) = (a.into(), b.into());
    let dx = (a[0] - b[0]).abs();
    let dy = (a[1] - b[1]).abs();

    if dy > dx {
        dy + (dx >> 1)
    } else {
        dx + (dy >> 1)
    }
}
