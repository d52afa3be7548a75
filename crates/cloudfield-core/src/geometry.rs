//! Grid coordinates and bounds.

use serde::{Deserialize, Serialize};

/// Largest grid a pool or sandbox level will index densely.
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Offsets of the eight cells surrounding a coordinate, in a fixed order.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A cell on the level grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The eight adjacent cells. May include cells outside the grid.
    pub fn neighbours(self) -> impl Iterator<Item = Coord> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| Coord::new(self.x + dx, self.y + dy))
    }

    /// Every cell within `radius` (Chebyshev distance), excluding `self`.
    pub fn within_radius(self, radius: i32) -> impl Iterator<Item = Coord> {
        let radius = radius.max(0);
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .map(move |(dx, dy)| Coord::new(self.x + dx, self.y + dy))
    }

    /// Chebyshev distance, the grid's notion of "moves apart".
    pub fn distance(self, other: Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Dimensions of the level grid. Cells are `0..width` by `0..height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: i32,
    pub height: i32,
}

impl GridBounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Dense row-major index of `pos`, or `None` when out of bounds.
    pub fn index(&self, pos: Coord) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Cells in the grid; negative dimensions count as zero.
    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize).saturating_mul(self.height.max(0) as usize)
    }

    /// Bounds small enough to back with a dense per-cell index, or `None`.
    pub fn checked_cell_count(&self) -> Option<usize> {
        if self.width < 0 || self.height < 0 {
            return None;
        }
        (self.width as usize)
            .checked_mul(self.height as usize)
            .filter(|&cells| cells <= MAX_GRID_CELLS)
    }

    /// Iterate every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Coord::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours_are_adjacent() {
        let c = Coord::new(5, 5);
        let n: Vec<_> = c.neighbours().collect();
        assert_eq!(n.len(), 8);
        assert!(n.iter().all(|p| p.distance(c) == 1));
        assert!(!n.contains(&c));
    }

    #[test]
    fn test_within_radius_counts() {
        let c = Coord::new(0, 0);
        assert_eq!(c.within_radius(1).count(), 8);
        assert_eq!(c.within_radius(2).count(), 24);
        assert_eq!(c.within_radius(0).count(), 0);
    }

    #[test]
    fn test_bounds_index() {
        let b = GridBounds::new(4, 3);
        assert_eq!(b.index(Coord::new(0, 0)), Some(0));
        assert_eq!(b.index(Coord::new(3, 2)), Some(11));
        assert_eq!(b.index(Coord::new(4, 0)), None);
        assert_eq!(b.index(Coord::new(-1, 1)), None);
        assert_eq!(b.cell_count(), 12);
        assert_eq!(b.cells().count(), 12);
    }

    #[test]
    fn test_oversized_bounds_have_no_checked_count() {
        assert_eq!(GridBounds::new(80, 50).checked_cell_count(), Some(4000));
        assert_eq!(GridBounds::new(0, 9).checked_cell_count(), Some(0));
        assert_eq!(GridBounds::new(70_000, 70_000).checked_cell_count(), None);
        assert_eq!(GridBounds::new(i32::MAX, i32::MAX).checked_cell_count(), None);
        assert_eq!(GridBounds::new(-3, 4).checked_cell_count(), None);
        assert_eq!(GridBounds::new(-3, 4).cell_count(), 0);
    }
}
