use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Position;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Position {position} is out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        position: Position,
        width: usize,
        height: usize,
    },
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order and is
/// addressed with [`Position`]s. Negative coordinates are always out of bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// # Arguments
    ///
    /// * `width`: The width of the grid.
    /// * `height`: The height of the grid.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default,
    {
        Self::from_generator(width, height, |_| T::default())
    }

    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator function `f` takes the cell's `Position` and returns the value for that cell.
    ///
    /// # Arguments
    ///
    /// * `width`: The width of the grid.
    /// * `height`: The height of the grid.
    /// * `f`: A function `FnMut(Position) -> T` to generate cell values.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(Position) -> T,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(Position::new(x as i32, y as i32)));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    /// Returns the width of the grid.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the grid.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts a position to a flat vector index, or `None` when out of bounds.
    #[inline]
    pub fn index_of(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Converts a flat vector index back to a position.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn position_of(&self, index: usize) -> Option<Position> {
        if index < self.cells.len() {
            Some(Position::new(
                (index % self.width) as i32,
                (index / self.width) as i32,
            ))
        } else {
            None
        }
    }

    /// Checks if the given position is within the grid boundaries.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        self.index_of(position).is_some()
    }

    /// Gets an immutable reference to the cell at `position`.
    ///
    /// Returns `None` if the position is out of bounds.
    pub fn get(&self, position: Position) -> Option<&T> {
        self.index_of(position).map(|index| &self.cells[index])
    }

    /// Gets a mutable reference to the cell at `position`.
    ///
    /// Returns `None` if the position is out of bounds.
    pub fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        self.index_of(position).map(move |index| &mut self.cells[index])
    }

    /// Sets the value of the cell at `position`.
    ///
    /// Returns `Ok(())` on success, or `Err(GridError::OutOfBounds)` if the
    /// position is invalid.
    pub fn set(&mut self, position: Position, value: T) -> Result<(), GridError> {
        let index = self.index_of(position).ok_or(GridError::OutOfBounds {
            position,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns an iterator over the cells of the grid in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Returns a mutable iterator over the cells of the grid in row-major order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            (
                Position::new((index % width) as i32, (index / width) as i32),
                cell,
            )
        })
    }
}

/// Indexing using Position coordinates for access.
impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &Self::Output {
        match self.index_of(position) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                position, self.width, self.height
            ),
        }
    }
}

/// Indexing using Position coordinates for mutable access.
impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, position: Position) -> &mut Self::Output {
        match self.index_of(position) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                position, self.width, self.height
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_filled_with_defaults() {
        let grid: Grid<Option<u8>> = Grid::new(3, 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.iter().all(Option::is_none));
    }

    #[test]
    fn negative_and_far_positions_are_out_of_bounds() {
        let grid: Grid<u8> = Grid::new(3, 2);
        assert!(!grid.contains(Position::new(-1, 0)));
        assert!(!grid.contains(Position::new(0, -1)));
        assert!(!grid.contains(Position::new(3, 0)));
        assert!(!grid.contains(Position::new(0, 2)));
        assert!(grid.contains(Position::new(2, 1)));
        assert_eq!(grid.get(Position::new(-1, 0)), None);
    }

    #[test]
    fn set_reports_out_of_bounds() {
        let mut grid: Grid<u8> = Grid::new(2, 2);
        assert_eq!(grid.set(Position::new(1, 1), 5), Ok(()));
        assert_eq!(grid[Position::new(1, 1)], 5);
        assert_eq!(
            grid.set(Position::new(2, 0), 1),
            Err(GridError::OutOfBounds {
                position: Position::new(2, 0),
                width: 2,
                height: 2,
            })
        );
    }

    #[test]
    fn generator_and_enumerate_agree_on_row_major_order() {
        let grid = Grid::from_generator(3, 2, |pos| pos.x + 10 * pos.y);
        let seen: Vec<(Position, i32)> = grid.enumerate().map(|(p, v)| (p, *v)).collect();
        assert_eq!(seen[0], (Position::new(0, 0), 0));
        assert_eq!(seen[4], (Position::new(1, 1), 11));
        assert_eq!(grid.position_of(5), Some(Position::new(2, 1)));
        assert_eq!(grid.position_of(6), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn indexing_outside_panics() {
        let grid: Grid<u8> = Grid::new(1, 1);
        let _ = grid[Position::new(1, 0)];
    }
}
