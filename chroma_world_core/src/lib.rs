use std::fmt;

use serde::{Deserialize, Serialize};

pub mod color;
pub mod entity;
pub mod level;
pub mod map;
pub mod mix;
pub mod palette;
pub mod world;

pub use color::Color;
pub use entity::{GameEntity, Interaction, MapItem, MapItemKind, Player};
pub use mix::ColorMixTable;

/// Unique identifier for players placed in a world.
pub type EntityId = usize;

/// Represents a 2D integer coordinate on the puzzle grid.
///
/// Coordinates may be negative; a grid simply reports such positions as out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Returns the position shifted by `(dx, dy)`, or `None` if either
    /// coordinate would overflow.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Position {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
