use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Position, color::Color, mix::ColorMixTable};

/// Behavior shared by everything that lives on the puzzle grid.
///
/// The driver calls `update` exactly once per tick on every active entity.
pub trait GameEntity {
    fn position(&self) -> Position;

    fn set_position(&mut self, position: Position);

    fn color(&self) -> Option<&Color>;

    fn is_active(&self) -> bool;

    /// Deactivation only flips a flag; the entity stays where it is until the
    /// driver drops it.
    fn set_active(&mut self, active: bool);

    /// Advances per-tick internal state.
    fn update(&mut self);
}

/// The fixed set of map element policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapItemKind {
    /// Never passable.
    Wall,
    /// Passable only by an actor of exactly the door's color.
    Door,
    /// Always passable; recolors the player that enters it.
    PaintingBlock,
}

/// Represents the outcome of a player touching a map element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    None,
    Recolored { from: Option<Color>, to: Color },
}

/// A static element of the map: a wall, a door or a painting block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapItem {
    kind: MapItemKind,
    pub position: Position,
    pub color: Option<Color>,
    pub active: bool,
}

impl MapItem {
    pub fn new(kind: MapItemKind, position: Position, color: Option<Color>) -> Self {
        MapItem {
            kind,
            position,
            color,
            active: true,
        }
    }

    pub fn wall(position: Position) -> Self {
        Self::new(MapItemKind::Wall, position, None)
    }

    pub fn door(position: Position, color: Option<Color>) -> Self {
        Self::new(MapItemKind::Door, position, color)
    }

    pub fn painting_block(position: Position, color: Option<Color>) -> Self {
        Self::new(MapItemKind::PaintingBlock, position, color)
    }

    #[inline]
    pub fn kind(&self) -> MapItemKind {
        self.kind
    }

    /// Returns whether an actor carrying `actor_color` may enter this element.
    ///
    /// A door with no color, or an actor with no color, never matches.
    pub fn is_passable(&self, actor_color: Option<&Color>) -> bool {
        match self.kind {
            MapItemKind::Wall => false,
            MapItemKind::Door => match (&self.color, actor_color) {
                (Some(door), Some(actor)) => door.is_equal_to(actor),
                _ => false,
            },
            MapItemKind::PaintingBlock => true,
        }
    }

    /// Applies the contact effect of this element to `player`.
    ///
    /// Only a colored painting block does anything: it feeds its color into
    /// [`Player::change_color`].
    pub fn interact(&self, player: &mut Player, table: &ColorMixTable) -> Interaction {
        match (self.kind, &self.color) {
            (MapItemKind::PaintingBlock, Some(paint)) => {
                let from = player.color.clone();
                let to = player.change_color(paint, table).clone();
                Interaction::Recolored { from, to }
            }
            _ => Interaction::None,
        }
    }
}

impl GameEntity for MapItem {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn update(&mut self) {}
}

/// The actor moved around the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub position: Position,
    color: Option<Color>,
    pub active: bool,
    /// Grid cells advanced per move.
    pub speed: u32,
}

impl Player {
    pub fn new(position: Position) -> Self {
        Player {
            position,
            color: None,
            active: true,
            speed: 1,
        }
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Paints the player with `new_color`.
    ///
    /// A colorless player simply takes the new color; otherwise the current
    /// color is mixed with it. Returns the resulting color.
    pub fn change_color(&mut self, new_color: &Color, table: &ColorMixTable) -> &Color {
        let next = match &self.color {
            Some(current) => current.combine_with(new_color, table),
            None => new_color.clone(),
        };
        debug!(from = ?self.color.as_ref().map(Color::name), to = next.name(), "player recolored");
        self.color.insert(next)
    }

    /// Overwrites the color without mixing, for level editing and resets.
    pub fn reset_color(&mut self, color: Option<Color>) {
        debug!(color = ?color.as_ref().map(Color::name), "player color reset");
        self.color = color;
    }
}

impl GameEntity for Player {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn update(&mut self) {}
}
