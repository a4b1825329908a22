use std::{collections::BTreeMap, ops::Deref};

use tracing::debug;

use crate::{
    EntityId, Position,
    color::Color,
    entity::{GameEntity, Interaction, MapItem, MapItemKind, Player},
    map::{Grid, GridError},
    mix::ColorMixTable,
};

/// Represents errors raised while populating or driving a world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Position {0} already holds a map item")]
    CellOccupied(Position),
    #[error("Position {position} is occupied by player {occupant}")]
    PlayerOccupied {
        position: Position,
        occupant: EntityId,
    },
    #[error("A {kind:?} at {position} cannot hold a player of that color")]
    Impassable {
        position: Position,
        kind: MapItemKind,
    },
    #[error("Player {0} not found")]
    UnknownPlayer(EntityId),
    #[error("Position {0} holds no map item")]
    NoItem(Position),
}

/// Mutable access to a placed map item that keeps its position fixed.
#[derive(Debug)]
pub struct ItemMut<'a> {
    item: &'a mut MapItem,
}

impl ItemMut<'_> {
    pub fn set_color(&mut self, color: Option<Color>) {
        self.item.color = color;
    }

    pub fn set_active(&mut self, active: bool) {
        self.item.active = active;
    }
}

impl Deref for ItemMut<'_> {
    type Target = MapItem;

    fn deref(&self) -> &MapItem {
        self.item
    }
}

/// Why a move ended before covering the player's full speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The player is deactivated and cannot move.
    Inactive,
    OutOfBounds,
    Blocked {
        position: Position,
        kind: MapItemKind,
    },
    OccupiedByPlayer(EntityId),
}

/// Represents the outcome of processing a move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub player: EntityId,
    pub from: Position,
    pub to: Position,
    /// Number of cells actually advanced.
    pub steps: u32,
    /// Contact effects applied along the way, in order.
    pub interactions: Vec<Interaction>,
    pub stopped: Option<StopReason>,
}

impl MoveOutcome {
    pub fn moved(&self) -> bool {
        self.steps > 0
    }
}

/// A reference driver for the rule engine: a grid of map items, the players
/// walking on it and the mix table that governs recoloring.
#[derive(Debug, Clone)]
pub struct World {
    items: Grid<Option<MapItem>>,
    players: BTreeMap<EntityId, Player>,
    mix_table: ColorMixTable,
    next_entity_id: EntityId,
}

impl World {
    /// Creates an empty world of the given size.
    pub fn new(width: usize, height: usize, mix_table: ColorMixTable) -> Self {
        World {
            items: Grid::new(width, height),
            players: BTreeMap::new(),
            mix_table,
            next_entity_id: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.items.width()
    }

    pub fn height(&self) -> usize {
        self.items.height()
    }

    pub fn mix_table(&self) -> &ColorMixTable {
        &self.mix_table
    }

    /// Places a map item at its own position. A cell holds at most one item.
    pub fn place_item(&mut self, item: MapItem) -> Result<(), WorldError> {
        let position = item.position;
        let (width, height) = (self.items.width(), self.items.height());
        let cell = self.items.get_mut(position).ok_or(GridError::OutOfBounds {
            position,
            width,
            height,
        })?;
        if cell.is_some() {
            return Err(WorldError::CellOccupied(position));
        }
        *cell = Some(item);
        Ok(())
    }

    /// Removes and returns the item at `position`, if any.
    pub fn remove_item(&mut self, position: Position) -> Option<MapItem> {
        self.items.get_mut(position).and_then(Option::take)
    }

    /// Adds a player and returns its id.
    ///
    /// The starting cell must be inside the grid, free of other active players
    /// and passable for the player's current color.
    pub fn add_player(&mut self, player: Player) -> Result<EntityId, WorldError> {
        let position = player.position;
        let cell = self.items.get(position).ok_or(GridError::OutOfBounds {
            position,
            width: self.items.width(),
            height: self.items.height(),
        })?;
        if let Some(item) = cell.as_ref().filter(|item| item.active) {
            if !item.is_passable(player.color()) {
                return Err(WorldError::Impassable {
                    position,
                    kind: item.kind(),
                });
            }
        }
        if let Some(occupant) = self.player_at(position) {
            return Err(WorldError::PlayerOccupied { position, occupant });
        }

        let id = self.next_entity_id;
        self.next_entity_id += 1;
        self.players.insert(id, player);
        Ok(id)
    }

    pub fn item_at(&self, position: Position) -> Option<&MapItem> {
        self.items.get(position).and_then(Option::as_ref)
    }

    /// Returns an editing handle for the item at `position`.
    ///
    /// The handle can recolor or (de)activate the item but not relocate it; use
    /// [`World::move_item`] for that so the grid cell follows.
    pub fn item_at_mut(&mut self, position: Position) -> Option<ItemMut<'_>> {
        self.items
            .get_mut(position)
            .and_then(Option::as_mut)
            .map(|item| ItemMut { item })
    }

    /// Relocates the item at `from` to the empty cell `to`.
    pub fn move_item(&mut self, from: Position, to: Position) -> Result<(), WorldError> {
        let (width, height) = (self.items.width(), self.items.height());
        let out_of_bounds = |position| GridError::OutOfBounds {
            position,
            width,
            height,
        };
        let source = self.items.index_of(from).ok_or(out_of_bounds(from))?;
        let target = self.items.index_of(to).ok_or(out_of_bounds(to))?;
        if self.items.get(from).is_none_or(Option::is_none) {
            return Err(WorldError::NoItem(from));
        }
        if source == target {
            return Ok(());
        }
        if self.items.get(to).is_some_and(Option::is_some) {
            return Err(WorldError::CellOccupied(to));
        }

        if let Some(mut item) = self.items.get_mut(from).and_then(Option::take) {
            item.position = to;
            self.items.set(to, Some(item))?;
        }
        Ok(())
    }

    pub fn items(&self) -> &Grid<Option<MapItem>> {
        &self.items
    }

    pub fn player(&self, id: EntityId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: EntityId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Iterates over all players in id order.
    pub fn players(&self) -> impl Iterator<Item = (EntityId, &Player)> {
        self.players.iter().map(|(id, player)| (*id, player))
    }

    /// Returns the id of the active player standing on `position`.
    pub fn player_at(&self, position: Position) -> Option<EntityId> {
        self.players
            .iter()
            .find(|(_, player)| player.active && player.position == position)
            .map(|(id, _)| *id)
    }

    /// Runs one tick: `update` is called once on every active entity.
    ///
    /// Returns the number of entities updated.
    pub fn tick(&mut self) -> usize {
        let mut updated = 0;
        for item in self.items.iter_mut().flatten() {
            if item.is_active() {
                item.update();
                updated += 1;
            }
        }
        for player in self.players.values_mut() {
            if player.is_active() {
                player.update();
                updated += 1;
            }
        }
        updated
    }

    /// Moves a player by `(dx, dy)` once per point of speed.
    ///
    /// Each step checks the target cell against the player's color at that
    /// moment, so a painting block entered on the first step can open a door on
    /// the second. Movement stops at the first cell that cannot be entered.
    pub fn try_move(&mut self, id: EntityId, dx: i32, dy: i32) -> Result<MoveOutcome, WorldError> {
        let others: Vec<(EntityId, Position)> = self
            .players
            .iter()
            .filter(|(other, player)| **other != id && player.active)
            .map(|(other, player)| (*other, player.position))
            .collect();
        let player = self
            .players
            .get_mut(&id)
            .ok_or(WorldError::UnknownPlayer(id))?;

        let mut outcome = MoveOutcome {
            player: id,
            from: player.position,
            to: player.position,
            steps: 0,
            interactions: Vec::new(),
            stopped: None,
        };
        if !player.active {
            outcome.stopped = Some(StopReason::Inactive);
            return Ok(outcome);
        }
        if dx == 0 && dy == 0 {
            return Ok(outcome);
        }

        for _ in 0..player.speed {
            let Some((target, cell)) = player
                .position
                .offset(dx, dy)
                .and_then(|target| self.items.get(target).map(|cell| (target, cell)))
            else {
                outcome.stopped = Some(StopReason::OutOfBounds);
                break;
            };
            if let Some(&(occupant, _)) = others.iter().find(|(_, pos)| *pos == target) {
                outcome.stopped = Some(StopReason::OccupiedByPlayer(occupant));
                break;
            }

            let item = cell.as_ref().filter(|item| item.active);
            if let Some(item) = item {
                if !item.is_passable(player.color()) {
                    debug!(player = id, position = %target, kind = ?item.kind(), "move blocked");
                    outcome.stopped = Some(StopReason::Blocked {
                        position: target,
                        kind: item.kind(),
                    });
                    break;
                }
            }

            player.position = target;
            outcome.steps += 1;

            if let Some(item) = item {
                match item.interact(player, &self.mix_table) {
                    Interaction::None => {}
                    effect => outcome.interactions.push(effect),
                }
            }
        }

        outcome.to = player.position;
        Ok(outcome)
    }
}
