//! Plain-text level format.
//!
//! A level is a block of whitespace-separated two-character tokens, one row
//! per line:
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `..`  | empty floor |
//! | `WL`  | wall |
//! | `ST`  | player start (exactly one) |
//! | `Dc`  | door of the palette color with code `c`, `D-` for an uncolored door |
//! | `Pc`  | painting block of color `c`, `P-` for an uncolored block |

use tracing::info;

use crate::{
    EntityId, Position,
    color::Color,
    entity::{MapItem, MapItemKind, Player},
    palette::Palette,
    world::{World, WorldError},
};

/// Represents errors raised while parsing a level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("Map string is empty")]
    Empty,
    #[error("Map has zero width")]
    ZeroWidth,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    InconsistentWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown map code '{token}' at {position}")]
    UnknownToken { token: String, position: Position },
    #[error("Unknown color code '{code}' at {position}")]
    UnknownColorCode { code: char, position: Position },
    #[error("Multiple start positions ('ST') found; second at {0}")]
    MultipleStarts(Position),
    #[error("No start position ('ST') found in map")]
    NoStart,
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Parses `map` into a world using `palette` for color codes and mixing.
///
/// Returns the world and the id of the player spawned at the start cell.
pub fn load_world_from_str(map: &str, palette: &Palette) -> Result<(World, EntityId), LevelError> {
    let lines: Vec<&str> = map.trim().lines().collect();
    if lines.is_empty() {
        return Err(LevelError::Empty);
    }

    let height = lines.len();
    let mut width = 0;
    let mut rows: Vec<Vec<&str>> = Vec::with_capacity(height);
    for (y, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if y == 0 {
            width = tokens.len();
            if width == 0 {
                return Err(LevelError::ZeroWidth);
            }
        } else if tokens.len() != width {
            return Err(LevelError::InconsistentWidth {
                row: y,
                expected: width,
                found: tokens.len(),
            });
        }
        rows.push(tokens);
    }

    let mut world = World::new(width, height, palette.mix_table().clone());
    let mut start: Option<Position> = None;

    for (y, row) in rows.iter().enumerate() {
        for (x, token) in row.iter().enumerate() {
            let position = Position::new(x as i32, y as i32);
            let item = match *token {
                ".." => None,
                "ST" => {
                    if start.is_some() {
                        return Err(LevelError::MultipleStarts(position));
                    }
                    start = Some(position);
                    None
                }
                "WL" => Some(MapItem::wall(position)),
                other => Some(parse_colored(other, position, palette)?),
            };
            if let Some(item) = item {
                world.place_item(item)?;
            }
        }
    }

    let start = start.ok_or(LevelError::NoStart)?;
    let player = world.add_player(Player::new(start))?;
    info!(width, height, start = %start, "level loaded");
    Ok((world, player))
}

fn parse_colored(token: &str, position: Position, palette: &Palette) -> Result<MapItem, LevelError> {
    let unknown = || LevelError::UnknownToken {
        token: token.to_string(),
        position,
    };
    let mut chars = token.chars();
    let (Some(prefix), Some(code), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(unknown());
    };
    let kind = match prefix {
        'D' => MapItemKind::Door,
        'P' => MapItemKind::PaintingBlock,
        _ => return Err(unknown()),
    };
    let color: Option<Color> = match code {
        '-' => None,
        code => Some(
            palette
                .by_code(code)
                .cloned()
                .ok_or(LevelError::UnknownColorCode { code, position })?,
        ),
    };
    Ok(MapItem::new(kind, position, color))
}
