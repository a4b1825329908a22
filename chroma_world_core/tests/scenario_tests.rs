//! End-to-end puzzle scenarios driving the rule engine through `World`.

use chroma_world_core::{
    Color, ColorMixTable, GameEntity, MapItem, MapItemKind, Player, Position,
    level::load_world_from_str,
    palette::Palette,
    world::{StopReason, World},
};

fn color(name: &str, rgb: (u8, u8, u8)) -> Color {
    Color::new(name, rgb)
}

/// Player walks over green then blue paint and is turned away by a red door.
#[test]
fn paint_mix_then_locked_door() {
    let table = ColorMixTable::classic();
    let mut player = Player::new(Position::new(0, 0));
    assert_eq!(player.speed, 1);
    assert!(player.color().is_none());

    let green_block = MapItem::painting_block(Position::new(1, 0), Some(color("green", (0, 255, 0))));
    let blue_block = MapItem::painting_block(Position::new(2, 0), Some(color("blue", (0, 0, 255))));
    let red_door = MapItem::door(Position::new(3, 0), Some(color("red", (255, 0, 0))));

    assert!(green_block.is_passable(player.color()));
    player.position = green_block.position;
    green_block.interact(&mut player, &table);
    assert_eq!(player.color().map(Color::name), Some("green"));

    assert!(blue_block.is_passable(player.color()));
    player.position = blue_block.position;
    blue_block.interact(&mut player, &table);
    assert_eq!(player.color().map(Color::name), Some("yellow"));

    assert!(!red_door.is_passable(player.color()));
    assert_eq!(player.position, Position::new(2, 0));
}

/// Same scenario, loaded from a level and resolved by the world driver.
#[test]
fn paint_mix_then_locked_door_from_level() {
    let (mut world, id) = load_world_from_str("ST PG PB DR ..", &Palette::classic()).unwrap();

    let first = world.try_move(id, 1, 0).unwrap();
    assert_eq!(first.to, Position::new(1, 0));
    assert_eq!(world.player(id).unwrap().color().map(Color::name), Some("green"));

    world.try_move(id, 1, 0).unwrap();
    assert_eq!(world.player(id).unwrap().color().map(Color::name), Some("yellow"));

    let blocked = world.try_move(id, 1, 0).unwrap();
    assert!(!blocked.moved());
    assert_eq!(
        blocked.stopped,
        Some(StopReason::Blocked {
            position: Position::new(3, 0),
            kind: MapItemKind::Door,
        })
    );
    assert_eq!(world.player(id).unwrap().position, Position::new(2, 0));
}

/// A red player repainted blue becomes purple and can pass a purple door.
#[test]
fn mixed_color_opens_matching_door() {
    let mut world = World::new(4, 1, ColorMixTable::classic());
    world
        .place_item(MapItem::painting_block(Position::new(1, 0), Some(color("blue", (0, 0, 255)))))
        .unwrap();
    world
        .place_item(MapItem::door(Position::new(2, 0), Some(color("purple", (1, 1, 1)))))
        .unwrap();
    let id = world
        .add_player(Player::new(Position::new(0, 0)).with_color(color("red", (255, 0, 0))))
        .unwrap();

    for _ in 0..3 {
        world.try_move(id, 1, 0).unwrap();
        world.tick();
    }

    let player = world.player(id).unwrap();
    assert_eq!(player.position, Position::new(3, 0));
    assert_eq!(player.color().map(Color::name), Some("purple"));
}

/// Unknown mixes leave the player's color unchanged.
#[test]
fn unregistered_mix_keeps_current_color() {
    let (mut world, id) = load_world_from_str("ST PY PP", &Palette::classic()).unwrap();
    world.player_mut(id).unwrap().speed = 2;

    let outcome = world.try_move(id, 1, 0).unwrap();

    assert_eq!(outcome.steps, 2);
    assert_eq!(outcome.interactions.len(), 2);
    assert_eq!(world.player(id).unwrap().color().map(Color::name), Some("yellow"));
}

/// Walls stop everything; a custom palette drives both codes and mixing.
#[test]
fn custom_palette_level() {
    let palette = Palette::from_toml_str(
        r#"
        [[colors]]
        name = "cyan"
        code = "C"
        rgb = [0, 255, 255]

        [[colors]]
        name = "magenta"
        code = "M"
        rgb = [255, 0, 255]

        [[colors]]
        name = "blue"
        code = "B"
        rgb = [0, 0, 255]

        [[mixes]]
        first = "cyan"
        second = "magenta"
        result = "blue"
        "#,
    )
    .unwrap();
    let map = "
        ST PC PM DB ..
        WL WL WL WL WL
    ";
    let (mut world, id) = load_world_from_str(map, &palette).unwrap();
    world.player_mut(id).unwrap().speed = 10;

    let across = world.try_move(id, 1, 0).unwrap();
    assert_eq!(across.to, Position::new(4, 0));
    assert_eq!(across.stopped, Some(StopReason::OutOfBounds));
    assert_eq!(world.player(id).unwrap().color().map(Color::name), Some("blue"));

    let down = world.try_move(id, 0, 1).unwrap();
    assert_eq!(
        down.stopped,
        Some(StopReason::Blocked {
            position: Position::new(4, 1),
            kind: MapItemKind::Wall,
        })
    );
}
