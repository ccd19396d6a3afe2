use super::*;
use serde_json::json;

fn server_map_json() -> serde_json::Value {
    let mut columns = Vec::new();
    for x in 0..MAP_DIM {
        let mut col = Vec::new();
        for y in 0..MAP_DIM {
            if (x, y) == (3, 4) {
                col.push(json!({
                    "passable": true,
                    "graphics": [
                        { "graphic_id": 100, "properties": { "variant": "dark" } },
                        { "graphic_id": 200 }
                    ],
                    "blocked_directions": [
                        { "direction": 0, "block_inbound": true, "block_outbound": false }
                    ],
                    "warp": { "map_id": 10, "x": 5, "y": 10 },
                    "triggers": [{ "event": "open_chest" }],
                    "attributes": { "biome": "forest" }
                }));
            } else {
                col.push(json!({ "passable": false }));
            }
        }
        columns.push(col);
    }
    json!({
        "id": 5,
        "name": "Town",
        "tags": ["test", "rpg"],
        "attributes": { "difficulty": "easy" },
        "last_updated": "2024-05-01T12:00:00Z",
        "version": 7,
        "tiles": columns,
        "links": { "north": 2 }
    })
}

#[test]
fn decodes_full_server_document() {
    let m: GameMap = serde_json::from_value(server_map_json()).unwrap();
    assert_eq!(m.id, 5);
    assert_eq!(m.name, "Town");
    assert_eq!(m.version, 7);
    assert_eq!(m.tags, vec!["test".to_string(), "rpg".to_string()]);
    assert_eq!(m.links.north, Some(2));
    assert_eq!(m.links.east, None);
    assert_eq!(m.tiles.dim(), MAP_DIM);

    let t = m.tile(3, 4).unwrap();
    assert!(t.passable);
    assert_eq!(t.top_graphic().map(|g| g.graphic_id), Some(200));
    assert_eq!(
        t.graphics[0].properties.as_ref().unwrap().get("variant").map(String::as_str),
        Some("dark")
    );
    assert_eq!(t.warp, Some(WarpTarget { map_id: 10, x: 5, y: 10 }));
    assert_eq!(t.triggers[0].event, "open_chest");
    assert_eq!(m.last_updated.unix_timestamp(), 1_714_564_800);
}

#[test]
fn decodes_game_server_tile_shape() {
    let mut doc = server_map_json();
    doc["tiles"][0][0] = json!({
        "passable": true,
        "graphics": {
            "1": { "graphic_id": 30 },
            "-1": { "graphic_id": 10 },
            "0": { "graphic_id": 20, "properties": { "tint": "red" } }
        },
        "trigger": "open_chest"
    });

    let m: GameMap = serde_json::from_value(doc).unwrap();
    let t = m.tile(0, 0).unwrap();
    let ids: Vec<_> = t.graphics.iter().map(|g| g.graphic_id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
    assert_eq!(t.top_graphic().map(|g| g.graphic_id), Some(30));
    assert_eq!(
        t.graphics[1].properties.as_ref().and_then(|p| p.get("tint")).map(String::as_str),
        Some("red")
    );
    assert_eq!(
        t.triggers,
        vec![TileTrigger {
            event: "open_chest".to_string(),
            payload: None
        }]
    );

    // Re-encoded in the list forms.
    let back = serde_json::to_value(t).unwrap();
    assert_eq!(back["graphics"][0]["graphic_id"], 10);
    assert_eq!(back["triggers"][0]["event"], "open_chest");
    assert!(back.get("trigger").is_none());
}

#[test]
fn graphics_keys_must_be_z_indexes() {
    let err = serde_json::from_value::<MapTile>(json!({
        "passable": true,
        "graphics": { "top": { "graphic_id": 1 } }
    }))
    .unwrap_err();
    assert!(err.to_string().contains("not a z-index"), "{err}");

    let t: MapTile = serde_json::from_value(json!({ "graphics": null, "trigger": "" })).unwrap();
    assert!(t.graphics.is_empty());
    assert!(t.triggers.is_empty());
}

#[test]
fn null_collections_decode_as_empty() {
    let m: GameMap = serde_json::from_value(json!({
        "id": 1,
        "name": "Cave",
        "tags": null,
        "attributes": null,
        "last_updated": "2024-05-01T12:00:00Z",
        "version": 1,
        "tiles": null,
        "links": {}
    }))
    .unwrap();
    assert!(m.tags.is_empty());
    assert!(m.attributes.is_empty());
    assert!(m.tiles.is_empty());
    assert!(m.links.is_empty());
}

#[test]
fn undersized_grid_is_padded() {
    let grid: TileGrid = serde_json::from_value(json!([[{ "passable": true }]])).unwrap();
    assert_eq!(grid.dim(), MAP_DIM);
    assert!(grid.get(GridPos::new(0, 0)).unwrap().passable);
    assert_eq!(
        grid.get(GridPos::new(16, 16)),
        Some(&MapTile::default())
    );
    assert_eq!(grid.iter().count(), MAP_DIM * MAP_DIM);
}

#[test]
fn oversized_grid_is_rejected() {
    let too_wide = vec![Vec::<MapTile>::new(); MAP_DIM + 1];
    assert_eq!(
        TileGrid::from_columns(too_wide),
        Err(GridError::TooManyColumns(MAP_DIM + 1))
    );

    let mut too_tall = vec![Vec::new(); 2];
    too_tall[1] = vec![MapTile::default(); MAP_DIM + 2];
    assert_eq!(
        TileGrid::from_columns(too_tall),
        Err(GridError::ColumnTooTall {
            column: 1,
            len: MAP_DIM + 2
        })
    );

    let wide_tiles = vec![Vec::<serde_json::Value>::new(); MAP_DIM + 1];
    let err = serde_json::from_value::<GameMap>(json!({
        "id": 1,
        "name": "Bad",
        "last_updated": "2024-05-01T12:00:00Z",
        "version": 1,
        "tiles": wide_tiles,
        "links": {}
    }))
    .unwrap_err();
    assert!(err.to_string().contains("columns"), "{err}");
}

#[test]
fn blank_map_is_unsaved_and_empty() {
    let m = GameMap::blank();
    assert!(m.is_unsaved());
    assert_eq!(m.id, 0);
    assert_eq!(m.version, 1);
    assert_eq!(m.name, UNTITLED_MAP_NAME);
    assert!(m.tiles.is_empty());
    assert!(m.links.is_empty());
    assert!(m.tile(0, 0).is_none());
}

#[test]
fn renamed_only_touches_name() {
    let m: GameMap = serde_json::from_value(server_map_json()).unwrap();
    let r = m.renamed("Village");
    assert_eq!(r.name, "Village");
    assert_eq!(r.id, m.id);
    assert_eq!(r.version, m.version);
    assert_eq!(r.tiles, m.tiles);
    assert_eq!(r.links, m.links);
    assert_eq!(r.last_updated, m.last_updated);
}

#[test]
fn direction_wire_values() {
    assert_eq!(serde_json::to_value(Direction::West).unwrap(), json!(3));
    let d: Direction = serde_json::from_value(json!(1)).unwrap();
    assert_eq!(d, Direction::East);
    assert!(serde_json::from_value::<Direction>(json!(99)).is_err());

    assert_eq!(Direction::North.delta(), (0, -1));
    assert_eq!(Direction::East.delta(), (1, 0));
    assert_eq!(Direction::South.delta(), (0, 1));
    assert_eq!(Direction::West.delta(), (-1, 0));
}

#[test]
fn passability_respects_directional_blocks() {
    let mut m: GameMap = serde_json::from_value(server_map_json()).unwrap();
    assert_eq!(m.is_passable(3, 4, Direction::North), Some(false));
    assert_eq!(m.is_passable(3, 4, Direction::East), Some(true));
    assert_eq!(m.is_passable(0, 0, Direction::East), Some(false));
    assert_eq!(m.is_passable(17, 0, Direction::East), None);

    let t = m.tile_mut(0, 0).unwrap();
    t.passable = true;
    t.blocked_directions.push(DirectionalBlock {
        direction: Direction::South,
        block_inbound: false,
        block_outbound: true,
    });
    assert_eq!(m.is_passable(0, 0, Direction::South), Some(false));
    assert_eq!(m.is_passable(0, 0, Direction::West), Some(true));
}

#[test]
fn encoding_omits_empty_optional_fields() {
    let v = serde_json::to_value(GameMap::blank()).unwrap();
    assert_eq!(v["id"], json!(0));
    assert_eq!(v["tiles"], json!([]));
    assert_eq!(v["links"], json!({}));
    assert!(v.get("attributes").is_none());
    assert!(v["last_updated"].as_str().unwrap().ends_with('Z'));

    let tile = serde_json::to_value(MapTile::default()).unwrap();
    assert_eq!(tile, json!({ "passable": false }));
}
