//! Level files: a tile grid split into named layers plus named object layers.
//!
//! Tile layers are written as rows of single-character symbols. The level's
//! `tilesets` table maps each symbol to an image path under the asset root.
//! `.` and space are empty cells.
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "level_id": "world",
//!   "tile_size": 64,
//!   "width": 4,
//!   "height": 2,
//!   "tilesets": { "G": "images/tiles/ground" },
//!   "layers": [
//!     { "type": "tiles", "name": "Main", "rows": ["....", "GGGG"] },
//!     { "type": "objects", "name": "Entities",
//!       "objects": [{ "name": "Player", "x": 10, "y": 0, "width": 0, "height": 0 }] }
//!   ]
//! }
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::rect::FRect;

const SUPPORTED_VERSION: &str = "0.1";

pub const MAIN_LAYER: &str = "Main";
pub const DECORATION_LAYER: &str = "Decoration";
pub const ENTITIES_LAYER: &str = "Entities";

pub const PLAYER_OBJECT: &str = "Player";
pub const GIFT_OBJECT: &str = "Gift";
/// Both names place a patrolling ground enemy.
pub const WALKER_OBJECTS: [&str; 2] = ["Worm", "Homeless"];

#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub version: String,
    pub level_id: String,
    pub tile_size: u32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub tilesets: BTreeMap<String, String>,
    pub layers: Vec<LevelLayer>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LevelLayer {
    Tiles {
        name: String,
        rows: Vec<String>,
    },
    Objects {
        name: String,
        objects: Vec<LevelObject>,
    },
}

impl LevelLayer {
    pub fn name(&self) -> &str {
        match self {
            LevelLayer::Tiles { name, .. } | LevelLayer::Objects { name, .. } => name,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LevelObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl LevelObject {
    pub fn rect(&self) -> FRect {
        FRect::new(self.x, self.y, self.width, self.height)
    }
}

/// One occupied cell of a tile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePlacement<'a> {
    pub x: i32,
    pub y: i32,
    /// Image path from the tileset table.
    pub image: &'a str,
}

impl LevelFile {
    pub fn pixel_width(&self) -> f32 {
        (self.width * self.tile_size) as f32
    }

    pub fn pixel_height(&self) -> f32 {
        (self.height * self.tile_size) as f32
    }

    pub fn layer(&self, name: &str) -> Option<&LevelLayer> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    /// Occupied cells of a tile layer in row-major order. Missing or
    /// non-tile layers yield nothing.
    pub fn tiles(&self, layer: &str) -> Vec<TilePlacement<'_>> {
        let Some(LevelLayer::Tiles { rows, .. }) = self.layer(layer) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                if is_empty_symbol(symbol) {
                    continue;
                }
                if let Some(image) = self.tilesets.get(symbol.encode_utf8(&mut [0; 4]) as &str) {
                    out.push(TilePlacement {
                        x: x as i32,
                        y: y as i32,
                        image: image.as_str(),
                    });
                }
            }
        }
        out
    }

    pub fn objects(&self, layer: &str) -> &[LevelObject] {
        match self.layer(layer) {
            Some(LevelLayer::Objects { objects, .. }) => objects.as_slice(),
            _ => &[],
        }
    }
}

fn is_empty_symbol(symbol: char) -> bool {
    symbol == '.' || symbol == ' '
}

pub fn load_level_from_path(path: &Path) -> Result<LevelFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    parse_level(&raw).map_err(|e| format!("{e} ({})", path.display()))
}

pub fn parse_level(raw: &str) -> Result<LevelFile, String> {
    let level: LevelFile =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse level JSON: {e}"))?;
    validate_level(&level)?;
    Ok(level)
}

fn validate_level(level: &LevelFile) -> Result<(), String> {
    if level.version != SUPPORTED_VERSION {
        return Err(format!(
            "Level validation failed: unsupported version '{}' (expected '{SUPPORTED_VERSION}')",
            level.version
        ));
    }
    if level.layers.is_empty() {
        return Err("Level validation failed: layers array is empty".to_string());
    }
    if level.tile_size == 0 {
        return Err("Level validation failed: tile_size must be > 0".to_string());
    }
    if level.width == 0 || level.height == 0 {
        return Err("Level validation failed: width and height must be > 0".to_string());
    }
    for symbol in level.tilesets.keys() {
        let mut chars = symbol.chars();
        let single = matches!((chars.next(), chars.next()), (Some(c), None) if !is_empty_symbol(c));
        if !single {
            return Err(format!(
                "Level validation failed: tileset key '{symbol}' must be one non-empty character"
            ));
        }
    }

    let mut layer_names = HashSet::new();
    for layer in &level.layers {
        if !layer_names.insert(layer.name()) {
            return Err(format!(
                "Level validation failed: duplicate layer name '{}'",
                layer.name()
            ));
        }
        match layer {
            LevelLayer::Tiles { name, rows } => validate_rows(level, name, rows)?,
            LevelLayer::Objects { name, objects } => {
                if objects.is_empty() {
                    log::warn!("Level layer '{name}' has no objects.");
                }
                for object in objects {
                    if object.width < 0.0 || object.height < 0.0 {
                        return Err(format!(
                            "Level validation failed: object '{}' in '{name}' has negative size",
                            object.name
                        ));
                    }
                }
            }
        }
    }

    if !matches!(level.layer(MAIN_LAYER), Some(LevelLayer::Tiles { .. })) {
        return Err(format!(
            "Level validation failed: missing tile layer '{MAIN_LAYER}'"
        ));
    }
    let players = level
        .objects(ENTITIES_LAYER)
        .iter()
        .filter(|object| object.name == PLAYER_OBJECT)
        .count();
    if players != 1 {
        return Err(format!(
            "Level validation failed: expected exactly one '{PLAYER_OBJECT}' in '{ENTITIES_LAYER}', found {players}"
        ));
    }
    Ok(())
}

fn validate_rows(level: &LevelFile, name: &str, rows: &[String]) -> Result<(), String> {
    if rows.len() > level.height as usize {
        return Err(format!(
            "Level validation failed: layer '{name}' has {} rows but level height is {}",
            rows.len(),
            level.height
        ));
    }
    for (y, row) in rows.iter().enumerate() {
        if row.chars().count() > level.width as usize {
            return Err(format!(
                "Level validation failed: layer '{name}' row {y} is wider than level width {}",
                level.width
            ));
        }
        for (x, symbol) in row.chars().enumerate() {
            if is_empty_symbol(symbol) {
                continue;
            }
            if !level.tilesets.contains_key(symbol.encode_utf8(&mut [0; 4]) as &str) {
                return Err(format!(
                    "Level validation failed: layer '{name}' uses unknown tile '{symbol}' at ({x}, {y})"
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pf_level_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    const VALID: &str = r#"{
      "version":"0.1",
      "level_id":"test",
      "tile_size":64,
      "width":4,
      "height":3,
      "tilesets":{"G":"images/tiles/ground","F":"images/tiles/flower"},
      "layers":[
        {"type":"tiles","name":"Main","rows":["....","G..G","GGGG"]},
        {"type":"tiles","name":"Decoration","rows":["F..."]},
        {"type":"objects","name":"Entities","objects":[
          {"name":"Player","x":70,"y":10},
          {"name":"Worm","x":0,"y":60,"width":256,"height":64}
        ]}
      ]
    }"#;

    #[test]
    fn load_level_valid_file_parses() {
        let path = temp_file_path("valid");
        fs::write(&path, VALID).expect("write temp file");

        let level = load_level_from_path(&path).expect("valid level should load");
        assert_eq!(level.level_id, "test");
        assert_eq!(level.pixel_width(), 256.0);
        assert_eq!(level.pixel_height(), 192.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn tiles_are_row_major_with_image_paths() {
        let level = parse_level(VALID).expect("valid level");
        let main = level.tiles(MAIN_LAYER);
        assert_eq!(main.len(), 6);
        assert_eq!(
            main[0],
            TilePlacement {
                x: 0,
                y: 1,
                image: "images/tiles/ground"
            }
        );
        assert_eq!(main.last().map(|t| (t.x, t.y)), Some((3, 2)));
        assert_eq!(level.tiles(DECORATION_LAYER)[0].image, "images/tiles/flower");
        assert!(level.tiles("Missing").is_empty());
        assert!(level.tiles(ENTITIES_LAYER).is_empty());
    }

    #[test]
    fn objects_keep_file_order() {
        let level = parse_level(VALID).expect("valid level");
        let names: Vec<_> = level
            .objects(ENTITIES_LAYER)
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["Player", "Worm"]);
        assert_eq!(
            level.objects(ENTITIES_LAYER)[1].rect(),
            FRect::new(0.0, 60.0, 256.0, 64.0)
        );
    }

    #[test]
    fn rejects_unknown_tile_symbol() {
        let raw = VALID.replace("\"G..G\"", "\"G..X\"");
        let err = parse_level(&raw).expect_err("unknown symbol should fail");
        assert!(err.contains("unknown tile 'X'"));
    }

    #[test]
    fn rejects_rows_outside_level() {
        let raw = VALID.replace("\"GGGG\"", "\"GGGGG\"");
        let err = parse_level(&raw).expect_err("wide row should fail");
        assert!(err.contains("wider than level width"));
    }

    #[test]
    fn rejects_missing_player() {
        let raw = VALID.replace("\"name\":\"Player\"", "\"name\":\"Gift\"");
        let err = parse_level(&raw).expect_err("level without player should fail");
        assert!(err.contains("exactly one 'Player'"));
    }

    #[test]
    fn rejects_duplicate_layer_names() {
        let raw = VALID.replace("\"name\":\"Decoration\"", "\"name\":\"Main\"");
        let err = parse_level(&raw).expect_err("duplicate layer should fail");
        assert!(err.contains("duplicate layer name"));
    }

    #[test]
    fn rejects_unsupported_version() {
        let raw = VALID.replace("\"version\":\"0.1\"", "\"version\":\"9.9\"");
        let err = parse_level(&raw).expect_err("unknown version should fail");
        assert!(err.contains("unsupported version '9.9'"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_level_from_path(Path::new("/nonexistent/level.json"))
            .expect_err("missing file should fail");
        assert!(err.contains("Failed to read level file"));
    }
}
