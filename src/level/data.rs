//! Level description: the single interchange format between the generator,
//! level files and the grid.
//!
//! Rows are stored top row first. Field names follow the level JSON files
//! (`levelId`, `playerStartPosition`, `enemyType`, ...).

use std::fs;
use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integer point in level coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPoint {
    /// Column
    pub x: i32,
    /// Row, counted from the top
    pub y: i32,
}

impl LevelPoint {
    /// Marker for "no explicit position"
    pub const UNSET: Self = Self { x: -1, y: -1 };

    /// Create a point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// An explicit position is one with a non-negative column
    #[must_use]
    pub fn is_set(self) -> bool {
        self.x >= 0
    }
}

impl Default for LevelPoint {
    fn default() -> Self {
        Self::UNSET
    }
}

impl From<IVec2> for LevelPoint {
    fn from(v: IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<LevelPoint> for IVec2 {
    fn from(p: LevelPoint) -> Self {
        IVec2::new(p.x, p.y)
    }
}

/// Enemy species named by a level's spawn list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyType {
    /// Plain chaser
    Pooka,
    /// Chaser that breathes fire along its row
    Fygar,
}

impl EnemyType {
    /// Parse a spawn tag (`"P"` / `"F"`, case-insensitive)
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            t if t.eq_ignore_ascii_case("p") => Some(Self::Pooka),
            t if t.eq_ignore_ascii_case("f") => Some(Self::Fygar),
            _ => None,
        }
    }

    /// The spawn tag written to level files
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Pooka => "P",
            Self::Fygar => "F",
        }
    }
}

/// One enemy entry of a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemySpawnData {
    /// `"P"` for Pooka, `"F"` for Fygar
    pub enemy_type: String,
    /// Block position in level coordinates
    pub position: LevelPoint,
}

/// A complete level description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelData {
    /// Stable identifier
    pub level_id: String,
    /// Display name
    pub level_name: String,
    /// Symbol rows, top row first
    pub map: Vec<String>,
    /// Explicit player start, `UNSET` to fall back to the `*` marker
    pub player_start_position: LevelPoint,
    /// Enemy spawn list
    pub enemies: Vec<EnemySpawnData>,
}

impl Default for LevelData {
    fn default() -> Self {
        Self {
            level_id: String::new(),
            level_name: String::new(),
            map: Vec::new(),
            player_start_position: LevelPoint::UNSET,
            enemies: Vec::new(),
        }
    }
}

impl LevelData {
    /// The built-in level used when nothing else can be loaded
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            level_id: "def".to_string(),
            level_name: "Default".to_string(),
            map: vec![
                "#######".to_string(),
                "#1*001#".to_string(),
                "#######".to_string(),
            ],
            ..Default::default()
        }
    }

    /// Parse a level from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a level description
    pub fn from_json_str(content: &str) -> Result<Self, LevelError> {
        serde_json::from_str(content).map_err(|e| LevelError::Deserialize(e.to_string()))
    }

    /// Parse a level from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the RON is not a level description
    pub fn from_ron_str(content: &str) -> Result<Self, LevelError> {
        ron::from_str(content).map_err(|e| LevelError::Deserialize(e.to_string()))
    }

    /// Save the level to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LevelError::Serialize(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Save the level to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| LevelError::Serialize(e.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Load a level file, choosing the format from the extension
    /// (`.ron` is RON, anything else is JSON).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_ron = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));
        if is_ron {
            Self::from_ron_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Load a level file, falling back to the built-in level on any error
    #[must_use]
    pub fn load_or_fallback(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(level) => level,
            Err(e) => {
                log::warn!("Failed to load level {}: {e}; using default", path.display());
                Self::fallback()
            }
        }
    }
}

/// Errors that can occur while reading or writing level files
#[derive(Debug, Error)]
pub enum LevelError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
