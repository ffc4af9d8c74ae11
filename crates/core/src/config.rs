//! Level and process configuration
//!
//! Levels are plain serde data, usually loaded from a JSON list:
//!
//! ```json
//! [
//!   { "name": "Classic", "width": 8, "height": 8,
//!     "pieces": [ { "id": 0, "score": 1, "asset": "blue" },
//!                 { "id": 1, "score": 1, "asset": "green" },
//!                 { "id": 2, "score": 2, "asset": "red" } ],
//!     "revert_if_no_match": true, "target_score": 50 }
//! ]
//! ```
//!
//! Omitted fields take their defaults. Everything that builds a board
//! validates first and fails with a [`ConfigError`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{PieceCatalog, PieceSpec};
use crate::error::ConfigError;
use crate::types::{
    Coord, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, DEFAULT_TARGET_SCORE, DROP_MS_PER_ROW,
    POPULATE_SPAWN_MS, REMOVE_MS, SETTLE_MS, SHAKE_MS, SPAWN_MS, SWAP_MS,
};

/// Effect durations in milliseconds, consumed by effect implementations only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationDurations {
    pub swap: u32,
    pub drop_per_row: u32,
    pub remove: u32,
    pub spawn: u32,
    pub populate_spawn: u32,
    pub shake: u32,
    pub settle: u32,
}

impl Default for AnimationDurations {
    fn default() -> Self {
        Self {
            swap: SWAP_MS,
            drop_per_row: DROP_MS_PER_ROW,
            remove: REMOVE_MS,
            spawn: SPAWN_MS,
            populate_spawn: POPULATE_SPAWN_MS,
            shake: SHAKE_MS,
            settle: SETTLE_MS,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_target_score() -> u32 {
    DEFAULT_TARGET_SCORE
}

/// One level's board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub pieces: Vec<PieceSpec>,
    /// Swap a non-matching move back instead of keeping it
    #[serde(default = "default_true")]
    pub revert_if_no_match: bool,
    /// Refill emptied cells after each drop
    #[serde(default = "default_true")]
    pub auto_refill: bool,
    #[serde(default = "default_target_score")]
    pub target_score: u32,
    /// World position the board is centred on
    #[serde(default)]
    pub center: (i32, i32),
    #[serde(default)]
    pub durations: AnimationDurations,
}

impl Default for LevelConfig {
    fn default() -> Self {
        let pieces = ["blue", "green", "violet", "red", "yellow"]
            .into_iter()
            .zip(0u32..)
            .map(|(asset, id)| PieceSpec::new(id, 1, asset))
            .collect();

        Self {
            name: "Classic".to_string(),
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            pieces,
            revert_if_no_match: true,
            auto_refill: true,
            target_score: DEFAULT_TARGET_SCORE,
            center: (0, 0),
            durations: AnimationDurations::default(),
        }
    }
}

impl LevelConfig {
    /// Parse a single level from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let level: LevelConfig = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::InvalidWidth(self.width));
        }
        if self.height == 0 {
            return Err(ConfigError::InvalidHeight(self.height));
        }
        if self.target_score == 0 {
            return Err(ConfigError::InvalidTargetScore(self.target_score));
        }
        self.catalog().map(|_| ())
    }

    pub fn catalog(&self) -> Result<PieceCatalog, ConfigError> {
        PieceCatalog::new(self.pieces.clone())
    }

    pub fn center_coord(&self) -> Coord {
        Coord::new(self.center.0, self.center.1)
    }
}

/// An ordered list of levels with a wrapping cursor
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSet {
    levels: Vec<LevelConfig>,
    index: usize,
}

impl LevelSet {
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyLevelSet);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels, index: 0 })
    }

    /// The levels shipped with the game
    pub fn builtin() -> Self {
        let classic = LevelConfig::default();

        let compact = LevelConfig {
            name: "Compact".to_string(),
            width: 6,
            height: 6,
            pieces: classic.pieces[..4].to_vec(),
            target_score: 30,
            ..classic.clone()
        };

        let mut gems = classic.pieces.clone();
        gems.push(PieceSpec::new(5, 2, "white"));
        let open = LevelConfig {
            name: "Free Swap".to_string(),
            width: 9,
            height: 8,
            pieces: gems,
            revert_if_no_match: false,
            target_score: 80,
            ..classic.clone()
        };

        Self {
            levels: vec![classic, compact, open],
            index: 0,
        }
    }

    /// Parse a JSON array of levels and validate each
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let levels: Vec<LevelConfig> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &LevelConfig {
        &self.levels[self.index]
    }

    /// Advance to the next level, wrapping to the first
    pub fn next(&mut self) -> &LevelConfig {
        self.index = (self.index + 1) % self.levels.len();
        self.current()
    }

    /// Step back to the previous level, wrapping to the last
    pub fn previous(&mut self) -> &LevelConfig {
        self.index = self
            .index
            .checked_sub(1)
            .unwrap_or(self.levels.len() - 1);
        self.current()
    }
}

/// Accumulated score against a level's target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreProgress {
    pub current: u32,
    pub target: u32,
}

impl ScoreProgress {
    pub fn new(target: u32) -> Self {
        Self { current: 0, target }
    }

    pub fn add(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount);
    }

    /// Progress in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        if self.target == 0 {
            return 1.0;
        }
        (self.current as f32 / self.target as f32).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.target
    }

    pub fn reset(&mut self, target: u32) {
        *self = Self::new(target);
    }
}

/// Process-level settings read from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameConfig {
    /// JSON level list (`MATCH_BOARD_LEVELS`); built-in levels when unset
    pub levels_path: Option<PathBuf>,
    /// RNG seed (`MATCH_BOARD_SEED`); entropy when unset
    pub seed: Option<u64>,
    /// Log file (`MATCH_BOARD_LOG_PATH`); logging is off when unset
    pub log_path: Option<PathBuf>,
}

impl GameConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let seed = match get("MATCH_BOARD_SEED") {
            Some(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "MATCH_BOARD_SEED",
                value: raw,
            })?),
            None => None,
        };

        Ok(Self {
            levels_path: get("MATCH_BOARD_LEVELS").map(PathBuf::from),
            seed,
            log_path: get("MATCH_BOARD_LOG_PATH").map(PathBuf::from),
        })
    }

    pub fn load_levels(&self) -> Result<LevelSet, ConfigError> {
        match &self.levels_path {
            Some(path) => LevelSet::load(path),
            None => Ok(LevelSet::builtin()),
        }
    }
}
