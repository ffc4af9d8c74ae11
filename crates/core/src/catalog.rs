//! Piece catalog - the set of piece kinds a level is built from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::PieceTypeId;

/// One catalog entry.
///
/// `asset` is an opaque reference for the renderer (sprite name, glyph, ...);
/// the rules never look at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSpec {
    pub id: PieceTypeId,
    pub score: u32,
    #[serde(default)]
    pub asset: String,
}

impl PieceSpec {
    pub fn new(id: u32, score: u32, asset: impl Into<String>) -> Self {
        Self {
            id: PieceTypeId(id),
            score,
            asset: asset.into(),
        }
    }
}

/// The available piece types and their score values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceCatalog {
    specs: Vec<PieceSpec>,
}

impl PieceCatalog {
    /// Build a catalog, rejecting empty lists, duplicate ids and zero scores.
    pub fn new(specs: Vec<PieceSpec>) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(specs.len());
        for spec in &specs {
            if !seen.insert(spec.id) {
                return Err(ConfigError::DuplicatePieceType { id: spec.id });
            }
            if spec.score == 0 {
                return Err(ConfigError::ZeroScore { id: spec.id });
            }
        }

        Ok(Self { specs })
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn contains(&self, id: PieceTypeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: PieceTypeId) -> Option<&PieceSpec> {
        self.specs.iter().find(|spec| spec.id == id)
    }

    /// Score value of a type; unknown types score nothing
    pub fn score_of(&self, id: PieceTypeId) -> u32 {
        self.get(id).map(|spec| spec.score).unwrap_or(0)
    }

    /// Type ids in catalog order
    pub fn ids(&self) -> impl Iterator<Item = PieceTypeId> + '_ {
        self.specs.iter().map(|spec| spec.id)
    }

    pub fn specs(&self) -> &[PieceSpec] {
        &self.specs
    }
}
