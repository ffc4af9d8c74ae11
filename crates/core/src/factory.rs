//! Piece factory - constrained random piece generation
//!
//! Chooses piece types uniformly among the catalog entries that are not
//! excluded. Refill and population exclude the types of the two nearest
//! pieces to the left and the two nearest below the target cell, which keeps
//! freshly generated pieces from completing a run with settled neighbours.
//!
//! The random source is injectable. [`PieceFactory::seeded`] gives a
//! deterministic ChaCha8 stream for tests and replays.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::catalog::PieceCatalog;
use crate::piece::Piece;
use crate::types::{PieceId, PieceTypeId};

/// Generates piece instances from a catalog.
#[derive(Debug, Clone)]
pub struct PieceFactory<R = ChaCha8Rng> {
    catalog: PieceCatalog,
    rng: R,
    /// Next instance id to hand out
    next_id: u64,
}

impl PieceFactory<ChaCha8Rng> {
    /// Create a factory with a deterministic RNG stream
    pub fn seeded(catalog: PieceCatalog, seed: u64) -> Self {
        Self::with_rng(catalog, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Create a factory seeded from OS entropy
    pub fn from_entropy(catalog: PieceCatalog) -> Self {
        Self::with_rng(catalog, ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> PieceFactory<R> {
    pub fn with_rng(catalog: PieceCatalog, rng: R) -> Self {
        Self {
            catalog,
            rng,
            next_id: 0,
        }
    }

    pub fn catalog(&self) -> &PieceCatalog {
        &self.catalog
    }

    /// Pick a type uniformly among catalog types not in `excluded`.
    ///
    /// Falls back to an unconstrained uniform pick when `excluded` covers the
    /// whole catalog, so this never fails.
    pub fn random_type(&mut self, excluded: &[PieceTypeId]) -> PieceTypeId {
        let allowed: Vec<PieceTypeId> = self
            .catalog
            .ids()
            .filter(|id| !excluded.contains(id))
            .collect();

        if let Some(&id) = allowed.choose(&mut self.rng) {
            return id;
        }

        log::debug!(
            "exclusion set {:?} covers the catalog, picking unconstrained",
            excluded
        );
        let specs = self.catalog.specs();
        specs
            .choose(&mut self.rng)
            .map_or(specs[0].id, |spec| spec.id)
    }

    /// Create a new unplaced piece of a random allowed type
    pub fn spawn(&mut self, excluded: &[PieceTypeId]) -> Piece {
        let kind = self.random_type(excluded);
        self.spawn_kind(kind)
    }

    /// Create a new unplaced piece of a given type
    pub fn spawn_kind(&mut self, kind: PieceTypeId) -> Piece {
        let id = PieceId(self.next_id);
        self.next_id += 1;
        Piece::new(id, kind)
    }
}
