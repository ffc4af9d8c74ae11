//! Effect interface - the boundary to rendering and audio collaborators
//!
//! The rules suspend on every awaited request until the collaborator reports
//! the visual step finished. Fire-and-forget hooks return immediately.
//!
//! | Request | Awaited | Issued by |
//! |---------|---------|-----------|
//! | `request_moves` | yes | swap, revert |
//! | `request_remove_effect` | yes | clear phase, per matched piece |
//! | `request_drop_effect` | yes | drop phase, per falling piece |
//! | `request_spawn_effect` | yes | refill phase, per new piece |
//! | `request_populate_effect` | yes | initial population, per new piece |
//! | `settle` | yes | end of a swap, before input is re-enabled |
//! | `request_shake_effect` | no | drag towards an empty cell |
//! | `request_highlight` / `clear_highlight` | no | selection |
//! | `play_sound` | no | see [`SoundCue`] |

use crate::piece::Piece;
use crate::types::{Coord, PieceId, SoundCue, WorldPos};

/// One piece travelling to a world position
#[derive(Debug, Clone, Copy)]
pub struct PieceMove<'a> {
    pub piece: &'a Piece,
    pub target: WorldPos,
}

/// Rendering and audio hooks invoked by the board.
///
/// Implementations are driven from a single task; the board never issues two
/// requests concurrently.
#[allow(async_fn_in_trait)]
pub trait BoardEffects {
    /// Animate every piece in `moves` to its target; resolves when all arrive
    async fn request_moves(&mut self, moves: &[PieceMove<'_>]);

    /// Show a piece that was just placed by a refill
    async fn request_spawn_effect(&mut self, piece: &Piece);

    /// Show a piece that was just placed while populating a fresh board
    async fn request_populate_effect(&mut self, piece: &Piece) {
        self.request_spawn_effect(piece).await;
    }

    /// Play the removal of a matched piece, before it leaves the grid
    async fn request_remove_effect(&mut self, piece: &Piece);

    /// Animate a piece falling `rows` rows from its current cell
    async fn request_drop_effect(&mut self, piece: &Piece, rows: u32);

    /// Pause after a swap has fully resolved
    async fn settle(&mut self) {}

    fn request_shake_effect(&mut self, _piece: &Piece) {}

    fn request_highlight(&mut self, _piece: &Piece) {}

    fn clear_highlight(&mut self) {}

    fn play_sound(&mut self, _cue: SoundCue) {}
}

/// Effects that complete immediately and draw nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEffects;

impl BoardEffects for NoopEffects {
    async fn request_moves(&mut self, _moves: &[PieceMove<'_>]) {}

    async fn request_spawn_effect(&mut self, _piece: &Piece) {}

    async fn request_remove_effect(&mut self, _piece: &Piece) {}

    async fn request_drop_effect(&mut self, _piece: &Piece, _rows: u32) {}
}

impl<E: BoardEffects> BoardEffects for &mut E {
    async fn request_moves(&mut self, moves: &[PieceMove<'_>]) {
        (**self).request_moves(moves).await;
    }

    async fn request_spawn_effect(&mut self, piece: &Piece) {
        (**self).request_spawn_effect(piece).await;
    }

    async fn request_populate_effect(&mut self, piece: &Piece) {
        (**self).request_populate_effect(piece).await;
    }

    async fn request_remove_effect(&mut self, piece: &Piece) {
        (**self).request_remove_effect(piece).await;
    }

    async fn request_drop_effect(&mut self, piece: &Piece, rows: u32) {
        (**self).request_drop_effect(piece, rows).await;
    }

    async fn settle(&mut self) {
        (**self).settle().await;
    }

    fn request_shake_effect(&mut self, piece: &Piece) {
        (**self).request_shake_effect(piece);
    }

    fn request_highlight(&mut self, piece: &Piece) {
        (**self).request_highlight(piece);
    }

    fn clear_highlight(&mut self) {
        (**self).clear_highlight();
    }

    fn play_sound(&mut self, cue: SoundCue) {
        (**self).play_sound(cue);
    }
}

/// One observed effect request, see [`RecordingEffects`]
#[derive(Debug, Clone, PartialEq)]
pub enum EffectEvent {
    Moves(Vec<(PieceId, WorldPos)>),
    Spawn { id: PieceId, at: Coord },
    Populate { id: PieceId, at: Coord },
    Remove { id: PieceId, at: Coord },
    Drop { id: PieceId, from: Coord, rows: u32 },
    Shake(PieceId),
    Highlight(PieceId),
    ClearHighlight,
    Sound(SoundCue),
}

/// Effects that complete immediately and keep an ordered log of requests
#[derive(Debug, Clone, Default)]
pub struct RecordingEffects {
    pub events: Vec<EffectEvent>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> Vec<SoundCue> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EffectEvent::Sound(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&EffectEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl BoardEffects for RecordingEffects {
    async fn request_moves(&mut self, moves: &[PieceMove<'_>]) {
        self.events.push(EffectEvent::Moves(
            moves.iter().map(|m| (m.piece.id(), m.target)).collect(),
        ));
    }

    async fn request_spawn_effect(&mut self, piece: &Piece) {
        self.events.push(EffectEvent::Spawn {
            id: piece.id(),
            at: piece.coord(),
        });
    }

    async fn request_populate_effect(&mut self, piece: &Piece) {
        self.events.push(EffectEvent::Populate {
            id: piece.id(),
            at: piece.coord(),
        });
    }

    async fn request_remove_effect(&mut self, piece: &Piece) {
        self.events.push(EffectEvent::Remove {
            id: piece.id(),
            at: piece.coord(),
        });
    }

    async fn request_drop_effect(&mut self, piece: &Piece, rows: u32) {
        self.events.push(EffectEvent::Drop {
            id: piece.id(),
            from: piece.coord(),
            rows,
        });
    }

    fn request_shake_effect(&mut self, piece: &Piece) {
        self.events.push(EffectEvent::Shake(piece.id()));
    }

    fn request_highlight(&mut self, piece: &Piece) {
        self.events.push(EffectEvent::Highlight(piece.id()));
    }

    fn clear_highlight(&mut self) {
        self.events.push(EffectEvent::ClearHighlight);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.events.push(EffectEvent::Sound(cue));
    }
}
