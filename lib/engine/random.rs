use super::Suggest;
use crate::chess::{Move, Position};
use async_trait::async_trait;
use derive_more::{Constructor, Display, Error};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use test_strategy::Arbitrary;

/// The reason why [`Random`] could not suggest a [`Move`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Arbitrary, Error)]
#[display(fmt = "there are no legal moves in position `{}`", _0)]
pub struct NoLegalMoves(#[error(not(source))] pub Position);

/// A trivial engine that plays random, but stable, moves.
///
/// The same seed always suggests the same move in the same position.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Constructor, Arbitrary)]
pub struct Random {
    seed: u64,
}

impl Random {
    fn pick(&self, pos: &Position) -> Result<Move, NoLegalMoves> {
        let mut moves = pos.moves();
        let count = moves.len() as u64;
        if count == 0 {
            return Err(NoLegalMoves(pos.clone()));
        }

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        pos.hash(&mut hasher);

        match moves.nth((hasher.finish() % count) as usize) {
            Some(m) => Ok(m),
            None => Err(NoLegalMoves(pos.clone())),
        }
    }
}

#[async_trait]
impl Suggest for Random {
    type Error = NoLegalMoves;

    async fn suggest(&self, pos: &Position) -> Result<Move, Self::Error> {
        self.pick(pos)
    }
}
