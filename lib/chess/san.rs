use super::Position;
use derive_more::{DebugCustom, Display};
use proptest::{prelude::*, sample::Selector};
use shakmaty as sm;
use test_strategy::Arbitrary;

/// A representation of the [algebraic notation], including the check or checkmate suffix.
///
/// [algebraic notation]: https://www.chessprogramming.org/Algebraic_Chess_Notation
#[derive(DebugCustom, Display, Clone, Eq, PartialEq, Hash, Arbitrary)]
#[debug(fmt = "San({})", self)]
#[display(fmt = "{}", _0)]
pub struct San(
    #[strategy(any::<(Position, Selector)>().prop_filter_map("end position", |(pos, selector)| {
            let m = selector.try_select(sm::Position::legal_moves(pos.as_ref()))?;
            Some(sm::san::SanPlus::from_move(sm::Chess::from(pos), &m))
        })
    )]
    sm::san::SanPlus,
);

impl San {
    /// Whether this move gives check.
    pub fn is_check(&self) -> bool {
        self.0.suffix.is_some()
    }
}

#[doc(hidden)]
impl From<sm::san::SanPlus> for San {
    fn from(san: sm::san::SanPlus) -> Self {
        San(san)
    }
}

#[doc(hidden)]
impl From<San> for sm::san::SanPlus {
    fn from(san: San) -> Self {
        san.0
    }
}
