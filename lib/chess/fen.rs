use super::{Color, Piece, Position, Square};
use derive_more::{DebugCustom, Display, Error};
use proptest::{collection::hash_map, prelude::*};
use shakmaty as sm;
use std::str::FromStr;
use test_strategy::Arbitrary;

/// A representation of the [Forsyth–Edwards Notation].
///
/// Only the syntax is guaranteed, the position described may not be legal.
///
/// [Forsyth–Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
#[derive(DebugCustom, Display, Default, Clone, Eq, PartialEq, Hash, Arbitrary)]
#[debug(fmt = "Fen(\"{}\")", self)]
#[display(fmt = "{}", _0)]
pub struct Fen(
    #[strategy(hash_map(any::<Square>().prop_map_into(), any::<Piece>().prop_map_into(), 0..=64)
        .prop_map(|setup| setup.into_iter().collect())
        .prop_map(|board| sm::fen::Fen(sm::Setup { board, ..Default::default() }))
    )]
    sm::fen::Fen,
);

/// The reason why the string is not valid FEN.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum InvalidFen {
    #[display(fmt = "syntax error at the piece placement field")]
    InvalidPlacement,
    #[display(fmt = "syntax error at the side to move field")]
    InvalidTurn,
    #[display(fmt = "syntax error at the castling rights field")]
    InvalidCastlingRights,
    #[display(fmt = "syntax error at the en passant square field")]
    InvalidEnPassantSquare,
    #[display(fmt = "syntax error at the halfmove clock field")]
    InvalidHalfmoveClock,
    #[display(fmt = "syntax error at the fullmove counter field")]
    InvalidFullmoves,
    #[display(fmt = "unspecified syntax error")]
    InvalidSyntax,
}

#[doc(hidden)]
impl From<sm::fen::ParseFenError> for InvalidFen {
    fn from(e: sm::fen::ParseFenError) -> Self {
        use InvalidFen::*;
        match e {
            sm::fen::ParseFenError::InvalidBoard => InvalidPlacement,
            sm::fen::ParseFenError::InvalidTurn => InvalidTurn,
            sm::fen::ParseFenError::InvalidCastling => InvalidCastlingRights,
            sm::fen::ParseFenError::InvalidEpSquare => InvalidEnPassantSquare,
            sm::fen::ParseFenError::InvalidHalfmoveClock => InvalidHalfmoveClock,
            sm::fen::ParseFenError::InvalidFullmoves => InvalidFullmoves,
            _ => InvalidSyntax,
        }
    }
}

impl Fen {
    /// The trailing fields assumed when a FEN string is truncated.
    const DEFAULTS: [&'static str; 5] = ["w", "KQkq", "-", "0", "1"];

    /// Parses a FEN string that may be missing any number of trailing fields.
    ///
    /// Only the piece placement is mandatory, the other fields default to `w KQkq - 0 1`.
    pub fn from_partial(s: &str) -> Result<Self, InvalidFen> {
        let fields: Vec<&str> = s.split_whitespace().collect();

        match fields.len() {
            0 => Err(InvalidFen::InvalidPlacement),
            n if n > Self::DEFAULTS.len() + 1 => Err(InvalidFen::InvalidSyntax),
            n => {
                let defaults = Self::DEFAULTS[n - 1..].iter().copied();
                let full: Vec<&str> = fields.into_iter().chain(defaults).collect();
                full.join(" ").parse()
            }
        }
    }

    /// The piece placement field.
    pub fn placement(&self) -> String {
        let fen = self.to_string();
        match fen.split_once(' ') {
            Some((placement, _)) => placement.to_string(),
            None => fen,
        }
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.0 .0.turn.into()
    }

    /// The [`Piece`] at a given [`Square`], if any.
    pub fn piece_at(&self, s: Square) -> Option<Piece> {
        self.0 .0.board.piece_at(s.into()).map(Piece::from)
    }
}

impl FromStr for Fen {
    type Err = InvalidFen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Fen(s.parse()?))
    }
}

impl From<Position> for Fen {
    fn from(pos: Position) -> Self {
        sm::Setup::from(pos).into()
    }
}

#[doc(hidden)]
impl From<sm::Setup> for Fen {
    fn from(setup: sm::Setup) -> Self {
        Fen(sm::fen::Fen(setup))
    }
}

#[doc(hidden)]
impl From<Fen> for sm::Setup {
    fn from(fen: Fen) -> Self {
        fen.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn parsing_printed_fen_is_an_identity(fen: Fen) {
        assert_eq!(fen.to_string().parse(), Ok(fen));
    }

    #[proptest]
    fn parsing_invalid_fen_fails(
        #[by_ref] fen: Fen,
        #[strategy(..=#fen.to_string().len())] n: usize,
        #[strategy("[^[:ascii:]]+")] r: String,
    ) {
        assert!([&fen.to_string()[..n], &r].concat().parse::<Fen>().is_err());
    }

    #[proptest]
    fn from_partial_accepts_complete_fen(fen: Fen) {
        assert_eq!(Fen::from_partial(&fen.to_string()), Ok(fen));
    }

    #[proptest]
    fn from_partial_preserves_placement_and_turn(
        fen: Fen,
        #[strategy(1usize..=6)] n: usize,
    ) {
        let s = fen.to_string();
        let partial: Vec<&str> = s.split(' ').take(n).collect();
        let parsed = Fen::from_partial(&partial.join(" "))?;

        assert_eq!(parsed.placement(), fen.placement());
        assert_eq!(parsed.turn(), if n > 1 { fen.turn() } else { Color::White });
        for sq in Square::iter() {
            assert_eq!(parsed.piece_at(sq), fen.piece_at(sq));
        }
    }

    #[test]
    fn from_partial_fills_in_default_fields() {
        let fen = Fen::from_partial("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").unwrap();
        assert_eq!(fen, Fen::from(Position::default()));
        assert_eq!(
            fen.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn from_partial_respects_given_side_to_move() {
        let fen = Fen::from_partial("8/8/8/8/8/8/8/K6k b").unwrap();
        assert_eq!(fen.turn(), Color::Black);
    }

    #[test]
    fn from_partial_fails_if_there_are_too_many_fields() {
        assert_eq!(
            Fen::from_partial("8/8/8/8/8/8/8/K6k w - - 0 1 extra"),
            Err(InvalidFen::InvalidSyntax)
        );
    }

    #[test]
    fn from_partial_fails_if_placement_is_malformed() {
        for s in ["", "   ", "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR", "xnbqkbnr/8/8/8/8/8/8/8", "8/8/8"] {
            assert_eq!(Fen::from_partial(s), Err(InvalidFen::InvalidPlacement), "{s:?}");
        }
    }

    #[proptest]
    fn from_partial_never_panics(s: String) {
        let _ = Fen::from_partial(&s);
    }

    #[test]
    fn placement_is_the_first_field() {
        assert_eq!(
            Fen::from(Position::default()).placement(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }
}
