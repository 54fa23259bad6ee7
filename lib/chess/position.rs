use super::{Color, Fen, Move, Outcome, ParseMoveError, Piece, San, Square};
use derive_more::{DebugCustom, Display, Error};
use proptest::{prelude::*, sample::Selector};
use shakmaty as sm;
use std::{convert::TryFrom, num::NonZeroU32};
use test_strategy::Arbitrary;

/// Represents an illegal [`Move`] in a given [`Position`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Arbitrary, Error)]
#[display(fmt = "move `{}` is illegal in position `{}`", _0, _1)]
pub struct IllegalMove(pub Move, pub Position);

/// The current position on the chess board.
///
/// This type guarantees that it only holds legal positions.
#[derive(DebugCustom, Display, Default, Clone, Eq, PartialEq, Hash, Arbitrary)]
#[debug(fmt = "Position(\"{}\")", self)]
#[display(fmt = "{}", "Fen::from(self.clone())")]
pub struct Position(
    #[strategy((0..256, any::<Selector>()).prop_map(|(moves, selector)| {
        let mut chess = sm::Chess::default();
        for _ in 0..moves {
            match selector.try_select(sm::Position::legal_moves(&chess)) {
                Some(m) => sm::Position::play_unchecked(&mut chess, &m),
                _ => break,
            }
        }
        chess
    }).no_shrink())]
    sm::Chess,
);

impl Position {
    /// The side to move.
    pub fn turn(&self) -> Color {
        sm::Position::turn(&self.0).into()
    }

    /// The number of halfmoves since the last capture or pawn advance.
    pub fn halfmoves(&self) -> u32 {
        sm::Position::halfmoves(&self.0)
    }

    /// The current move number since the start of the game.
    pub fn fullmoves(&self) -> NonZeroU32 {
        sm::Position::fullmoves(&self.0)
    }

    /// The [`Piece`] at a given [`Square`], if any.
    pub fn piece_at(&self, s: Square) -> Option<Piece> {
        sm::Position::board(&self.0)
            .piece_at(s.into())
            .map(Into::into)
    }

    /// Whether this position is a [check].
    ///
    /// [check]: https://www.chessprogramming.org/Check
    pub fn is_check(&self) -> bool {
        sm::Position::is_check(&self.0)
    }

    /// Whether this position is a [checkmate].
    ///
    /// [checkmate]: https://www.chessprogramming.org/Checkmate
    pub fn is_checkmate(&self) -> bool {
        sm::Position::is_checkmate(&self.0)
    }

    /// Whether this position is a [stalemate].
    ///
    /// [stalemate]: https://www.chessprogramming.org/Stalemate
    pub fn is_stalemate(&self) -> bool {
        sm::Position::is_stalemate(&self.0)
    }

    /// Whether this position has [insufficient material].
    ///
    /// [insufficient material]: https://www.chessprogramming.org/Material#InsufficientMaterial
    pub fn is_material_insufficient(&self) -> bool {
        sm::Position::is_insufficient_material(&self.0)
    }

    /// The [`Outcome`] this position forces on the game, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.is_checkmate() {
            Some(Outcome::Checkmate(!self.turn()))
        } else if self.is_stalemate() {
            Some(Outcome::Stalemate)
        } else if self.is_material_insufficient() {
            Some(Outcome::DrawByInsufficientMaterial)
        } else if self.halfmoves() >= 150 {
            Some(Outcome::DrawBy75MoveRule)
        } else {
            None
        }
    }

    /// An iterator over the legal [`Move`]s that can be played in this position.
    pub fn moves(&self) -> impl ExactSizeIterator<Item = Move> {
        sm::Position::legal_moves(&self.0)
            .into_iter()
            .map(|vm| Move::from(&vm))
    }

    /// The legal moves in this position in [`San`].
    pub fn sans(&self) -> Vec<San> {
        sm::Position::legal_moves(&self.0)
            .iter()
            .map(|vm| sm::san::SanPlus::from_move(self.0.clone(), vm).into())
            .collect()
    }

    /// Interprets a move in either standard algebraic or pure coordinate notation.
    ///
    /// The move is not checked for legality unless it's given in algebraic notation.
    pub fn parse_move(&self, s: &str) -> Result<Move, ParseMoveError> {
        let san = s.trim().parse::<sm::san::SanPlus>();
        match san.map(|sp| sp.san.to_move(&self.0)) {
            Ok(Ok(vm)) => Ok(Move::from(&vm)),
            _ => s.trim().parse(),
        }
    }

    /// Play a [`Move`] if legal in this position.
    pub fn play(&mut self, m: Move) -> Result<San, IllegalMove> {
        match sm::uci::Uci::to_move(&m.into(), &self.0) {
            Ok(vm) if sm::Position::is_legal(&self.0, &vm) => {
                Ok(sm::san::SanPlus::from_move_and_play_unchecked(&mut self.0, &vm).into())
            }

            _ => Err(IllegalMove(m, self.clone())),
        }
    }
}

/// The reason why the position represented by the FEN string is illegal.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum IllegalPosition {
    #[display(fmt = "at least one side has no king")]
    MissingKing,
    #[display(fmt = "at least one side has multiple kings")]
    TooManyKings,
    #[display(fmt = "there are pawns on the back-rank")]
    PawnsOnBackRank,
    #[display(fmt = "the player in check is not to move")]
    OppositeCheck,
    #[display(fmt = "invalid en passant square; wrong rank, occupied, or missing pushed pawn")]
    InvalidEnPassantSquare,
    #[display(fmt = "no sequence of legal moves can reach this position")]
    Other,
}

#[doc(hidden)]
impl From<sm::PositionError<sm::Chess>> for IllegalPosition {
    fn from(e: sm::PositionError<sm::Chess>) -> Self {
        let kinds = e.kinds();

        if kinds.contains(sm::PositionErrorKinds::MISSING_KING) {
            IllegalPosition::MissingKing
        } else if kinds.contains(sm::PositionErrorKinds::TOO_MANY_KINGS) {
            IllegalPosition::TooManyKings
        } else if kinds.contains(sm::PositionErrorKinds::PAWNS_ON_BACKRANK) {
            IllegalPosition::PawnsOnBackRank
        } else if kinds.contains(sm::PositionErrorKinds::OPPOSITE_CHECK) {
            IllegalPosition::OppositeCheck
        } else if kinds.contains(sm::PositionErrorKinds::INVALID_EP_SQUARE) {
            IllegalPosition::InvalidEnPassantSquare
        } else {
            IllegalPosition::Other
        }
    }
}

/// Castling rights inconsistent with the placement are dropped.
impl TryFrom<Fen> for Position {
    type Error = IllegalPosition;

    fn try_from(fen: Fen) -> Result<Self, Self::Error> {
        let chess = sm::Setup::from(fen)
            .position::<sm::Chess>(sm::CastlingMode::Standard)
            .or_else(sm::PositionError::ignore_invalid_castling_rights)?;

        Ok(Position(chess))
    }
}

#[doc(hidden)]
impl From<Position> for sm::Setup {
    fn from(pos: Position) -> Self {
        sm::Position::into_setup(pos.0, sm::EnPassantMode::Always)
    }
}

#[doc(hidden)]
impl From<sm::Chess> for Position {
    fn from(chess: sm::Chess) -> Self {
        Position(chess)
    }
}

#[doc(hidden)]
impl From<Position> for sm::Chess {
    fn from(pos: Position) -> Self {
        pos.0
    }
}

#[doc(hidden)]
impl AsRef<sm::Chess> for Position {
    fn as_ref(&self) -> &sm::Chess {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Promotion, Role};
    use test_strategy::proptest;

    fn fen(s: &str) -> Position {
        Position::try_from(s.parse::<Fen>().unwrap()).unwrap()
    }

    #[proptest]
    fn turn_returns_the_current_side_to_play(pos: Position) {
        assert_eq!(pos.turn(), sm::Setup::from(pos).turn.into());
    }

    #[proptest]
    fn halfmoves_returns_the_number_of_halfmoves_since_last_irreversible_move(pos: Position) {
        assert_eq!(pos.halfmoves(), sm::Setup::from(pos).halfmoves);
    }

    #[proptest]
    fn fullmoves_returns_the_current_move_number(pos: Position) {
        assert_eq!(pos.fullmoves(), sm::Setup::from(pos).fullmoves);
    }

    #[proptest]
    fn checkmate_implies_check(pos: Position) {
        assert!(!pos.is_checkmate() || pos.is_check());
    }

    #[proptest]
    fn checkmate_and_stalemate_are_mutually_exclusive(pos: Position) {
        assert!(!(pos.is_checkmate() && pos.is_stalemate()));
    }

    #[proptest]
    fn game_is_over_if_there_are_no_legal_moves(pos: Position) {
        if pos.moves().len() == 0 {
            assert!(pos.outcome().is_some());
        }
    }

    #[proptest]
    fn moves_returns_all_legal_moves_from_this_position(pos: Position) {
        for m in pos.moves() {
            let mut pos = pos.clone();
            assert_eq!(pos.piece_at(m.whence()).map(|p| p.color()), Some(pos.turn()));
            assert_eq!(pos.play(m).err(), None);
        }
    }

    #[proptest]
    fn sans_has_one_entry_per_legal_move(pos: Position) {
        assert_eq!(pos.sans().len(), pos.moves().len());
    }

    #[proptest]
    fn legal_move_updates_position(
        #[by_ref]
        #[filter(#pos.moves().len() > 0)]
        mut pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves());
        let vm = sm::uci::Uci::to_move(&m.into(), &pos.0)?;
        let mut next = pos.0.clone();
        let san = sm::san::SanPlus::from_move_and_play_unchecked(&mut next, &vm);
        assert_eq!(pos.play(m), Ok(san.into()));
        assert_eq!(pos, Position(next));
    }

    #[proptest]
    fn illegal_move_fails_without_changing_position(
        #[by_ref] mut pos: Position,
        #[filter(#pos.clone().play(#m).is_err())] m: Move,
    ) {
        let before = pos.clone();
        assert_eq!(pos.play(m), Err(IllegalMove(m, before.clone())));
        assert_eq!(pos, before);
    }

    #[proptest]
    fn legal_moves_can_be_parsed_in_either_notation(
        #[by_ref]
        #[filter(#pos.moves().len() > 0)]
        pos: Position,
        selector: Selector,
    ) {
        let m = selector.select(pos.moves());
        let san = pos.clone().play(m)?;
        assert_eq!(pos.parse_move(&m.to_string()), Ok(m));
        assert_eq!(pos.parse_move(&san.to_string()), Ok(m));
    }

    #[test]
    fn parse_move_accepts_castling_and_promotion() {
        let pos = fen("r3k3/1P6/8/8/8/8/8/R3K2R w KQq - 0 1");
        assert_eq!(
            pos.parse_move("O-O"),
            Ok(Move(Square::E1, Square::G1, Promotion::None))
        );
        assert_eq!(
            pos.parse_move("bxa8=Q+"),
            Ok(Move(Square::B7, Square::A8, Promotion::Queen))
        );
        assert_eq!(
            pos.parse_move("b7b8n"),
            Ok(Move(Square::B7, Square::B8, Promotion::Knight))
        );
    }

    #[test]
    fn parse_move_fails_on_gibberish() {
        assert_eq!(Position::default().parse_move("hello"), Err(ParseMoveError));
    }

    #[test]
    fn fools_mate_is_a_checkmate_by_black() {
        let mut pos = Position::default();
        for s in ["f3", "e5", "g4", "Qh4#"] {
            let m = pos.parse_move(s).unwrap();
            pos.play(m).unwrap();
        }

        assert!(pos.is_checkmate());
        assert_eq!(pos.outcome(), Some(Outcome::Checkmate(Color::Black)));
    }

    #[test]
    fn bare_kings_is_a_draw_by_insufficient_material() {
        let pos = fen("8/8/4k3/8/8/3K4/8/8 w - - 0 1");
        assert_eq!(pos.outcome(), Some(Outcome::DrawByInsufficientMaterial));
    }

    #[test]
    fn cornered_king_without_moves_is_a_stalemate() {
        let pos = fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(pos.outcome(), Some(Outcome::Stalemate));
    }

    #[test]
    fn seventy_five_moves_without_progress_is_a_draw() {
        let pos = fen("4k3/8/8/8/8/8/4P3/4K2R w - - 150 120");
        assert_eq!(pos.outcome(), Some(Outcome::DrawBy75MoveRule));
    }

    #[test]
    fn invalid_castling_rights_are_dropped() {
        let pos = Position::try_from(Fen::from_partial("4k3/8/8/8/8/8/8/4K3").unwrap());
        assert!(pos.is_ok());
    }

    #[test]
    fn position_without_king_is_illegal() {
        let fen = Fen::from_partial("8/8/8/8/8/8/8/8").unwrap();
        assert_eq!(Position::try_from(fen), Err(IllegalPosition::MissingKing));
    }

    #[test]
    fn piece_at_returns_the_piece_occupying_a_square() {
        let pos = Position::default();
        assert_eq!(pos.piece_at(Square::E1), Some(Piece(Color::White, Role::King)));
        assert_eq!(pos.piece_at(Square::E4), None);
    }

    #[proptest]
    fn all_positions_can_be_represented_using_fen_notation(pos: Position) {
        assert_eq!(Position::try_from(Fen::from(pos.clone())), Ok(pos));
    }

    #[proptest]
    fn position_has_an_equivalent_shakmaty_representation(pos: Position) {
        assert_eq!(Position::from(sm::Chess::from(pos.clone())), pos);
    }
}
