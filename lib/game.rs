use crate::chess::{Color, Move, Outcome, Pgn, Position, San};
use tracing::instrument;

mod error;
mod manager;
mod player;
mod store;

pub use error::*;
pub use manager::*;
pub use player::*;
pub use store::*;

/// A move together with how it was written down.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Ply {
    pub played: Move,
    pub san: San,
}

/// Whether a [`Game`] is still being played.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Status {
    InProgress,
    Finished(Outcome),
}

/// What a participant may do about a draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawAction {
    Offer,
    Accept,
    Decline,
}

/// A chess game between two [`Player`]s.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Game {
    white: Player,
    black: Player,
    position: Position,
    history: Vec<Ply>,
    status: Status,
    draw_offer: Option<Color>,
}

impl Game {
    /// Starts a game from the initial position.
    pub fn new(white: Player, black: Player) -> Self {
        Game {
            white,
            black,
            position: Position::default(),
            history: Vec::new(),
            status: Status::InProgress,
            draw_offer: None,
        }
    }

    /// The [`Player`] controlling the pieces of a [`Color`].
    pub fn player(&self, c: Color) -> &Player {
        match c {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// The current [`Position`].
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The moves played so far.
    pub fn history(&self) -> &[Ply] {
        &self.history
    }

    /// The last move played, if any.
    pub fn last(&self) -> Option<&Ply> {
        self.history.last()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The [`Outcome`] of the game, if it is over.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            Status::InProgress => None,
            Status::Finished(o) => Some(o),
        }
    }

    /// The side that offered a draw, if the offer still stands.
    pub fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// Whether the engine is expected to play next.
    pub fn is_engine_to_move(&self) -> bool {
        self.status == Status::InProgress && *self.player(self.turn()) == Player::Engine
    }

    /// The side a chat user plays for.
    ///
    /// A user playing both sides always plays for the side to move.
    pub fn side_of(&self, user: Caller<'_>) -> Result<Color, GameError> {
        match (self.white.is(user), self.black.is(user)) {
            (true, true) => Ok(self.turn()),
            (true, false) => Ok(Color::White),
            (false, true) => Ok(Color::Black),
            (false, false) => Err(GameError::NotAParticipant),
        }
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        match self.status {
            Status::InProgress => Ok(()),
            Status::Finished(o) => Err(GameError::GameAlreadyFinished(o)),
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.status = Status::Finished(outcome);
        self.draw_offer = None;
    }

    /// Plays a [`Move`] for the side to move, whoever controls it.
    #[instrument(level = "debug", skip(self), ret, err)]
    pub fn play(&mut self, m: Move) -> Result<Ply, GameError> {
        self.ensure_in_progress()?;

        let mover = self.turn();
        let san = self.position.play(m).map_err(|_| GameError::IllegalMove {
            input: m.to_string(),
            legal: self.position.sans(),
        })?;

        if self.draw_offer.map_or(false, |c| c != mover) {
            self.draw_offer = None;
        }

        if let Some(o) = self.position.outcome() {
            self.finish(o);
        }

        let ply = Ply { played: m, san };
        self.history.push(ply.clone());
        Ok(ply)
    }

    /// Plays a move written in either algebraic or coordinate notation on behalf of a chat user.
    pub fn play_as(&mut self, user: Caller<'_>, input: &str) -> Result<Ply, GameError> {
        self.ensure_in_progress()?;

        if self.side_of(user)? != self.turn() {
            return Err(GameError::NotYourTurn);
        }

        let m = self
            .position
            .parse_move(input)
            .map_err(|_| GameError::IllegalMove {
                input: input.to_string(),
                legal: self.position.sans(),
            })?;

        self.play(m).map_err(|e| match e {
            GameError::IllegalMove { legal, .. } => GameError::IllegalMove {
                input: input.to_string(),
                legal,
            },
            e => e,
        })
    }

    /// Resigns the game on behalf of a chat user.
    pub fn resign(&mut self, user: Caller<'_>) -> Result<Outcome, GameError> {
        if self.status != Status::InProgress {
            return Err(GameError::NoActiveGame);
        }

        let outcome = Outcome::Resignation(self.side_of(user)?);
        self.finish(outcome);
        Ok(outcome)
    }

    /// Offers, accepts or declines a draw on behalf of a chat user.
    ///
    /// The engine never agrees to a draw, and offering a draw that the other side already offered
    /// agrees to it.
    pub fn draw(
        &mut self,
        user: Caller<'_>,
        action: DrawAction,
    ) -> Result<Option<Outcome>, GameError> {
        if self.status != Status::InProgress {
            return Err(GameError::NoActiveGame);
        }

        let side = self.side_of(user)?;
        let (white, black) = (self.white.is(user), self.black.is(user));

        match action {
            DrawAction::Offer if *self.player(!side) == Player::Engine => {
                Err(GameError::DrawDeclined)
            }

            DrawAction::Offer if self.draw_offer == Some(!side) && !(white && black) => {
                self.finish(Outcome::DrawByAgreement);
                Ok(Some(Outcome::DrawByAgreement))
            }

            DrawAction::Offer => {
                self.draw_offer = Some(side);
                Ok(None)
            }

            DrawAction::Accept | DrawAction::Decline => {
                let offered_to_user = match self.draw_offer {
                    Some(Color::White) => black,
                    Some(Color::Black) => white,
                    None => false,
                };

                if !offered_to_user {
                    return Err(GameError::NoDrawOffer);
                }

                self.draw_offer = None;
                if action == DrawAction::Accept {
                    self.finish(Outcome::DrawByAgreement);
                    Ok(Some(Outcome::DrawByAgreement))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// The game record.
    pub fn pgn(&self) -> Pgn {
        Pgn {
            white: self.white.name().to_string(),
            black: self.black.name().to_string(),
            outcome: self.outcome(),
            moves: self.history.iter().map(|p| p.san.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{Promotion, Square};

    const ALICE: Caller<'static> = Caller {
        id: "UALICE",
        name: "alice",
    };

    const BOB: Caller<'static> = Caller {
        id: "UBOB",
        name: "bob",
    };

    fn alice() -> Player {
        Player::User(ALICE.id.into())
    }

    fn bob() -> Player {
        Player::User(BOB.id.into())
    }

    fn play_all(game: &mut Game, moves: &[&str]) {
        for (i, m) in moves.iter().enumerate() {
            let user = if i % 2 == 0 { ALICE } else { BOB };
            game.play_as(user, m).unwrap();
        }
    }

    #[test]
    fn new_game_is_in_progress_from_the_initial_position() {
        let game = Game::new(alice(), bob());
        assert_eq!(game.status(), Status::InProgress);
        assert_eq!(game.position(), &Position::default());
        assert_eq!(game.turn(), Color::White);
        assert!(game.history().is_empty());
    }

    #[test]
    fn legal_move_flips_the_turn() {
        let mut game = Game::new(alice(), bob());
        let ply = game.play_as(ALICE, "e2e4").unwrap();
        assert_eq!(ply.played, Move(Square::E2, Square::E4, Promotion::None));
        assert_eq!(ply.san.to_string(), "e4");
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.last(), Some(&ply));
    }

    #[test]
    fn moving_out_of_turn_fails() {
        let mut game = Game::new(alice(), bob());
        assert_eq!(game.play_as(BOB, "e2e4"), Err(GameError::NotYourTurn));
        assert_eq!(game, Game::new(alice(), bob()));
    }

    #[test]
    fn strangers_cannot_move() {
        let mut game = Game::new(alice(), bob());
        assert_eq!(
            game.play_as(Caller::new("UCAROL", "carol"), "e4"),
            Err(GameError::NotAParticipant)
        );
    }

    #[test]
    fn illegal_move_lists_the_legal_alternatives() {
        let mut game = Game::new(alice(), bob());
        match game.play_as(ALICE, "e5") {
            Err(GameError::IllegalMove { input, legal }) => {
                assert_eq!(input, "e5");
                assert_eq!(legal.len(), 20);
            }

            r => panic!("unexpected {:?}", r),
        }

        assert!(game.history().is_empty());
    }

    #[test]
    fn user_playing_both_sides_moves_for_the_side_to_move() {
        let mut game = Game::new(alice(), alice());
        game.play_as(ALICE, "e4").unwrap();
        game.play_as(ALICE, "e5").unwrap();
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn checkmate_finishes_the_game() {
        let mut game = Game::new(alice(), bob());
        play_all(&mut game, &["f3", "e5", "g4", "Qh4#"]);

        let mate = Outcome::Checkmate(Color::Black);
        assert_eq!(game.status(), Status::Finished(mate));
        assert_eq!(
            game.play_as(ALICE, "a3"),
            Err(GameError::GameAlreadyFinished(mate))
        );
    }

    #[test]
    fn resignation_finishes_the_game() {
        let mut game = Game::new(alice(), bob());
        assert_eq!(
            game.resign(BOB),
            Ok(Outcome::Resignation(Color::Black))
        );

        assert_eq!(game.resign(ALICE), Err(GameError::NoActiveGame));
    }

    #[test]
    fn accepted_draw_finishes_the_game() {
        let mut game = Game::new(alice(), bob());
        assert_eq!(game.draw(ALICE, DrawAction::Offer), Ok(None));
        assert_eq!(game.draw_offer(), Some(Color::White));
        assert_eq!(game.draw(ALICE, DrawAction::Accept), Err(GameError::NoDrawOffer));
        assert_eq!(
            game.draw(BOB, DrawAction::Accept),
            Ok(Some(Outcome::DrawByAgreement))
        );

        assert_eq!(game.outcome(), Some(Outcome::DrawByAgreement));
    }

    #[test]
    fn declined_draw_withdraws_the_offer() {
        let mut game = Game::new(alice(), bob());
        game.draw(BOB, DrawAction::Offer).unwrap();
        assert_eq!(game.draw(ALICE, DrawAction::Decline), Ok(None));
        assert_eq!(game.draw_offer(), None);
        assert_eq!(game.draw(ALICE, DrawAction::Accept), Err(GameError::NoDrawOffer));
    }

    #[test]
    fn counter_offer_agrees_to_the_draw() {
        let mut game = Game::new(alice(), bob());
        game.draw(BOB, DrawAction::Offer).unwrap();
        assert_eq!(
            game.draw(ALICE, DrawAction::Offer),
            Ok(Some(Outcome::DrawByAgreement))
        );

        assert_eq!(game.outcome(), Some(Outcome::DrawByAgreement));
        assert_eq!(game.draw_offer(), None);
    }

    #[test]
    fn repeated_offer_keeps_the_game_going() {
        let mut game = Game::new(alice(), bob());
        game.draw(ALICE, DrawAction::Offer).unwrap();
        assert_eq!(game.draw(ALICE, DrawAction::Offer), Ok(None));
        assert_eq!(game.status(), Status::InProgress);
    }

    #[test]
    fn opponent_invited_by_name_may_play() {
        let mut game = Game::new(alice(), Player::User(BOB.name.into()));
        game.play_as(ALICE, "e4").unwrap();
        game.play_as(BOB, "e5").unwrap();
        assert_eq!(game.resign(BOB), Ok(Outcome::Resignation(Color::Black)));
    }

    #[test]
    fn moving_withdraws_a_draw_offered_by_the_opponent() {
        let mut game = Game::new(alice(), bob());
        game.draw(BOB, DrawAction::Offer).unwrap();
        game.play_as(ALICE, "d4").unwrap();
        assert_eq!(game.draw_offer(), None);
    }

    #[test]
    fn engine_declines_draws() {
        let mut game = Game::new(alice(), Player::Engine);
        assert_eq!(
            game.draw(ALICE, DrawAction::Offer),
            Err(GameError::DrawDeclined)
        );
    }

    #[test]
    fn engine_to_move_only_while_in_progress() {
        let mut game = Game::new(Player::Engine, alice());
        assert!(game.is_engine_to_move());
        game.resign(ALICE).unwrap();
        assert!(!game.is_engine_to_move());
    }

    #[test]
    fn pgn_records_players_moves_and_outcome() {
        let mut game = Game::new(alice(), bob());
        play_all(&mut game, &["e4", "e5"]);
        game.resign(BOB).unwrap();

        let pgn = game.pgn();
        assert_eq!(pgn.white, "UALICE");
        assert_eq!(pgn.black, "UBOB");
        assert_eq!(pgn.moves.len(), 2);
        assert_eq!(pgn.outcome, Some(Outcome::Resignation(Color::Black)));
    }
}
