use crate::chess::{Outcome, San};
use derive_more::{Display, Error};

/// The reason why a game action was rejected.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum GameError {
    #[display(fmt = "`{}` is not a legal move", input)]
    IllegalMove { input: String, legal: Vec<San> },

    #[display(fmt = "a game is already in progress, use `force` to replace it")]
    GameInProgress,

    #[display(fmt = "there is no game in progress")]
    NoActiveGame,

    #[display(fmt = "the game is already over, {}", _0)]
    GameAlreadyFinished(#[error(not(source))] Outcome),

    #[display(fmt = "it is not your turn")]
    NotYourTurn,

    #[display(fmt = "you are not playing this game")]
    NotAParticipant,

    #[display(fmt = "there is no draw offer to respond to")]
    NoDrawOffer,

    #[display(fmt = "the draw offer was declined")]
    DrawDeclined,
}
