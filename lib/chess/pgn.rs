use super::{Outcome, San};
use std::fmt::{self, Display};

/// The description of a chess game.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Pgn {
    pub white: String,
    pub black: String,
    pub outcome: Option<Outcome>,
    pub moves: Vec<San>,
}

/// Prints a simplified [PGN] description of the game
///
/// [PGN]: https://www.chessprogramming.org/Portable_Game_Notation
impl Display for Pgn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let result = self.outcome.as_ref().map_or("*", Outcome::result);

        writeln!(f, "[White {:?}]", self.white)?;
        writeln!(f, "[Black {:?}]", self.black)?;
        writeln!(f, "[Result {:?}]", result)?;
        writeln!(f)?;

        for (i, san) in self.moves.iter().enumerate() {
            if i % 2 == 0 {
                write!(f, "{}. ", i / 2 + 1)?;
            }

            write!(f, "{} ", san)?;
        }

        match self.outcome {
            Some(o) => write!(f, "{{{}}} {}", o, result),
            None => write!(f, "{}", result),
        }
    }
}
