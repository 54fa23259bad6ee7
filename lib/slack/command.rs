use crate::{chess::Color, game::DrawAction, game::Player};
use derive_more::{Display, Error};
use std::str::FromStr;

/// The reason why the text of a slash command could not be understood.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum ParseCommandError {
    #[display(fmt = "unknown command `{}`", _0)]
    UnknownCommand(#[error(not(source))] String),

    #[display(fmt = "missing {}", _0)]
    MissingArgument(#[error(not(source))] &'static str),

    #[display(fmt = "unexpected argument `{}`", _0)]
    InvalidArgument(#[error(not(source))] String),
}

/// An action requested through the slash command.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Command {
    Help,
    New {
        opponent: Player,
        color: Color,
        force: bool,
    },
    Move(String),
    Board,
    Resign,
    Draw(DrawAction),
    Pgn,
}

/// Interprets a mention of the opponent, either `engine`, `@user` or an escaped `<@U123|name>`.
fn parse_opponent(arg: &str) -> Option<Player> {
    if arg.eq_ignore_ascii_case("engine") {
        return Some(Player::Engine);
    }

    let id = match arg.strip_prefix("<@").and_then(|s| s.strip_suffix('>')) {
        Some(escaped) => escaped.split('|').next().unwrap_or_default(),
        None => arg.strip_prefix('@')?,
    };

    if id.is_empty() {
        None
    } else {
        Some(Player::User(id.to_string()))
    }
}

fn parse_new<'a>(args: impl Iterator<Item = &'a str>) -> Result<Command, ParseCommandError> {
    let mut opponent = None;
    let mut color = None;
    let mut force = false;

    for arg in args {
        match arg.to_ascii_lowercase().as_str() {
            "white" if color.is_none() => color = Some(Color::White),
            "black" if color.is_none() => color = Some(Color::Black),
            "force" if !force => force = true,
            _ => match parse_opponent(arg) {
                Some(p) if opponent.is_none() => opponent = Some(p),
                _ => return Err(ParseCommandError::InvalidArgument(arg.to_string())),
            },
        }
    }

    Ok(Command::New {
        opponent: opponent.unwrap_or(Player::Engine),
        color: color.unwrap_or(Color::White),
        force,
    })
}

fn no_more<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<(), ParseCommandError> {
    match args.next() {
        None => Ok(()),
        Some(arg) => Err(ParseCommandError::InvalidArgument(arg.to_string())),
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();

        let verb = match tokens.next() {
            None => return Ok(Command::Help),
            Some(v) => v.to_ascii_lowercase(),
        };

        let cmd = match verb.as_str() {
            "help" => Command::Help,
            "new" | "play" => return parse_new(tokens),
            "board" => Command::Board,
            "resign" => Command::Resign,
            "pgn" => Command::Pgn,

            "move" => match tokens.next() {
                Some(m) => Command::Move(m.to_string()),
                None => return Err(ParseCommandError::MissingArgument("the move to play")),
            },

            "draw" => match tokens.next().map(str::to_ascii_lowercase).as_deref() {
                Some("offer") => Command::Draw(DrawAction::Offer),
                Some("accept") => Command::Draw(DrawAction::Accept),
                Some("decline") => Command::Draw(DrawAction::Decline),
                Some(arg) => return Err(ParseCommandError::InvalidArgument(arg.to_string())),
                None => return Err(ParseCommandError::MissingArgument("one of offer, accept or decline")),
            },

            _ => return Err(ParseCommandError::UnknownCommand(verb)),
        };

        no_more(tokens)?;
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn empty_text_asks_for_help() {
        assert_eq!("".parse(), Ok(Command::Help));
        assert_eq!("   ".parse(), Ok(Command::Help));
        assert_eq!("help".parse(), Ok(Command::Help));
    }

    #[test]
    fn new_defaults_to_playing_white_against_the_engine() {
        let expected = Command::New {
            opponent: Player::Engine,
            color: Color::White,
            force: false,
        };

        assert_eq!("new".parse(), Ok(expected.clone()));
        assert_eq!("play".parse(), Ok(expected));
    }

    #[test]
    fn new_accepts_arguments_in_any_order() {
        let expected = Command::New {
            opponent: Player::User("U123".into()),
            color: Color::Black,
            force: true,
        };

        assert_eq!("new <@U123|bob> black force".parse(), Ok(expected.clone()));
        assert_eq!("NEW force Black <@U123>".parse(), Ok(expected.clone()));
        assert_eq!("play black @U123 force".parse(), Ok(expected));
    }

    #[test]
    fn new_rejects_repeated_or_unknown_arguments() {
        assert_eq!(
            "new white black".parse::<Command>(),
            Err(ParseCommandError::InvalidArgument("black".into()))
        );

        assert_eq!(
            "new engine @bob".parse::<Command>(),
            Err(ParseCommandError::InvalidArgument("@bob".into()))
        );

        assert_eq!(
            "new purple".parse::<Command>(),
            Err(ParseCommandError::InvalidArgument("purple".into()))
        );

        assert_eq!(
            "new <@>".parse::<Command>(),
            Err(ParseCommandError::InvalidArgument("<@>".into()))
        );
    }

    #[test]
    fn move_requires_exactly_one_argument() {
        assert_eq!("move e4".parse(), Ok(Command::Move("e4".into())));
        assert_eq!("Move e7e8q".parse(), Ok(Command::Move("e7e8q".into())));

        assert!(matches!(
            "move".parse::<Command>(),
            Err(ParseCommandError::MissingArgument(_))
        ));

        assert_eq!(
            "move e4 e5".parse::<Command>(),
            Err(ParseCommandError::InvalidArgument("e5".into()))
        );
    }

    #[test]
    fn draw_requires_an_action() {
        assert_eq!("draw offer".parse(), Ok(Command::Draw(DrawAction::Offer)));
        assert_eq!("draw ACCEPT".parse(), Ok(Command::Draw(DrawAction::Accept)));
        assert_eq!("draw decline".parse(), Ok(Command::Draw(DrawAction::Decline)));

        assert!(matches!(
            "draw".parse::<Command>(),
            Err(ParseCommandError::MissingArgument(_))
        ));

        assert_eq!(
            "draw maybe".parse::<Command>(),
            Err(ParseCommandError::InvalidArgument("maybe".into()))
        );
    }

    #[test]
    fn verbs_without_arguments_reject_extra_arguments() {
        assert_eq!("board".parse(), Ok(Command::Board));
        assert_eq!("resign".parse(), Ok(Command::Resign));
        assert_eq!("pgn".parse(), Ok(Command::Pgn));

        assert_eq!(
            "resign now".parse::<Command>(),
            Err(ParseCommandError::InvalidArgument("now".into()))
        );
    }

    #[proptest]
    fn unknown_verbs_are_rejected(#[strategy("[a-z]{10}")] verb: String) {
        assert_eq!(
            verb.parse::<Command>(),
            Err(ParseCommandError::UnknownCommand(verb))
        );
    }

    #[proptest]
    fn verbs_are_case_insensitive(#[strategy("(?i)board")] verb: String) {
        assert_eq!(verb.parse(), Ok(Command::Board));
    }
}
