use crate::chess::{Color, Fen, Pgn, San};
use crate::game::{Game, Report, Status};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use url::Url;

/// Who gets to see a [`Response`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    InChannel,
    Ephemeral,
}

/// An image shown alongside the text of a [`Response`].
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Attachment {
    pub fallback: String,
    pub image_url: String,
}

/// The reply to a slash command.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Response {
    pub response_type: Visibility,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Response {
    /// A reply everyone in the channel can see.
    pub fn in_channel(text: impl Into<String>) -> Self {
        Response {
            response_type: Visibility::InChannel,
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    /// A reply only the caller can see.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Response {
            response_type: Visibility::Ephemeral,
            text: text.into(),
            attachments: Vec::new(),
        }
    }
}

/// The usage instructions.
pub const HELP: &str = "\
Usage:
`new [engine | @user] [white | black] [force]` starts a game, by default as white against the engine.
`move <move>` plays a move, such as `e4`, `Nf3`, `O-O`, `exd8=Q` or `e2e4`.
`board` shows the current board.
`resign` resigns the game.
`draw offer | accept | decline` handles draw offers.
`pgn` prints the record of the game.
`help` shows this message.";

/// Writes the chat replies for games.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Formatter {
    base: Url,
}

impl Formatter {
    /// Constructs a [`Formatter`] whose image links point to the server at `base`.
    pub fn new(base: Url) -> Self {
        Formatter { base }
    }

    /// The link to the image of the current board, highlighting the last move.
    pub fn image_url(&self, game: &Game) -> Url {
        let placement = Fen::from(game.position().clone()).placement();

        let mut url = self.base.clone();
        let path = format!("{}/board/{}.png", url.path().trim_end_matches('/'), placement);
        url.set_path(&path);

        url.set_query(
            game.last()
                .map(|ply| format!("markSquares={},{}", ply.played.whence(), ply.played.whither()))
                .as_deref(),
        );

        url
    }

    fn summary(&self, game: &Game) -> String {
        let mut text = String::new();
        let white = game.player(Color::White);
        let black = game.player(Color::Black);
        let _ = write!(text, "{} (white) vs {} (black)", white, black);

        match game.status() {
            Status::Finished(o) => {
                let _ = write!(text, "\nThe game is over, {} ({}).", o, o.result());
            }

            Status::InProgress => {
                let turn = game.turn();
                let _ = write!(text, "\nIt is {}'s turn as {}.", game.player(turn), turn);
                if game.position().is_check() {
                    let _ = write!(text, " {} is in check.", turn);
                }

                if let Some(c) = game.draw_offer() {
                    let _ = write!(text, "\n{} offered a draw.", game.player(c));
                }
            }
        }

        text
    }

    /// The reply describing the state of a game after an action.
    pub fn report(&self, report: &Report) -> Response {
        let game = &report.game;
        let mut text = String::new();

        let first = game.history().len() - report.played.len();
        for (i, ply) in report.played.iter().enumerate() {
            let n = first + i;
            let mover = game.player(if n % 2 == 0 {
                Color::White
            } else {
                Color::Black
            });

            let _ = writeln!(text, "{} played {}", mover, ply.san);
        }

        text.push_str(&self.summary(game));

        if report.pending {
            text.push_str("\nThe engine has not replied yet, its move will be played on the next command.");
        }

        Response {
            response_type: Visibility::InChannel,
            text,
            attachments: vec![Attachment {
                fallback: Fen::from(game.position().clone()).to_string(),
                image_url: self.image_url(game).to_string(),
            }],
        }
    }

    /// The reply rejecting a move, listing the legal alternatives.
    pub fn illegal_move(&self, input: &str, legal: &[San]) -> Response {
        let moves: Vec<_> = legal.iter().map(San::to_string).collect();
        Response::ephemeral(format!(
            "`{}` is not a legal move, try one of: {}",
            input,
            moves.join(", ")
        ))
    }

    /// The reply holding the record of a game.
    pub fn pgn(&self, pgn: &Pgn) -> Response {
        Response::in_channel(format!("```\n{}\n```", pgn))
    }
}
