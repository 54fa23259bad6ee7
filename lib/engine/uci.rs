use super::{Limits, Suggest};
use crate::chess::{Move, Position};
use crate::util::Io;
use anyhow::{Context, Error as Anyhow};
use async_trait::async_trait;
use derive_more::{DebugCustom, Display, Error, From};
use futures_util::future::{BoxFuture, FutureExt};
use std::{collections::HashMap, io};
use tokio::{runtime, sync::Mutex, task::block_in_place};
use tracing::{debug, error, instrument, warn};
use vampirc_uci::{self as uci, UciFen, UciMessage, UciSearchControl};

pub type UciOptions = HashMap<String, Option<String>>;

type Handshake<T> = BoxFuture<'static, Result<T, UciError>>;

#[derive(DebugCustom)]
#[debug(bound = "T: std::fmt::Debug")]
enum Lazy<T> {
    #[debug(fmt = "{:?}", _0)]
    Initialized(T),
    #[debug(fmt = "?")]
    Uninitialized(Handshake<T>),
    #[debug(fmt = "!")]
    Poisoned,
}

impl<T> Lazy<T> {
    async fn get_or_init(&mut self) -> Result<&mut T, UciError> {
        if let Lazy::Uninitialized(handshake) = self {
            match handshake.await {
                Ok(io) => *self = Lazy::Initialized(io),
                Err(e) => {
                    *self = Lazy::Poisoned;
                    return Err(e);
                }
            }
        }

        match self {
            Lazy::Initialized(io) => Ok(io),
            _ => Err(UciError::Unavailable),
        }
    }
}

/// The reason why a [`Move`] could not be received from the UCI server.
#[derive(Debug, Display, Error, From)]
pub enum UciError {
    #[display(fmt = "the UCI server encountered an error")]
    Io(io::Error),

    #[display(fmt = "the UCI server replied with an invalid move `{}`", _0)]
    #[from(ignore)]
    InvalidMove(#[error(not(source))] String),

    #[display(fmt = "the UCI server failed to start")]
    #[from(ignore)]
    Unavailable,
}

fn is_best_move(line: &str) -> bool {
    line.split_whitespace().next() == Some("bestmove")
}

#[derive(Debug)]
struct Session<T> {
    io: Lazy<T>,
    searching: bool,
}

/// A [Universal Chess Interface] client.
///
/// [Universal Chess Interface]: https://www.chessprogramming.org/UCI
#[derive(Debug)]
pub struct Uci<T: Io> {
    session: Mutex<Session<T>>,
    limits: Limits,
}

impl<T: Io + Send + 'static> Uci<T> {
    /// Constructs [`Uci`] with the default [`Limits`].
    pub fn new(io: T) -> Self {
        Self::with_config(io, Limits::default(), UciOptions::new())
    }

    /// Constructs [`Uci`] with some [`Limits`] and [`UciOptions`].
    ///
    /// The handshake is deferred until the first suggestion is requested.
    pub fn with_config(mut io: T, limits: Limits, options: UciOptions) -> Self {
        let handshake: Handshake<T> = async move {
            io.send(&UciMessage::Uci.to_string()).await?;
            io.flush().await?;

            while !matches!(uci::parse_one(io.recv().await?.trim()), UciMessage::UciOk) {}

            for (name, value) in options {
                let set_option = UciMessage::SetOption { name, value };
                io.send(&set_option.to_string()).await?;
            }

            io.send(&UciMessage::UciNewGame.to_string()).await?;
            io.send(&UciMessage::IsReady.to_string()).await?;
            io.flush().await?;

            while !matches!(uci::parse_one(io.recv().await?.trim()), UciMessage::ReadyOk) {}

            Ok(io)
        }
        .boxed();

        Uci {
            session: Mutex::new(Session {
                io: Lazy::Uninitialized(handshake),
                searching: false,
            }),
            limits,
        }
    }
}

impl<T: Io> Uci<T> {
    fn go(&self) -> UciMessage {
        match self.limits {
            Limits::None => UciMessage::go(),
            Limits::Depth(d) => UciMessage::Go {
                search_control: Some(UciSearchControl::depth(d)),
                time_control: None,
            },
            Limits::Time(t) => UciMessage::go_movetime(
                uci::Duration::from_std(t).unwrap_or_else(|_| uci::Duration::max_value()),
            ),
        }
    }
}

impl<T: Io> Drop for Uci<T> {
    #[instrument(level = "trace", skip(self))]
    fn drop(&mut self) {
        let session = self.session.get_mut();
        let result: Result<(), Anyhow> = block_in_place(|| {
            runtime::Handle::try_current()?.block_on(async {
                if let Lazy::Initialized(io) = &mut session.io {
                    io.send(&UciMessage::Stop.to_string()).await?;
                    io.send(&UciMessage::Quit.to_string()).await?;
                    io.flush().await?;
                }

                Ok(())
            })
        });

        if let Err(e) = result.context("failed to gracefully shutdown the uci engine") {
            error!("{:?}", e);
        }
    }
}

#[async_trait]
impl<T: Io + Send + 'static> Suggest for Uci<T> {
    type Error = UciError;

    /// Request a move from the UCI server.
    ///
    /// A search left behind by a cancelled request is stopped first.
    #[instrument(level = "debug", skip(self, pos), ret(Display), err, fields(%pos))]
    async fn suggest(&self, pos: &Position) -> Result<Move, Self::Error> {
        let mut session = self.session.lock().await;
        let Session { io, searching } = &mut *session;
        let io = io.get_or_init().await?;

        if *searching {
            warn!("stopping abandoned search");
            io.send(&UciMessage::Stop.to_string()).await?;
            io.flush().await?;

            while !is_best_move(&io.recv().await?) {}

            *searching = false;
        }

        let position = UciMessage::Position {
            startpos: false,
            fen: Some(UciFen(pos.to_string())),
            moves: Vec::new(),
        };

        io.send(&position.to_string()).await?;
        io.send(&self.go().to_string()).await?;
        io.flush().await?;
        *searching = true;

        let best = loop {
            let line = io.recv().await?;
            match uci::parse_one(line.trim()) {
                UciMessage::BestMove { best_move, .. } => break best_move.to_string(),
                _ if is_best_move(&line) => break line.trim().to_string(),
                msg => debug!(%msg, "ignoring message"),
            }
        };

        *searching = false;
        best.parse().map_err(|_| UciError::InvalidMove(best))
    }
}
