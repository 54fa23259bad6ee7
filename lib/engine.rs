use crate::chess::{Move, Position};
use crate::util::{Build, Process};
use async_trait::async_trait;
use derive_more::{DebugCustom, Display, Error, From};
use serde::{Deserialize, Serialize};
use std::{io, str::FromStr};
use test_strategy::Arbitrary;

mod limits;
mod random;
mod uci;

pub use limits::*;
pub use random::*;
pub use uci::*;

/// Trait for types that can suggest a move in a chess position.
#[cfg_attr(test, mockall::automock(type Error = String;))]
#[async_trait]
pub trait Suggest {
    /// The reason why a [`Move`] could not be suggested.
    type Error;

    /// Suggest the next move to play in a [`Position`].
    async fn suggest(&self, pos: &Position) -> Result<Move, Self::Error>;
}

/// The reason why parsing [`EngineConfig`] failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse engine configuration")]
pub struct ParseEngineConfigError(ron::de::SpannedError);

/// Runtime configuration for an [`Engine`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Arbitrary, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "lowercase")]
pub enum EngineConfig {
    /// A [`Random`] mover.
    #[display(fmt = "{}", "ron::ser::to_string(self).unwrap()")]
    Random {
        #[serde(default)]
        seed: u64,
    },

    /// A [`Uci`] engine spawned from an executable path.
    #[display(fmt = "{}", "ron::ser::to_string(self).unwrap()")]
    Uci(
        String,
        #[serde(default)] Limits,
        #[serde(default)] UciOptions,
    ),
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::Uci("stockfish".into(), Limits::default(), UciOptions::default())
    }
}

impl FromStr for EngineConfig {
    type Err = ParseEngineConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}

/// The reason why an [`Engine`] could not be built.
#[derive(Debug, Display, Error, From)]
#[display(fmt = "failed to spawn the engine process")]
pub struct SpawnEngineError(io::Error);

impl Build for EngineConfig {
    type Output = Engine;
    type Error = SpawnEngineError;

    fn build(self) -> Result<Self::Output, Self::Error> {
        match self {
            EngineConfig::Random { seed } => Ok(Random::new(seed).into()),
            EngineConfig::Uci(path, limits, options) => {
                let io = Process::spawn(&path)?;
                Ok(Uci::with_config(io, limits, options).into())
            }
        }
    }
}

/// The reason why [`Engine`] failed to suggest a [`Move`].
#[derive(Debug, Display, Error, From)]
pub enum EngineError {
    Random(NoLegalMoves),
    Uci(UciError),
}

/// A generic chess engine.
#[derive(DebugCustom, From)]
#[allow(clippy::large_enum_variant)]
pub enum Engine {
    #[debug(fmt = "{:?}", _0)]
    Random(Random),
    #[debug(fmt = "{:?}", _0)]
    Uci(Uci<Process>),
}

#[async_trait]
impl Suggest for Engine {
    type Error = EngineError;

    async fn suggest(&self, pos: &Position) -> Result<Move, Self::Error> {
        match self {
            Engine::Random(e) => Ok(e.suggest(pos).await?),
            Engine::Uci(e) => Ok(e.suggest(pos).await?),
        }
    }
}
