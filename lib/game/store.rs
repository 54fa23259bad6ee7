use super::Game;
use async_trait::async_trait;
use derive_more::{Display, Error};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::instrument;

/// A monotonically increasing counter of the writes to a channel.
pub type Version = u64;

/// The reason why the [`Store`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum StoreError {
    #[display(fmt = "the game was modified concurrently")]
    Conflict,

    #[display(fmt = "the game store is unavailable: {}", _0)]
    Unavailable(#[error(not(source))] String),
}

/// Trait for the persistence of [`Game`]s keyed by channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store {
    /// The current [`Game`] in a channel, if any, along with its [`Version`].
    async fn get(&self, channel: &str) -> Result<Option<(Version, Game)>, StoreError>;

    /// Replaces the [`Game`] in a channel if its [`Version`] is still the expected one.
    ///
    /// `None` expects the channel to hold no game yet.
    async fn compare_and_swap(
        &self,
        channel: &str,
        expected: Option<Version>,
        game: Game,
    ) -> Result<Version, StoreError>;
}

/// An in-memory [`Store`].
#[derive(Debug, Default)]
pub struct Memory {
    games: RwLock<HashMap<String, (Version, Game)>>,
}

#[async_trait]
impl Store for Memory {
    #[instrument(level = "trace", skip(self), err)]
    async fn get(&self, channel: &str) -> Result<Option<(Version, Game)>, StoreError> {
        Ok(self.games.read().await.get(channel).cloned())
    }

    #[instrument(level = "trace", skip(self, game), err)]
    async fn compare_and_swap(
        &self,
        channel: &str,
        expected: Option<Version>,
        game: Game,
    ) -> Result<Version, StoreError> {
        let mut games = self.games.write().await;
        let current = games.get(channel).map(|(v, _)| *v);

        if current != expected {
            return Err(StoreError::Conflict);
        }

        let version = current.map_or(0, |v| v + 1);
        games.insert(channel.to_string(), (version, game));
        Ok(version)
    }
}
