use super::{Caller, DrawAction, Game, GameError, Player, Ply, Store, StoreError, Version};
use crate::chess::{Color, Pgn};
use crate::engine::Suggest;
use derive_more::{Display, Error, From};
use std::{collections::HashMap, fmt::Display, sync::Arc, time::Duration};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;
use tracing::{instrument, warn};

/// The reason why the [`Manager`] failed to carry out an action.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ManagerError {
    Game(GameError),
    Store(StoreError),
}

/// What happened to a [`Game`] as a result of an action.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Report {
    /// The game after the action.
    pub game: Game,

    /// The moves played while carrying out the action, in order.
    pub played: Vec<Ply>,

    /// Whether the engine still owes a reply.
    pub pending: bool,
}

impl Report {
    fn new(game: Game, played: Vec<Ply>) -> Self {
        let pending = game.is_engine_to_move();
        Report {
            game,
            played,
            pending,
        }
    }
}

/// Keeps track of the [`Game`] in each channel and plays the engine side.
#[derive(Debug)]
pub struct Manager<S, E> {
    store: S,
    engine: E,
    timeout: Duration,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S, E> Manager<S, E>
where
    S: Store + Sync,
    E: Suggest + Sync,
    E::Error: Display,
{
    /// Constructs a [`Manager`] that waits at most `timeout` for each engine reply.
    pub fn new(store: S, engine: E, timeout: Duration) -> Self {
        Manager {
            store,
            engine,
            timeout,
            locks: Mutex::default(),
        }
    }

    /// Serializes actions on a channel.
    ///
    /// Locks nobody holds or waits for are pruned along the way.
    async fn lock(&self, channel: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(channel.to_string()).or_default().clone()
        };

        lock.lock_owned().await
    }

    async fn load(&self, channel: &str) -> Result<(Version, Game), ManagerError> {
        match self.store.get(channel).await? {
            Some(entry) => Ok(entry),
            None => Err(GameError::NoActiveGame.into()),
        }
    }

    async fn save(
        &self,
        channel: &str,
        version: Option<Version>,
        game: &Game,
    ) -> Result<(), ManagerError> {
        self.store
            .compare_and_swap(channel, version, game.clone())
            .await?;

        Ok(())
    }

    /// Asks the engine for its move, if it is the engine's turn.
    ///
    /// A reply that fails to arrive in time, or that is not legal, is left pending.
    #[instrument(level = "debug", skip(self, game))]
    async fn reply(&self, game: &mut Game) -> Option<Ply> {
        if !game.is_engine_to_move() {
            return None;
        }

        let m = match timeout(self.timeout, self.engine.suggest(game.position())).await {
            Ok(Ok(m)) => m,

            Ok(Err(e)) => {
                warn!(error = %e, "the engine failed to suggest a move");
                return None;
            }

            Err(_) => {
                warn!(timeout = ?self.timeout, "the engine failed to reply in time");
                return None;
            }
        };

        match game.play(m) {
            Ok(ply) => Some(ply),
            Err(e) => {
                warn!(error = %e, "the engine suggested an illegal move");
                None
            }
        }
    }

    /// Starts a new game between the caller and an opponent.
    ///
    /// An ongoing game is only replaced if `force` is set.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn new_game(
        &self,
        channel: &str,
        caller: Caller<'_>,
        opponent: Player,
        color: Color,
        force: bool,
    ) -> Result<Report, ManagerError> {
        let _guard = self.lock(channel).await;

        let version = match self.store.get(channel).await? {
            Some((_, g)) if g.outcome().is_none() && !force => {
                return Err(GameError::GameInProgress.into())
            }

            entry => entry.map(|(v, _)| v),
        };

        let caller = Player::User(caller.id.to_string());
        let mut game = match color {
            Color::White => Game::new(caller, opponent),
            Color::Black => Game::new(opponent, caller),
        };

        let played = self.reply(&mut game).await.into_iter().collect();
        self.save(channel, version, &game).await?;
        Ok(Report::new(game, played))
    }

    /// Plays a move on behalf of the caller and lets the engine reply.
    ///
    /// A reply the engine still owed is played first. If that reply ends the game, the game is
    /// reported as is and the caller's move is not attempted.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn play(
        &self,
        channel: &str,
        caller: Caller<'_>,
        input: &str,
    ) -> Result<Report, ManagerError> {
        let _guard = self.lock(channel).await;
        let (version, mut game) = self.load(channel).await?;

        let mut played: Vec<_> = self.reply(&mut game).await.into_iter().collect();

        if !played.is_empty() && game.outcome().is_some() {
            self.save(channel, Some(version), &game).await?;
            return Ok(Report::new(game, played));
        }

        match game.play_as(caller, input) {
            Ok(ply) => played.push(ply),
            Err(e) => {
                if !played.is_empty() {
                    self.save(channel, Some(version), &game).await?;
                }

                return Err(e.into());
            }
        }

        played.extend(self.reply(&mut game).await);
        self.save(channel, Some(version), &game).await?;
        Ok(Report::new(game, played))
    }

    /// The current state of the game, after the engine plays any reply it owed.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn board(&self, channel: &str) -> Result<Report, ManagerError> {
        let _guard = self.lock(channel).await;
        let (version, mut game) = self.load(channel).await?;

        let played: Vec<_> = self.reply(&mut game).await.into_iter().collect();
        if !played.is_empty() {
            self.save(channel, Some(version), &game).await?;
        }

        Ok(Report::new(game, played))
    }

    /// Resigns the game on behalf of the caller.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn resign(&self, channel: &str, caller: Caller<'_>) -> Result<Report, ManagerError> {
        let _guard = self.lock(channel).await;
        let (version, mut game) = self.load(channel).await?;

        game.resign(caller)?;
        self.save(channel, Some(version), &game).await?;
        Ok(Report::new(game, Vec::new()))
    }

    /// Offers, accepts or declines a draw on behalf of the caller.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn draw(
        &self,
        channel: &str,
        caller: Caller<'_>,
        action: DrawAction,
    ) -> Result<Report, ManagerError> {
        let _guard = self.lock(channel).await;
        let (version, mut game) = self.load(channel).await?;

        game.draw(caller, action)?;
        self.save(channel, Some(version), &game).await?;
        Ok(Report::new(game, Vec::new()))
    }

    /// The record of the game.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn pgn(&self, channel: &str) -> Result<Pgn, ManagerError> {
        let (_, game) = self.load(channel).await?;
        Ok(game.pgn())
    }
}
