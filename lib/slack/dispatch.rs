use super::{Command, Formatter, Response, SlashCommand, HELP};
use crate::engine::Suggest;
use crate::game::{Caller, GameError, Manager, ManagerError, Store, StoreError};
use std::fmt::Display;
use tracing::instrument;

/// Carries out slash commands and writes the replies.
#[derive(Debug)]
pub struct Dispatcher<S, E> {
    manager: Manager<S, E>,
    formatter: Formatter,
}

impl<S, E> Dispatcher<S, E>
where
    S: Store + Sync,
    E: Suggest + Sync,
    E::Error: Display,
{
    pub fn new(manager: Manager<S, E>, formatter: Formatter) -> Self {
        Dispatcher { manager, formatter }
    }

    /// Replies to a slash command.
    ///
    /// Commands that are not understood or not allowed are answered with an explanation,
    /// only failures to access the stored games are errors.
    #[instrument(level = "debug", skip(self, cmd), fields(channel = %cmd.channel_id, user = %cmd.user_id, text = %cmd.text), err)]
    pub async fn dispatch(&self, cmd: &SlashCommand) -> Result<Response, StoreError> {
        let command = match cmd.text.parse::<Command>() {
            Ok(c) => c,
            Err(e) => return Ok(Response::ephemeral(format!("Sorry, {}.\n{}", e, HELP))),
        };

        let channel = cmd.channel_id.as_str();
        let caller = Caller::new(&cmd.user_id, &cmd.user_name);
        let fmt = &self.formatter;

        let result = match command {
            Command::Help => return Ok(Response::ephemeral(HELP)),

            Command::New {
                opponent,
                color,
                force,
            } => self
                .manager
                .new_game(channel, caller, opponent, color, force)
                .await
                .map(|r| fmt.report(&r)),

            Command::Move(m) => self
                .manager
                .play(channel, caller, &m)
                .await
                .map(|r| fmt.report(&r)),

            Command::Board => self.manager.board(channel).await.map(|r| fmt.report(&r)),

            Command::Resign => self
                .manager
                .resign(channel, caller)
                .await
                .map(|r| fmt.report(&r)),

            Command::Draw(action) => self
                .manager
                .draw(channel, caller, action)
                .await
                .map(|r| fmt.report(&r)),

            Command::Pgn => self.manager.pgn(channel).await.map(|p| fmt.pgn(&p)),
        };

        match result {
            Ok(response) => Ok(response),
            Err(ManagerError::Game(GameError::IllegalMove { input, legal })) => {
                Ok(fmt.illegal_move(&input, &legal))
            }

            Err(ManagerError::Game(e)) => Ok(Response::ephemeral(format!("Sorry, {}.", e))),
            Err(ManagerError::Store(e)) => Err(e),
        }
    }
}
