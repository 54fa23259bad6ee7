use serde::Deserialize;

mod command;
mod dispatch;
mod response;

pub use command::*;
pub use dispatch::*;
pub use response::*;

/// The fields of a slash command request, as posted by Slack.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct SlashCommand {
    pub token: String,
    pub channel_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub text: String,
}
