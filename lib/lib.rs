/// Chess domain types.
pub mod chess;
/// Chess engines that suggest moves.
pub mod engine;
/// Games played on chat channels.
pub mod game;
/// Board images.
pub mod render;
/// The HTTP service.
pub mod server;
/// The Slack slash command protocol.
pub mod slack;
/// Assorted utilities.
pub mod util;
