mod board;
mod help;
mod stats;

use crate::BotState;

pub use board::{leaderboard, rotate};
pub use help::help;
pub use stats::{export_csv, stats};

type CommandResult = Result<(), CommandError>;
type Context<'a> = poise::Context<'a, BotState, CommandError>;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    User { message: String },
    #[error("{message}")]
    Internal { message: String },
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

fn user_err(message: impl Into<String>) -> CommandError {
    CommandError::User {
        message: message.into(),
    }
}

fn internal_err(message: impl Into<String>) -> CommandError {
    CommandError::Internal {
        message: message.into(),
    }
}

pub fn all() -> Vec<poise::Command<BotState, CommandError>> {
    vec![leaderboard(), rotate(), stats(), export_csv(), help()]
}
