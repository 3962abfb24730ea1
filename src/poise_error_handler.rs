use poise::{CreateReply, FrameworkError};
use tracing::{debug, error, warn};

use crate::{commands::CommandError, BotState};

type Context<'a> = poise::Context<'a, BotState, CommandError>;

pub async fn handle_error(error: FrameworkError<'_, BotState, CommandError>) {
    use FrameworkError::*;

    match error {
        Setup { error, .. } => {
            error!("Could not set up the bot: {error}");
        }

        EventHandler { error, event, .. } => {
            error!(
                "Could not handle the {} event: {error}",
                event.snake_case_name()
            );
        }

        Command { error, ctx, .. } => {
            let command = &ctx.command().qualified_name;

            match error {
                CommandError::User { message } => {
                    debug!("`{command}` refused: {message}");
                    reply(ctx, &message).await;
                }

                CommandError::Internal { message } => {
                    error!("`{command}` failed: {message}");
                    reply_internal(ctx).await;
                }

                CommandError::Serenity(err) => {
                    error!("`{command}` failed talking to Discord: {err}");
                    reply_internal(ctx).await;
                }
            }
        }

        ArgumentParse {
            error, input, ctx, ..
        } => {
            let usage = ctx
                .command()
                .help_text
                .as_deref()
                .unwrap_or("Use `help` to see how the command works.");

            let response = match input {
                Some(input) => format!("**Could not read `{input}`: {error}**\n{usage}"),
                None => format!("**{error}**\n{usage}"),
            };

            reply(ctx, &response).await;
        }

        CommandStructureMismatch {
            description, ctx, ..
        } => {
            error!(
                "Slash command `{}` does not match its registration: {description}",
                ctx.command.qualified_name
            );
        }

        MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            warn!("The bot is missing permissions: {missing_permissions}");
            reply(ctx, "The bot lacks the permissions this command needs.").await;
        }

        GuildOnly { ctx, .. } => {
            reply(ctx, "This command only works in the server.").await;
        }

        UnknownCommand { msg_content, .. } => {
            debug!("Ignoring unknown command {msg_content:?}");
        }

        error => {
            error!("Unhandled framework error: {error}");
        }
    }
}

async fn reply(ctx: Context<'_>, message: &str) {
    let reply = CreateReply::default().content(message).ephemeral(true);

    if let Err(err) = poise::send_reply(ctx, reply).await {
        error!("Could not send an error reply ({message:?}): {err}");
    }
}

async fn reply_internal(ctx: Context<'_>) {
    reply(
        ctx,
        "Something went wrong on our side. The admins can find the details in the logs.",
    )
    .await;
}
