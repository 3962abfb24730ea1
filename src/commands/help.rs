use poise::builtins::HelpConfiguration;

use crate::commands::{CommandResult, Context};

/// Show the available commands.
#[poise::command(prefix_command, slash_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to show help for"] command: Option<String>,
) -> CommandResult {
    let config = HelpConfiguration {
        extra_text_at_bottom: "Post an image without text to enter. Reactions decide the ranking.",
        ..Default::default()
    };

    poise::builtins::help(ctx, command.as_deref(), config).await?;
    Ok(())
}
