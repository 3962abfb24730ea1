use poise::{serenity_prelude::CreateAttachment, CreateReply};

use crate::{
    commands::{internal_err, CommandResult, Context},
    utils::report::{leaderboard_csv, stats_embed, CSV_FILE_NAME},
};

/// Show submission count, users, average and top score.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn stats(ctx: Context<'_>) -> CommandResult {
    let stats = ctx
        .data()
        .tracker
        .stats()
        .await
        .map_err(|err| internal_err(format!("Could not get stats: {err}")))?;

    match stats {
        Some(stats) => {
            ctx.send(CreateReply::default().embed(stats_embed(&stats)))
                .await?;
        }
        None => {
            ctx.say("No data yet.").await?;
        }
    }

    Ok(())
}

/// Export every tracked submission as a CSV file.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn export_csv(ctx: Context<'_>) -> CommandResult {
    let ranking = ctx
        .data()
        .tracker
        .ranking(None)
        .await
        .map_err(|err| internal_err(format!("Could not get the ranking: {err}")))?;

    if ranking.is_empty() {
        ctx.say("Nothing to export.").await?;
        return Ok(());
    }

    let csv = leaderboard_csv(&ranking);
    ctx.send(
        CreateReply::default()
            .content("📎 Exported CSV:")
            .attachment(CreateAttachment::bytes(csv.into_bytes(), CSV_FILE_NAME)),
    )
    .await?;

    Ok(())
}
