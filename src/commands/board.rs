use poise::CreateReply;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    commands::{internal_err, user_err, CommandResult, Context},
    tracker::RotationOutcome,
    utils::report::ranking_embed,
};

/// Show the current leaderboard without resetting it.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn leaderboard(ctx: Context<'_>) -> CommandResult {
    let state = ctx.data();

    let ranking = state
        .tracker
        .ranking(Some(state.leaderboard_size))
        .await
        .map_err(|err| internal_err(format!("Could not get the ranking: {err}")))?;

    if ranking.is_empty() {
        ctx.say("No submissions yet.").await?;
        return Ok(());
    }

    let embed = ranking_embed(
        "🔥 Current Leaderboard",
        &ranking,
        &state.emoji,
        OffsetDateTime::now_utc(),
    );
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Post the leaderboard now and start a new round.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn rotate(ctx: Context<'_>) -> CommandResult {
    let state = ctx.data();

    let is_admin = ctx
        .author_member()
        .await
        .is_some_and(|member| member.roles.contains(&state.admin_role));

    if !is_admin {
        return Err(user_err("**Only admins can rotate the leaderboard.**"));
    }

    let outcome = state
        .tracker
        .rotate()
        .await
        .map_err(|err| internal_err(format!("Could not rotate the leaderboard: {err}")))?;

    match outcome {
        RotationOutcome::Empty => {
            ctx.say("Nothing to rotate, there are no submissions yet.")
                .await?;
        }

        RotationOutcome::Rotated { report, report_sent } => {
            info!("{} rotated the leaderboard", ctx.author().tag());

            if report_sent {
                ctx.say(format!("Leaderboard rotated with {} entries.", report.len()))
                    .await?;
            } else {
                warn!("The rotation report could not be posted");
                ctx.say("Leaderboard rotated, but the report could not be posted.")
                    .await?;
            }
        }
    }

    Ok(())
}
