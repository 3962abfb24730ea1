use poise::serenity_prelude::{self as serenity, FullEvent, Reaction};
use tracing::{debug, error, info_span, Instrument};

use crate::{
    commands::CommandError,
    platform::Author,
    tracker::{AdmissionOutcome, EditedMessage},
    voter_roles::VoterChange,
    BotState,
};

pub async fn handle_event(
    _ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, BotState, CommandError>,
    state: &BotState,
) -> Result<(), CommandError> {
    match event {
        FullEvent::Message { new_message } if new_message.channel_id == state.target_channel => {
            let message = state.platform.channel_message(new_message);
            let author_roles = new_message.member.as_ref().map(|m| m.roles.clone());

            async {
                match state.tracker.admit(message, author_roles).await {
                    Ok(AdmissionOutcome::Ignored) => {}
                    Ok(outcome) => debug!("Admission finished: {outcome:?}"),
                    Err(err) => error!("Could not admit the message: {err}"),
                }
            }
            .instrument(info_span!("message", id = %new_message.id))
            .await;
        }

        FullEvent::MessageUpdate { event, new, .. } if event.channel_id == state.target_channel => {
            // Embed unfurls also arrive as updates but carry no edit timestamp.
            if event.edited_timestamp.is_none() {
                return Ok(());
            }

            let Some(user) = event
                .author
                .as_ref()
                .or_else(|| new.as_ref().map(|m| &m.author))
            else {
                return Ok(());
            };

            let edited = EditedMessage {
                id: event.id,
                author: Author {
                    id: user.id,
                    display: user.tag(),
                    bot: user.bot,
                },
                author_roles: None,
            };

            if let Err(err) = state
                .tracker
                .edited(edited)
                .instrument(info_span!("edit", id = %event.id))
                .await
            {
                error!("Could not check the edited message: {err}");
            }
        }

        FullEvent::ReactionAdd { add_reaction } if is_tracked(state, add_reaction) => {
            if let Some(user) = add_reaction.user_id {
                let change = state.voter_roles.reaction_added(user).await;
                log_change(change);
            }
        }

        FullEvent::ReactionRemove { removed_reaction } if is_tracked(state, removed_reaction) => {
            if let Some(user) = removed_reaction.user_id {
                let change = state.voter_roles.reaction_removed(user).await;
                log_change(change);
            }
        }

        _ => {}
    }

    Ok(())
}

fn is_tracked(state: &BotState, reaction: &Reaction) -> bool {
    reaction.channel_id == state.target_channel && reaction.emoji.unicode_eq(&state.emoji)
}

fn log_change(change: VoterChange) {
    if change != VoterChange::Unchanged {
        debug!("Voter role change: {change:?}");
    }
}
