#![forbid(unsafe_code)]

mod actors;
mod commands;
mod config;
mod event_handler;
mod liveness;
mod models;
mod platform;
mod poise_error_handler;
mod repository;
mod scheduler;
mod tracker;
mod utils;
mod voter_roles;

use std::{process::exit, str::FromStr, sync::Arc};

use commands::CommandError;
use config::AppConfig;
use platform::DiscordPlatform;
use poise::{serenity_prelude::*, Framework};
use poise_error_handler::handle_error;
use repository::SnapshotRepository;
use scheduler::Scheduler;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tokio::{select, signal, sync::Notify};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker::{Tracker, TrackerHandle};
use voter_roles::VoterRoles;

pub struct BotState {
    pub tracker: TrackerHandle,
    pub voter_roles: VoterRoles,
    pub platform: Arc<DiscordPlatform>,
    pub target_channel: ChannelId,
    pub emoji: String,
    pub admin_role: RoleId,
    pub leaderboard_size: usize,
}

#[tracing::instrument]
#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "fire_board_bot=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    if let Err(err) = app_config.validate() {
        error!("Invalid app config: {err}");
        exit(255);
    }

    let db_pool = match setup_database(&app_config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Could not setup database: {err}");
            exit(255);
        }
    };

    liveness::spawn(app_config.liveness_addr.clone());

    let shutdown_notify = Arc::new(Notify::new());
    let scheduler_shutdown = shutdown_notify.clone();
    let snapshots = Arc::new(SnapshotRepository::new(db_pool.clone()));
    let token = app_config.discord_bot_token.clone();

    let framework = Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(app_config.command_prefix.clone()),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, state| {
                Box::pin(event_handler::handle_event(ctx, event, framework, state))
            },
            on_error: |error| Box::pin(handle_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(
                async move {
                    let commands = &framework.options().commands;

                    if let Some(true) = app_config.register_commands_globally {
                        info!("Registering commands globally");
                        poise::builtins::register_globally(ctx, commands).await?;
                    }

                    if let Some(guilds) = &app_config.register_commands_in_guilds {
                        for guild in guilds.iter().map(|g| GuildId::new(*g)) {
                            let guild_name = ctx
                                .http()
                                .get_guild(guild)
                                .await
                                .map(|g| g.name)
                                .unwrap_or("???".to_string());

                            info!("Registering commands in guild {guild} ({guild_name})");

                            poise::builtins::register_in_guild(ctx, commands, guild).await?;
                        }
                    }

                    let target_channel = app_config.target_channel();
                    let guild = match ctx.http.get_channel(target_channel).await? {
                        Channel::Guild(channel) => channel.guild_id,
                        _ => {
                            let message =
                                format!("Channel {target_channel} is not a server channel");
                            return Err(CommandError::Internal { message });
                        }
                    };

                    info!("Tracking channel {target_channel} in guild {guild}");

                    let platform = Arc::new(DiscordPlatform::new(
                        ctx.http.clone(),
                        guild,
                        target_channel,
                        app_config.tracked_emoji.clone(),
                        app_config.platform_timeout(),
                    ));

                    let tracker = Tracker::load(
                        platform.clone(),
                        snapshots,
                        app_config.tracker_config(),
                    )
                    .await;
                    let tracker = actors::spawn(tracker, "tracker", 64);

                    if let Err(err) = tracker.reconcile().await {
                        error!("Could not reconcile missed submissions: {err}");
                    }

                    Scheduler::create_and_start(
                        scheduler_shutdown,
                        tracker.clone(),
                        app_config.rescore_interval(),
                        app_config.rotation_interval(),
                    );

                    Ok(BotState {
                        tracker,
                        voter_roles: VoterRoles::new(
                            platform.clone(),
                            app_config.voter_role(),
                            app_config.voter_scan_limit(),
                        ),
                        platform,
                        target_channel,
                        emoji: app_config.tracked_emoji.clone(),
                        admin_role: app_config.admin_role(),
                        leaderboard_size: app_config.leaderboard_size,
                    })
                }
                .instrument(info_span!("bot_setup")),
            )
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match ClientBuilder::new(token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to create the client: {err}");
            exit(255);
        }
    };

    select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            shutdown_notify.notify_waiters();
            client.shard_manager.shutdown_all().await;
            db_pool.close().await;
        },

        result = client.start() => {
            if let Err(err) = result {
                error!("Failed to start the client: {err}");
            }
        },
    };
}

#[tracing::instrument(skip(url))]
async fn setup_database(url: &str) -> anyhow::Result<SqlitePool> {
    info!("Connecting to SQLite database at {url}");
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    info!("Running migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Done!");
    Ok(pool)
}
