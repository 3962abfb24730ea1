use std::{borrow::Cow, fmt::Write};

use poise::serenity_prelude::CreateEmbed;
use time::OffsetDateTime;

use super::formatting::{format_mean, format_report_date};
use crate::models::{RankedSubmission, SubmissionStats};

const LEADERBOARD_COLOR: u32 = 0xFF9900;
const STATS_COLOR: u32 = 0x00BFFF;

pub const CSV_FILE_NAME: &str = "leaderboard.csv";

/// The embed posted when the leaderboard rotates.
pub fn leaderboard_embed(
    entries: &[RankedSubmission],
    emoji: &str,
    date: OffsetDateTime,
) -> CreateEmbed {
    ranking_embed("🏆 Daily Leaderboard", entries, emoji, date)
}

pub fn ranking_embed(
    title: &str,
    entries: &[RankedSubmission],
    emoji: &str,
    date: OffsetDateTime,
) -> CreateEmbed {
    entries.iter().fold(
        CreateEmbed::new()
            .title(title)
            .description(format_report_date(date))
            .colour(LEADERBOARD_COLOR),
        |embed, entry| {
            let (name, value) = ranking_field(entry, emoji);
            embed.field(name, value, false)
        },
    )
}

pub fn ranking_field(entry: &RankedSubmission, emoji: &str) -> (String, String) {
    (
        format!("{}. {}", entry.rank, entry.record.author_display),
        format!(
            "{emoji} {} points\n[Post]({})",
            entry.record.score, entry.record.link
        ),
    )
}

pub fn stats_embed(stats: &SubmissionStats) -> CreateEmbed {
    CreateEmbed::new()
        .title("📊 Stats")
        .colour(STATS_COLOR)
        .field("Submissions", stats.submissions.to_string(), true)
        .field("Users", stats.users.to_string(), true)
        .field("Avg Score", format_mean(stats.mean_score), true)
        .field("Top Score", stats.max_score.to_string(), true)
}

/// All tracked submissions as CSV rows of rank, author, score and link.
pub fn leaderboard_csv(entries: &[RankedSubmission]) -> String {
    let mut csv = String::from("Rank,Author,Score,Link\r\n");

    for entry in entries {
        let _ = write!(
            csv,
            "{},{},{},{}\r\n",
            entry.rank,
            csv_field(&entry.record.author_display),
            entry.record.score,
            csv_field(&entry.record.link),
        );
    }

    csv
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains(&[',', '"', '\r', '\n'][..]) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
