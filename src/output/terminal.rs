// Colored terminal output for recommendations, moods, and model details.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::catalog::enrich::EnrichedRecommendation;
use crate::catalog::traits::Resolved;
use crate::mood::Mood;

/// Width of the similarity bar in characters.
const BAR_WIDTH: usize = 20;

/// Display a ranked recommendation list with catalog links.
pub fn display_recommendations(
    query_song: &str,
    mood: Option<Mood>,
    recommendations: &[EnrichedRecommendation],
) {
    let mood_str = mood.map(|m| m.label()).unwrap_or("no mood");
    println!(
        "\n{}",
        format!("=== Recommendations for \"{query_song}\" ({mood_str}) ===").bold()
    );
    println!();

    for (i, item) in recommendations.iter().enumerate() {
        let rec = &item.recommendation;
        println!(
            "  {:>2}. {:<36} {:<28} {} {:.2}",
            i + 1,
            super::truncate_chars(&rec.song, 33).bold(),
            super::truncate_chars(&rec.artist, 25).bright_green(),
            similarity_bar(rec.score),
            rec.score,
        );
        println!("      {} {}", "play:".dimmed(), colorize_link(&item.play_link));
        println!("      {} {}", "art: ".dimmed(), colorize_link(&item.artwork));
    }
    println!();
}

/// Display the list of songs available to pick from.
pub fn display_songs(titles: &[&str], total: usize) {
    if titles.is_empty() {
        println!("No songs match.");
        return;
    }

    for title in titles {
        println!("  {title}");
    }
    println!(
        "\n{}",
        format!("{} of {} songs", titles.len(), total).dimmed()
    );
}

/// Display the mood labels and the keywords each one adds to a query.
pub fn display_moods() {
    println!("\n{}", "=== Moods ===".bold());
    println!();
    for mood in Mood::ALL {
        println!(
            "  {:<14} {}",
            mood.label(),
            mood.keywords().join(", ").dimmed()
        );
    }
    println!();
}

/// Display a summary of the loaded model bundle.
pub fn display_model_info(
    path: &Path,
    built_at: DateTime<Utc>,
    entries: usize,
    unique_titles: usize,
    vocabulary: usize,
) {
    println!("\n{}", "=== Melodix Model ===".bold());
    println!();
    println!("  Bundle:        {}", path.display());
    println!("  Built:         {}", built_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  Corpus:        {entries} entries ({unique_titles} unique titles)");
    println!("  Vocabulary:    {vocabulary} terms");
    println!();
}

/// Render a similarity score (0.0 to 1.0) as a fixed-width bar.
fn similarity_bar(score: f64) -> colored::ColoredString {
    let filled = ((score.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(BAR_WIDTH - filled));

    if score >= 0.25 {
        bar.bright_green()
    } else if score >= 0.10 {
        bar.bright_yellow()
    } else {
        bar.bright_blue()
    }
}

/// Catalog hits in plain text, fallbacks dimmed.
fn colorize_link(resolved: &Resolved) -> colored::ColoredString {
    match resolved {
        Resolved::Found(url) => url.normal(),
        Resolved::Fallback(url) => format!("{url} (fallback)").dimmed(),
    }
}
