use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use melodix::catalog::enrich::enrich;
use melodix::catalog::spotify::SpotifyResolver;
use melodix::catalog::traits::{CatalogResolver, OfflineResolver};
use melodix::config::Config;
use melodix::engine::{Outcome, QuerySource, RecommendationEngine, Request};
use melodix::model::bundle::{load_raw_songs, BuildOptions, ModelBundle};
use melodix::mood::Mood;
use melodix::output::terminal;

/// Melodix: music discovery by lyric similarity.
///
/// Pick a song and a mood; Melodix finds songs whose lyrics read alike.
#[derive(Parser)]
#[command(name = "melodix", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the model bundle from a JSON array of {song, artist, text}
    Build {
        /// Songs file to read
        #[arg(long)]
        input: PathBuf,

        /// Where to write the bundle (default: MELODIX_MODEL_PATH)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only use the first N songs of the input
        #[arg(long)]
        limit: Option<usize>,

        /// Keep English stop words in the vocabulary
        #[arg(long)]
        keep_stop_words: bool,
    },

    /// Recommend songs similar to SONG (a random song if omitted)
    Recommend {
        /// Song title to start from
        song: Option<String>,

        /// Mood to bias towards (Happy, Chill, Sad, Energetic)
        #[arg(long)]
        mood: Option<String>,

        /// Number of recommendations (default: MELODIX_TOP_N or 5)
        #[arg(long)]
        top_n: Option<usize>,

        /// Query with the song's lyric fingerprint instead of its title
        #[arg(long)]
        by_lyrics: bool,

        /// Skip Spotify lookups and use fallback links
        #[arg(long)]
        offline: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List songs in the model
    Songs {
        /// Only show titles containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },

    /// List moods and the keywords they add
    Moods,

    /// Show model bundle details
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging on stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("melodix=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            limit,
            keep_stop_words,
        } => {
            let config = Config::load()?;
            let output = output.unwrap_or_else(|| config.model_path.clone());

            println!("Reading songs from {}...", input.display());
            let songs = load_raw_songs(&input)?;
            println!("Building model from {} songs...", songs.len());

            let options = BuildOptions {
                limit,
                remove_stop_words: !keep_stop_words,
            };
            let bundle = ModelBundle::build(songs, &options);
            bundle.save(&output)?;

            println!("\n{}", "Model built.".bold());
            println!("  Songs:      {}", bundle.corpus.len());
            println!("  Vocabulary: {} terms", bundle.vectorizer.vocabulary_len());
            println!("  Saved to:   {}", output.display());
        }

        Commands::Recommend {
            song,
            mood,
            top_n,
            by_lyrics,
            offline,
            json,
        } => {
            let config = Config::load()?;
            let engine = load_engine(&config)?;

            let song = match song {
                Some(song) => song,
                None => match engine.random_song() {
                    Some(picked) => {
                        if !json {
                            println!("Picked a random song: {}", picked.bold());
                        }
                        picked.to_string()
                    }
                    None => anyhow::bail!("The model has no songs to pick from"),
                },
            };

            let mood = mood.as_deref().and_then(|label| {
                let parsed = Mood::parse(label);
                if parsed.is_none() {
                    warn!(mood = label, "Unknown mood, recommending without one");
                }
                parsed
            });

            let query_source = if by_lyrics {
                QuerySource::Fingerprint
            } else {
                QuerySource::Title
            };
            let request = Request::new(song.clone())
                .with_mood(mood)
                .with_top_n(top_n.unwrap_or(config.top_n))
                .with_query_source(query_source);

            let recommendations = match engine.recommend(&request) {
                Ok(Outcome::Found(recommendations)) => recommendations,
                Ok(Outcome::NoneFound) => {
                    if json {
                        println!("[]");
                    } else {
                        println!(
                            "{}",
                            "No recommendations found. Try a different song.".yellow()
                        );
                    }
                    return Ok(());
                }
                Err(e) => {
                    return Err(anyhow::Error::new(e).context("Error generating recommendations"));
                }
            };

            let resolver = create_resolver(&config, offline)?;

            let spinner = if json {
                ProgressBar::hidden()
            } else {
                let pb = ProgressBar::new_spinner();
                pb.set_style(ProgressStyle::default_spinner().template("  {spinner} {msg}")?);
                pb.set_message("Finding similar tracks...");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            };

            let enriched = enrich(
                resolver.as_ref(),
                recommendations,
                config.enrich_concurrency,
            )
            .await;
            spinner.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&enriched)?);
            } else {
                terminal::display_recommendations(&song, mood, &enriched);
            }
        }

        Commands::Songs { filter } => {
            let config = Config::load()?;
            let engine = load_engine(&config)?;
            let titles = engine.song_titles();
            let total = titles.len();

            let shown: Vec<&str> = match filter.as_deref() {
                Some(needle) => {
                    let needle = needle.to_lowercase();
                    titles
                        .into_iter()
                        .filter(|t| t.to_lowercase().contains(&needle))
                        .collect()
                }
                None => titles,
            };

            terminal::display_songs(&shown, total);
        }

        Commands::Moods => {
            terminal::display_moods();
        }

        Commands::Info => {
            let config = Config::load()?;
            config.require_model()?;
            let bundle = ModelBundle::load(&config.model_path)?;
            let built_at = bundle.built_at;
            let path = config.model_path.clone();
            let engine = RecommendationEngine::from_bundle(bundle)?;

            terminal::display_model_info(
                &path,
                built_at,
                engine.corpus().len(),
                engine.song_titles().len(),
                engine.vectorizer().vocabulary_len(),
            );
        }
    }

    Ok(())
}

/// Load the model bundle and build the engine. Any failure here is fatal:
/// without a model there is nothing to serve.
fn load_engine(config: &Config) -> Result<RecommendationEngine> {
    config.require_model()?;
    let bundle = ModelBundle::load(&config.model_path)?;
    let engine = RecommendationEngine::from_bundle(bundle)?;
    info!(songs = engine.corpus().len(), "Recommendation engine ready");
    Ok(engine)
}

/// Pick the catalog resolver: Spotify when credentials are configured,
/// offline fallbacks otherwise.
fn create_resolver(config: &Config, offline: bool) -> Result<Box<dyn CatalogResolver>> {
    if offline {
        return Ok(Box::new(OfflineResolver));
    }
    if !config.has_spotify() {
        info!("SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET not set; using fallback links");
        return Ok(Box::new(OfflineResolver));
    }
    Ok(Box::new(SpotifyResolver::new(
        &config.spotify_client_id,
        &config.spotify_client_secret,
        &config.spotify_api_url,
        &config.spotify_accounts_url,
    )?))
}
