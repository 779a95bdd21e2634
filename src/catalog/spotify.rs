// Spotify Web API resolver.
//
// Uses the client-credentials flow (no user login): exchange the app's id and
// secret for a short-lived bearer token, cache it until shortly before it
// expires, and search tracks with `track:<song> artist:<artist>`.
//
// API docs: https://developer.spotify.com/documentation/web-api/reference/search

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::traits::{
    fallback_artwork, fallback_play_link, CatalogLinks, CatalogResolver, Resolved,
};

/// Default Web API base URL.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Default accounts service base URL (token endpoint).
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

/// Refresh tokens this long before they actually expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What a track search tells us about the best match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMatch {
    pub artwork_url: Option<String>,
    pub track_url: Option<String>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Spotify catalog resolver.
pub struct SpotifyResolver {
    client: Client,
    api_url: String,
    accounts_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyResolver {
    /// Create a resolver against the given endpoints.
    ///
    /// Pass `DEFAULT_API_URL` / `DEFAULT_ACCOUNTS_URL` for the public
    /// Spotify service, or other URLs for testing and proxies.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        api_url: &str,
        accounts_url: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent("melodix/0.1 (music-discovery)")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Return a valid access token, fetching a new one if the cached token
    /// is missing or about to expire.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let url = format!("{}/api/token", self.accounts_url);
        debug!("Requesting Spotify access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Spotify token request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Spotify token endpoint returned {status}: {body}");
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Spotify token response")?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    /// Search for the best track match for (song, artist).
    /// `Ok(None)` means the search worked but found nothing.
    pub async fn search_track(&self, song: &str, artist: &str) -> Result<Option<TrackMatch>> {
        let token = self.access_token().await?;
        let url = format!("{}/search", self.api_url);
        let query = format!("track:{song} artist:{artist}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            .send()
            .await
            .context("Spotify search request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Spotify search returned {status}: {body}");
        }

        let result: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Spotify search response")?;

        Ok(result.tracks.items.into_iter().next().map(|track| TrackMatch {
            artwork_url: track.album.images.into_iter().next().map(|i| i.url),
            track_url: track.external_urls.spotify,
        }))
    }

    /// Run one search and turn it into links, falling back on any miss.
    async fn lookup(&self, song: &str, artist: &str) -> CatalogLinks {
        let found = match self.search_track(song, artist).await {
            Ok(found) => found.unwrap_or_default(),
            Err(e) => {
                warn!(song = song, artist = artist, error = %e, "Spotify lookup failed, using fallbacks");
                TrackMatch::default()
            }
        };

        CatalogLinks {
            artwork: found
                .artwork_url
                .map(Resolved::Found)
                .unwrap_or_else(fallback_artwork),
            play_link: found
                .track_url
                .map(Resolved::Found)
                .unwrap_or_else(|| fallback_play_link(song, artist)),
        }
    }
}

#[async_trait]
impl CatalogResolver for SpotifyResolver {
    async fn resolve_artwork(&self, song: &str, artist: &str) -> Resolved {
        self.lookup(song, artist).await.artwork
    }

    async fn resolve_play_link(&self, song: &str, artist: &str) -> Resolved {
        self.lookup(song, artist).await.play_link
    }

    async fn resolve(&self, song: &str, artist: &str) -> CatalogLinks {
        self.lookup(song, artist).await
    }
}

// --- Spotify API response types ---

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<Track>,
}

#[derive(Deserialize)]
struct Track {
    album: Album,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Deserialize)]
struct Image {
    url: String,
}

#[derive(Deserialize, Default)]
struct ExternalUrls {
    spotify: Option<String>,
}
