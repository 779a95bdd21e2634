// Catalog resolver trait: artwork and play links for recommended songs.
//
// Resolution is best-effort and never fails: every lookup returns either the
// catalog's answer or a fallback URL, and says which one it is. Callers and
// tests can tell a real hit from a fallback without inspecting logs.

use std::fmt;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Artwork shown when the catalog has no cover for a song.
pub const PLACEHOLDER_ARTWORK_URL: &str = "https://i.postimg.cc/0QNxYz4V/social.png";

/// Base of the catalog search page used as the play-link fallback.
pub const SEARCH_LINK_BASE: &str = "https://open.spotify.com/search/";

/// Characters left unescaped in search links: RFC 3986 unreserved plus '/'.
const SEARCH_QUERY_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// A resolved URL, tagged with whether it came from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "url", rename_all = "snake_case")]
pub enum Resolved {
    Found(String),
    Fallback(String),
}

impl Resolved {
    pub fn url(&self) -> &str {
        match self {
            Resolved::Found(url) | Resolved::Fallback(url) => url,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolved::Fallback(_))
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

/// Artwork and play link for one song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogLinks {
    pub artwork: Resolved,
    pub play_link: Resolved,
}

/// Fallback artwork for any song.
pub fn fallback_artwork() -> Resolved {
    Resolved::Fallback(PLACEHOLDER_ARTWORK_URL.to_string())
}

/// Fallback play link: a catalog search for "<song> <artist>".
pub fn fallback_play_link(song: &str, artist: &str) -> Resolved {
    let query = format!("{song} {artist}");
    Resolved::Fallback(format!(
        "{}{}",
        SEARCH_LINK_BASE,
        utf8_percent_encode(&query, SEARCH_QUERY_SET)
    ))
}

/// Trait for looking up catalog links. Implementations must be async because
/// real catalogs are HTTP APIs.
#[async_trait]
pub trait CatalogResolver: Send + Sync {
    /// Cover art URL for the song.
    async fn resolve_artwork(&self, song: &str, artist: &str) -> Resolved;

    /// Playable link for the song.
    async fn resolve_play_link(&self, song: &str, artist: &str) -> Resolved;

    /// Both links. The default calls the two lookups in turn; providers that
    /// get both from one request can override it.
    async fn resolve(&self, song: &str, artist: &str) -> CatalogLinks {
        CatalogLinks {
            artwork: self.resolve_artwork(song, artist).await,
            play_link: self.resolve_play_link(song, artist).await,
        }
    }
}

/// Resolver used when no catalog credentials are configured (or with
/// `--offline`). Always returns fallbacks, never touches the network.
pub struct OfflineResolver;

#[async_trait]
impl CatalogResolver for OfflineResolver {
    async fn resolve_artwork(&self, _song: &str, _artist: &str) -> Resolved {
        fallback_artwork()
    }

    async fn resolve_play_link(&self, song: &str, artist: &str) -> Resolved {
        fallback_play_link(song, artist)
    }
}
