// Post-ranking enrichment: attaches artwork and play links to
// recommendations. Runs after the engine has returned, so catalog latency or
// failures can never affect ranking.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::debug;

use super::traits::{CatalogResolver, Resolved};
use crate::ranking::select::Recommendation;

/// A recommendation with its catalog links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub artwork: Resolved,
    pub play_link: Resolved,
}

/// Resolve links for every recommendation, at most `concurrency` lookups at
/// a time. Output order matches input order. Never fails: lookups that miss
/// come back as fallbacks.
pub async fn enrich(
    resolver: &dyn CatalogResolver,
    recommendations: Vec<Recommendation>,
    concurrency: usize,
) -> Vec<EnrichedRecommendation> {
    let total = recommendations.len();

    let enriched: Vec<EnrichedRecommendation> = stream::iter(recommendations)
        .map(|recommendation| async move {
            let links = resolver
                .resolve(&recommendation.song, &recommendation.artist)
                .await;
            EnrichedRecommendation {
                recommendation,
                artwork: links.artwork,
                play_link: links.play_link,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let fallbacks = enriched
        .iter()
        .filter(|e| e.artwork.is_fallback() || e.play_link.is_fallback())
        .count();
    debug!(total = total, fallbacks = fallbacks, "Enriched recommendations");

    enriched
}
