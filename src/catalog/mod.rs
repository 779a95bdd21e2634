// Catalog enrichment: artwork and play links for recommended songs.

pub mod enrich;
pub mod spotify;
pub mod traits;
