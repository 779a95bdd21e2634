// Recommendation model: corpus records, the TF-IDF vectorizer, and the
// on-disk bundle that carries both.

pub mod bundle;
pub mod corpus;
pub mod vectorizer;
