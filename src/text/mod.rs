// Text processing: word tokenization and lemmatization.

pub mod lemma;
pub mod normalize;

pub use normalize::{normalize, normalize_display};
