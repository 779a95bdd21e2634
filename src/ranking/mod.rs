// Similarity ranking and top-N selection.

pub mod select;
pub mod similarity;
