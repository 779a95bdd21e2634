// Melodix: mood-aware song recommendations from lyric fingerprints.
//
// This is the library root. Each module corresponds to a stage of the
// recommendation pipeline or the ambient plumbing around it.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod model;
pub mod mood;
pub mod output;
pub mod ranking;
pub mod text;
