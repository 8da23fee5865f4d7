//! Core building blocks shared by the indexer and the server

pub mod error;
pub mod language;
pub mod paths;

pub use error::{SearchError, SearchResult};
