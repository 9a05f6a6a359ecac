//! In-memory inverted index for policy search.

mod index;

pub use index::PolicyIndex;
