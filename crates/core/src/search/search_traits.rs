use async_trait::async_trait;

use super::search_model::PolicySearchDocument;
use crate::errors::Result;

/// Inverted index over policy search documents.
#[async_trait]
pub trait PolicyIndexTrait: Send + Sync {
    fn get(&self, policy_number: &str) -> Result<Option<PolicySearchDocument>>;

    /// Documents having, for every entry of `terms`, at least one indexed
    /// term starting with it.
    fn search_terms(&self, terms: &[String]) -> Result<Vec<PolicySearchDocument>>;

    /// Inserts or replaces the document keyed by its policy number.
    async fn index(&self, document: PolicySearchDocument) -> Result<()>;
}

pub trait PolicySearchServiceTrait: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<PolicySearchDocument>>;
}
