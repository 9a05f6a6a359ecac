use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;
use policyhub_core::search::{PolicyIndexTrait, PolicySearchDocument};
use policyhub_core::Result;

use crate::errors::StorageError;

#[derive(Default)]
struct IndexState {
    documents: HashMap<String, PolicySearchDocument>,
    /// term -> policy numbers
    postings: BTreeMap<String, BTreeSet<String>>,
}

impl IndexState {
    fn remove(&mut self, policy_number: &str) {
        if let Some(old) = self.documents.remove(policy_number) {
            for term in old.terms() {
                if let Some(numbers) = self.postings.get_mut(&term) {
                    numbers.remove(policy_number);
                    if numbers.is_empty() {
                        self.postings.remove(&term);
                    }
                }
            }
        }
    }

    /// Policy numbers having some term that starts with `prefix`.
    fn prefix_matches(&self, prefix: &str) -> BTreeSet<String> {
        self.postings
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(term, _)| term.starts_with(prefix))
            .flat_map(|(_, numbers)| numbers.iter().cloned())
            .collect()
    }
}

/// Term index with prefix lookup over a sorted term dictionary.
#[derive(Default)]
pub struct PolicyIndex {
    state: RwLock<IndexState>,
}

impl PolicyIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyIndexTrait for PolicyIndex {
    fn get(&self, policy_number: &str) -> Result<Option<PolicySearchDocument>> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::LockPoisoned("PolicySearchDocument"))?;
        Ok(state.documents.get(policy_number).cloned())
    }

    fn search_terms(&self, terms: &[String]) -> Result<Vec<PolicySearchDocument>> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::LockPoisoned("PolicySearchDocument"))?;

        let mut matched: Option<BTreeSet<String>> = None;
        for term in terms {
            let hits = state.prefix_matches(term);
            let next = match matched {
                Some(acc) => acc.intersection(&hits).cloned().collect(),
                None => hits,
            };
            if next.is_empty() {
                return Ok(Vec::new());
            }
            matched = Some(next);
        }

        Ok(matched
            .unwrap_or_default()
            .iter()
            .filter_map(|number| state.documents.get(number).cloned())
            .collect())
    }

    async fn index(&self, document: PolicySearchDocument) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::LockPoisoned("PolicySearchDocument"))?;
        let number = document.policy_number.clone();
        state.remove(&number);
        for term in document.terms() {
            state
                .postings
                .entry(term)
                .or_default()
                .insert(number.clone());
        }
        state.documents.insert(number, document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use policyhub_core::policies::PolicyStatus;
    use rust_decimal_macros::dec;

    fn doc(number: &str, last_name: &str) -> PolicySearchDocument {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PolicySearchDocument {
            policy_number: number.to_string(),
            product_code: "HSI".to_string(),
            policy_holder_first_name: "Jan".to_string(),
            policy_holder_last_name: last_name.to_string(),
            agent_login: "danny.solid".to_string(),
            policy_from: day,
            policy_to: day,
            total_premium: dec!(1),
            status: PolicyStatus::Active,
        }
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn prefix_terms_are_intersected() {
        let index = PolicyIndex::new();
        index.index(doc("P1", "Kowalski")).await.unwrap();
        index.index(doc("P2", "Kowalczyk")).await.unwrap();
        index.index(doc("P3", "Nowak")).await.unwrap();

        assert_eq!(index.search_terms(&terms(&["kowal"])).unwrap().len(), 2);
        let hits = index.search_terms(&terms(&["kowalc", "jan"])).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].policy_number, "P2");
        assert!(index
            .search_terms(&terms(&["nowak", "kowal"]))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn reindexing_drops_stale_terms() {
        let index = PolicyIndex::new();
        index.index(doc("P1", "Kowalski")).await.unwrap();
        index.index(doc("P1", "Nowak")).await.unwrap();

        assert!(index.search_terms(&terms(&["kowal"])).unwrap().is_empty());
        assert_eq!(index.search_terms(&terms(&["nowak"])).unwrap().len(), 1);
    }
}
