use async_trait::async_trait;
use policyhub_core::dashboard::{PolicyDocument, PolicyDocumentStoreTrait, SalesFilter};
use policyhub_core::Result;

use crate::table::MemoryTable;

pub struct PolicyDocumentStore {
    documents: MemoryTable<PolicyDocument>,
}

impl PolicyDocumentStore {
    pub fn new() -> Self {
        PolicyDocumentStore {
            documents: MemoryTable::new("PolicyDocument"),
        }
    }
}

impl Default for PolicyDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyDocumentStoreTrait for PolicyDocumentStore {
    fn find(&self, policy_number: &str) -> Result<Option<PolicyDocument>> {
        self.documents.get(policy_number)
    }

    fn query(&self, filter: &SalesFilter) -> Result<Vec<PolicyDocument>> {
        let mut docs = self.documents.filter(|doc| filter.matches(doc))?;
        docs.sort_by(|a, b| {
            a.policy_from
                .cmp(&b.policy_from)
                .then_with(|| a.policy_number.cmp(&b.policy_number))
        });
        Ok(docs)
    }

    async fn upsert(&self, document: PolicyDocument) -> Result<()> {
        let key = document.policy_number.clone();
        self.documents.upsert(&key, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn doc(number: &str, product: &str, from: NaiveDate) -> PolicyDocument {
        PolicyDocument {
            policy_number: number.to_string(),
            product_code: product.to_string(),
            agent_login: "agnes.smith".to_string(),
            policy_from: from,
            policy_to: from,
            total_premium: dec!(10),
            terminated: false,
        }
    }

    #[tokio::test]
    async fn query_applies_filter_in_sales_order() {
        let store = PolicyDocumentStore::new();
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        store.upsert(doc("B", "TRI", d(3))).await.unwrap();
        store.upsert(doc("A", "TRI", d(1))).await.unwrap();
        store.upsert(doc("C", "CAR", d(2))).await.unwrap();

        let filter = SalesFilter {
            product_code: Some("TRI".to_string()),
            ..Default::default()
        };
        let numbers: Vec<String> = store
            .query(&filter)
            .unwrap()
            .into_iter()
            .map(|d| d.policy_number)
            .collect();
        assert_eq!(numbers, vec!["A", "B"]);
    }
}
