use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::search_model::{tokenize, PolicySearchDocument};
use super::search_traits::{PolicyIndexTrait, PolicySearchServiceTrait};
use crate::errors::{Error, Result};
use crate::events::{IntegrationEvent, IntegrationEventHandler};
use crate::policies::PolicyStatus;

pub struct PolicySearchService {
    index: Arc<dyn PolicyIndexTrait>,
}

impl PolicySearchService {
    pub fn new(index: Arc<dyn PolicyIndexTrait>) -> Self {
        Self { index }
    }
}

impl PolicySearchServiceTrait for PolicySearchService {
    fn search(&self, query: &str) -> Result<Vec<PolicySearchDocument>> {
        let mut terms = tokenize(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        terms.sort();
        terms.dedup();

        let mut found = self.index.search_terms(&terms)?;
        found.sort_by(|a, b| {
            b.policy_from
                .cmp(&a.policy_from)
                .then_with(|| a.policy_number.cmp(&b.policy_number))
        });
        debug!("Search '{}' matched {} policies", query, found.len());
        Ok(found)
    }
}

#[async_trait]
impl IntegrationEventHandler for PolicySearchService {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        match event {
            IntegrationEvent::PolicyCreated(e) => {
                self.index
                    .index(PolicySearchDocument {
                        policy_number: e.policy_number.clone(),
                        product_code: e.product_code.clone(),
                        policy_holder_first_name: e.policy_holder.first_name.clone(),
                        policy_holder_last_name: e.policy_holder.last_name.clone(),
                        agent_login: e.agent_login.clone(),
                        policy_from: e.policy_from,
                        policy_to: e.policy_to,
                        total_premium: e.total_premium,
                        status: PolicyStatus::Active,
                    })
                    .await
            }
            IntegrationEvent::PolicyTerminated(e) => {
                let mut doc = self
                    .index
                    .get(&e.policy_number)?
                    .ok_or_else(|| Error::not_found("PolicySearchDocument", e.policy_number.clone()))?;
                if doc.status == PolicyStatus::Terminated {
                    return Ok(());
                }
                doc.status = PolicyStatus::Terminated;
                doc.policy_to = e.termination_date;
                doc.total_premium -= e.amount_to_return;
                self.index.index(doc).await
            }
        }
    }
}
